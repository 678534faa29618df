//! Legality oracle wrapped around `cozy-chess`.
//!
//! The arena never generates moves on its own behalf. It only needs to know
//! whether an engine's answer is legal, apply it, name it in SAN for the game
//! record, and tell when the game is over by the rules.

use cozy_chess::util::{display_uci_move, parse_uci_move};
use cozy_chess::{Board, Color, File, GameStatus, Move, Piece, Rank, Square};

use crate::error::ArenaError;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Why a proposed move was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    /// Not a coordinate move at all (`0000`, `(none)`, garbage)
    Unparseable,
    /// Well-formed, but not legal in this position
    Illegal,
}

/// Rules-determined end of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Checkmate { winner: Color },
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    Repetition,
}

#[derive(Debug, Clone)]
pub struct Position {
    board: Board,
    /// Hashes of every position reached so far, current one included
    history: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::startpos()
    }
}

impl Position {
    pub fn startpos() -> Self {
        Self::from_board(Board::default())
    }

    pub fn from_fen(fen: &str) -> Result<Self, ArenaError> {
        let board = Board::from_fen(fen, false).map_err(|_| ArenaError::InvalidFen(fen.to_string()))?;
        Ok(Self::from_board(board))
    }

    fn from_board(board: Board) -> Self {
        let history = vec![board.hash()];
        Self { board, history }
    }

    pub fn fen(&self) -> String {
        self.board.to_string()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Validate an engine's coordinate move against the current position.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveError> {
        let mv = parse_uci_move(&self.board, text.trim()).map_err(|_| MoveError::Unparseable)?;
        if self.board.is_legal(mv) {
            Ok(mv)
        } else {
            Err(MoveError::Illegal)
        }
    }

    /// Standard UCI spelling of a move in this position (`e1g1` for castling).
    pub fn uci(&self, mv: Move) -> String {
        display_uci_move(&self.board, mv).to_string()
    }

    /// Apply a legal move and return its SAN.
    pub fn play(&mut self, mv: Move) -> String {
        let mut san = self.san_body(mv);
        self.board.play_unchecked(mv);
        self.history.push(self.board.hash());

        if self.board.status() == GameStatus::Won {
            san.push('#');
        } else if !self.board.checkers().is_empty() {
            san.push('+');
        }
        san
    }

    /// Rules-determined terminal state, if any.
    pub fn terminal(&self) -> Option<Terminal> {
        match self.board.status() {
            GameStatus::Won => {
                return Some(Terminal::Checkmate {
                    winner: !self.board.side_to_move(),
                })
            }
            GameStatus::Drawn => {
                let has_moves = self.board.generate_moves(|_| true);
                return Some(if has_moves {
                    Terminal::FiftyMoveRule
                } else {
                    Terminal::Stalemate
                });
            }
            GameStatus::Ongoing => {}
        }

        if self.is_insufficient_material() {
            return Some(Terminal::InsufficientMaterial);
        }
        if self.repetitions() >= 3 {
            return Some(Terminal::Repetition);
        }
        None
    }

    /// How often the current position has occurred.
    pub fn repetitions(&self) -> usize {
        let current = self.board.hash();
        self.history.iter().filter(|&&h| h == current).count()
    }

    /// Neither side can ever mate: bare kings, a single minor piece, or
    /// bishops that all stand on one square colour.
    pub fn is_insufficient_material(&self) -> bool {
        let board = &self.board;
        let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
        if !heavy.is_empty() {
            return false;
        }

        let knights = board.pieces(Piece::Knight);
        let bishops = board.pieces(Piece::Bishop);
        let minors = knights.len() + bishops.len();
        if minors <= 1 {
            return true;
        }
        if !knights.is_empty() {
            return false;
        }

        let mut colours = bishops.into_iter().map(square_colour);
        let first = colours.next();
        colours.all(|c| Some(c) == first)
    }

    /// Text diagram, rank 8 first, uppercase for White.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &rank in Rank::ALL.iter().rev() {
            out.push_str(&format!("{} ", rank_char(rank)));
            for &file in File::ALL.iter() {
                let sq = Square::new(file, rank);
                let ch = match (self.board.piece_on(sq), self.board.color_on(sq)) {
                    (Some(piece), Some(Color::White)) => piece_char(piece).to_ascii_uppercase(),
                    (Some(piece), Some(Color::Black)) => piece_char(piece),
                    _ => '.',
                };
                out.push(ch);
                out.push(' ');
            }
            out.pop();
            out.push('\n');
        }
        out.push_str("  a b c d e f g h\n");
        out
    }

    /// SAN without the check suffix.
    fn san_body(&self, mv: Move) -> String {
        let board = &self.board;
        let us = board.side_to_move();
        let piece = match board.piece_on(mv.from) {
            Some(piece) => piece,
            None => return self.uci(mv),
        };

        // cozy-chess encodes castling as the king capturing its own rook
        if piece == Piece::King && board.color_on(mv.to) == Some(us) {
            return if (mv.to.file() as usize) > (mv.from.file() as usize) {
                "O-O".to_string()
            } else {
                "O-O-O".to_string()
            };
        }

        let capture = board.color_on(mv.to) == Some(!us) || (piece == Piece::Pawn && mv.from.file() != mv.to.file());
        let mut san = String::new();

        if piece == Piece::Pawn {
            if capture {
                san.push(file_char(mv.from.file()));
            }
        } else {
            san.push(piece_char(piece).to_ascii_uppercase());
            san.push_str(&self.disambiguation(mv, piece));
        }

        if capture {
            san.push('x');
        }
        san.push(file_char(mv.to.file()));
        san.push(rank_char(mv.to.rank()));

        if let Some(promotion) = mv.promotion {
            san.push('=');
            san.push(piece_char(promotion).to_ascii_uppercase());
        }
        san
    }

    fn disambiguation(&self, mv: Move, piece: Piece) -> String {
        let board = &self.board;
        let ours = board.colored_pieces(board.side_to_move(), piece);
        let mut rivals: Vec<Square> = Vec::new();
        board.generate_moves_for(ours & !mv.from.bitboard(), |moves| {
            if moves.to.has(mv.to) {
                rivals.push(moves.from);
            }
            false
        });

        if rivals.is_empty() {
            return String::new();
        }
        let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
        let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());
        match (shares_file, shares_rank) {
            (false, _) => file_char(mv.from.file()).to_string(),
            (true, false) => rank_char(mv.from.rank()).to_string(),
            (true, true) => format!("{}{}", file_char(mv.from.file()), rank_char(mv.from.rank())),
        }
    }
}

fn square_colour(sq: Square) -> usize {
    (sq.file() as usize + sq.rank() as usize) % 2
}

fn piece_char(piece: Piece) -> char {
    match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
    }
}

fn file_char(file: File) -> char {
    (b'a' + file as u8) as char
}

fn rank_char(rank: Rank) -> char {
    (b'1' + rank as u8) as char
}

#[cfg(test)]
#[path = "position_tests.rs"]
mod position_tests;
