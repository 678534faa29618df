//! Game records and their PGN rendering.

use chrono::{DateTime, Local};
use cozy_chess::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Write;
use uuid::Uuid;

use crate::position::Terminal;

/// Final result of one game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    /// Protocol failure: no points are awarded
    Abort,
}

impl GameResult {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    /// PGN result tag.
    pub fn pgn_tag(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Abort => "*",
        }
    }

    /// Points for (white, black).
    pub fn points(&self) -> (f64, f64) {
        match self {
            GameResult::WhiteWins => (1.0, 0.0),
            GameResult::BlackWins => (0.0, 1.0),
            GameResult::Draw => (0.5, 0.5),
            GameResult::Abort => (0.0, 0.0),
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Abort => f.write_str("Abort"),
            other => f.write_str(other.pgn_tag()),
        }
    }
}

/// Why a game ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    Checkmate,
    Stalemate,
    InsufficientMaterial,
    FiftyMoveRule,
    Repetition,
    /// The named side ran out of time
    TimeForfeit { loser: String },
    IllegalMove { mv: String },
    UnparseableMove { mv: String },
    NoResponse,
    /// Half-move ceiling reached without a rules result
    MoveCap,
    LaunchFailure { engine: String },
    Cancelled,
    Failure { reason: String },
}

impl Termination {
    /// Result and termination for a game the rules ended.
    pub fn from_terminal(terminal: Terminal) -> (GameResult, Termination) {
        match terminal {
            Terminal::Checkmate { winner } => (GameResult::win_for(winner), Termination::Checkmate),
            Terminal::Stalemate => (GameResult::Draw, Termination::Stalemate),
            Terminal::InsufficientMaterial => (GameResult::Draw, Termination::InsufficientMaterial),
            Terminal::FiftyMoveRule => (GameResult::Draw, Termination::FiftyMoveRule),
            Terminal::Repetition => (GameResult::Draw, Termination::Repetition),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate => f.write_str("checkmate"),
            Termination::Stalemate => f.write_str("stalemate"),
            Termination::InsufficientMaterial => f.write_str("insufficient material"),
            Termination::FiftyMoveRule => f.write_str("fifty-move rule"),
            Termination::Repetition => f.write_str("threefold repetition"),
            Termination::TimeForfeit { loser } => write!(f, "{} lost on time", loser),
            Termination::IllegalMove { mv } => write!(f, "illegal move {}", mv),
            Termination::UnparseableMove { mv } => write!(f, "invalid move {}", mv),
            Termination::NoResponse => f.write_str("no answer from engine"),
            Termination::MoveCap => f.write_str("move limit reached"),
            Termination::LaunchFailure { engine } => write!(f, "engine {} failed to start", engine),
            Termination::Cancelled => f.write_str("cancelled"),
            Termination::Failure { reason } => write!(f, "simulation failure: {}", reason),
        }
    }
}

/// One move as played.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedMove {
    pub uci: String,
    pub san: String,
}

/// A finished (or aborted) game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub id: Uuid,
    pub round: u32,
    pub white: String,
    pub black: String,
    pub time_control: String,
    pub started: DateTime<Local>,
    /// Set when the game did not start from the standard position
    pub start_fen: Option<String>,
    pub moves: Vec<RecordedMove>,
    pub result: GameResult,
    pub termination: Termination,
}

impl GameRecord {
    pub fn new(round: u32, white: &str, black: &str, time_control: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            round,
            white: white.to_string(),
            black: black.to_string(),
            time_control,
            started: Local::now(),
            start_fen: None,
            moves: Vec::new(),
            result: GameResult::Abort,
            termination: Termination::Cancelled,
        }
    }

    pub fn add_move(&mut self, uci: String, san: String) {
        self.moves.push(RecordedMove { uci, san });
    }

    pub fn finish(&mut self, result: GameResult, termination: Termination) {
        self.result = result;
        self.termination = termination;
    }

    /// Name of the engine playing `color`.
    pub fn player(&self, color: Color) -> &str {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    /// Render the game as PGN text.
    pub fn to_pgn(&self) -> String {
        let mut out = String::new();
        let result = self.result.pgn_tag();

        let _ = writeln!(out, "[Event \"Engine Arena\"]");
        let _ = writeln!(out, "[Site \"local\"]");
        let _ = writeln!(out, "[Date \"{}\"]", self.started.format("%Y.%m.%d"));
        let _ = writeln!(out, "[Round \"{}\"]", self.round);
        let _ = writeln!(out, "[White \"{}\"]", self.white);
        let _ = writeln!(out, "[Black \"{}\"]", self.black);
        let _ = writeln!(out, "[Result \"{}\"]", result);
        let _ = writeln!(out, "[TimeControl \"{}\"]", self.time_control);
        let _ = writeln!(out, "[Time \"{}\"]", self.started.format("%H:%M:%S"));
        if let Some(fen) = &self.start_fen {
            let _ = writeln!(out, "[SetUp \"1\"]");
            let _ = writeln!(out, "[FEN \"{}\"]", fen);
        }
        let _ = writeln!(out, "[Termination \"{}\"]", self.termination);
        out.push('\n');

        let mut movetext = String::new();
        for (i, mv) in self.moves.iter().enumerate() {
            if i % 2 == 0 {
                let _ = write!(movetext, "{}. ", i / 2 + 1);
            }
            let _ = write!(movetext, "{} ", mv.san);
        }
        movetext.push_str(result);
        out.push_str(&wrap(&movetext, 80));
        out.push('\n');
        out
    }
}

/// Break movetext into lines of at most `width` characters.
fn wrap(text: &str, width: usize) -> String {
    let mut out = String::new();
    let mut line_len = 0;
    for word in text.split(' ') {
        if line_len > 0 && line_len + 1 + word.len() > width {
            out.push('\n');
            line_len = 0;
        } else if line_len > 0 {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(word);
        line_len += word.len();
    }
    out
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod record_tests;
