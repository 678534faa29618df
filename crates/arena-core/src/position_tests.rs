use super::*;

fn play_line(pos: &mut Position, moves: &[&str]) -> Vec<String> {
    moves
        .iter()
        .map(|m| {
            let mv = pos.parse_move(m).unwrap_or_else(|e| panic!("{} rejected: {:?}", m, e));
            pos.play(mv)
        })
        .collect()
}

#[test]
fn test_startpos_fen_roundtrip() {
    let pos = Position::startpos();
    assert_eq!(pos.fen(), START_FEN);
    assert_eq!(pos.side_to_move(), Color::White);
    assert!(pos.terminal().is_none());
}

#[test]
fn test_invalid_fen() {
    assert!(matches!(Position::from_fen("not a fen"), Err(ArenaError::InvalidFen(_))));
}

#[test]
fn test_unparseable_and_illegal_moves() {
    let pos = Position::startpos();
    assert_eq!(pos.parse_move("0000"), Err(MoveError::Unparseable));
    assert_eq!(pos.parse_move("(none)"), Err(MoveError::Unparseable));
    assert_eq!(pos.parse_move("e2"), Err(MoveError::Unparseable));
    assert_eq!(pos.parse_move("e2e5"), Err(MoveError::Illegal));
    assert_eq!(pos.parse_move("e7e5"), Err(MoveError::Illegal));
    assert!(pos.parse_move("e2e4").is_ok());
    assert!(pos.parse_move("g1f3\n").is_ok());
}

#[test]
fn test_fools_mate() {
    let mut pos = Position::startpos();
    let san = play_line(&mut pos, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(san, vec!["f3", "e5", "g4", "Qh4#"]);
    assert_eq!(
        pos.terminal(),
        Some(Terminal::Checkmate {
            winner: Color::Black
        })
    );
}

#[test]
fn test_san_captures_checks_and_castling() {
    let mut pos = Position::startpos();
    let san = play_line(
        &mut pos,
        &["e2e4", "d7d5", "e4d5", "d8d5", "g1f3", "d5e4", "f1e2", "c8g4", "e1g1"],
    );
    assert_eq!(san, vec!["e4", "d5", "exd5", "Qxd5", "Nf3", "Qe4+", "Be2", "Bg4", "O-O"]);
}

#[test]
fn test_san_disambiguation() {
    // Knights on b1 and f3 can both reach d2
    let mut pos = Position::from_fen("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1").unwrap();
    let san = play_line(&mut pos, &["b1d2"]);
    assert_eq!(san, vec!["Nbd2"]);

    // Rooks on a1 and a5 share a file
    let mut pos = Position::from_fen("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1").unwrap();
    let san = play_line(&mut pos, &["a1a3"]);
    assert_eq!(san, vec!["R1a3"]);
}

#[test]
fn test_san_promotion() {
    let mut pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
    let san = play_line(&mut pos, &["e7e8q"]);
    assert_eq!(san, vec!["e8=Q"]);
}

#[test]
fn test_stalemate() {
    let pos = Position::from_fen("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1").unwrap();
    assert_eq!(pos.terminal(), Some(Terminal::Stalemate));
}

#[test]
fn test_fifty_move_rule() {
    let pos = Position::from_fen("8/8/8/4k3/8/4K3/8/R7 w - - 100 60").unwrap();
    assert_eq!(pos.terminal(), Some(Terminal::FiftyMoveRule));
}

#[test]
fn test_insufficient_material() {
    let bare = Position::from_fen("8/8/8/4k3/8/4K3/8/8 w - - 0 1").unwrap();
    assert!(bare.is_insufficient_material());
    assert_eq!(bare.terminal(), Some(Terminal::InsufficientMaterial));

    let knight = Position::from_fen("8/8/8/4k3/8/4K3/8/6N1 w - - 0 1").unwrap();
    assert!(knight.is_insufficient_material());

    // Bishops on c1 (dark) and f8 (dark)
    let same_colour = Position::from_fen("5b2/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(same_colour.is_insufficient_material());

    // Bishops on c1 (dark) and c8 (light)
    let opposite = Position::from_fen("2b5/8/8/4k3/8/4K3/8/2B5 w - - 0 1").unwrap();
    assert!(!opposite.is_insufficient_material());

    let rook = Position::from_fen("8/8/8/4k3/8/4K3/8/R7 w - - 0 1").unwrap();
    assert!(!rook.is_insufficient_material());
}

#[test]
fn test_threefold_repetition() {
    let mut pos = Position::startpos();
    play_line(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(pos.repetitions(), 2);
    assert!(pos.terminal().is_none());

    play_line(&mut pos, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    assert_eq!(pos.repetitions(), 3);
    assert_eq!(pos.terminal(), Some(Terminal::Repetition));
}

#[test]
fn test_render() {
    let text = Position::startpos().render();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 9);
    assert_eq!(lines[0], "8 r n b q k b n r");
    assert_eq!(lines[4], "4 . . . . . . . .");
    assert_eq!(lines[7], "1 R N B Q K B N R");
    assert_eq!(lines[8], "  a b c d e f g h");
}

#[test]
fn test_uci_castling_spelling() {
    let pos = Position::from_fen("4k3/8/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let mv = pos.parse_move("e1g1").unwrap();
    assert_eq!(pos.uci(mv), "e1g1");
}
