use super::*;

#[test]
fn test_every_participant_listed() {
    let standings = Standings::new(["A", "B", "C"]);
    assert_eq!(standings.entries().len(), 3);
    assert_eq!(standings.score("B"), Some(0.0));
    assert_eq!(standings.score("Z"), None);
}

#[test]
fn test_scoring() {
    let mut standings = Standings::new(["A", "B"]);
    standings.record("A", "B", GameResult::WhiteWins);
    standings.record("B", "A", GameResult::Draw);
    standings.record("B", "A", GameResult::WhiteWins);
    standings.record("A", "B", GameResult::Abort);

    let a = standings.get("A").unwrap();
    assert_eq!(a.points, 1.5);
    assert_eq!((a.wins, a.draws, a.losses, a.aborts), (1, 1, 1, 1));
    assert_eq!(a.games(), 4);

    let b = standings.get("B").unwrap();
    assert_eq!(b.points, 1.5);
    assert_eq!((b.wins, b.draws, b.losses, b.aborts), (1, 1, 1, 1));
}

#[test]
fn test_order_independent() {
    let games = [
        ("A", "B", GameResult::WhiteWins),
        ("B", "C", GameResult::Draw),
        ("C", "A", GameResult::BlackWins),
        ("B", "A", GameResult::Abort),
    ];
    let mut forward = Standings::new(["A", "B", "C"]);
    for (w, b, r) in games {
        forward.record(w, b, r);
    }
    let mut backward = Standings::new(["A", "B", "C"]);
    for (w, b, r) in games.iter().rev() {
        backward.record(w, b, *r);
    }
    assert_eq!(forward, backward);
}

#[test]
fn test_summary_and_ranking() {
    let mut standings = Standings::new(["A", "B"]);
    standings.record("A", "B", GameResult::BlackWins);
    standings.record("B", "A", GameResult::Draw);
    assert_eq!(standings.summary(), "Tournament finished. Results:\nA: 0.5 points\nB: 1.5 points\n");
    let ranked: Vec<&str> = standings.ranked().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(ranked, vec!["B", "A"]);
}

#[test]
fn test_json() {
    let standings = Standings::new(["A"]);
    let json = standings.to_json().unwrap();
    assert!(json.contains("\"name\": \"A\""));
    assert!(json.contains("\"points\": 0.0"));
}
