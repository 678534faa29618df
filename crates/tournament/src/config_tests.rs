use super::*;
use arena_core::{ArenaError, TimeControl};

const SAMPLE: &str = r#"
rounds = 2
concurrency = 3

[time_control]
kind = "clock"
base_ms = 60000
increment_ms = 1000

[protocol]
grace_ms = 500

[[engines]]
name = "stockfish"
command = "/usr/bin/stockfish"
init = ["setoption name Threads value 1"]

[[engines]]
name = "velvet"
command = "./velvet"
args = ["--uci"]
working_dir = "/opt/velvet"

[[engines]]
name = "random"
command = "./random-mover"
"#;

#[test]
fn test_parse_full_config() {
    let config = parse_tournament_config(SAMPLE).unwrap();

    assert_eq!(config.rounds, 2);
    assert_eq!(config.concurrency, 3);
    assert_eq!(config.max_plies, 200);
    assert_eq!(
        config.time_control,
        TimeControl::Clock {
            base_ms: 60_000,
            increment_ms: 1_000,
            bonus_every: 0
        }
    );
    assert_eq!(config.protocol.grace_ms, 500);
    assert_eq!(config.protocol.poll_ms, 100);

    let names: Vec<&str> = config.engines.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["stockfish", "velvet", "random"]);
    assert_eq!(config.engines[0].init_directives, vec!["setoption name Threads value 1"]);
    assert_eq!(config.engines[1].args, vec!["--uci"]);
    assert_eq!(
        config.engines[1].working_dir.as_deref(),
        Some(std::path::Path::new("/opt/velvet"))
    );
}

#[test]
fn test_defaults_for_minimal_config() {
    let config = parse_tournament_config(
        r#"
        [[engines]]
        name = "a"
        command = "a"
        [[engines]]
        name = "b"
        command = "b"
        "#,
    )
    .unwrap();

    assert_eq!(config.rounds, 1);
    assert_eq!(config.concurrency, 1);
    assert_eq!(config.time_control, TimeControl::MoveTime { per_move_ms: 1000 });
    assert!(config.validate().is_ok());
}

#[test]
fn test_unknown_time_control_kind_is_rejected() {
    let err = parse_tournament_config(
        r#"
        engines = []
        [time_control]
        kind = "hourglass"
        "#,
    );
    assert!(err.is_err());
}

#[test]
fn test_overrides_select_and_reorder() {
    let mut config = parse_tournament_config(SAMPLE).unwrap();
    let overrides = Overrides {
        engines: vec!["random".into(), "stockfish".into()],
        rounds: Some(4),
        concurrency: Some(1),
    };
    overrides.apply(&mut config).unwrap();

    let names: Vec<&str> = config.engines.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["random", "stockfish"]);
    assert_eq!(config.rounds, 4);
    assert_eq!(config.concurrency, 1);
}

#[test]
fn test_overrides_reject_unknown_engine() {
    let mut config = parse_tournament_config(SAMPLE).unwrap();
    let overrides = Overrides {
        engines: vec!["stockfish".into(), "crafty".into()],
        ..Default::default()
    };
    let err = overrides.apply(&mut config).unwrap_err();
    assert!(matches!(err.downcast_ref::<ArenaError>(), Some(ArenaError::Config(_))));
}

#[test]
fn test_overrides_validate_single_engine() {
    let mut config = parse_tournament_config(SAMPLE).unwrap();
    let overrides = Overrides {
        engines: vec!["velvet".into()],
        ..Default::default()
    };
    assert!(overrides.apply(&mut config).is_err());
}

#[test]
fn test_read_missing_file_names_the_path() {
    let err = read_tournament_config(std::path::Path::new("/no/such/arena.toml")).unwrap_err();
    assert!(format!("{:#}", err).contains("/no/such/arena.toml"));
}
