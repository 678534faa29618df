use super::*;

fn two_engines() -> TournamentConfig {
    TournamentConfig::new(
        vec![EngineDescriptor::new("A", "/bin/a"), EngineDescriptor::new("B", "/bin/b")],
        TimeControl::MoveTime { per_move_ms: 100 },
    )
}

#[test]
fn test_defaults() {
    let config = two_engines();
    assert_eq!(config.rounds, 1);
    assert_eq!(config.concurrency, 1);
    assert_eq!(config.max_plies, 200);
    assert_eq!(config.protocol.poll(), Duration::from_millis(100));
    assert_eq!(config.protocol.grace(), Duration::from_millis(2000));
    assert_eq!(config.protocol.shutdown(), Duration::from_millis(3000));
    assert!(config.validate().is_ok());
}

#[test]
fn test_deserialize_partial() {
    let json = r#"{
        "engines": [{"name": "A", "command": "/bin/a"}, {"name": "B", "command": "/bin/b"}],
        "concurrency": 4,
        "time_control": {"kind": "clock", "base_ms": 60000, "increment_ms": 1000, "bonus_every": 40},
        "protocol": {"grace_ms": 500}
    }"#;
    let config: TournamentConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.rounds, 1);
    assert_eq!(config.concurrency, 4);
    assert_eq!(config.protocol.grace_ms, 500);
    assert_eq!(config.protocol.poll_ms, 100);
    assert!(config.time_control.uses_clock_time());
    assert!(config.validate().is_ok());
}

#[test]
fn test_validation_errors() {
    let mut config = two_engines();
    config.engines.pop();
    assert!(matches!(config.validate(), Err(ArenaError::Config(_))));

    let mut config = two_engines();
    config.engines[1].name = "A".into();
    assert!(matches!(config.validate(), Err(ArenaError::Config(msg)) if msg.contains("duplicate")));

    let mut config = two_engines();
    config.concurrency = 0;
    assert!(config.validate().is_err());

    let mut config = two_engines();
    config.rounds = 0;
    assert!(config.validate().is_err());

    let mut config = two_engines();
    config.time_control = TimeControl::MoveTime { per_move_ms: 0 };
    assert!(config.validate().is_err());
}

#[test]
fn test_zero_protocol_limits_are_rejected() {
    for field in ["poll_ms", "handshake_ms", "discovery_ms"] {
        let mut config = two_engines();
        match field {
            "poll_ms" => config.protocol.poll_ms = 0,
            "handshake_ms" => config.protocol.handshake_ms = 0,
            _ => config.protocol.discovery_ms = 0,
        }
        assert!(
            matches!(config.validate(), Err(ArenaError::Config(msg)) if msg.contains(field)),
            "{} = 0 accepted",
            field
        );
    }

    let mut config = two_engines();
    config.protocol.grace_ms = 0;
    config.protocol.shutdown_ms = 0;
    assert!(config.validate().is_ok());
}

#[test]
fn test_select_engines() {
    let mut config = two_engines();
    config.engines.push(EngineDescriptor::new("C", "/bin/c"));

    config.select(&["C".to_string(), "A".to_string()]).unwrap();
    let names: Vec<&str> = config.engines.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["C", "A"]);

    assert!(config.select(&["Z".to_string()]).is_err());
    assert!(config.engine("A").is_some());
    assert!(config.engine("B").is_none());
}
