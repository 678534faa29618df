use super::*;
use crate::protocol::parse_option_line;

#[test]
fn test_with_option_renders_setoption() {
    let engine = EngineDescriptor::new("sf", "/usr/bin/stockfish").with_option("Threads", "2");
    assert_eq!(engine.init_directives, vec!["setoption name Threads value 2"]);
}

#[test]
fn test_descriptor_from_toml_shape() {
    let json = r#"{"name":"a","command":"/bin/a","init":["setoption name Hash value 16"]}"#;
    let engine: EngineDescriptor = serde_json::from_str(json).unwrap();
    assert_eq!(engine.name, "a");
    assert!(engine.args.is_empty());
    assert!(engine.working_dir.is_none());
    assert_eq!(engine.init_directives.len(), 1);
}

#[test]
fn test_init_directives_skip_buttons_and_blanks() {
    let options: Vec<EngineOption> = [
        "option name Hash type spin default 16 min 1 max 33554432",
        "option name Clear Hash type button",
        "option name SyzygyPath type string default <empty>",
        "option name Debug Log File type string",
    ]
    .iter()
    .filter_map(|line| parse_option_line(line))
    .collect();

    assert_eq!(options.len(), 4);
    assert_eq!(
        init_directives(&options),
        vec![
            "setoption name Hash value 16".to_string(),
            "setoption name SyzygyPath value <empty>".to_string(),
        ]
    );
}

#[test]
fn test_bounds_label() {
    let opt = parse_option_line("option name Threads type spin default 1 min 1 max 512").unwrap();
    assert_eq!(opt.bounds_label(), "1/512");

    let opt = parse_option_line("option name Ponder type check default false").unwrap();
    assert_eq!(opt.bounds_label(), "");
}
