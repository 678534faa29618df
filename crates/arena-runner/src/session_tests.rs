use super::*;
use crate::scripted::{Behavior, ScriptedEngine, ScriptedLauncher};
use arena_core::{OptionKind, Score, TimeControl, START_FEN};

fn fast_settings(uses_clock_time: bool) -> SessionSettings {
    SessionSettings::new(
        ProtocolLimits {
            handshake_ms: 200,
            poll_ms: 5,
            grace_ms: 50,
            shutdown_ms: 50,
            discovery_ms: 200,
        },
        uses_clock_time,
    )
}

fn movetime(ms: u64) -> Clock {
    Clock::new(TimeControl::MoveTime { per_move_ms: ms })
}

async fn start(
    launcher: &ScriptedLauncher,
    name: &str,
    settings: SessionSettings,
) -> Result<EngineSession<crate::scripted::ScriptedChannel>, ArenaError> {
    let descriptor = EngineDescriptor::new(name, "scripted");
    EngineSession::start(launcher, &descriptor, settings, CancelFlag::new()).await
}

#[tokio::test]
async fn test_start_performs_handshake() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("alpha")]);
    let session = start(&launcher, "alpha", fast_settings(false)).await.unwrap();

    assert_eq!(session.name(), "alpha");
    assert_eq!(launcher.sent_to("alpha"), vec!["uci", "isready"]);
}

#[tokio::test]
async fn test_start_unknown_engine_is_launch_error() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("alpha")]);
    let err = start(&launcher, "ghost", fast_settings(false)).await.err().unwrap();

    assert!(matches!(err, ArenaError::Launch { ref engine, .. } if engine == "ghost"));
}

#[tokio::test]
async fn test_mute_engine_times_out_handshake() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("mute").behavior(Behavior::Mute)]);
    let err = start(&launcher, "mute", fast_settings(false)).await.err().unwrap();

    assert!(matches!(err, ArenaError::HandshakeTimeout { ref token, .. } if token == READY_OK));
    // The half-started engine is cleaned up
    assert_eq!(launcher.terminations(), 1);
}

#[tokio::test]
async fn test_discover_options_dedups_and_is_idempotent() {
    let engine = ScriptedEngine::new("alpha")
        .option_line("option name Hash type spin default 16 min 1 max 1024")
        .option_line("option name Ponder type check default false")
        .option_line("option name Hash type spin default 64 min 1 max 2048")
        .option_line("option name Clear Hash type button");
    let launcher = ScriptedLauncher::new([engine]);
    let mut session = start(&launcher, "alpha", fast_settings(false)).await.unwrap();

    let first = session.discover_options(Duration::from_millis(200)).await.unwrap();
    let names: Vec<&str> = first.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Hash", "Ponder", "Clear Hash"]);
    assert_eq!(first[0].default.as_deref(), Some("16"));
    assert_eq!(first[0].max, Some(1024));
    assert_eq!(first[2].kind, OptionKind::Button);

    let second = session.discover_options(Duration::from_millis(200)).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_discover_options_returns_partial_list_on_timeout() {
    let engine = ScriptedEngine::new("mute")
        .behavior(Behavior::Mute)
        .option_line("option name Hash type spin default 16 min 1 max 1024");
    let launcher = ScriptedLauncher::new([engine]);
    let descriptor = EngineDescriptor::new("mute", "scripted");
    let channel = launcher.open(&descriptor).await.unwrap();
    let mut session = EngineSession::with_channel("mute", channel, fast_settings(false), CancelFlag::new());

    let options = session.discover_options(Duration::from_millis(30)).await.unwrap();
    assert!(options.is_empty());
}

#[tokio::test]
async fn test_request_move_returns_move_and_merged_info() {
    let engine = ScriptedEngine::new("alpha")
        .moves(["e2e4"])
        .info_line("info depth 1 score cp 10 nodes 20")
        .info_line("info depth 2 seldepth 3 nodes 500 time 7")
        .info_line("info string thinking hard");
    let launcher = ScriptedLauncher::new([engine]);
    let mut session = start(&launcher, "alpha", fast_settings(false)).await.unwrap();

    let reply = session
        .request_move(START_FEN, Color::White, &movetime(100))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(reply.best_move, "e2e4");
    assert_eq!(reply.info.depth, Some(2));
    assert_eq!(reply.info.seldepth, Some(3));
    assert_eq!(reply.info.score, Some(Score::Centipawns(10)));
    assert_eq!(reply.info.nodes, Some(500));
    assert_eq!(reply.info.time_ms, Some(7));
    assert_eq!(reply.raw.last().map(String::as_str), Some("bestmove e2e4"));

    let sent = launcher.sent_to("alpha");
    assert!(sent.contains(&format!("position fen {}", START_FEN)));
    assert!(sent.contains(&"go movetime 100".to_string()));
}

#[tokio::test]
async fn test_request_move_sends_clock_directive_for_black() {
    let engine = ScriptedEngine::new("beta").moves(["e2e4", "e7e5"]);
    let launcher = ScriptedLauncher::new([engine]);
    let mut session = start(&launcher, "beta", fast_settings(true)).await.unwrap();
    let clock = Clock::new(TimeControl::Clock {
        base_ms: 5000,
        increment_ms: 100,
        bonus_every: 0,
    });

    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    let reply = session.request_move(fen, Color::Black, &clock).await.unwrap().unwrap();

    assert_eq!(reply.best_move, "e7e5");
    assert!(launcher.sent_to("beta").contains(&"go btime 5000 binc 100".to_string()));
}

#[tokio::test]
async fn test_silent_engine_yields_no_answer_after_grace() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("silent").behavior(Behavior::Silent)]);
    let mut session = start(&launcher, "silent", fast_settings(false)).await.unwrap();

    let started = Instant::now();
    let reply = session.request_move(START_FEN, Color::White, &movetime(20)).await.unwrap();

    assert!(reply.is_none());
    // Allotment plus grace, bounded by the poll interval
    assert!(started.elapsed() >= Duration::from_millis(70));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_crashed_engine_yields_no_answer() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("crash").behavior(Behavior::Crash)]);
    let mut session = start(&launcher, "crash", fast_settings(false)).await.unwrap();

    let reply = session.request_move(START_FEN, Color::White, &movetime(1000)).await.unwrap();
    assert!(reply.is_none());
}

#[tokio::test]
async fn test_cancel_interrupts_search() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("silent").behavior(Behavior::Silent)]);
    let cancel = CancelFlag::new();
    let descriptor = EngineDescriptor::new("silent", "scripted");
    let mut session = EngineSession::start(&launcher, &descriptor, fast_settings(false), cancel.clone())
        .await
        .unwrap();

    cancel.cancel();
    let err = session
        .request_move(START_FEN, Color::White, &movetime(10_000))
        .await
        .err()
        .unwrap();
    assert!(matches!(err, ArenaError::Cancelled));
}

#[tokio::test]
async fn test_shutdown_sends_quit_and_terminates_once() {
    let launcher = ScriptedLauncher::new([ScriptedEngine::new("alpha")]);
    let mut session = start(&launcher, "alpha", fast_settings(false)).await.unwrap();
    session.send_raw("setoption name Hash value 32").await.unwrap();
    session.new_game().await.unwrap();
    session.shutdown().await.unwrap();

    assert_eq!(
        launcher.sent_to("alpha"),
        vec!["uci", "isready", "setoption name Hash value 32", "ucinewgame", "quit"]
    );
    assert_eq!(launcher.terminations(), 1);
}

#[tokio::test]
async fn test_probe_options_shuts_engine_down() {
    let engine = ScriptedEngine::new("alpha").option_line("option name Threads type spin default 1 min 1 max 64");
    let launcher = ScriptedLauncher::new([engine]);

    let options = probe_options(&launcher, &EngineDescriptor::new("alpha", "scripted"), fast_settings(false))
        .await
        .unwrap();

    assert_eq!(options.len(), 1);
    assert_eq!(options[0].name, "Threads");
    assert_eq!(launcher.sent_to("alpha"), vec!["uci", "quit"]);
    assert_eq!(launcher.terminations(), 1);
}
