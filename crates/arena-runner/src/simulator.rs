//! Plays one game between two engine sessions.

use anyhow::Context;
use arena_core::{
    side_name, ArenaError, Clock, ClockStatus, Color, EngineDescriptor, GameRecord, GameResult,
    MoveError, Position, Termination, TimeControl, TournamentConfig,
};
use std::fmt::Write;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::launcher::SessionLauncher;
use crate::observer::{ArenaObserver, MoveUpdate, NullObserver};
use crate::session::{EngineSession, SessionSettings};

/// Outcome of one game: the record plus its human readable move log.
#[derive(Debug, Clone)]
pub struct GameReport {
    pub record: GameRecord,
    pub log: String,
}

type Outcome = (GameResult, Termination);

fn slot(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

pub struct GameSimulator<L: SessionLauncher> {
    launcher: Arc<L>,
    white: EngineDescriptor,
    black: EngineDescriptor,
    settings: SessionSettings,
    time_control: TimeControl,
    max_plies: u32,
    round: u32,
    fixture: usize,
    start_fen: Option<String>,
    observer: Arc<dyn ArenaObserver>,
    cancel: CancelFlag,
}

impl<L: SessionLauncher> GameSimulator<L> {
    pub fn new(
        launcher: Arc<L>,
        white: EngineDescriptor,
        black: EngineDescriptor,
        config: &TournamentConfig,
    ) -> Self {
        Self {
            launcher,
            white,
            black,
            settings: SessionSettings::new(config.protocol, config.time_control.uses_clock_time()),
            time_control: config.time_control,
            max_plies: config.max_plies,
            round: 1,
            fixture: 1,
            start_fen: None,
            observer: Arc::new(NullObserver),
            cancel: CancelFlag::new(),
        }
    }

    pub fn round(mut self, round: u32) -> Self {
        self.round = round;
        self
    }

    pub fn fixture(mut self, fixture: usize) -> Self {
        self.fixture = fixture;
        self
    }

    /// Play from `fen` instead of the standard starting position.
    pub fn start_fen(mut self, fen: impl Into<String>) -> Self {
        self.start_fen = Some(fen.into());
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ArenaObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Play the game to its end.
    ///
    /// Protocol failures (no answer, illegal moves, a failed launch) end the
    /// game as an abort. Errors are only returned for broken I/O, and only
    /// after both engines were shut down.
    pub async fn play(self) -> anyhow::Result<GameReport> {
        let mut record = GameRecord::new(
            self.round,
            &self.white.name,
            &self.black.name,
            self.time_control.pgn_label(),
        );
        let mut position = match &self.start_fen {
            Some(fen) => {
                record.start_fen = Some(fen.clone());
                Position::from_fen(fen)?
            }
            None => Position::startpos(),
        };
        let mut log = String::new();

        info!(game = self.fixture, white = %self.white.name, black = %self.black.name, "game started");

        let (white_started, black_started) = tokio::join!(
            EngineSession::<L::Channel>::start(&*self.launcher, &self.white, self.settings, self.cancel.clone()),
            EngineSession::<L::Channel>::start(&*self.launcher, &self.black, self.settings, self.cancel.clone()),
        );
        let mut sessions = match (white_started, black_started) {
            (Ok(white), Ok(black)) => [white, black],
            (white_started, black_started) => {
                let termination = self
                    .abandon_launch([(&self.white, white_started), (&self.black, black_started)])
                    .await;
                let _ = writeln!(log, "Abort: {}", termination);
                record.finish(GameResult::Abort, termination);
                return Ok(GameReport { record, log });
            }
        };

        let outcome = self.drive(&mut sessions, &mut position, &mut record, &mut log).await;

        let [white_session, black_session] = sessions;
        let (white_down, black_down) = tokio::join!(white_session.shutdown(), black_session.shutdown());
        for (name, down) in [(&self.white.name, white_down), (&self.black.name, black_down)] {
            if let Err(e) = down {
                warn!(engine = %name, error = %e, "engine did not shut down cleanly");
            }
        }

        let (result, termination) = outcome.with_context(|| {
            format!("game {} ({} vs {})", self.fixture, self.white.name, self.black.name)
        })?;
        if result == GameResult::Abort {
            warn!(game = self.fixture, %termination, "game aborted");
        } else {
            info!(game = self.fixture, %result, %termination, plies = record.moves.len(), "game finished");
        }
        record.finish(result, termination);
        Ok(GameReport { record, log })
    }

    /// Shut down whichever engine did start and name the one that did not.
    async fn abandon_launch(
        &self,
        started: [(&EngineDescriptor, Result<EngineSession<L::Channel>, ArenaError>); 2],
    ) -> Termination {
        let mut termination = None;
        for (descriptor, attempt) in started {
            match attempt {
                Ok(session) => {
                    if let Err(e) = session.shutdown().await {
                        warn!(engine = %descriptor.name, error = %e, "engine did not shut down cleanly");
                    }
                }
                Err(ArenaError::Cancelled) => {
                    termination.get_or_insert(Termination::Cancelled);
                }
                Err(e) => {
                    warn!(engine = %descriptor.name, error = %e, "engine failed to start");
                    termination.get_or_insert(Termination::LaunchFailure {
                        engine: descriptor.name.clone(),
                    });
                }
            }
        }
        termination.unwrap_or(Termination::Cancelled)
    }

    async fn drive(
        &self,
        sessions: &mut [EngineSession<L::Channel>; 2],
        position: &mut Position,
        record: &mut GameRecord,
        log: &mut String,
    ) -> Result<Outcome, ArenaError> {
        for (session, descriptor) in sessions.iter_mut().zip([&self.white, &self.black]) {
            for directive in &descriptor.init_directives {
                session.send_raw(directive).await?;
            }
            session.new_game().await?;
        }

        let mut clocks = [Clock::new(self.time_control), Clock::new(self.time_control)];
        let mut summaries: [Option<String>; 2] = [None, None];

        loop {
            if self.cancel.is_cancelled() {
                return Ok((GameResult::Abort, Termination::Cancelled));
            }
            if let Some(terminal) = position.terminal() {
                return Ok(Termination::from_terminal(terminal));
            }
            if record.moves.len() >= self.max_plies as usize {
                let _ = writeln!(log, "Move limit of {} plies reached.", self.max_plies);
                return Ok((GameResult::Abort, Termination::MoveCap));
            }

            let side = position.side_to_move();
            let mover = slot(side);
            let name = record.player(side).to_string();

            let started = Instant::now();
            let reply = match sessions[mover].request_move(&position.fen(), side, &clocks[mover]).await {
                Err(ArenaError::Cancelled) => return Ok((GameResult::Abort, Termination::Cancelled)),
                reply => reply?,
            };
            let elapsed = started.elapsed();
            debug!(engine = %name, elapsed_ms = elapsed.as_millis() as u64, "search finished");

            if let Some(reply) = &reply {
                self.observer.on_raw(side, &reply.raw);
            }

            if clocks[mover].record_move(elapsed) == ClockStatus::Flagged {
                let _ = writeln!(log, "{} ({}) lost on time.", side_name(side), name);
                return Ok((
                    GameResult::win_for(!side),
                    Termination::TimeForfeit { loser: name },
                ));
            }

            let Some(reply) = reply else {
                let _ = writeln!(log, "No answer from engine.");
                return Ok((GameResult::Abort, Termination::NoResponse));
            };

            let mv = match position.parse_move(&reply.best_move) {
                Ok(mv) => mv,
                Err(MoveError::Unparseable) => {
                    let _ = writeln!(log, "Invalid move: {}", reply.best_move);
                    return Ok((
                        GameResult::Abort,
                        Termination::UnparseableMove { mv: reply.best_move },
                    ));
                }
                Err(MoveError::Illegal) => {
                    let _ = writeln!(log, "Illegal move: {}", reply.best_move);
                    return Ok((GameResult::Abort, Termination::IllegalMove { mv: reply.best_move }));
                }
            };

            let uci = position.uci(mv);
            let san = position.play(mv);
            record.add_move(uci.clone(), san);
            let _ = writeln!(
                log,
                "{}. {} plays {} ({})",
                record.moves.len(),
                side_name(side),
                uci,
                clocks[mover].label()
            );

            summaries[mover] = Some(if reply.info.is_empty() {
                "idle".to_string()
            } else {
                reply.info.summary()
            });
            let summary = |color: Color| {
                format!(
                    "{} {}: {}",
                    side_name(color),
                    record.player(color),
                    summaries[slot(color)].as_deref().unwrap_or("idle")
                )
            };
            self.observer.on_move(&MoveUpdate {
                game: record.id,
                fixture: self.fixture,
                board: position.render(),
                side,
                engine: name,
                white_summary: summary(Color::White),
                black_summary: summary(Color::Black),
            });
        }
    }
}

#[cfg(test)]
#[path = "simulator_tests.rs"]
mod simulator_tests;
