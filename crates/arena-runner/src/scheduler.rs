//! Round-robin scheduling and the bounded pool of running games.

use arena_core::{
    ArenaError, EngineDescriptor, GameRecord, GameResult, Standings, Termination, TournamentConfig,
};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::launcher::{ProcessLauncher, SessionLauncher};
use crate::observer::{ArenaObserver, NullObserver};
use crate::simulator::{GameReport, GameSimulator};

/// One scheduled game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// 1-based position in the schedule
    pub index: usize,
    pub round: u32,
    pub white: EngineDescriptor,
    pub black: EngineDescriptor,
}

/// Every pair meets twice per round, once with each colour.
///
/// Pairs follow selection order: for `i < j`, engine `i` has white first.
pub fn double_round_robin(engines: &[EngineDescriptor], rounds: u32) -> Vec<Fixture> {
    let mut fixtures = Vec::new();
    for round in 1..=rounds {
        for i in 0..engines.len() {
            for j in i + 1..engines.len() {
                for (white, black) in [(i, j), (j, i)] {
                    fixtures.push(Fixture {
                        index: fixtures.len() + 1,
                        round,
                        white: engines[white].clone(),
                        black: engines[black].clone(),
                    });
                }
            }
        }
    }
    fixtures
}

/// Everything a finished (or cancelled) tournament produced.
#[derive(Debug, Clone)]
pub struct TournamentReport {
    pub standings: Standings,
    /// Cumulative log, one block per game in completion order, numbered
    /// by completion
    pub log: String,
    pub summary: String,
    /// All game records as PGN, separated by blank lines
    pub pgn: String,
    pub records: Vec<GameRecord>,
    pub games_played: usize,
    pub games_scheduled: usize,
    pub cancelled: bool,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

pub struct Scheduler<L: SessionLauncher = ProcessLauncher> {
    config: Arc<TournamentConfig>,
    launcher: Arc<L>,
    observer: Arc<dyn ArenaObserver>,
    cancel: CancelFlag,
}

impl Scheduler<ProcessLauncher> {
    /// Scheduler launching real engine processes.
    pub fn with_processes(config: TournamentConfig) -> Result<Self, ArenaError> {
        Self::new(config, ProcessLauncher)
    }
}

impl<L: SessionLauncher> Scheduler<L> {
    pub fn new(config: TournamentConfig, launcher: L) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            launcher: Arc::new(launcher),
            observer: Arc::new(NullObserver),
            cancel: CancelFlag::new(),
        })
    }

    pub fn observer(mut self, observer: Arc<dyn ArenaObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Share an existing flag, e.g. one set by a signal handler.
    pub fn cancel_with(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn config(&self) -> &TournamentConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn fixtures(&self) -> Vec<Fixture> {
        double_round_robin(&self.config.engines, self.config.rounds)
    }

    /// Play every fixture with at most `concurrency` games in flight.
    ///
    /// Results are folded in completion order. A game that errors or panics
    /// counts as an abort; once cancelled, fixtures not yet started are
    /// skipped.
    pub async fn run(&self) -> TournamentReport {
        let started = Local::now();
        let fixtures = self.fixtures();
        let total = fixtures.len();
        let mut standings = Standings::new(self.config.engines.iter().map(|e| e.name.clone()));
        let mut log = String::new();
        let mut records = Vec::with_capacity(total);

        info!(
            games = total,
            concurrency = self.config.concurrency,
            time_control = %self.config.time_control,
            "tournament started"
        );

        let mut queue = fixtures.into_iter();
        let mut in_flight = JoinSet::new();
        loop {
            while in_flight.len() < self.config.concurrency && !self.cancel.is_cancelled() {
                let Some(fixture) = queue.next() else { break };
                in_flight.spawn(self.game(fixture));
            }
            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let (fixture, report) = match joined {
                Ok(done) => done,
                Err(e) => {
                    warn!(error = %e, "game task vanished");
                    continue;
                }
            };

            let GameReport { record, log: game_log } = report;
            // Numbered by completion, so the log always counts up
            let finished = records.len() + 1;
            debug!(
                game = finished,
                fixture = fixture.index,
                round = fixture.round,
                result = %record.result,
                "game finished"
            );
            standings.record(&record.white, &record.black, record.result);
            let _ = write!(
                log,
                "Game {}/{}: {} (White) vs. {} (Black)\n{}\nResult: {}\n\n",
                finished, total, record.white, record.black, game_log, record.result
            );
            self.observer.on_log(&log);
            records.push(record);
        }

        let skipped = queue.count();
        let cancelled = self.cancel.is_cancelled();
        if skipped > 0 {
            warn!(skipped, "tournament cancelled before all games started");
        }

        let summary = standings.summary();
        info!(games = records.len(), "{}", summary.trim_end());
        self.observer.on_finished(&summary);

        let pgn = records.iter().map(GameRecord::to_pgn).collect::<Vec<_>>().join("\n");
        TournamentReport {
            standings,
            log,
            summary,
            pgn,
            games_played: records.len(),
            games_scheduled: total,
            records,
            cancelled,
            started,
            finished: Local::now(),
        }
    }

    /// Future resolving to a fixture's report. Never fails: errors and panics
    /// of the inner game task are turned into aborts.
    fn game(&self, fixture: Fixture) -> impl Future<Output = (Fixture, GameReport)> + Send + 'static {
        let simulator = GameSimulator::new(
            Arc::clone(&self.launcher),
            fixture.white.clone(),
            fixture.black.clone(),
            &self.config,
        )
        .round(fixture.round)
        .fixture(fixture.index)
        .observer(Arc::clone(&self.observer))
        .cancel(self.cancel.clone());
        let time_control = self.config.time_control.pgn_label();

        async move {
            let report = match tokio::spawn(simulator.play()).await {
                Ok(Ok(report)) => report,
                Ok(Err(e)) => failed_game(&fixture, time_control, format!("{:#}", e)),
                Err(e) => failed_game(&fixture, time_control, e.to_string()),
            };
            (fixture, report)
        }
    }
}

fn failed_game(fixture: &Fixture, time_control: String, reason: String) -> GameReport {
    warn!(game = fixture.index, %reason, "game failed");
    let mut record = GameRecord::new(fixture.round, &fixture.white.name, &fixture.black.name, time_control);
    let log = format!("Error during simulation: {}", reason);
    record.finish(GameResult::Abort, Termination::Failure { reason });
    GameReport { record, log }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
