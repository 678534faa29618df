//! In-memory engines that speak just enough UCI to play scripted games.
//!
//! A [`ScriptedEngine`] answers every `go` with the move its script holds for
//! the current ply (taken from the FEN's move counters), or `0000` once the
//! script runs out. [`ScriptedLauncher`] hands them out in place of real
//! processes, so whole tournaments run deterministically without spawning
//! anything.

use arena_core::{ArenaError, EngineDescriptor};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use crate::channel::{EngineChannel, Polled};
use crate::launcher::SessionLauncher;

/// How a scripted engine misbehaves, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Behavior {
    #[default]
    Normal,
    /// Handshakes fine, never answers `go`
    Silent,
    /// Never answers the handshake
    Mute,
    /// Closes its output when asked to search
    Crash,
}

#[derive(Debug, Clone)]
pub struct ScriptedEngine {
    name: String,
    moves: Vec<String>,
    option_lines: Vec<String>,
    info_lines: Vec<String>,
    behavior: Behavior,
    think: Duration,
}

impl ScriptedEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            moves: Vec::new(),
            option_lines: Vec::new(),
            info_lines: Vec::new(),
            behavior: Behavior::Normal,
            think: Duration::ZERO,
        }
    }

    /// Moves to play, indexed by ply from the start of the game.
    pub fn moves<I, S>(mut self, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.moves = moves.into_iter().map(Into::into).collect();
        self
    }

    /// Raw `option name ...` line announced after `uci`.
    pub fn option_line(mut self, line: &str) -> Self {
        self.option_lines.push(line.to_string());
        self
    }

    /// Raw `info ...` line printed before each `bestmove`.
    pub fn info_line(mut self, line: &str) -> Self {
        self.info_lines.push(line.to_string());
        self
    }

    pub fn behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Delay between `go` and the answer.
    pub fn think(mut self, think: Duration) -> Self {
        self.think = think;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Descriptor naming this engine, for configurations run by a
    /// [`ScriptedLauncher`].
    pub fn descriptor(&self) -> EngineDescriptor {
        EngineDescriptor::new(self.name.clone(), "scripted")
    }

    fn move_at(&self, ply: usize) -> &str {
        self.moves.get(ply).map(String::as_str).unwrap_or("0000")
    }
}

/// Ply index encoded by a FEN's side-to-move and fullmove fields.
fn ply_of(fen: &str) -> usize {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    let fullmove = fields.get(5).and_then(|v| v.parse::<usize>().ok()).unwrap_or(1);
    let black = fields.get(1) == Some(&"b");
    fullmove.saturating_sub(1) * 2 + usize::from(black)
}

/// Counters shared by a launcher and every channel it opened.
#[derive(Debug, Default)]
struct Tally {
    launches: AtomicUsize,
    terminations: AtomicUsize,
    transcript: Mutex<Vec<(String, String)>>,
}

pub struct ScriptedChannel {
    engine: ScriptedEngine,
    tally: Arc<Tally>,
    pending: VecDeque<String>,
    /// Search output held back until `reply_at`
    delayed: Vec<String>,
    reply_at: Option<Instant>,
    ply: usize,
    closed: bool,
}

impl ScriptedChannel {
    pub fn new(engine: ScriptedEngine) -> Self {
        Self::with_tally(engine, Arc::default())
    }

    fn with_tally(engine: ScriptedEngine, tally: Arc<Tally>) -> Self {
        Self {
            engine,
            tally,
            pending: VecDeque::new(),
            delayed: Vec::new(),
            reply_at: None,
            ply: 0,
            closed: false,
        }
    }

    fn respond(&mut self, line: &str) {
        let mute = self.engine.behavior == Behavior::Mute;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("uci") if !mute => {
                self.pending.push_back(format!("id name {}", self.engine.name));
                self.pending.extend(self.engine.option_lines.iter().cloned());
                self.pending.push_back("uciok".to_string());
            }
            Some("isready") if !mute => self.pending.push_back("readyok".to_string()),
            Some("position") => {
                if let Some(fen) = line.strip_prefix("position fen ") {
                    self.ply = ply_of(fen);
                }
            }
            Some("go") => match self.engine.behavior {
                Behavior::Normal => {
                    self.delayed = self.engine.info_lines.clone();
                    self.delayed
                        .push(format!("bestmove {}", self.engine.move_at(self.ply)));
                    self.reply_at = Some(Instant::now() + self.engine.think);
                }
                Behavior::Crash => self.closed = true,
                Behavior::Silent | Behavior::Mute => {}
            },
            Some("quit") => self.closed = true,
            _ => {}
        }
    }
}

#[async_trait]
impl EngineChannel for ScriptedChannel {
    async fn write_line(&mut self, line: &str) -> Result<(), ArenaError> {
        if self.closed {
            return Err(ArenaError::Closed {
                engine: self.engine.name.clone(),
            });
        }
        if let Ok(mut transcript) = self.tally.transcript.lock() {
            transcript.push((self.engine.name.clone(), line.to_string()));
        }
        self.respond(line);
        Ok(())
    }

    async fn poll_line(&mut self, wait: Duration) -> Result<Polled, ArenaError> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(Polled::Line(line));
        }
        if let Some(at) = self.reply_at {
            if at <= Instant::now() + wait {
                tokio::time::sleep_until(at).await;
                self.reply_at = None;
                self.pending.extend(self.delayed.drain(..));
                return Ok(self.pending.pop_front().map_or(Polled::Idle, Polled::Line));
            }
        }
        if self.closed {
            return Ok(Polled::Closed);
        }
        tokio::time::sleep(wait).await;
        Ok(Polled::Idle)
    }

    async fn terminate(&mut self, _grace: Duration) -> Result<(), ArenaError> {
        self.closed = true;
        self.tally.terminations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Launcher serving scripted engines by descriptor name.
#[derive(Debug, Default)]
pub struct ScriptedLauncher {
    engines: HashMap<String, ScriptedEngine>,
    tally: Arc<Tally>,
}

impl ScriptedLauncher {
    pub fn new<I>(engines: I) -> Self
    where
        I: IntoIterator<Item = ScriptedEngine>,
    {
        Self {
            engines: engines
                .into_iter()
                .map(|engine| (engine.name.clone(), engine))
                .collect(),
            tally: Arc::default(),
        }
    }

    /// Channels opened so far.
    pub fn launches(&self) -> usize {
        self.tally.launches.load(Ordering::SeqCst)
    }

    /// Channels terminated so far.
    pub fn terminations(&self) -> usize {
        self.tally.terminations.load(Ordering::SeqCst)
    }

    /// Every line written to `engine`, in order.
    pub fn sent_to(&self, engine: &str) -> Vec<String> {
        self.tally
            .transcript
            .lock()
            .map(|transcript| {
                transcript
                    .iter()
                    .filter(|(name, _)| name == engine)
                    .map(|(_, line)| line.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    type Channel = ScriptedChannel;

    async fn open(&self, descriptor: &EngineDescriptor) -> Result<ScriptedChannel, ArenaError> {
        let engine = self
            .engines
            .get(&descriptor.name)
            .cloned()
            .ok_or_else(|| ArenaError::launch(&descriptor.name, "no such scripted engine"))?;
        self.tally.launches.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedChannel::with_tally(engine, Arc::clone(&self.tally)))
    }
}

#[cfg(test)]
#[path = "scripted_tests.rs"]
mod scripted_tests;
