//! Tournament configuration values.
//!
//! These arrive already parsed (the CLI reads them from TOML) and are passed
//! explicitly into the scheduler and every session it creates.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

use crate::clock::TimeControl;
use crate::descriptor::EngineDescriptor;
use crate::error::ArenaError;

/// Half-move ceiling for a single game
pub const DEFAULT_MAX_PLIES: u32 = 200;

/// Timeouts of the UCI conversation, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolLimits {
    /// Wait for `readyok` after launch
    pub handshake_ms: u64,
    /// Longest single wait on the engine's output
    pub poll_ms: u64,
    /// Extra time allowed on top of a move's allotment
    pub grace_ms: u64,
    /// Wait after `quit` before the process is killed
    pub shutdown_ms: u64,
    /// Overall budget for option discovery
    pub discovery_ms: u64,
}

impl Default for ProtocolLimits {
    fn default() -> Self {
        Self {
            handshake_ms: 5000,
            poll_ms: 100,
            grace_ms: 2000,
            shutdown_ms: 3000,
            discovery_ms: 5000,
        }
    }
}

impl ProtocolLimits {
    pub fn handshake(&self) -> Duration {
        Duration::from_millis(self.handshake_ms)
    }

    pub fn poll(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    pub fn shutdown(&self) -> Duration {
        Duration::from_millis(self.shutdown_ms)
    }

    pub fn discovery(&self) -> Duration {
        Duration::from_millis(self.discovery_ms)
    }

    /// Poll, handshake and discovery budgets must be positive. Grace and
    /// shutdown may be zero.
    pub fn validate(&self) -> Result<(), ArenaError> {
        for (name, value) in [
            ("handshake_ms", self.handshake_ms),
            ("poll_ms", self.poll_ms),
            ("discovery_ms", self.discovery_ms),
        ] {
            if value == 0 {
                return Err(ArenaError::Config(format!("protocol.{} must be at least 1", name)));
            }
        }
        Ok(())
    }
}

fn default_rounds() -> u32 {
    1
}

fn default_concurrency() -> usize {
    1
}

fn default_max_plies() -> u32 {
    DEFAULT_MAX_PLIES
}

/// Everything one tournament run needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Participants, in selection order
    pub engines: Vec<EngineDescriptor>,
    #[serde(default = "default_rounds")]
    pub rounds: u32,
    /// Games played at the same time
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub time_control: TimeControl,
    #[serde(default = "default_max_plies")]
    pub max_plies: u32,
    #[serde(default)]
    pub protocol: ProtocolLimits,
}

impl TournamentConfig {
    pub fn new(engines: Vec<EngineDescriptor>, time_control: TimeControl) -> Self {
        Self {
            engines,
            rounds: default_rounds(),
            concurrency: default_concurrency(),
            time_control,
            max_plies: DEFAULT_MAX_PLIES,
            protocol: ProtocolLimits::default(),
        }
    }

    /// Reject configurations the scheduler cannot run.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.engines.len() < 2 {
            return Err(ArenaError::Config("at least two engines are required".into()));
        }
        let mut names = HashSet::new();
        for engine in &self.engines {
            if engine.name.trim().is_empty() {
                return Err(ArenaError::Config("engine names must not be empty".into()));
            }
            if !names.insert(engine.name.as_str()) {
                return Err(ArenaError::Config(format!("duplicate engine name '{}'", engine.name)));
            }
        }
        if self.rounds == 0 {
            return Err(ArenaError::Config("rounds must be at least 1".into()));
        }
        if self.concurrency == 0 {
            return Err(ArenaError::Config("concurrency must be at least 1".into()));
        }
        if self.max_plies == 0 {
            return Err(ArenaError::Config("max_plies must be at least 1".into()));
        }
        self.protocol.validate()?;
        match self.time_control {
            TimeControl::MoveTime { per_move_ms: 0 } | TimeControl::Clock { base_ms: 0, .. } => {
                Err(ArenaError::Config("time control must be positive".into()))
            }
            _ => Ok(()),
        }
    }

    /// Keep only the named engines, in the order they are listed in `names`.
    pub fn select(&mut self, names: &[String]) -> Result<(), ArenaError> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let engine = self
                .engines
                .iter()
                .find(|e| &e.name == name)
                .ok_or_else(|| ArenaError::Config(format!("unknown engine '{}'", name)))?;
            selected.push(engine.clone());
        }
        self.engines = selected;
        Ok(())
    }

    pub fn engine(&self, name: &str) -> Option<&EngineDescriptor> {
        self.engines.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
