//! Time controls and per-side game clocks.
//!
//! A tournament picks one [`TimeControl`] policy. Each game then gives both
//! sides their own [`Clock`], which the game loop advances once per move with
//! the wall time the engine spent thinking.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Time control policy for a whole tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TimeControl {
    /// Every move gets the same budget, regardless of earlier moves.
    MoveTime { per_move_ms: u64 },
    /// Each side owns a running clock.
    Clock {
        /// Starting time, also injected again as the periodic bonus
        base_ms: u64,
        #[serde(default)]
        increment_ms: u64,
        /// Add `base_ms` every this many moves of the side (0 = never)
        #[serde(default)]
        bonus_every: u32,
    },
}

impl TimeControl {
    /// Whether engines receive their clock (`wtime`/`btime`) rather than a
    /// fixed `movetime`.
    pub fn uses_clock_time(&self) -> bool {
        matches!(self, TimeControl::Clock { .. })
    }

    /// PGN `TimeControl` tag value.
    pub fn pgn_label(&self) -> String {
        match *self {
            TimeControl::MoveTime { per_move_ms } => format!("{}/move", seconds(per_move_ms)),
            TimeControl::Clock {
                base_ms,
                increment_ms,
                bonus_every: 0,
            } => format!("{}+{}", seconds(base_ms), seconds(increment_ms)),
            TimeControl::Clock {
                base_ms,
                increment_ms,
                bonus_every,
            } => format!(
                "{}/{}+{}",
                bonus_every,
                seconds(base_ms),
                seconds(increment_ms)
            ),
        }
    }
}

impl Default for TimeControl {
    fn default() -> Self {
        TimeControl::MoveTime { per_move_ms: 1000 }
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeControl::MoveTime { per_move_ms } => {
                write!(f, "movetime {}s", seconds(per_move_ms))
            }
            TimeControl::Clock {
                base_ms,
                increment_ms,
                bonus_every,
            } => {
                write!(f, "clock {}s+{}s", seconds(base_ms), seconds(increment_ms))?;
                if bonus_every > 0 {
                    write!(f, ", +{}s every {} moves", seconds(base_ms), bonus_every)?;
                }
                Ok(())
            }
        }
    }
}

fn seconds(ms: u64) -> String {
    if ms % 1000 == 0 {
        (ms / 1000).to_string()
    } else {
        format!("{}", ms as f64 / 1000.0)
    }
}

/// Outcome of advancing a clock by one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStatus {
    Running,
    /// Remaining time dropped to zero or below: the mover forfeits.
    Flagged,
}

/// One side's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clock {
    control: TimeControl,
    /// May be negative right after the move that flagged
    remaining_ms: i64,
    moves_played: u32,
}

impl Clock {
    pub fn new(control: TimeControl) -> Self {
        let remaining_ms = match control {
            TimeControl::MoveTime { per_move_ms } => per_move_ms as i64,
            TimeControl::Clock { base_ms, .. } => base_ms as i64,
        };
        Self {
            control,
            remaining_ms,
            moves_played: 0,
        }
    }

    pub fn control(&self) -> TimeControl {
        self.control
    }

    pub fn remaining_ms(&self) -> i64 {
        self.remaining_ms
    }

    pub fn increment_ms(&self) -> u64 {
        match self.control {
            TimeControl::MoveTime { .. } => 0,
            TimeControl::Clock { increment_ms, .. } => increment_ms,
        }
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    /// Time budget for the next search.
    pub fn allotment_ms(&self) -> u64 {
        match self.control {
            TimeControl::MoveTime { per_move_ms } => per_move_ms,
            TimeControl::Clock { .. } => self.remaining_ms.max(0) as u64,
        }
    }

    /// Charge one move's thinking time.
    ///
    /// Under a running clock: subtract `elapsed`, add the increment, and add
    /// the base time again whenever the move count reaches a multiple of the
    /// bonus interval. Fixed move time never flags.
    pub fn record_move(&mut self, elapsed: Duration) -> ClockStatus {
        self.moves_played += 1;
        let TimeControl::Clock {
            base_ms,
            increment_ms,
            bonus_every,
        } = self.control
        else {
            return ClockStatus::Running;
        };

        let elapsed_ms = i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX);
        self.remaining_ms = self
            .remaining_ms
            .saturating_sub(elapsed_ms)
            .saturating_add(increment_ms as i64);
        if bonus_every > 0 && self.moves_played % bonus_every == 0 {
            self.remaining_ms = self.remaining_ms.saturating_add(base_ms as i64);
        }

        if self.remaining_ms <= 0 {
            ClockStatus::Flagged
        } else {
            ClockStatus::Running
        }
    }

    /// `remaining 59.1s` or `movetime 1s`, for game logs.
    pub fn label(&self) -> String {
        match self.control {
            TimeControl::MoveTime { per_move_ms } => format!("movetime {}s", seconds(per_move_ms)),
            TimeControl::Clock { .. } => {
                format!("remaining {:.1}s", self.remaining_ms as f64 / 1000.0)
            }
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod clock_tests;
