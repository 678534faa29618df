//! Live progress on the terminal.

use arena_core::{side_name, Color};
use arena_runner::{ArenaObserver, MoveUpdate};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Prints each finished game's log block as it arrives.
///
/// The scheduler hands over the whole cumulative log every time, so only the
/// part not printed yet is written.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    printed: AtomicUsize,
}

impl ConsoleObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Portion of `log` not returned by an earlier call.
    pub fn unseen(&self, log: &str) -> Option<String> {
        let printed = self.printed.swap(log.len(), Ordering::SeqCst);
        log.get(printed..)
            .filter(|fresh| !fresh.is_empty())
            .map(str::to_string)
    }
}

impl ArenaObserver for ConsoleObserver {
    fn on_move(&self, update: &MoveUpdate) {
        debug!(
            game = update.fixture,
            "{} {} moved\n{}{}\n{}",
            side_name(update.side),
            update.engine,
            update.board,
            update.white_summary,
            update.black_summary
        );
    }

    fn on_raw(&self, side: Color, lines: &[String]) {
        trace!("{} raw: {}", side_name(side), lines.join(" | "));
    }

    fn on_log(&self, log: &str) {
        if let Some(fresh) = self.unseen(log) {
            print!("{}", fresh);
        }
    }
}

#[cfg(test)]
#[path = "console_tests.rs"]
mod console_tests;
