//! Progress callbacks for whoever is watching a tournament.

use arena_core::Color;
use uuid::Uuid;

/// Snapshot emitted after every applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveUpdate {
    pub game: Uuid,
    /// Fixture number, 1-based
    pub fixture: usize,
    /// Board after the move, rank 8 first
    pub board: String,
    /// Side that made the move
    pub side: Color,
    pub engine: String,
    /// `White <name>: <summary>` for each side, `idle` before its first search
    pub white_summary: String,
    pub black_summary: String,
}

/// Receives tournament progress. Every method defaults to doing nothing.
///
/// Called from game tasks as well as the scheduler loop, so implementations
/// must be cheap and thread-safe.
pub trait ArenaObserver: Send + Sync {
    fn on_move(&self, _update: &MoveUpdate) {}

    /// Every line an engine printed while answering one search request.
    fn on_raw(&self, _side: Color, _lines: &[String]) {}

    /// Cumulative tournament log after another game finished.
    fn on_log(&self, _log: &str) {}

    fn on_finished(&self, _summary: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ArenaObserver for NullObserver {}
