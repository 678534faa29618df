//! Core types for running UCI engines against each other.
//!
//! Nothing in this crate touches a process or a clock source: it holds the
//! engine descriptors, the UCI wire grammar, per-side clocks, the legality
//! oracle wrapped around `cozy-chess`, game records and standings. The
//! `arena-runner` crate drives real (or scripted) engines on top of it.

pub mod clock;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod position;
pub mod protocol;
pub mod record;
pub mod standings;

// Re-export the vocabulary used by the runner and the CLI
pub use clock::*;
pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use position::*;
pub use protocol::*;
pub use record::*;
pub use standings::*;

pub use cozy_chess::Color;

/// Human readable side name, as used in logs and PGN comments.
pub fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
