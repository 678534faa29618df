//! Command-line front end for engine tournaments.
//!
//! # Usage
//!
//! ```bash
//! # Double round-robin between every engine in the file
//! cargo run -p tournament -- run arena.toml
//!
//! # Two engines only, three rounds, four games at a time, PGN on stdout
//! cargo run -p tournament -- run arena.toml --engines sf,velvet --rounds 3 --concurrency 4 --pgn
//!
//! # Options an engine declares
//! cargo run -p tournament -- options arena.toml sf
//! ```

mod config;
mod console;
mod report;

pub use config::*;
pub use console::*;
pub use report::*;
