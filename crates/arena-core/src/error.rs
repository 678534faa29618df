//! Error taxonomy shared by the arena crates.
//!
//! Only failures that stop a session (or a configuration) are errors. A
//! missing `bestmove`, an illegal move or a flag fall are game terminations and
//! live in [`crate::record::Termination`] instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArenaError {
    /// The engine process could not be spawned, or its stream closed before
    /// it answered the handshake.
    #[error("engine '{engine}' failed to launch: {reason}")]
    Launch { engine: String, reason: String },

    /// The engine is running but never sent the expected handshake token.
    #[error("engine '{engine}' did not answer '{token}' in time")]
    HandshakeTimeout { engine: String, token: String },

    #[error("engine '{engine}' closed its output stream")]
    Closed { engine: String },

    #[error("cancelled")]
    Cancelled,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid FEN '{0}'")]
    InvalidFen(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ArenaError {
    pub fn launch(engine: &str, reason: impl ToString) -> Self {
        ArenaError::Launch {
            engine: engine.to_string(),
            reason: reason.to_string(),
        }
    }
}
