//! Runs UCI engines against each other.
//!
//! An [`EngineSession`] owns one engine's conversation over an
//! [`EngineChannel`], a [`GameSimulator`] referees one game between two
//! sessions, and the [`Scheduler`] plays a double round-robin on a bounded
//! pool of tokio tasks.

pub mod cancel;
pub mod channel;
pub mod launcher;
pub mod observer;
pub mod scheduler;
pub mod scripted;
pub mod session;
pub mod simulator;

pub use cancel::CancelFlag;
pub use channel::{EngineChannel, Polled, ProcessChannel};
pub use launcher::{ProcessLauncher, SessionLauncher};
pub use observer::{ArenaObserver, MoveUpdate, NullObserver};
pub use scheduler::{double_round_robin, Fixture, Scheduler, TournamentReport};
pub use session::{probe_options, EngineSession, SearchReply, SessionSettings};
pub use simulator::{GameReport, GameSimulator};
