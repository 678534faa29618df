//! Opening channels to engines.

use arena_core::{ArenaError, EngineDescriptor};
use async_trait::async_trait;

use crate::channel::{EngineChannel, ProcessChannel};

/// Opens a raw channel for a descriptor. Handshakes are the session's job.
#[async_trait]
pub trait SessionLauncher: Send + Sync + 'static {
    type Channel: EngineChannel + 'static;

    async fn open(&self, descriptor: &EngineDescriptor) -> Result<Self::Channel, ArenaError>;
}

/// Launches real engine processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessLauncher;

#[async_trait]
impl SessionLauncher for ProcessLauncher {
    type Channel = ProcessChannel;

    async fn open(&self, descriptor: &EngineDescriptor) -> Result<ProcessChannel, ArenaError> {
        ProcessChannel::spawn(descriptor)
    }
}
