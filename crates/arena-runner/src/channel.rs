//! Line-oriented transport to an engine.
//!
//! [`ProcessChannel`] talks to a child process over its standard streams.
//! Sessions only see the [`EngineChannel`] trait, so a scripted engine can
//! stand in for a process in tests.

use arena_core::{ArenaError, EngineDescriptor};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

/// Result of one bounded read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Polled {
    Line(String),
    /// Nothing arrived within the wait
    Idle,
    /// The engine closed its output
    Closed,
}

#[async_trait]
pub trait EngineChannel: Send {
    /// Write one line followed by a newline and flush it.
    async fn write_line(&mut self, line: &str) -> Result<(), ArenaError>;

    /// Wait at most `wait` for the next output line.
    async fn poll_line(&mut self, wait: Duration) -> Result<Polled, ArenaError>;

    /// Give the engine `grace` to exit on its own, then kill it.
    async fn terminate(&mut self, grace: Duration) -> Result<(), ArenaError>;
}

pub struct ProcessChannel {
    name: String,
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
}

impl ProcessChannel {
    /// Launch the descriptor's command with piped standard streams.
    pub fn spawn(descriptor: &EngineDescriptor) -> Result<Self, ArenaError> {
        let mut command = Command::new(&descriptor.command);
        command
            .args(&descriptor.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if let Some(dir) = &descriptor.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| ArenaError::launch(&descriptor.name, e))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ArenaError::launch(&descriptor.name, "no stdin handle"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ArenaError::launch(&descriptor.name, "no stdout handle"))?;

        debug!(engine = %descriptor.name, pid = ?child.id(), "spawned engine process");
        Ok(Self {
            name: descriptor.name.clone(),
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
        })
    }
}

#[async_trait]
impl EngineChannel for ProcessChannel {
    async fn write_line(&mut self, line: &str) -> Result<(), ArenaError> {
        trace!(engine = %self.name, "> {}", line);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn poll_line(&mut self, wait: Duration) -> Result<Polled, ArenaError> {
        // `next_line` is cancel safe, so a timed-out read loses nothing
        match tokio::time::timeout(wait, self.lines.next_line()).await {
            Err(_) => Ok(Polled::Idle),
            Ok(Ok(Some(line))) => {
                trace!(engine = %self.name, "< {}", line);
                Ok(Polled::Line(line))
            }
            Ok(Ok(None)) => Ok(Polled::Closed),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn terminate(&mut self, grace: Duration) -> Result<(), ArenaError> {
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!(engine = %self.name, ?status, "engine exited");
                Ok(())
            }
            Err(_) => {
                warn!(engine = %self.name, "engine ignored quit, killing it");
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}
