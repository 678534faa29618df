//! One engine's UCI conversation.

use arena_core::{
    add_option, is_token, parse_bestmove, parse_option_line, ArenaError, Clock, Color, Command,
    EngineDescriptor, EngineOption, GoLimit, ProtocolLimits, SearchInfo, READY_OK, UCI_OK,
};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cancel::CancelFlag;
use crate::channel::{EngineChannel, Polled};
use crate::launcher::SessionLauncher;

/// How a session talks to its engine. Fixed for the session's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub limits: ProtocolLimits,
    /// Send `wtime`/`btime` instead of `movetime`
    pub uses_clock_time: bool,
}

impl SessionSettings {
    pub fn new(limits: ProtocolLimits, uses_clock_time: bool) -> Self {
        Self {
            limits,
            uses_clock_time,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(ProtocolLimits::default(), false)
    }
}

/// An engine's answer to one search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReply {
    pub best_move: String,
    /// Richest progress snapshot seen during the search
    pub info: SearchInfo,
    /// Every line received for this request, `bestmove` included
    pub raw: Vec<String>,
}

pub struct EngineSession<C: EngineChannel> {
    name: String,
    channel: C,
    settings: SessionSettings,
    cancel: CancelFlag,
}

impl<C: EngineChannel> EngineSession<C> {
    /// Wrap an already opened channel. No commands are sent.
    pub fn with_channel(name: &str, channel: C, settings: SessionSettings, cancel: CancelFlag) -> Self {
        Self {
            name: name.to_string(),
            channel,
            settings,
            cancel,
        }
    }

    /// Open a channel through `launcher` and complete the `uci`/`isready`
    /// handshake.
    pub async fn start<L>(
        launcher: &L,
        descriptor: &EngineDescriptor,
        settings: SessionSettings,
        cancel: CancelFlag,
    ) -> Result<Self, ArenaError>
    where
        L: SessionLauncher<Channel = C>,
    {
        let channel = launcher.open(descriptor).await?;
        let mut session = Self::with_channel(&descriptor.name, channel, settings, cancel);
        match session.handshake().await {
            Ok(()) => Ok(session),
            Err(e) => {
                if let Err(term) = session.channel.terminate(Duration::ZERO).await {
                    debug!(engine = %session.name, error = %term, "cleanup after failed handshake");
                }
                Err(match e {
                    ArenaError::Closed { engine } => {
                        ArenaError::launch(&engine, "output closed before the handshake completed")
                    }
                    other => other,
                })
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    /// Announce UCI mode and wait for `readyok`.
    pub async fn handshake(&mut self) -> Result<(), ArenaError> {
        self.send(Command::Uci).await?;
        self.send(Command::IsReady).await?;
        self.wait_for(READY_OK, self.settings.limits.handshake()).await?;
        debug!(engine = %self.name, "handshake complete");
        Ok(())
    }

    /// Ask the engine to list its options again and collect them until
    /// `uciok`. A timeout returns whatever was declared so far.
    pub async fn discover_options(&mut self, timeout: Duration) -> Result<Vec<EngineOption>, ArenaError> {
        self.send(Command::Uci).await?;

        let deadline = Instant::now() + timeout;
        let mut options = Vec::new();
        loop {
            let now = Instant::now();
            if now >= deadline {
                warn!(engine = %self.name, found = options.len(), "option discovery timed out");
                break;
            }
            let wait = self.settings.limits.poll().min(deadline - now);
            match self.channel.poll_line(wait).await? {
                Polled::Line(line) if is_token(&line, UCI_OK) => break,
                Polled::Line(line) => {
                    if let Some(option) = parse_option_line(&line) {
                        add_option(&mut options, option);
                    }
                }
                Polled::Idle => {}
                Polled::Closed => {
                    warn!(engine = %self.name, "engine closed during option discovery");
                    break;
                }
            }
            self.check_cancelled()?;
        }
        Ok(options)
    }

    /// Request a move for the position `fen`.
    ///
    /// `Ok(None)` means no `bestmove` arrived before the allotment plus the
    /// grace period ran out (or the engine went away): the caller decides what
    /// a missing answer means for the game.
    pub async fn request_move(
        &mut self,
        fen: &str,
        side: Color,
        clock: &Clock,
    ) -> Result<Option<SearchReply>, ArenaError> {
        let allotment = clock.allotment_ms();
        let limit = if self.settings.uses_clock_time {
            GoLimit::Clock {
                side,
                remaining_ms: allotment,
                increment_ms: clock.increment_ms(),
            }
        } else {
            GoLimit::MoveTime(allotment)
        };

        self.send(Command::Position { fen: fen.to_string() }).await?;
        self.send(Command::Go(limit)).await?;

        let deadline = Instant::now() + Duration::from_millis(allotment) + self.settings.limits.grace();
        let mut raw: Vec<String> = Vec::new();
        loop {
            let now = Instant::now();
            if now >= deadline {
                warn!(engine = %self.name, allotment, "no bestmove before deadline");
                return Ok(None);
            }
            let wait = self.settings.limits.poll().min(deadline - now);
            match self.channel.poll_line(wait).await? {
                Polled::Line(line) => {
                    let best_move = parse_bestmove(&line).map(str::to_string);
                    raw.push(line);
                    if let Some(best_move) = best_move {
                        let info = SearchInfo::from_lines(raw.iter().map(String::as_str));
                        return Ok(Some(SearchReply { best_move, info, raw }));
                    }
                }
                Polled::Idle => {}
                Polled::Closed => {
                    warn!(engine = %self.name, "engine closed its output while searching");
                    return Ok(None);
                }
            }
            self.check_cancelled()?;
        }
    }

    /// Fire-and-forget directive, e.g. a configured `setoption`.
    pub async fn send_raw(&mut self, directive: &str) -> Result<(), ArenaError> {
        self.channel.write_line(directive).await
    }

    pub async fn new_game(&mut self) -> Result<(), ArenaError> {
        self.send(Command::NewGame).await
    }

    /// Send `quit` and make sure the engine is gone.
    pub async fn shutdown(mut self) -> Result<(), ArenaError> {
        if let Err(e) = self.send(Command::Quit).await {
            debug!(engine = %self.name, error = %e, "could not send quit");
        }
        self.channel.terminate(self.settings.limits.shutdown()).await
    }

    async fn send(&mut self, command: Command) -> Result<(), ArenaError> {
        self.channel.write_line(&command.to_string()).await
    }

    async fn wait_for(&mut self, token: &str, timeout: Duration) -> Result<(), ArenaError> {
        let deadline = Instant::now() + timeout;
        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(ArenaError::HandshakeTimeout {
                    engine: self.name.clone(),
                    token: token.to_string(),
                });
            }
            let wait = self.settings.limits.poll().min(deadline - now);
            match self.channel.poll_line(wait).await? {
                Polled::Line(line) if is_token(&line, token) => return Ok(()),
                Polled::Line(_) | Polled::Idle => {}
                Polled::Closed => {
                    return Err(ArenaError::Closed {
                        engine: self.name.clone(),
                    })
                }
            }
            self.check_cancelled()?;
        }
    }

    fn check_cancelled(&self) -> Result<(), ArenaError> {
        if self.cancel.is_cancelled() {
            Err(ArenaError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Launch an engine only to read its option list, then shut it down.
pub async fn probe_options<L: SessionLauncher>(
    launcher: &L,
    descriptor: &EngineDescriptor,
    settings: SessionSettings,
) -> Result<Vec<EngineOption>, ArenaError> {
    let channel = launcher.open(descriptor).await?;
    let mut session = EngineSession::with_channel(&descriptor.name, channel, settings, CancelFlag::new());
    let discovered = session.discover_options(settings.limits.discovery()).await;
    let shutdown = session.shutdown().await;
    let options = discovered?;
    if let Err(e) = shutdown {
        warn!(engine = %descriptor.name, error = %e, "engine did not shut down cleanly");
    }
    Ok(options)
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod session_tests;
