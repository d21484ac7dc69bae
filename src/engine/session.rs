//! Engine session: process lifecycle plus the per-turn query

use super::channel::{ChildProcessChannel, LineChannel};
use super::error::{EngineError, EngineResult};
use super::protocol::{
    is_bestmove_line, parse_bestmove, position_command, skill_level_command, EngineReply, GO,
    IS_READY, QUIT, READY_OK,
};
use bevy::prelude::Resource;

/// A live conversation with one engine process
///
/// Owns the transport exclusively. The move history is append-only and is
/// replayed in full on every query, so the engine never needs to keep state
/// between turns. Dropping the session sends `quit` and reaps the process.
#[derive(Resource)]
pub struct EngineSession {
    channel: Box<dyn LineChannel>,
    difficulty: u8,
    history: Vec<String>,
    last_reply: Option<EngineReply>,
    closed: bool,
}

impl EngineSession {
    /// Spawn `command` and complete the readiness handshake
    pub fn start(command: &str, args: &[String], difficulty: u8) -> EngineResult<Self> {
        let channel = ChildProcessChannel::spawn(command, args)?;
        Self::with_channel(Box::new(channel), difficulty)
    }

    /// Run the handshake over an already connected channel
    ///
    /// On failure the half-built session is dropped here, which shuts the
    /// channel down before the error reaches the caller.
    pub fn with_channel(channel: Box<dyn LineChannel>, difficulty: u8) -> EngineResult<Self> {
        let mut session = Self {
            channel,
            difficulty,
            history: Vec::new(),
            last_reply: None,
            closed: false,
        };
        session.handshake()?;
        tracing::info!(
            "[ENGINE] Ready (skill level {})",
            session.difficulty.min(super::protocol::MAX_SKILL_LEVEL)
        );
        Ok(session)
    }

    fn handshake(&mut self) -> EngineResult<()> {
        let banner = self.receive_non_empty()?;
        tracing::info!("[ENGINE] {}", banner);

        self.send(&skill_level_command(self.difficulty))?;
        self.send(IS_READY)?;

        let reply = self.receive_non_empty()?;
        if reply != READY_OK {
            return Err(EngineError::protocol(format!(
                "expected '{READY_OK}' after '{IS_READY}', got '{reply}'"
            )));
        }
        Ok(())
    }

    /// Send the user's move and block until the engine answers
    ///
    /// There is no timeout: a hung engine stalls the caller.
    pub fn query_next_move(&mut self, user_move: &str) -> EngineResult<EngineReply> {
        if self.closed {
            return Err(EngineError::protocol("session already shut down"));
        }

        self.history.push(user_move.to_string());
        self.send(&position_command(&self.history))?;
        self.send(GO)?;

        loop {
            let line = self.receive()?;
            if !is_bestmove_line(&line) {
                tracing::trace!("[ENGINE] skipping '{}'", line);
                continue;
            }

            let reply = parse_bestmove(&line)?;
            tracing::info!(
                "[ENGINE] bestmove {} (ponder {})",
                reply.best_move,
                reply.ponder.as_deref().unwrap_or("-")
            );
            self.history.push(reply.best_move.clone());
            self.last_reply = Some(reply.clone());
            return Ok(reply);
        }
    }

    /// Send `quit`, wait for the engine to exit and close the pipes
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn shutdown(&mut self) -> EngineResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.channel.write_line(QUIT) {
            // Already gone: nothing left to tell it
            tracing::debug!("[ENGINE] could not send quit: {}", e);
        }
        self.channel.terminate()?;
        tracing::info!("[ENGINE] Session closed after {} plies", self.history.len());
        Ok(())
    }

    /// Every move exchanged so far, user and engine interleaved
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// The engine's suggested continuation from its last reply
    pub fn last_suggestion(&self) -> Option<&str> {
        self.last_reply.as_ref()?.ponder.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn send(&mut self, line: &str) -> EngineResult<()> {
        self.channel.write_line(line)?;
        Ok(())
    }

    fn receive(&mut self) -> EngineResult<String> {
        match self.channel.read_line()? {
            Some(line) => Ok(line),
            None => Err(EngineError::protocol("engine closed its output")),
        }
    }

    fn receive_non_empty(&mut self) -> EngineResult<String> {
        loop {
            let line = self.receive()?;
            if !line.trim().is_empty() {
                return Ok(line);
            }
        }
    }
}

impl Drop for EngineSession {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!("[ENGINE] Shutdown failed: {}", e);
        }
    }
}
