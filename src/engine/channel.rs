//! Bidirectional line channels to an engine
//!
//! The connector only ever needs four things from its transport: write a
//! line, block on the next line, and tear the transport down. [`LineChannel`]
//! captures that contract so the session logic is the same whether the
//! engine is a child process or an in-memory script.

use super::error::{EngineError, EngineResult};
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// How long a child gets to exit on its own after `quit` before it is killed
const EXIT_GRACE_POLLS: u32 = 40;
const EXIT_GRACE_INTERVAL: Duration = Duration::from_millis(25);

/// A newline-delimited, bidirectional text channel
pub trait LineChannel: Send + Sync {
    /// Write `line` followed by a newline and flush
    fn write_line(&mut self, line: &str) -> io::Result<()>;

    /// Block until a full line arrives. `Ok(None)` means the peer closed its end.
    fn read_line(&mut self) -> io::Result<Option<String>>;

    /// Close both directions and release the peer. Must tolerate repeated calls.
    fn terminate(&mut self) -> io::Result<()>;
}

/// Engine running as a child process, stdin/stdout piped
pub struct ChildProcessChannel {
    command: String,
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Option<BufReader<ChildStdout>>,
    reaped: bool,
}

impl ChildProcessChannel {
    /// Spawn `command` with `args` and wire its standard streams
    pub fn spawn(command: &str, args: &[String]) -> EngineResult<Self> {
        let startup = |source: io::Error| EngineError::Startup {
            command: command.to_string(),
            source,
        };

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(startup)?;

        let stdin = child.stdin.take();
        let stdout = child.stdout.take().map(BufReader::new);
        let mut channel = Self {
            command: command.to_string(),
            child,
            stdin,
            stdout,
            reaped: false,
        };

        if channel.stdin.is_none() || channel.stdout.is_none() {
            // Reap before reporting so no zombie is left behind
            let _ = channel.terminate();
            return Err(startup(io::Error::other("engine pipes were not captured")));
        }

        tracing::info!(
            "[ENGINE] Spawned '{}' (pid {})",
            channel.command,
            channel.child.id()
        );
        Ok(channel)
    }

    fn wait_with_grace(&mut self) -> io::Result<()> {
        for _ in 0..EXIT_GRACE_POLLS {
            if let Some(status) = self.child.try_wait()? {
                tracing::debug!("[ENGINE] '{}' exited with {}", self.command, status);
                return Ok(());
            }
            thread::sleep(EXIT_GRACE_INTERVAL);
        }

        tracing::warn!(
            "[ENGINE] '{}' did not exit after quit, killing it",
            self.command
        );
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}

impl LineChannel for ChildProcessChannel {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "engine stdin already closed",
            ));
        };
        tracing::debug!("[ENGINE] >> {}", line);
        writeln!(stdin, "{line}")?;
        stdin.flush()
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buf = String::new();
        if stdout.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        let line = buf.trim_end_matches(['\r', '\n']).to_string();
        tracing::debug!("[ENGINE] << {}", line);
        Ok(Some(line))
    }

    fn terminate(&mut self) -> io::Result<()> {
        if self.reaped {
            return Ok(());
        }
        // Closing stdin is the engine's EOF; most engines exit on it as well as on `quit`
        self.stdin.take();
        let result = self.wait_with_grace();
        self.stdout.take();
        self.reaped = true;
        result
    }
}

impl Drop for ChildProcessChannel {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            tracing::error!("[ENGINE] Failed to reap '{}': {}", self.command, e);
        }
    }
}

/// Everything written to and observed on a [`ScriptedChannel`]
#[derive(Debug, Default)]
pub struct Transcript {
    pub written: Vec<String>,
    pub terminations: u32,
}

/// In-memory engine double
///
/// Replies are released when a matching trigger line is written, in the order
/// the rules were registered. Lines queued with [`ScriptedChannel::greeting`]
/// are readable immediately.
#[derive(Default)]
pub struct ScriptedChannel {
    pending: VecDeque<String>,
    rules: VecDeque<(String, Vec<String>)>,
    transcript: Arc<Mutex<Transcript>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line available before anything is written (engine id banner)
    pub fn greeting(mut self, line: &str) -> Self {
        self.pending.push_back(line.to_string());
        self
    }

    /// When `trigger` is written, make `replies` readable
    pub fn on(mut self, trigger: &str, replies: &[&str]) -> Self {
        self.rules.push_back((
            trigger.to_string(),
            replies.iter().map(|r| r.to_string()).collect(),
        ));
        self
    }

    /// A well-behaved engine: answers the readiness check
    pub fn ready() -> Self {
        Self::new().on("isready", &["readyok"])
    }

    /// Shared handle for inspecting the conversation after the channel is boxed
    pub fn transcript(&self) -> Arc<Mutex<Transcript>> {
        Arc::clone(&self.transcript)
    }

    fn record(&self, f: impl FnOnce(&mut Transcript)) {
        if let Ok(mut transcript) = self.transcript.lock() {
            f(&mut transcript);
        }
    }
}

impl LineChannel for ScriptedChannel {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.record(|t| t.written.push(line.to_string()));
        if let Some(index) = self.rules.iter().position(|(trigger, _)| trigger == line) {
            if let Some((_, replies)) = self.rules.remove(index) {
                self.pending.extend(replies);
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.pending.pop_front())
    }

    fn terminate(&mut self) -> io::Result<()> {
        self.record(|t| t.terminations += 1);
        self.pending.clear();
        Ok(())
    }
}
