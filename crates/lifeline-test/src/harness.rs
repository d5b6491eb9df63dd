//! Line-oriented session over a spawned child.
//!
//! A [`Session`] spawns a child with piped stdio and talks to it one line at
//! a time, which is all the controller tests need from an I/O layer.

use std::io::{BufRead, BufReader, Write};
use std::process::{ChildStdin, ChildStdout};
use std::time::{Duration, Instant};

use lifeline_core::{ProcessHandle, ProcessStatus, SpawnConfig, StdioMode};

use crate::error::{Result, TestError};

/// Interval between liveness checks while polling.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long an end of output waits for the child's status to become reapable.
pub const EOF_REAP_GRACE: Duration = Duration::from_millis(500);

/// A spawned child plus line I/O over its pipes.
#[derive(Debug)]
pub struct Session {
    handle: ProcessHandle,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl Session {
    /// Spawns `config` with piped stdio.
    ///
    /// # Errors
    /// Returns an error if the child cannot be spawned.
    pub fn spawn(config: SpawnConfig) -> Result<Self> {
        let mut handle = ProcessHandle::spawn(&config.stdio(StdioMode::Piped))?;
        let stdout = handle
            .take_stdout()
            .ok_or_else(|| TestError::harness("child stdout is not piped"))?;
        let stdin = handle.take_stdin();
        Ok(Self {
            handle,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    /// The controller handle.
    #[must_use]
    pub const fn handle(&self) -> &ProcessHandle {
        &self.handle
    }

    /// Mutable access to the controller handle.
    pub fn handle_mut(&mut self) -> &mut ProcessHandle {
        &mut self.handle
    }

    /// Gives up the session, keeping only the handle.
    #[must_use]
    pub fn into_handle(self) -> ProcessHandle {
        self.handle
    }

    /// Writes `line` plus a newline to the child's stdin.
    ///
    /// # Errors
    /// Returns an error if stdin was closed or the write fails.
    pub fn send_line(&mut self, line: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| TestError::harness("stdin already closed"))?;
        writeln!(stdin, "{line}")?;
        stdin.flush()?;
        tracing::debug!(pid = self.handle.pid(), line = line, "sent line");
        Ok(())
    }

    /// Closes the child's stdin.
    pub fn close_stdin(&mut self) {
        drop(self.stdin.take());
    }

    /// Reads one line, without its trailing newline.
    ///
    /// At end of output the child is checked through the handle, so a
    /// death behind the EOF is recorded in the cached status.
    ///
    /// # Errors
    /// [`TestError::UnexpectedEof`] if the child closed stdout; controller
    /// errors from the liveness check propagate.
    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            self.observe_eof()?;
            return Err(TestError::UnexpectedEof {
                expected: "a line".to_string(),
            });
        }
        let trimmed = line.trim_end_matches(['\n', '\r']).to_string();
        Ok(trimmed)
    }

    /// Reads lines until one contains `needle` and returns it.
    ///
    /// # Errors
    /// [`TestError::UnexpectedEof`] if output ends first.
    pub fn expect_line(&mut self, needle: &str) -> Result<String> {
        loop {
            match self.read_line() {
                Ok(line) if line.contains(needle) => {
                    tracing::debug!(pid = self.handle.pid(), line = %line, "matched");
                    return Ok(line);
                }
                Ok(_) => {}
                Err(TestError::UnexpectedEof { .. }) => {
                    return Err(TestError::UnexpectedEof {
                        expected: needle.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// The pipe closes slightly before the exit status is reapable, so
    /// liveness is polled for up to [`EOF_REAP_GRACE`]. A child that closed
    /// stdout but keeps running is left alone.
    fn observe_eof(&mut self) -> Result<()> {
        let deadline = Instant::now() + EOF_REAP_GRACE;
        while self.handle.is_alive()? {
            if Instant::now() >= deadline {
                tracing::debug!(pid = self.handle.pid(), "stdout closed, child still running");
                return Ok(());
            }
            std::thread::sleep(POLL_INTERVAL);
        }
        tracing::debug!(pid = self.handle.pid(), status = %self.handle.status(), "stdout closed by exit");
        Ok(())
    }

    /// Polls until the child is reaped.
    ///
    /// # Errors
    /// [`TestError::Timeout`] if it is still alive after `timeout`.
    pub fn wait_until_dead(&mut self, timeout: Duration) -> Result<ProcessStatus> {
        wait_until_dead(&mut self.handle, timeout)
    }

    /// Checks that the child stays alive for all of `period`.
    ///
    /// # Errors
    /// [`TestError::Assertion`] if it dies.
    pub fn assert_alive_for(&mut self, period: Duration) -> Result<()> {
        assert_alive_for(&mut self.handle, period)
    }
}

/// Polls `handle` until it is reaped or `timeout` passes.
///
/// # Errors
/// [`TestError::Timeout`] on timeout; controller errors propagate.
pub fn wait_until_dead(handle: &mut ProcessHandle, timeout: Duration) -> Result<ProcessStatus> {
    let deadline = Instant::now() + timeout;
    while handle.is_alive()? {
        if Instant::now() >= deadline {
            return Err(TestError::Timeout(timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    Ok(handle.status())
}

/// Checks that `handle` stays alive for `period`.
///
/// # Errors
/// [`TestError::Assertion`] if the child dies; controller errors propagate.
pub fn assert_alive_for(handle: &mut ProcessHandle, period: Duration) -> Result<()> {
    let deadline = Instant::now() + period;
    loop {
        if !handle.is_alive()? {
            return Err(TestError::assertion(format!(
                "process {} died early: {}",
                handle.pid(),
                handle.status()
            )));
        }
        if Instant::now() >= deadline {
            return Ok(());
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}
