//! The process handle: one child, reaped exactly once.
//!
//! All mutation goes through [`ProcessHandle::record`], which feeds reap
//! outcomes into [`ProcessStatus::advance`]. Nothing else writes the status,
//! so the exit code and fatal signal are fixed the moment a final outcome is
//! seen.

use std::process::{ChildStderr, ChildStdin, ChildStdout};
use std::time::Duration;

use crate::config::ControllerConfig;
use crate::error::{ControlError, Result};
use crate::escalate::Escalator;
use crate::ops::{Delivery, NixOps, ProcessOps};
use crate::signal::Signal;
use crate::status::{ProcessStatus, ReapOutcome};

/// Handle to one child process.
///
/// Single owner: every operation takes `&mut self` and there is no internal
/// locking. Callers sharing a handle across threads must serialize access.
#[derive(Debug)]
pub struct ProcessHandle<O: ProcessOps = NixOps> {
    pid: u32,
    status: ProcessStatus,
    controller: ControllerConfig,
    ops: O,
    stdin: Option<ChildStdin>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl ProcessHandle<NixOps> {
    /// Takes control of a child that was forked elsewhere (for example by a
    /// pty layer). The caller must not reap `pid` itself from now on.
    #[must_use]
    pub fn adopt(pid: u32, controller: ControllerConfig) -> Self {
        Self::with_ops(pid, controller, NixOps::new())
    }
}

impl<O: ProcessOps> ProcessHandle<O> {
    /// Creates a handle over `pid` using a specific OS back end.
    #[must_use]
    pub fn with_ops(pid: u32, controller: ControllerConfig, ops: O) -> Self {
        Self {
            pid,
            status: ProcessStatus::Unknown,
            controller,
            ops,
            stdin: None,
            stdout: None,
            stderr: None,
        }
    }

    pub(crate) fn with_stdio(
        mut self,
        stdin: Option<ChildStdin>,
        stdout: Option<ChildStdout>,
        stderr: Option<ChildStderr>,
    ) -> Self {
        self.stdin = stdin;
        self.stdout = stdout;
        self.stderr = stderr;
        self
    }

    /// Process id, fixed at spawn.
    #[must_use]
    pub const fn pid(&self) -> u32 {
        self.pid
    }

    /// Cached status. `Unknown` until the final status has been reaped.
    #[must_use]
    pub const fn status(&self) -> ProcessStatus {
        self.status
    }

    /// True once the final status has been reaped. Never reverts.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.status.is_terminated()
    }

    /// Exit code of a normal exit; `None` while running or after signal death.
    #[must_use]
    pub const fn exit_status(&self) -> Option<i32> {
        self.status.exit_code()
    }

    /// Fatal signal; `None` while running or after a normal exit.
    #[must_use]
    pub const fn signal_status(&self) -> Option<Signal> {
        self.status.signal()
    }

    /// Whether the child was spawned with SIGHUP ignored.
    #[must_use]
    pub const fn ignores_hangup(&self) -> bool {
        self.controller.ignore_hangup
    }

    /// Controller settings this handle was created with.
    #[must_use]
    pub const fn controller(&self) -> &ControllerConfig {
        &self.controller
    }

    /// Takes the write end of the child's stdin pipe, if piped.
    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.stdin.take()
    }

    /// Takes the read end of the child's stdout pipe, if piped.
    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    /// Takes the read end of the child's stderr pipe, if piped.
    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }

    /// Non-blocking liveness check.
    ///
    /// Once terminated this returns `false` without touching the OS.
    /// Otherwise one reap check runs (two if the first says "still alive")
    /// and a final status, if any, is cached.
    ///
    /// # Errors
    /// Ownership violation if someone else reaped the child; job-control
    /// error if the child reports a stop.
    pub fn is_alive(&mut self) -> Result<bool> {
        if self.status.is_terminated() {
            return Ok(false);
        }

        let mut outcome = self.check_reap()?;
        if outcome == ReapOutcome::StillAlive {
            // A child that died a moment ago can be reported as running once.
            outcome = self.check_reap()?;
        }
        self.record(outcome)
    }

    /// Blocks until the child terminates and returns its final status.
    ///
    /// No timeout. Kill the child to make this return early.
    ///
    /// # Errors
    /// Ownership violation if the handle has already reaped the child, or if
    /// someone else reaps it first.
    pub fn wait(&mut self) -> Result<ProcessStatus> {
        self.ensure_waitable()?;
        loop {
            let outcome = self
                .ops
                .reap_blocking(self.pid)
                .inspect_err(|e| self.log_reap_failure(e))?;
            if !self.record(outcome)? {
                return Ok(self.status);
            }
        }
    }

    /// Async variant of [`wait`](Self::wait) for tokio callers, polling the
    /// non-blocking reap check every `poll_interval`.
    ///
    /// # Errors
    /// Same contract as [`wait`](Self::wait).
    pub async fn wait_async(&mut self, poll_interval: Duration) -> Result<ProcessStatus> {
        self.ensure_waitable()?;
        while self.is_alive()? {
            tokio::time::sleep(poll_interval).await;
        }
        Ok(self.status)
    }

    /// Sends `signal` if the child is still alive. Fire-and-forget: this
    /// never updates the cached status itself.
    ///
    /// # Errors
    /// Propagates liveness errors; delivery failures other than "no such
    /// process" are signal errors.
    pub fn kill(&mut self, signal: Signal) -> Result<()> {
        if !self.is_alive()? {
            tracing::debug!(pid = self.pid, signal = %signal, "not signaling terminated child");
            return Ok(());
        }
        match self.ops.send_signal(self.pid, signal)? {
            Delivery::Delivered => {
                tracing::debug!(pid = self.pid, signal = %signal, "sent signal");
            }
            Delivery::NoSuchProcess => {
                tracing::debug!(pid = self.pid, signal = %signal, "child vanished before signal");
            }
        }
        Ok(())
    }

    /// Escalating termination: SIGINT, SIGTERM, SIGHUP (unless shielded),
    /// then SIGKILL if `force`. Returns whether the child is dead.
    ///
    /// # Errors
    /// Reap inconsistencies propagate; running out of soft signals does not
    /// error, it returns `Ok(false)`.
    pub fn terminate(&mut self, force: bool) -> Result<bool> {
        Escalator::new(self.controller.escalation).terminate(self, force)
    }

    /// Drops the stdio pipes, waits `delay_after_close`, and terminates the
    /// child if it is still alive.
    ///
    /// # Errors
    /// [`ControlError::Terminate`] if the child survives termination.
    pub fn close(&mut self, force: bool) -> Result<()> {
        drop(self.stdin.take());
        drop(self.stdout.take());
        drop(self.stderr.take());
        std::thread::sleep(self.controller.escalation.delay_after_close);

        if self.is_alive()? && !self.terminate(force)? {
            return Err(ControlError::Terminate(self.pid));
        }
        Ok(())
    }

    fn ensure_waitable(&self) -> Result<()> {
        if self.status.is_terminated() {
            return Err(ControlError::ownership(
                self.pid,
                format!("cannot wait for dead child process ({})", self.status),
            ));
        }
        Ok(())
    }

    fn check_reap(&self) -> Result<ReapOutcome> {
        self.ops
            .try_reap(self.pid)
            .inspect_err(|e| self.log_reap_failure(e))
    }

    /// Feeds one reap outcome into the status. Returns whether the child is
    /// still alive.
    fn record(&mut self, outcome: ReapOutcome) -> Result<bool> {
        match outcome {
            ReapOutcome::StillAlive => Ok(true),
            ReapOutcome::Stopped(_) => Err(ControlError::JobControl {
                pid: self.pid,
                event: "stop",
            }),
            ReapOutcome::Continued => Err(ControlError::JobControl {
                pid: self.pid,
                event: "continue",
            }),
            ReapOutcome::Exited(_) | ReapOutcome::Signaled { .. } => {
                self.status = self.status.advance(&outcome);
                if let ReapOutcome::Signaled {
                    core_dumped: true, ..
                } = outcome
                {
                    tracing::info!(pid = self.pid, "child dumped core");
                }
                tracing::info!(pid = self.pid, status = %self.status, "reaped child");
                Ok(false)
            }
        }
    }

    fn log_reap_failure(&self, err: &ControlError) {
        if err.is_ownership_violation() {
            tracing::warn!(pid = self.pid, error = %err, "lost ownership of child");
        } else {
            tracing::error!(pid = self.pid, error = %err, "reap failed");
        }
    }
}

impl<O: ProcessOps> Drop for ProcessHandle<O> {
    fn drop(&mut self) {
        if !self.controller.terminate_on_drop || self.status.is_terminated() {
            return;
        }
        match self.terminate(true) {
            Ok(true) => tracing::debug!(pid = self.pid, "terminated child on drop"),
            Ok(false) => tracing::warn!(pid = self.pid, "child survived termination on drop"),
            Err(e) => tracing::warn!(pid = self.pid, error = %e, "termination on drop failed"),
        }
    }
}
