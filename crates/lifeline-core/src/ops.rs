//! OS back end for reaping and signaling.
//!
//! [`ProcessOps`] is the seam between the handle's state machine and the
//! kernel. [`NixOps`] talks to `waitpid(2)` and `kill(2)` through `nix`;
//! tests substitute a scripted back end.

use std::time::Duration;

use crate::error::{ControlError, Result};
use crate::signal::Signal;
use crate::status::ReapOutcome;

/// Sleep between reap checks in the default polling [`ProcessOps::reap_blocking`].
pub const BLOCKING_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Result of a signal delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The kernel accepted the signal.
    Delivered,
    /// The process no longer exists (ESRCH).
    NoSuchProcess,
}

/// Reap and signal primitives for one OS.
///
/// Implementations report "no child to reap" (ECHILD) as
/// [`ControlError::Ownership`]; the handle relies on that to detect external
/// reapers.
pub trait ProcessOps {
    /// Non-blocking reap check. Must never block.
    ///
    /// # Errors
    /// Returns an ownership error if there is no such child to reap.
    fn try_reap(&self, pid: u32) -> Result<ReapOutcome>;

    /// Blocks until the child reports a state change.
    ///
    /// The default polls [`try_reap`](Self::try_reap), sleeping
    /// [`BLOCKING_POLL_INTERVAL`] between reap checks.
    ///
    /// # Errors
    /// Same as [`try_reap`](Self::try_reap).
    fn reap_blocking(&self, pid: u32) -> Result<ReapOutcome> {
        loop {
            match self.try_reap(pid)? {
                ReapOutcome::StillAlive => std::thread::sleep(BLOCKING_POLL_INTERVAL),
                outcome => return Ok(outcome),
            }
        }
    }

    /// Sends `signal` to `pid`.
    ///
    /// # Errors
    /// Returns a signal error for failures other than ESRCH.
    fn send_signal(&self, pid: u32, signal: Signal) -> Result<Delivery>;
}

pub(crate) fn no_child_error(pid: u32) -> ControlError {
    ControlError::ownership(
        pid,
        "reap found no child process although the handle has not seen it terminate. \
         Did someone else call waitpid() on our process?",
    )
}

#[cfg(unix)]
pub use self::unix::NixOps;

#[cfg(unix)]
mod unix {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal as NixSignal, kill as nix_kill};
    use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
    use nix::unistd::Pid;

    use super::{Delivery, ProcessOps, no_child_error};
    use crate::error::{ControlError, Result};
    use crate::signal::Signal;
    use crate::status::ReapOutcome;

    /// `waitpid(2)`/`kill(2)` back end.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NixOps;

    impl NixOps {
        /// Creates the back end.
        #[must_use]
        pub const fn new() -> Self {
            Self
        }

        fn waitpid_retrying(pid: u32, flags: Option<WaitPidFlag>) -> Result<ReapOutcome> {
            let nix_pid = Pid::from_raw(pid as i32);
            loop {
                match waitpid(nix_pid, flags) {
                    Ok(status) => return translate(pid, status),
                    Err(Errno::EINTR) => continue,
                    Err(Errno::ECHILD) => return Err(no_child_error(pid)),
                    Err(e) => {
                        return Err(ControlError::wait(format!("waitpid({pid}) failed: {e}")));
                    }
                }
            }
        }
    }

    impl ProcessOps for NixOps {
        fn try_reap(&self, pid: u32) -> Result<ReapOutcome> {
            Self::waitpid_retrying(pid, Some(WaitPidFlag::WNOHANG))
        }

        fn reap_blocking(&self, pid: u32) -> Result<ReapOutcome> {
            Self::waitpid_retrying(pid, None)
        }

        fn send_signal(&self, pid: u32, signal: Signal) -> Result<Delivery> {
            let nix_signal = NixSignal::try_from(signal)?;
            match nix_kill(Pid::from_raw(pid as i32), nix_signal) {
                Ok(()) => Ok(Delivery::Delivered),
                Err(Errno::ESRCH) => Ok(Delivery::NoSuchProcess),
                Err(e) => Err(ControlError::signal(format!(
                    "kill({pid}, {signal}) failed: {e}"
                ))),
            }
        }
    }

    fn translate(pid: u32, status: WaitStatus) -> Result<ReapOutcome> {
        let outcome = match status {
            WaitStatus::StillAlive => ReapOutcome::StillAlive,
            WaitStatus::Exited(_, code) => ReapOutcome::Exited(code),
            WaitStatus::Signaled(_, sig, core_dumped) => ReapOutcome::Signaled {
                signal: sig.into(),
                core_dumped,
            },
            WaitStatus::Stopped(_, sig) => ReapOutcome::Stopped(sig.into()),
            WaitStatus::Continued(_) => ReapOutcome::Continued,
            #[cfg(any(target_os = "linux", target_os = "android"))]
            WaitStatus::PtraceEvent(_, sig, _) => ReapOutcome::Stopped(sig.into()),
            #[cfg(any(target_os = "linux", target_os = "android"))]
            WaitStatus::PtraceSyscall(_) => ReapOutcome::Stopped(Signal::Other(0)),
        };
        if outcome.is_final() {
            tracing::trace!(pid = pid, outcome = ?outcome, "waitpid reported final status");
        }
        Ok(outcome)
    }

}
