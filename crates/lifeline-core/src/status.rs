//! Cached process status and the reap outcomes that drive it.
//!
//! ```text
//! Unknown ──reap: exited(code)──▶ Exited(code)
//!    │ ▲
//!    │ └──reap: still alive
//!    └────reap: signaled(sig)───▶ Signaled(sig)
//! ```
//!
//! `Exited` and `Signaled` are absorbing: [`ProcessStatus::advance`] returns
//! them unchanged whatever the reap check says next.

use serde::{Deserialize, Serialize};

use crate::signal::Signal;

/// What one reap check observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReapOutcome {
    /// The child has not changed state.
    StillAlive,
    /// The child exited normally with this code.
    Exited(i32),
    /// The child was killed by an unhandled signal.
    Signaled {
        /// The fatal signal.
        signal: Signal,
        /// Whether the kernel wrote a core dump.
        core_dumped: bool,
    },
    /// The child was stopped by job control or a tracer.
    Stopped(Signal),
    /// The child was resumed after a stop.
    Continued,
}

impl ReapOutcome {
    /// Returns true if this outcome carries a final status.
    #[must_use]
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Exited(_) | Self::Signaled { .. })
    }
}

/// Lazily cached terminal status of a child.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProcessStatus {
    /// Not yet reaped; the child may or may not still be running.
    #[default]
    Unknown,
    /// Exited normally.
    Exited(i32),
    /// Killed by a signal.
    Signaled(Signal),
}

impl ProcessStatus {
    /// Applies a reap outcome. Only `Unknown` can move; terminal states stay put.
    #[must_use]
    pub fn advance(self, outcome: &ReapOutcome) -> Self {
        match (self, outcome) {
            (Self::Unknown, ReapOutcome::Exited(code)) => Self::Exited(*code),
            (Self::Unknown, ReapOutcome::Signaled { signal, .. }) => Self::Signaled(*signal),
            (current, _) => current,
        }
    }

    /// Returns true once the final status has been reaped.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Exit code, set only for a normal exit.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Exited(code) => Some(*code),
            Self::Unknown | Self::Signaled(_) => None,
        }
    }

    /// Fatal signal, set only for death by signal.
    #[must_use]
    pub const fn signal(&self) -> Option<Signal> {
        match self {
            Self::Signaled(sig) => Some(*sig),
            Self::Unknown | Self::Exited(_) => None,
        }
    }
}

impl std::fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown => f.write_str("not reaped"),
            Self::Exited(code) => write!(f, "exited with code {code}"),
            Self::Signaled(sig) => write!(f, "killed by {sig}"),
        }
    }
}
