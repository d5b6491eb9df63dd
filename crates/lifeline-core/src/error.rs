//! Error types for lifeline-core.
//!
//! Reap inconsistencies are surfaced, never absorbed: the controller is the
//! only party allowed to collect a child's status, so an external reaper is a
//! correctness bug in the hosting process.

/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, ControlError>;

/// Errors raised by the process handle and termination escalator.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// The single-writer invariant over reaping was broken, or a finished
    /// process was waited on again.
    #[error("process {pid}: {reason}")]
    Ownership {
        /// Process the violation was detected on.
        pid: u32,
        /// What was observed.
        reason: String,
    },

    /// The child reported a job-control stop or continue. We never ask for
    /// those, so someone else is tracing or job-controlling our child.
    #[error(
        "process {pid} reported a job-control {event}; is some other process \
         attempting job control with our child pid?"
    )]
    JobControl {
        /// Process that reported the event.
        pid: u32,
        /// Either "stop" or "continue".
        event: &'static str,
    },

    /// Spawn failed.
    #[error("failed to spawn process: {0}")]
    Spawn(String),

    /// Signal delivery failed for a reason other than the process being gone.
    #[error("failed to send signal: {0}")]
    Signal(String),

    /// Reaping failed with an unexpected OS error.
    #[error("wait failed: {0}")]
    Wait(String),

    /// The child survived every termination attempt made by `close`.
    #[error("could not terminate process {0}")]
    Terminate(u32),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ControlError {
    /// Creates an ownership violation error.
    #[must_use]
    pub fn ownership(pid: u32, reason: impl Into<String>) -> Self {
        Self::Ownership {
            pid,
            reason: reason.into(),
        }
    }

    /// Creates a spawn error.
    #[must_use]
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Creates a signal error.
    #[must_use]
    pub fn signal(msg: impl Into<String>) -> Self {
        Self::Signal(msg.into())
    }

    /// Creates a wait error.
    #[must_use]
    pub fn wait(msg: impl Into<String>) -> Self {
        Self::Wait(msg.into())
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if someone outside the handle interfered with our child.
    #[must_use]
    pub const fn is_ownership_violation(&self) -> bool {
        matches!(self, Self::Ownership { .. } | Self::JobControl { .. })
    }

    /// Returns true if the handle's view of the child can no longer be trusted.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Ownership { .. } | Self::JobControl { .. } | Self::Wait(_)
        )
    }
}
