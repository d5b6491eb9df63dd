//! Unix signals as seen by the controller.
//!
//! Named variants cover the signals the escalator sends and the ones a child
//! commonly dies from. Anything else the OS reports is kept as
//! [`Signal::Other`] so a reaped status is never lost.

use serde::{Deserialize, Serialize};

/// Unix-style signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    /// Hangup (terminal disconnect).
    Hup,
    /// Interrupt (^C).
    Int,
    /// Quit (^\, core dump).
    Quit,
    /// Abort.
    Abrt,
    /// Kill (cannot be caught or ignored).
    Kill,
    /// Segmentation fault.
    Segv,
    /// Broken pipe.
    Pipe,
    /// Alarm clock.
    Alrm,
    /// Terminate.
    Term,
    /// User signal 1.
    Usr1,
    /// User signal 2.
    Usr2,
    /// Child status changed.
    Chld,
    /// Continue (resume).
    Cont,
    /// Stop (pause).
    Stop,
    /// Any other signal, by raw number.
    Other(i32),
}

impl Signal {
    /// Returns the conventional `SIGxxx` name, if this is a named variant.
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        match self {
            Self::Hup => Some("SIGHUP"),
            Self::Int => Some("SIGINT"),
            Self::Quit => Some("SIGQUIT"),
            Self::Abrt => Some("SIGABRT"),
            Self::Kill => Some("SIGKILL"),
            Self::Segv => Some("SIGSEGV"),
            Self::Pipe => Some("SIGPIPE"),
            Self::Alrm => Some("SIGALRM"),
            Self::Term => Some("SIGTERM"),
            Self::Usr1 => Some("SIGUSR1"),
            Self::Usr2 => Some("SIGUSR2"),
            Self::Chld => Some("SIGCHLD"),
            Self::Cont => Some("SIGCONT"),
            Self::Stop => Some("SIGSTOP"),
            Self::Other(_) => None,
        }
    }

    /// Returns true for signals a process cannot catch, block, or ignore.
    #[must_use]
    pub const fn is_uncatchable(&self) -> bool {
        matches!(self, Self::Kill | Self::Stop)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name(), self) {
            (Some(name), _) => f.write_str(name),
            (None, Self::Other(raw)) => write!(f, "signal {raw}"),
            (None, _) => write!(f, "{self:?}"),
        }
    }
}

#[cfg(unix)]
mod unix {
    use nix::sys::signal::Signal as NixSignal;

    use super::Signal;
    use crate::error::ControlError;

    impl Signal {
        /// Returns the platform signal number.
        #[must_use]
        pub fn as_raw(self) -> i32 {
            if let Self::Other(raw) = self {
                return raw;
            }
            self.named_to_nix().map_or(0, |sig| sig as i32)
        }

        /// Creates a signal from a platform signal number.
        ///
        /// Returns `None` if the number is not a valid signal on this platform.
        #[must_use]
        pub fn from_raw(raw: i32) -> Option<Self> {
            NixSignal::try_from(raw).ok().map(Self::from)
        }

        fn named_to_nix(self) -> Option<NixSignal> {
            let sig = match self {
                Self::Hup => NixSignal::SIGHUP,
                Self::Int => NixSignal::SIGINT,
                Self::Quit => NixSignal::SIGQUIT,
                Self::Abrt => NixSignal::SIGABRT,
                Self::Kill => NixSignal::SIGKILL,
                Self::Segv => NixSignal::SIGSEGV,
                Self::Pipe => NixSignal::SIGPIPE,
                Self::Alrm => NixSignal::SIGALRM,
                Self::Term => NixSignal::SIGTERM,
                Self::Usr1 => NixSignal::SIGUSR1,
                Self::Usr2 => NixSignal::SIGUSR2,
                Self::Chld => NixSignal::SIGCHLD,
                Self::Cont => NixSignal::SIGCONT,
                Self::Stop => NixSignal::SIGSTOP,
                Self::Other(_) => return None,
            };
            Some(sig)
        }
    }

    impl From<NixSignal> for Signal {
        fn from(sig: NixSignal) -> Self {
            match sig {
                NixSignal::SIGHUP => Self::Hup,
                NixSignal::SIGINT => Self::Int,
                NixSignal::SIGQUIT => Self::Quit,
                NixSignal::SIGABRT => Self::Abrt,
                NixSignal::SIGKILL => Self::Kill,
                NixSignal::SIGSEGV => Self::Segv,
                NixSignal::SIGPIPE => Self::Pipe,
                NixSignal::SIGALRM => Self::Alrm,
                NixSignal::SIGTERM => Self::Term,
                NixSignal::SIGUSR1 => Self::Usr1,
                NixSignal::SIGUSR2 => Self::Usr2,
                NixSignal::SIGCHLD => Self::Chld,
                NixSignal::SIGCONT => Self::Cont,
                NixSignal::SIGSTOP => Self::Stop,
                other => Self::Other(other as i32),
            }
        }
    }

    impl TryFrom<Signal> for NixSignal {
        type Error = ControlError;

        fn try_from(sig: Signal) -> Result<Self, Self::Error> {
            if let Some(named) = sig.named_to_nix() {
                return Ok(named);
            }
            let raw = sig.as_raw();
            Self::try_from(raw)
                .map_err(|e| ControlError::signal(format!("invalid signal number {raw}: {e}")))
        }
    }
}
