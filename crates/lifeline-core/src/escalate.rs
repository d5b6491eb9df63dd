//! Termination escalator.
//!
//! ```text
//! RUNNING --INT--> RUNNING|DEAD --TERM--> RUNNING|DEAD
//!         --HUP (unless shielded)--> RUNNING|DEAD --KILL (force only)--> DEAD
//! ```
//!
//! Each step sends one signal, sleeps a bounded delay, and re-checks
//! liveness. SIGKILL is never sent unless the caller asks for force.

use std::time::Duration;

use crate::config::EscalationConfig;
use crate::error::Result;
use crate::handle::ProcessHandle;
use crate::ops::ProcessOps;
use crate::signal::Signal;

const SOFT_SIGNALS: [Signal; 3] = [Signal::Int, Signal::Term, Signal::Hup];

enum Step {
    Dead,
    StillAlive,
    /// Delivery failed; the re-check after the delay is the final answer.
    Abandoned { dead: bool },
}

/// Escalating termination policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Escalator {
    config: EscalationConfig,
}

impl Escalator {
    /// Creates an escalator with the given delays.
    #[must_use]
    pub const fn new(config: EscalationConfig) -> Self {
        Self { config }
    }

    /// The soft signals tried, in order, before SIGKILL.
    #[must_use]
    pub fn soft_signals(ignore_hangup: bool) -> &'static [Signal] {
        if ignore_hangup {
            &SOFT_SIGNALS[..2]
        } else {
            &SOFT_SIGNALS
        }
    }

    /// Runs the escalation against `handle`. Returns whether the child is
    /// dead at the end.
    ///
    /// # Errors
    /// Reap inconsistencies from the liveness checks.
    pub fn terminate<O: ProcessOps>(
        &self,
        handle: &mut ProcessHandle<O>,
        force: bool,
    ) -> Result<bool> {
        if !handle.is_alive()? {
            return Ok(true);
        }

        for &signal in Self::soft_signals(handle.ignores_hangup()) {
            match Self::step(handle, signal, self.config.delay_after_signal)? {
                Step::Dead => return Ok(true),
                Step::StillAlive => {}
                Step::Abandoned { dead } => return Ok(dead),
            }
        }

        if !force {
            tracing::warn!(
                pid = handle.pid(),
                "child survived soft termination signals"
            );
            return Ok(false);
        }

        match Self::step(handle, Signal::Kill, self.config.delay_after_kill)? {
            Step::Dead => Ok(true),
            Step::StillAlive => {
                tracing::warn!(pid = handle.pid(), "child survived SIGKILL");
                Ok(false)
            }
            Step::Abandoned { dead } => Ok(dead),
        }
    }

    fn step<O: ProcessOps>(
        handle: &mut ProcessHandle<O>,
        signal: Signal,
        delay: Duration,
    ) -> Result<Step> {
        if !handle.is_alive()? {
            return Ok(Step::Dead);
        }
        tracing::debug!(pid = handle.pid(), signal = %signal, "escalating");
        let delivered = match handle.kill(signal) {
            Ok(()) => true,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                tracing::warn!(pid = handle.pid(), signal = %signal, error = %e, "signal delivery failed");
                false
            }
        };

        std::thread::sleep(delay);
        let dead = !handle.is_alive()?;

        Ok(match (delivered, dead) {
            (false, dead) => Step::Abandoned { dead },
            (true, true) => Step::Dead,
            (true, false) => Step::StillAlive,
        })
    }
}
