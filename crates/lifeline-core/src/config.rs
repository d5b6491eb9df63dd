//! Spawn and controller configuration.
//!
//! Configuration is validated at load time, with defaults matching the
//! conventional interactive-child behavior: hangup shielded, 100 ms of
//! patience per escalation step, terminate on drop.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ControlError, Result};

/// Upper bound for any single escalation delay.
pub const MAX_STEP_DELAY: Duration = Duration::from_secs(10);

/// How a spawned child's stdin, stdout, and stderr are wired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum StdioMode {
    /// Pipes owned by the handle, available through `take_stdin` and friends.
    #[default]
    Piped,
    /// Inherit the parent's descriptors.
    Inherit,
    /// Redirect to /dev/null.
    Null,
}

/// Everything needed to spawn and control one child.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnConfig {
    /// Program to execute, resolved through `PATH` if relative.
    pub program: PathBuf,

    /// Command-line arguments.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Stdio wiring.
    #[serde(default)]
    pub stdio: StdioMode,

    /// Controller behavior for the spawned handle.
    #[serde(default)]
    pub controller: ControllerConfig,
}

impl SpawnConfig {
    /// Creates a configuration for `program` with default controller settings.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: vec![],
            env: HashMap::new(),
            working_dir: None,
            stdio: StdioMode::default(),
            controller: ControllerConfig::default(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets whether the child ignores SIGHUP.
    #[must_use]
    pub fn ignore_hangup(mut self, ignore: bool) -> Self {
        self.controller.ignore_hangup = ignore;
        self
    }

    /// Sets the stdio wiring.
    #[must_use]
    pub fn stdio(mut self, stdio: StdioMode) -> Self {
        self.stdio = stdio;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.program.as_os_str().is_empty() {
            return Err(ControlError::config("program cannot be empty"));
        }
        if self.env.keys().any(|k| k.is_empty() || k.contains('=')) {
            return Err(ControlError::config(
                "environment variable names must be non-empty and must not contain '='",
            ));
        }
        self.controller.validate()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ControlError::config(format!("failed to read config: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed or is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ControlError::config(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

/// Per-handle controller behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Shield the child from SIGHUP. When false the child's SIGHUP
    /// disposition is reset to default, whatever the parent has.
    #[serde(default = "default_true")]
    pub ignore_hangup: bool,

    /// Run a forced termination when a live handle is dropped.
    #[serde(default = "default_true")]
    pub terminate_on_drop: bool,

    /// Escalation timing.
    #[serde(default)]
    pub escalation: EscalationConfig,
}

fn default_true() -> bool {
    true
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            ignore_hangup: default_true(),
            terminate_on_drop: default_true(),
            escalation: EscalationConfig::default(),
        }
    }
}

impl ControllerConfig {
    /// Validates the controller settings.
    ///
    /// # Errors
    /// Returns an error if a delay is out of range.
    pub fn validate(&self) -> Result<()> {
        self.escalation.validate()
    }
}

/// Delays used by the termination escalator and `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationConfig {
    /// Pause after each soft signal (INT, TERM, HUP) before re-checking.
    #[serde(default = "default_step_delay")]
    #[serde(with = "humantime_serde")]
    pub delay_after_signal: Duration,

    /// Pause after SIGKILL before the final liveness check.
    #[serde(default = "default_step_delay")]
    #[serde(with = "humantime_serde")]
    pub delay_after_kill: Duration,

    /// Pause after closing the pipes, before deciding to terminate.
    #[serde(default = "default_step_delay")]
    #[serde(with = "humantime_serde")]
    pub delay_after_close: Duration,
}

fn default_step_delay() -> Duration {
    Duration::from_millis(100)
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            delay_after_signal: default_step_delay(),
            delay_after_kill: default_step_delay(),
            delay_after_close: default_step_delay(),
        }
    }
}

impl EscalationConfig {
    /// All delays zero. Useful with a scripted back end.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            delay_after_signal: Duration::ZERO,
            delay_after_kill: Duration::ZERO,
            delay_after_close: Duration::ZERO,
        }
    }

    /// Worst-case time `terminate(force = true)` spends sleeping.
    #[must_use]
    pub fn worst_case_latency(&self, ignore_hangup: bool) -> Duration {
        let soft_steps = if ignore_hangup { 2 } else { 3 };
        self.delay_after_signal * soft_steps + self.delay_after_kill
    }

    /// Validates the delays.
    ///
    /// # Errors
    /// Returns an error if any delay exceeds [`MAX_STEP_DELAY`].
    pub fn validate(&self) -> Result<()> {
        for (name, delay) in [
            ("delay_after_signal", self.delay_after_signal),
            ("delay_after_kill", self.delay_after_kill),
            ("delay_after_close", self.delay_after_close),
        ] {
            if delay > MAX_STEP_DELAY {
                return Err(ControlError::config(format!(
                    "{name} must be at most {}",
                    humantime::format_duration(MAX_STEP_DELAY)
                )));
            }
        }
        Ok(())
    }
}

/// Serde helper for humantime durations.
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    /// Serializes a duration as a human-readable string.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    /// Deserializes a duration from a human-readable string.
    ///
    /// # Errors
    /// Returns an error if the string cannot be parsed.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
