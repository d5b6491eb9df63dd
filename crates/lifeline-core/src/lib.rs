// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # lifeline-core
//!
//! Child process lifecycle primitives: spawn a child, track its liveness,
//! reap its final status exactly once, and terminate it with an escalating
//! signal sequence.
//!
//! - [`ProcessHandle`] owns one child and caches its [`ProcessStatus`]
//! - [`Escalator`] sends SIGINT, SIGTERM, SIGHUP, then (if forced) SIGKILL
//! - [`ProcessOps`] is the OS seam; [`NixOps`] is the `waitpid`/`kill` back end
//! - [`SpawnConfig`] and [`ControllerConfig`] carry TOML-loadable settings
//!
//! ## Example
//!
//! ```rust,no_run
//! use lifeline_core::{ProcessHandle, SpawnConfig};
//!
//! # fn main() -> lifeline_core::Result<()> {
//! let mut child = ProcessHandle::spawn(&SpawnConfig::new("sleep").arg("30"))?;
//! assert!(child.is_alive()?);
//! assert!(child.terminate(false)?);
//! assert!(child.signal_status().is_some());
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod ops;
pub mod signal;
pub mod status;

#[cfg(unix)]
pub mod escalate;
#[cfg(unix)]
pub mod handle;
#[cfg(unix)]
mod spawn;

#[cfg(all(test, unix))]
mod tests;

pub use config::{ControllerConfig, EscalationConfig, MAX_STEP_DELAY, SpawnConfig, StdioMode};
pub use error::{ControlError, Result};
pub use ops::{BLOCKING_POLL_INTERVAL, Delivery, ProcessOps};
pub use signal::Signal;
pub use status::{ProcessStatus, ReapOutcome};

#[cfg(unix)]
pub use escalate::Escalator;
#[cfg(unix)]
pub use handle::ProcessHandle;
#[cfg(unix)]
pub use ops::NixOps;
