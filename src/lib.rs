//! Lifeline: child process lifecycle control for Unix.
//!
//! Spawn a child, check on it without blocking, reap it exactly once, and
//! take it down with an escalating signal sequence.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use lifeline::prelude::*;
//!
//! # fn main() -> lifeline::core::Result<()> {
//! let mut child = ProcessHandle::spawn(&SpawnConfig::new("sleep").arg("30"))?;
//! if !child.terminate(false)? {
//!     child.terminate(true)?;
//! }
//! println!("{}", child.status());
//! # Ok(())
//! # }
//! ```

pub use lifeline_core as core;

/// Prelude module for common imports.
pub mod prelude {
    pub use lifeline_core::{
        ControlError, ControllerConfig, EscalationConfig, ProcessStatus, Signal, SpawnConfig,
        StdioMode,
    };
    #[cfg(unix)]
    pub use lifeline_core::{Escalator, ProcessHandle};
}
