// Allow unwrap/expect in tests for clear failure messages
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! # lifeline-test
//!
//! Testing infrastructure for the lifeline process controller.
//!
//! - **Session**: line-oriented I/O over a spawned child's pipes
//! - **Fixtures**: `/bin/sh` helpers with known signal dispositions
//! - **Integration suites**: real-process tests under `tests/`
//!
//! ## Example
//!
//! ```rust,no_run
//! use lifeline_test::{Session, fixtures};
//!
//! # fn main() -> lifeline_test::Result<()> {
//! let mut session = Session::spawn(fixtures::stubborn())?;
//! session.expect_line(fixtures::READY)?;
//! assert!(!session.handle_mut().terminate(false)?);
//! assert!(session.handle_mut().terminate(true)?);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod fixtures;
pub mod harness;

pub use error::{Result, TestError};
pub use harness::{Session, assert_alive_for, wait_until_dead};
