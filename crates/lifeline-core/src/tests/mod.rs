//! State-machine tests against a scripted OS back end.
//!
//! | Module | Covers |
//! |--------|--------|
//! | `lifecycle` | liveness checks, wait, kill, reap errors, drop, close |
//! | `escalation` | signal order, hangup shielding, force, delivery failures |
//!
//! Real-process coverage lives in the `lifeline-test` crate.


pub use mocks::ScriptedOps;
