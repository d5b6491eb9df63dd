//! Helper-process fixtures.
//!
//! Every fixture is a plain `/bin/sh` one-liner. Long-running fixtures print
//! [`READY`] once their signal dispositions are in place and then `exec`
//! into `sleep`, so signals land on a single process and ignored
//! dispositions carry across the exec.

use lifeline_core::{Signal, SpawnConfig};

/// Line printed by long-running fixtures once they are set up.
pub const READY: &str = "READY";

/// How long the sleeping fixtures stay up if nobody kills them.
pub const LINGER_SECS: u32 = 60;

fn shell(script: &str) -> SpawnConfig {
    SpawnConfig::new("sh").args(["-c", script])
}

fn ready_then_sleep(traps: &str) -> SpawnConfig {
    shell(&format!("{traps}echo {READY}; exec sleep {LINGER_SECS}"))
}

/// `cat`, echoing stdin to stdout.
#[must_use]
pub fn cat() -> SpawnConfig {
    SpawnConfig::new("cat")
}

/// Sleeps for `secs` seconds and exits 0.
#[must_use]
pub fn sleeper(secs: f64) -> SpawnConfig {
    SpawnConfig::new("sleep").arg(secs.to_string())
}

/// Exits immediately with `code`.
#[must_use]
pub fn exit_with(code: u8) -> SpawnConfig {
    shell(&format!("exit {code}"))
}

/// Prints `text` and exits 0.
#[must_use]
pub fn echo(text: &str) -> SpawnConfig {
    SpawnConfig::new("echo").arg(text)
}

/// Kills itself with `signal`, which must be one whose default action
/// terminates.
#[must_use]
pub fn self_signal(signal: Signal) -> SpawnConfig {
    let name = signal.name().map_or("TERM", |n| n.trim_start_matches("SIG"));
    shell(&format!("kill -s {name} $$; sleep {LINGER_SECS}"))
}

/// Default dispositions: dies on the first soft signal.
#[must_use]
pub fn interruptible() -> SpawnConfig {
    ready_then_sleep("")
}

/// Ignores SIGINT and SIGTERM; SIGHUP keeps whatever the controller sets.
#[must_use]
pub fn ignores_int_term() -> SpawnConfig {
    ready_then_sleep("trap '' INT TERM; ")
}

/// Ignores every soft signal. Only SIGKILL gets rid of it.
#[must_use]
pub fn stubborn() -> SpawnConfig {
    ready_then_sleep("trap '' INT TERM HUP; ")
}
