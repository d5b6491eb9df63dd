// Demos are allowed to use expect/unwrap for simplicity
#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Escalating termination demo.
//!
//! Spawns a child that ignores SIGINT and SIGTERM, tries a soft termination,
//! then forces it.
//!
//! # Usage
//!
//! ```bash
//! # Built-in stubborn child
//! RUST_LOG=debug cargo run --example terminate
//!
//! # Child and delays from a TOML file
//! cargo run --example terminate -- --config child.toml
//!
//! # Let SIGHUP through to the child
//! cargo run --example terminate -- --no-shield
//! ```

use std::time::Instant;

use lifeline::prelude::*;
use tracing_subscriber::EnvFilter;

const STUBBORN: &str = "trap '' INT TERM; echo ready; exec sleep 60";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|a| a == "--help" || a == "-h") {
        println!("Usage: terminate [--config FILE] [--no-shield]");
        println!();
        println!("Options:");
        println!("  --config FILE  Spawn configuration in TOML");
        println!("  --no-shield    Do not ignore SIGHUP in the child");
        println!("  --help         Show this help");
        return Ok(());
    }

    let config_path = args
        .iter()
        .position(|a| a == "--config")
        .and_then(|i| args.get(i + 1));
    let mut config = match config_path {
        Some(path) => SpawnConfig::load(path)?,
        None => SpawnConfig::new("sh")
            .args(["-c", STUBBORN])
            .stdio(StdioMode::Inherit),
    };
    if args.iter().any(|a| a == "--no-shield") {
        config = config.ignore_hangup(false);
    }

    let escalation = config.controller.escalation;
    tracing::info!(
        program = %config.program.display(),
        args = ?config.args,
        worst_case = ?escalation.worst_case_latency(config.controller.ignore_hangup),
        "spawning demo child"
    );
    let mut child = ProcessHandle::spawn(&config)?;
    std::thread::sleep(escalation.delay_after_signal);

    let start = Instant::now();
    let soft = child.terminate(false)?;
    tracing::info!(terminated = soft, elapsed = ?start.elapsed(), "soft termination");

    if !soft {
        let forced = child.terminate(true)?;
        tracing::info!(terminated = forced, elapsed = ?start.elapsed(), "forced termination");
    }

    tracing::info!(pid = child.pid(), status = %child.status(), "done");
    Ok(())
}
