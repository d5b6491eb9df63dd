//! Spawning children under a [`ProcessHandle`].

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use nix::sys::signal::{SigHandler, Signal as NixSignal, signal};

use crate::config::{SpawnConfig, StdioMode};
use crate::error::{ControlError, Result};
use crate::handle::ProcessHandle;
use crate::ops::NixOps;

impl ProcessHandle<NixOps> {
    /// Spawns `config.program` and returns the handle that owns it.
    ///
    /// Signal dispositions are set explicitly before exec. SIGHUP is ignored
    /// when `controller.ignore_hangup` is true and default otherwise; SIGINT
    /// and SIGTERM are always default. The parent's own dispositions never
    /// leak through.
    ///
    /// # Errors
    /// Configuration errors, or a spawn error if the program cannot be run.
    #[allow(clippy::zombie_processes)]
    pub fn spawn(config: &SpawnConfig) -> Result<Self> {
        config.validate()?;

        let mut cmd = Command::new(&config.program);
        cmd.args(&config.args).envs(&config.env);
        if let Some(ref cwd) = config.working_dir {
            cmd.current_dir(cwd);
        }
        cmd.stdin(stdio(config.stdio))
            .stdout(stdio(config.stdio))
            .stderr(stdio(config.stdio));
        set_signal_dispositions(&mut cmd, config.controller.ignore_hangup);

        let mut child = cmd.spawn().map_err(|e| {
            ControlError::spawn(format!("{}: {e}", config.program.display()))
        })?;
        let pid = child.id();

        tracing::info!(
            pid = pid,
            program = %config.program.display(),
            ignore_hangup = config.controller.ignore_hangup,
            "spawned child"
        );

        // `child` is dropped without being waited on; the handle is the only reaper.
        Ok(
            Self::with_ops(pid, config.controller.clone(), NixOps::new()).with_stdio(
                child.stdin.take(),
                child.stdout.take(),
                child.stderr.take(),
            ),
        )
    }
}

fn stdio(mode: StdioMode) -> Stdio {
    match mode {
        StdioMode::Piped => Stdio::piped(),
        StdioMode::Inherit => Stdio::inherit(),
        StdioMode::Null => Stdio::null(),
    }
}

/// Signals the escalator relies on, reset to their default action in the child.
const RESET_TO_DEFAULT: [NixSignal; 2] = [NixSignal::SIGINT, NixSignal::SIGTERM];

#[allow(unsafe_code)]
fn set_signal_dispositions(cmd: &mut Command, ignore_hangup: bool) {
    let hangup = if ignore_hangup {
        SigHandler::SigIgn
    } else {
        SigHandler::SigDfl
    };
    let hook = move || {
        for (sig, handler) in RESET_TO_DEFAULT
            .into_iter()
            .map(|sig| (sig, SigHandler::SigDfl))
            .chain([(NixSignal::SIGHUP, hangup)])
        {
            // SAFETY: installs SIG_IGN or SIG_DFL, never a Rust handler.
            unsafe { signal(sig, handler) }.map_err(std::io::Error::from)?;
        }
        Ok(())
    };
    // SAFETY: the hook runs in the forked child before exec. It only calls
    // sigaction(2), which is async-signal-safe, and touches no shared state.
    unsafe {
        cmd.pre_exec(hook);
    }
}
