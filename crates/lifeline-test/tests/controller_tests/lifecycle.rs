//! Spawn, liveness, wait and reap ownership.

use std::time::{Duration, Instant};

use lifeline_core::{ControllerConfig, ProcessHandle, ProcessStatus, Signal};
use lifeline_test::{Session, TestError, fixtures, wait_until_dead};
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

use super::init_tracing;

/// Exit code N is reported by wait and stays put.
#[test]
fn exit_code_recorded() {
    init_tracing();
    let mut handle = ProcessHandle::spawn(&fixtures::exit_with(3)).unwrap();

    assert_eq!(handle.wait().unwrap(), ProcessStatus::Exited(3));
    assert_eq!(handle.exit_status(), Some(3));
    assert_eq!(handle.signal_status(), None);
    for _ in 0..3 {
        assert!(!handle.is_alive().unwrap());
    }
}

#[test]
fn exit_code_zero_recorded() {
    let mut handle = ProcessHandle::spawn(&fixtures::exit_with(0)).unwrap();
    assert_eq!(handle.wait().unwrap(), ProcessStatus::Exited(0));
    assert_eq!(handle.exit_status(), Some(0));
}

/// A child killed by SIGALRM has no exit code.
#[test]
fn signal_death_recorded() {
    init_tracing();
    let mut handle = ProcessHandle::spawn(&fixtures::self_signal(Signal::Alrm)).unwrap();

    assert_eq!(handle.wait().unwrap(), ProcessStatus::Signaled(Signal::Alrm));
    assert_eq!(handle.exit_status(), None);
    assert_eq!(handle.signal_status(), Some(Signal::Alrm));
    assert!(!handle.is_alive().unwrap());
}

/// wait blocks for the child's lifetime and no longer.
#[test]
fn wait_blocks_until_exit() {
    let mut handle = ProcessHandle::spawn(&fixtures::sleeper(1.0)).unwrap();
    assert!(handle.is_alive().unwrap());

    let start = Instant::now();
    assert_eq!(handle.wait().unwrap(), ProcessStatus::Exited(0));
    let elapsed = start.elapsed();
    assert!(elapsed > Duration::from_millis(900), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(2500), "{elapsed:?}");
}

/// is_alive picks up a death without any blocking call.
#[test]
fn is_alive_observes_exit() {
    let mut handle = ProcessHandle::spawn(&fixtures::exit_with(4)).unwrap();
    let status = wait_until_dead(&mut handle, Duration::from_secs(5)).unwrap();
    assert_eq!(status, ProcessStatus::Exited(4));
    assert!(!handle.is_alive().unwrap());
}

#[test]
fn wait_after_wait_is_ownership_violation() {
    let mut handle = ProcessHandle::spawn(&fixtures::exit_with(0)).unwrap();
    handle.wait().unwrap();

    let err = handle.wait().unwrap_err();
    assert!(err.is_ownership_violation());
    assert_eq!(handle.exit_status(), Some(0));
}

/// Someone else reaping our child is detected, and the cache is untouched.
#[test]
fn external_waitpid_is_detected() {
    init_tracing();
    let mut session = Session::spawn(fixtures::echo("alpha")).unwrap();
    assert_eq!(session.read_line().unwrap(), "alpha");

    let pid = Pid::from_raw(session.handle().pid() as i32);
    let reaped = waitpid(pid, None).unwrap();
    assert!(matches!(reaped, WaitStatus::Exited(_, 0)));

    let handle = session.handle_mut();
    let err = handle.is_alive().unwrap_err();
    assert!(err.is_ownership_violation());
    assert!(
        err.to_string()
            .contains("Did someone else call waitpid() on our process?")
    );
    assert_eq!(handle.status(), ProcessStatus::Unknown);
    assert!(handle.wait().unwrap_err().is_ownership_violation());
}

/// Death seen through end of output counts as observed: wait refuses.
#[test]
fn wait_after_eof_is_ownership_violation() {
    init_tracing();
    let mut session = Session::spawn(fixtures::cat()).unwrap();
    session.send_line(fixtures::READY).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    session.handle_mut().kill(Signal::Kill).unwrap();
    assert!(matches!(
        session.read_line(),
        Err(TestError::UnexpectedEof { .. })
    ));
    assert_eq!(session.handle().signal_status(), Some(Signal::Kill));

    let err = session.handle_mut().wait().unwrap_err();
    assert!(err.is_ownership_violation());
    assert!(!session.handle_mut().is_alive().unwrap());
}

/// A handle can adopt a child that something else forked.
#[test]
fn adopted_child_is_controlled() {
    let child = std::process::Command::new("sleep")
        .arg("30")
        .spawn()
        .unwrap();
    let mut handle = ProcessHandle::adopt(child.id(), ControllerConfig::default());

    assert!(handle.is_alive().unwrap());
    assert!(handle.terminate(false).unwrap());
    assert_eq!(handle.signal_status(), Some(Signal::Int));
}

/// kill is fire-and-forget; the death shows up on the next reap check.
#[test]
fn kill_then_wait() {
    let mut handle = ProcessHandle::spawn(&fixtures::sleeper(30.0)).unwrap();
    handle.kill(Signal::Usr1).unwrap();
    assert_eq!(handle.wait().unwrap(), ProcessStatus::Signaled(Signal::Usr1));

    handle.kill(Signal::Kill).unwrap();
    assert_eq!(handle.signal_status(), Some(Signal::Usr1));
}

#[tokio::test]
async fn wait_async_reports_exit() {
    let mut handle = ProcessHandle::spawn(&fixtures::sleeper(0.2)).unwrap();
    let status = handle
        .wait_async(Duration::from_millis(10))
        .await
        .unwrap();
    assert_eq!(status, ProcessStatus::Exited(0));
}

/// close hangs up the pipes; cat exits on EOF without any signal.
#[test]
fn close_lets_cat_exit_on_eof() {
    let mut config = fixtures::cat();
    config.controller.escalation.delay_after_close = Duration::from_secs(1);
    let mut handle = ProcessHandle::spawn(&config).unwrap();
    handle.close(false).unwrap();
    assert!(!handle.is_alive().unwrap());
    assert_eq!(handle.exit_status(), Some(0));
}

/// Dropping a live handle kills the child.
#[test]
fn drop_terminates_child() {
    let handle = ProcessHandle::spawn(&fixtures::stubborn()).unwrap();
    let pid = Pid::from_raw(handle.pid() as i32);
    drop(handle);

    // The child was reaped by the drop, so there is nothing left to wait for.
    assert_eq!(waitpid(pid, None), Err(nix::errno::Errno::ECHILD));
}
