//! Escalating termination against real processes.

use std::time::{Duration, Instant};

use lifeline_core::{ProcessHandle, ProcessStatus, Signal};
use lifeline_test::{Session, fixtures};

use super::init_tracing;

/// A child with default dispositions dies on SIGINT.
#[test]
fn interruptible_child_dies_on_int() {
    init_tracing();
    let mut session = Session::spawn(fixtures::interruptible()).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    let handle = session.handle_mut();
    assert!(handle.terminate(false).unwrap());
    assert!(!handle.is_alive().unwrap());
    assert_eq!(handle.status(), ProcessStatus::Signaled(Signal::Int));
}

/// Force is only a fallback: a child that dies on SIGINT never sees SIGKILL.
#[test]
fn force_not_needed_for_interruptible_child() {
    let mut session = Session::spawn(fixtures::interruptible()).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    let handle = session.handle_mut();
    assert!(handle.terminate(true).unwrap());
    assert_eq!(handle.signal_status(), Some(Signal::Int));
    assert_eq!(handle.exit_status(), None);
}

#[test]
fn shielded_child_ignoring_int_term_needs_force() {
    let mut session = Session::spawn(fixtures::ignores_int_term().ignore_hangup(true)).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    // Shielded from HUP and ignoring INT and TERM: soft escalation fails.
    let handle = session.handle_mut();
    assert!(!handle.terminate(false).unwrap());
    assert!(handle.is_alive().unwrap());
    assert!(handle.terminate(true).unwrap());
    assert_eq!(handle.signal_status(), Some(Signal::Kill));
}

/// With the shield off, SIGHUP finishes a child that ignores INT and TERM.
#[test]
fn unshielded_child_dies_on_hup() {
    init_tracing();
    let mut session = Session::spawn(fixtures::ignores_int_term().ignore_hangup(false)).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    let handle = session.handle_mut();
    assert!(handle.terminate(false).unwrap());
    assert_eq!(handle.signal_status(), Some(Signal::Hup));
    assert_eq!(handle.exit_status(), None);
}

/// Ignoring INT, TERM and HUP: soft termination fails, force succeeds.
#[test]
fn stubborn_child_needs_force() {
    init_tracing();
    let mut session = Session::spawn(fixtures::stubborn().ignore_hangup(false)).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    let handle = session.handle_mut();
    assert!(!handle.terminate(false).unwrap());
    assert!(handle.is_alive().unwrap());
    assert_eq!(handle.status(), ProcessStatus::Unknown);

    assert!(handle.terminate(true).unwrap());
    assert!(!handle.is_alive().unwrap());
    assert_eq!(handle.signal_status(), Some(Signal::Kill));
}

/// Soft termination sleeps one delay per soft signal, nothing more.
#[test]
fn soft_termination_is_bounded() {
    let mut config = fixtures::stubborn();
    config.controller.escalation.delay_after_signal = Duration::from_millis(50);
    let mut session = Session::spawn(config).unwrap();
    session.expect_line(fixtures::READY).unwrap();

    let handle = session.handle_mut();
    let start = Instant::now();
    assert!(!handle.terminate(false).unwrap());
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(100), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(2), "{elapsed:?}");
    assert!(handle.terminate(true).unwrap());
}

#[test]
fn terminate_dead_child_is_immediate() {
    let mut handle = ProcessHandle::spawn(&fixtures::exit_with(5)).unwrap();
    handle.wait().unwrap();

    let start = Instant::now();
    assert!(handle.terminate(true).unwrap());
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(handle.exit_status(), Some(5));
}

/// close on a stubborn child reports the failure unless forced.
#[test]
fn close_stubborn_child() {
    let mut session = Session::spawn(fixtures::stubborn()).unwrap();
    session.expect_line(fixtures::READY).unwrap();
    let mut handle = session.into_handle();

    let err = handle.close(false).unwrap_err();
    assert!(err.to_string().contains("could not terminate process"));
    handle.close(true).unwrap();
    assert_eq!(handle.signal_status(), Some(Signal::Kill));
}
