//! SIGHUP shielding at spawn.

use std::time::Duration;

use lifeline_core::{ProcessStatus, Signal};
use lifeline_test::{Session, fixtures};

use super::init_tracing;

/// Default shielding: `cat` shrugs off SIGHUP and keeps echoing.
#[test]
fn shielded_cat_survives_hangup() {
    init_tracing();
    let mut session = Session::spawn(fixtures::cat()).unwrap();
    assert!(session.handle().ignores_hangup());

    session.send_line("alpha").unwrap();
    assert_eq!(session.read_line().unwrap(), "alpha");

    session.handle_mut().kill(Signal::Hup).unwrap();
    session.assert_alive_for(Duration::from_millis(500)).unwrap();

    session.send_line("beta").unwrap();
    assert_eq!(session.read_line().unwrap(), "beta");
    assert!(session.handle_mut().terminate(false).unwrap());
}

/// Shield off: the child's SIGHUP disposition is the default, so it dies.
#[test]
fn unshielded_cat_dies_on_hangup() {
    let mut session = Session::spawn(fixtures::cat().ignore_hangup(false)).unwrap();
    session.send_line("alpha").unwrap();
    assert_eq!(session.read_line().unwrap(), "alpha");

    session.handle_mut().kill(Signal::Hup).unwrap();
    let status = session.wait_until_dead(Duration::from_secs(5)).unwrap();
    assert_eq!(status, ProcessStatus::Signaled(Signal::Hup));
}
