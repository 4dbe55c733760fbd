//! Integration tests for the security check
//!
//! The check has no success branch: every run ends in INTRUSION DETECTED,
//! a 5 → 0 countdown and a full restart. These tests pin that behavior.

use vaultgate::core::{Host, Owner, Session};
use vaultgate::types::{Mode, Notice, VerificationStatus};
use vaultgate::Timings;

fn session(seed: u64) -> Session {
    Session::seeded(Timings::default(), seed)
}

/// Tick until FAILED, returning the progress values observed after each tick
fn run_to_failure(s: &mut Session) -> Vec<u32> {
    let tick = s.timings().progress_tick_ms;
    let mut observed = Vec::new();
    for _ in 0..200 {
        s.advance(tick);
        observed.push(s.verification().progress);
        if s.verification().status == VerificationStatus::Failed {
            break;
        }
    }
    observed
}

fn count_restarts(notices: &[Notice]) -> usize {
    notices.iter().filter(|n| **n == Notice::RestartRequested).count()
}

// =============================================================================
// PROGRESS
// =============================================================================

#[test]
fn test_progress_monotonic_and_bounded() {
    for seed in 0..20 {
        let mut s = session(seed);
        s.start_verification();
        assert_eq!(s.verification().status, VerificationStatus::Checking);
        assert_eq!(s.verification().progress, 0);

        let observed = run_to_failure(&mut s);

        assert!(observed.windows(2).all(|w| w[0] <= w[1]), "seed {}: {:?}", seed, observed);
        assert!(observed.len() <= 100, "seed {}: {} ticks", seed, observed.len());
        // Increments are below 3, so at least 34 ticks are needed
        assert!(observed.len() >= 34, "seed {}: {} ticks", seed, observed.len());
        assert_eq!(*observed.last().unwrap(), 100);
        assert_eq!(s.verification().status, VerificationStatus::Failed);
    }
}

#[test]
fn test_progress_notices_never_exceed_100() {
    let mut s = session(3);
    s.start_verification();
    let notices = s.advance(10_000);
    for notice in &notices {
        if let Notice::Progress { progress } = notice {
            assert!(*progress <= 100);
        }
    }
    assert!(notices.contains(&Notice::VerificationFailed));
}

/// The check is authored to always fail. There is deliberately no success
/// branch; a run that ends any other way is a regression.
#[test]
fn test_verification_always_fails() {
    for seed in 0..50 {
        let mut s = session(seed);
        s.start_verification();
        let notices = s.run_until_idle(60_000);
        assert!(notices.contains(&Notice::VerificationFailed), "seed {}", seed);
        assert_eq!(notices.last(), Some(&Notice::RestartRequested), "seed {}", seed);
    }
}

// =============================================================================
// COUNTDOWN
// =============================================================================

#[test]
fn test_countdown_sequence_and_single_restart() {
    let mut s = session(8);
    s.start_verification();
    run_to_failure(&mut s);

    let mut countdown = vec![s.verification().countdown];
    for _ in 0..5 {
        let notices = s.advance(1000);
        assert_eq!(count_restarts(&notices), 0);
        countdown.push(s.verification().countdown);
    }
    assert_eq!(countdown, vec![5, 4, 3, 2, 1, 0]);

    // Restart follows 500ms after zero
    assert_eq!(count_restarts(&s.advance(499)), 0);
    assert_eq!(count_restarts(&s.advance(1)), 1);
    assert_eq!(s.pending_timers(), 0);
}

#[test]
fn test_countdown_notices() {
    let mut s = session(21);
    s.start_verification();
    let notices = s.run_until_idle(60_000);
    let countdown: Vec<u32> = notices
        .iter()
        .filter_map(|n| match n {
            Notice::Countdown { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![5, 4, 3, 2, 1, 0]);
    assert_eq!(count_restarts(&notices), 1);
}

// =============================================================================
// RE-ENTRANCY AND TEARDOWN
// =============================================================================

#[test]
fn test_restart_during_countdown_cancels_prior_restart() {
    let mut s = session(13);
    s.start_verification();
    run_to_failure(&mut s);

    // Countdown at zero, restart armed 500ms out
    s.advance(5000);
    assert_eq!(s.verification().countdown, 0);
    assert_eq!(s.pending_timers_for(Owner::Verification), 1);

    s.start_verification();
    assert_eq!(s.verification().status, VerificationStatus::Checking);
    // Only the new run's first tick remains
    assert_eq!(s.pending_timers_for(Owner::Verification), 1);

    // The old restart instant passes quietly
    let notices = s.advance(500);
    assert_eq!(count_restarts(&notices), 0);

    let notices = s.run_until_idle(60_000);
    assert_eq!(count_restarts(&notices), 1);
}

#[test]
fn test_restart_mid_countdown() {
    let mut s = session(17);
    s.start_verification();
    run_to_failure(&mut s);
    s.advance(2000);
    assert_eq!(s.verification().countdown, 3);

    s.start_verification();
    assert_eq!(s.verification().progress, 0);

    let notices = s.run_until_idle(60_000);
    assert_eq!(count_restarts(&notices), 1);
}

#[test]
fn test_teardown_cancels_everything() {
    let mut s = session(4);
    s.start_verification();
    s.advance(1000);

    s.teardown_verification();
    assert_eq!(s.verification().status, VerificationStatus::Idle);
    assert_eq!(s.pending_timers_for(Owner::Verification), 0);

    let notices = s.advance(60_000);
    assert!(notices.is_empty());
}

#[test]
fn test_verification_does_not_disturb_transition() {
    let mut s = session(9);
    s.begin_transition();
    s.start_verification();
    s.teardown_verification();

    s.advance(7000);
    assert_eq!(s.mode(), Mode::Elevated);
}

// =============================================================================
// RESTART
// =============================================================================

#[test]
fn test_host_restart_boots_fresh_session() {
    let mut host = Host::seeded(Timings::default(), 99);
    host.session_mut().begin_transition();
    host.advance(7000);
    host.session_mut().unlock();
    host.session_mut().click_gate();
    host.session_mut().start_verification();

    let mut restarts_seen = 0;
    for _ in 0..40 {
        let notices = host.advance(500);
        restarts_seen += count_restarts(&notices);
    }

    assert_eq!(restarts_seen, 1);
    assert_eq!(host.restarts(), 1);

    let s = host.session();
    assert_eq!(s.mode(), Mode::Normal);
    assert!(!s.panel().open);
    assert!(!s.authorization().terminal_authorized);
    assert_eq!(s.verification().status, VerificationStatus::Idle);
}

#[test]
fn test_unvalidated_zero_countdown_still_restarts() {
    let timings = Timings {
        countdown_start: 0,
        ..Timings::default()
    };
    let mut s = Session::seeded(timings, 1);
    s.start_verification();

    let notices = s.run_until_idle(600_000);
    assert_eq!(s.verification().status, VerificationStatus::Failed);
    assert_eq!(count_restarts(&notices), 1);
    assert_eq!(notices.last(), Some(&Notice::RestartRequested));
}
