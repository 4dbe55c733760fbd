//! Integration tests for the access gate
//!
//! Tests the gate contract through a full session:
//! - mode-dependent predicate (NORMAL needs unlock, ELEVATED needs both flags)
//! - unlock publishes both flags together
//! - elevation clears authorization

use pretty_assertions::assert_eq;
use vaultgate::core::{evaluate, Session};
use vaultgate::types::{
    AccessLabel, AuthorizationState, GateOutcome, GateStatus, Mode, Notice, PanelTab,
};
use vaultgate::Timings;

fn session() -> Session {
    Session::seeded(Timings::default(), 11)
}

/// Drive a session into ELEVATED with the transition fully finished
fn elevated_session() -> Session {
    let mut s = session();
    s.begin_transition();
    s.advance(Timings::default().transition_total_ms());
    assert_eq!(s.mode(), Mode::Elevated);
    s
}

// =============================================================================
// PREDICATE
// =============================================================================

#[test]
fn test_gate_matches_formula_for_all_inputs() {
    let cases = [
        (Mode::Normal, false, false, false),
        (Mode::Normal, false, true, true),
        (Mode::Normal, true, false, false),
        (Mode::Normal, true, true, true),
        (Mode::Elevated, false, false, false),
        (Mode::Elevated, false, true, false),
        (Mode::Elevated, true, false, false),
        (Mode::Elevated, true, true, true),
    ];

    for (mode, terminal_authorized, panel_unlocked, expected) in cases {
        let decision = evaluate(
            mode,
            AuthorizationState {
                terminal_authorized,
                panel_unlocked,
            },
        );
        assert_eq!(
            decision.granted, expected,
            "mode={} terminal={} panel={}",
            mode, terminal_authorized, panel_unlocked
        );
        let expected_status = if expected { GateStatus::Granted } else { GateStatus::Blocked };
        let expected_access = if expected { AccessLabel::Granted } else { AccessLabel::Denied };
        assert_eq!(decision.status, expected_status);
        assert_eq!(decision.access, expected_access);
    }
}

// =============================================================================
// SESSION FLOW
// =============================================================================

#[test]
fn test_normal_mode_unlock_opens_vault() {
    let mut s = session();

    assert_eq!(s.click_gate(), GateOutcome::Denied);
    assert!(!s.panel().open);

    s.unlock();
    assert!(s.gate().granted);
    assert_eq!(s.click_gate(), GateOutcome::Opened);
    assert!(s.panel().open);
    assert_eq!(s.panel().active_tab, PanelTab::Overview);
}

#[test]
fn test_elevated_mode_requires_reauthorization() {
    let mut s = session();
    s.unlock();
    s.begin_transition();
    let notices = s.advance(Timings::default().transition_total_ms());
    assert!(notices.contains(&Notice::ModeElevated));

    // Flags were reset on entry, the old unlock no longer counts
    assert_eq!(s.authorization(), AuthorizationState::locked());
    assert_eq!(s.click_gate(), GateOutcome::Denied);

    s.unlock();
    assert_eq!(s.click_gate(), GateOutcome::Opened);
}

#[test]
fn test_denied_click_changes_nothing() {
    let mut s = elevated_session();
    let before = s.snapshot();

    assert_eq!(s.click_gate(), GateOutcome::Denied);

    let after = s.snapshot();
    assert_eq!(before.panel, after.panel);
    assert_eq!(before.authorization, after.authorization);
    assert_eq!(before.pending_timers, after.pending_timers);
}

#[test]
fn test_open_resets_tab() {
    let mut s = session();
    s.unlock();
    s.click_gate();
    assert!(s.select_tab(PanelTab::Records));

    s.close_panel();
    assert!(!s.select_tab(PanelTab::Logs));

    s.click_gate();
    assert_eq!(s.panel().active_tab, PanelTab::Overview);
}

// =============================================================================
// ORDERING
// =============================================================================

#[test]
fn test_unlock_never_observed_half_applied() {
    let mut s = session();
    let mut rx = s.subscribe_authorization();

    s.unlock();

    assert!(rx.has_changed().unwrap());
    let seen = *rx.borrow_and_update();
    assert!(seen.terminal_authorized);
    assert!(seen.panel_unlocked);
    assert!(seen.is_consistent());
}

#[test]
fn test_elevation_reset_observed_as_single_change() {
    let mut s = session();
    s.unlock();
    let mut rx = s.subscribe_authorization();

    s.begin_transition();
    s.advance(5000);

    assert!(rx.has_changed().unwrap());
    assert_eq!(*rx.borrow_and_update(), AuthorizationState::locked());
}
