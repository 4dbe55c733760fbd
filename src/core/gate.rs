//! Access Gate: mode-dependent two-factor predicate over the vault panel
//!
//! - NORMAL:   granted = panel_unlocked
//! - ELEVATED: granted = terminal_authorized AND panel_unlocked

use tokio::sync::watch;
use tracing::{debug, info};

use crate::types::{
    AccessLabel, AuthorizationState, GateDecision, GateOutcome, GateStatus, Mode, PanelState,
    PanelTab, ReasonCode,
};

/// Evaluate the gate predicate
pub fn evaluate(mode: Mode, auth: AuthorizationState) -> GateDecision {
    let granted = match mode {
        Mode::Elevated => auth.terminal_authorized && auth.panel_unlocked,
        Mode::Normal => auth.panel_unlocked,
    };

    let reason = match (mode, granted) {
        (Mode::Normal, true) => ReasonCode::V001_GRANTED_UNLOCKED,
        (Mode::Elevated, true) => ReasonCode::V001_GRANTED_REAUTHORIZED,
        (Mode::Elevated, false) if auth.panel_unlocked => ReasonCode::V001_DENIED_REAUTH_REQUIRED,
        (_, false) => ReasonCode::V001_DENIED_LOCKED,
    };

    GateDecision {
        granted,
        status: if granted { GateStatus::Granted } else { GateStatus::Blocked },
        access: if granted { AccessLabel::Granted } else { AccessLabel::Denied },
        reason,
    }
}

/// Authorization flags plus the vault panel they guard
#[derive(Debug)]
pub struct AccessGate {
    auth: watch::Sender<AuthorizationState>,
    panel: PanelState,
}

impl Default for AccessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AccessGate {
    pub fn new() -> Self {
        let (auth, _rx) = watch::channel(AuthorizationState::locked());
        Self {
            auth,
            panel: PanelState::default(),
        }
    }

    pub fn authorization(&self) -> AuthorizationState {
        *self.auth.borrow()
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    /// Terminal unlock callback. Both flags are published in one replacement
    /// so no observer can see `panel_unlocked` without `terminal_authorized`.
    pub fn unlock(&self) {
        self.auth.send_replace(AuthorizationState::unlocked());
        info!("terminal unlock received");
    }

    /// Clear both flags and close the panel (mode entry)
    pub fn reset(&mut self) {
        self.auth.send_replace(AuthorizationState::locked());
        self.panel.open = false;
        debug!("authorization reset");
    }

    pub fn decision(&self, mode: Mode) -> GateDecision {
        evaluate(mode, self.authorization())
    }

    /// Click on the gated element. Denied clicks change nothing.
    pub fn click(&mut self, mode: Mode) -> GateOutcome {
        let decision = self.decision(mode);
        if !decision.granted {
            debug!(%mode, reason = decision.reason.code(), "gate click ignored");
            return GateOutcome::Denied;
        }
        self.panel = PanelState {
            open: true,
            active_tab: PanelTab::default(),
        };
        info!(%mode, reason = decision.reason.code(), "vault panel opened");
        GateOutcome::Opened
    }

    pub fn close_panel(&mut self) {
        self.panel.open = false;
    }

    /// Switch tab. Ignored while the panel is closed.
    pub fn select_tab(&mut self, tab: PanelTab) -> bool {
        if !self.panel.open {
            return false;
        }
        self.panel.active_tab = tab;
        true
    }

    /// Observe authorization changes
    pub fn subscribe(&self) -> watch::Receiver<AuthorizationState> {
        self.auth.subscribe()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(terminal_authorized: bool, panel_unlocked: bool) -> AuthorizationState {
        AuthorizationState {
            terminal_authorized,
            panel_unlocked,
        }
    }

    #[test]
    fn test_truth_table() {
        for mode in [Mode::Normal, Mode::Elevated] {
            for t in [false, true] {
                for p in [false, true] {
                    let expected = match mode {
                        Mode::Elevated => t && p,
                        Mode::Normal => p,
                    };
                    let d = evaluate(mode, auth(t, p));
                    assert_eq!(d.granted, expected, "mode={} t={} p={}", mode, t, p);
                }
            }
        }
    }

    #[test]
    fn test_asymmetry_examples() {
        assert!(!evaluate(Mode::Elevated, auth(true, false)).granted);
        assert!(evaluate(Mode::Normal, auth(false, true)).granted);
        assert!(evaluate(Mode::Elevated, auth(true, true)).granted);
    }

    #[test]
    fn test_labels() {
        let d = evaluate(Mode::Normal, auth(false, false));
        assert_eq!(d.status, GateStatus::Blocked);
        assert_eq!(d.access, AccessLabel::Denied);
        assert_eq!(d.reason, ReasonCode::V001_DENIED_LOCKED);

        let d = evaluate(Mode::Elevated, auth(true, true));
        assert_eq!(d.status, GateStatus::Granted);
        assert_eq!(d.access, AccessLabel::Granted);
        assert_eq!(d.label(), "STATUS: GRANTED | ACCESS: GRANTED");
    }

    #[test]
    fn test_reauth_reason() {
        let d = evaluate(Mode::Elevated, auth(false, true));
        assert_eq!(d.reason, ReasonCode::V001_DENIED_REAUTH_REQUIRED);
    }

    #[test]
    fn test_denied_click_is_noop() {
        let mut gate = AccessGate::new();
        assert_eq!(gate.click(Mode::Normal), GateOutcome::Denied);
        assert!(!gate.panel().open);
    }

    #[test]
    fn test_granted_click_resets_tab() {
        let mut gate = AccessGate::new();
        gate.unlock();
        assert_eq!(gate.click(Mode::Normal), GateOutcome::Opened);
        assert!(gate.select_tab(PanelTab::Logs));
        assert_eq!(gate.panel().active_tab, PanelTab::Logs);

        gate.close_panel();
        assert_eq!(gate.click(Mode::Normal), GateOutcome::Opened);
        assert_eq!(gate.panel().active_tab, PanelTab::Overview);
    }

    #[test]
    fn test_select_tab_needs_open_panel() {
        let mut gate = AccessGate::new();
        assert!(!gate.select_tab(PanelTab::Records));
        assert_eq!(gate.panel().active_tab, PanelTab::Overview);
    }

    #[test]
    fn test_unlock_publishes_both_flags_at_once() {
        let gate = AccessGate::new();
        let mut rx = gate.subscribe();
        gate.unlock();
        assert!(rx.has_changed().unwrap());
        let seen = *rx.borrow_and_update();
        assert_eq!(seen, AuthorizationState::unlocked());
        assert!(seen.is_consistent());
    }

    #[test]
    fn test_reset_clears_and_closes() {
        let mut gate = AccessGate::new();
        gate.unlock();
        gate.click(Mode::Normal);
        gate.reset();
        assert_eq!(gate.authorization(), AuthorizationState::locked());
        assert!(!gate.panel().open);
    }
}
