//! Session: the explicitly-owned state container for one application run
//!
//! Every consumer reads through a `&Session`, every mutation goes through
//! `&mut Session`. All timers live in the session's own scheduler, so a
//! discarded session can never leak a timer into its replacement.

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::config::Timings;
use crate::core::gate::AccessGate;
use crate::core::mode_store::ModeStore;
use crate::core::scheduler::{Effect, Owner, Scheduler};
use crate::core::transition::{TransitionEvent, TransitionSequencer};
use crate::core::verification::{VerificationEvent, VerificationProcess};
use crate::types::{
    AuthorizationState, GateDecision, GateOutcome, Mode, Notice, PanelState, PanelTab,
    SessionSnapshot, TransitionPhase, VerificationView,
};

#[derive(Debug)]
pub struct Session {
    timings: Timings,
    scheduler: Scheduler,
    mode: ModeStore,
    gate: AccessGate,
    transition: TransitionSequencer,
    verification: VerificationProcess,
}

impl Session {
    /// Fresh session with an entropy-seeded progress ramp
    pub fn new(timings: Timings) -> Self {
        Self::build(timings, VerificationProcess::new(timings))
    }

    /// Fresh session with a reproducible progress ramp
    pub fn seeded(timings: Timings, seed: u64) -> Self {
        Self::build(timings, VerificationProcess::seeded(timings, seed))
    }

    fn build(timings: Timings, verification: VerificationProcess) -> Self {
        Self {
            timings,
            scheduler: Scheduler::new(),
            mode: ModeStore::new(),
            gate: AccessGate::new(),
            transition: TransitionSequencer::new(timings),
            verification,
        }
    }

    // =========================================================================
    // Readers
    // =========================================================================

    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn mode(&self) -> Mode {
        self.mode.mode()
    }

    pub fn is_transitioning(&self) -> bool {
        self.mode.is_transitioning()
    }

    pub fn transition_phase(&self) -> TransitionPhase {
        self.transition.phase()
    }

    /// Virtual ms since the running transition began, `None` when idle
    pub fn transition_elapsed_ms(&self) -> Option<u64> {
        self.transition.elapsed_ms(self.now_ms())
    }

    pub fn authorization(&self) -> AuthorizationState {
        self.gate.authorization()
    }

    pub fn gate(&self) -> GateDecision {
        self.gate.decision(self.mode())
    }

    pub fn panel(&self) -> PanelState {
        self.gate.panel()
    }

    pub fn verification(&self) -> VerificationView {
        self.verification.view()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn pending_timers_for(&self, owner: Owner) -> usize {
        self.scheduler.pending_for(owner)
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<Mode> {
        self.mode.subscribe()
    }

    pub fn subscribe_authorization(&self) -> watch::Receiver<AuthorizationState> {
        self.gate.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            timestamp: Utc::now(),
            now_ms: self.now_ms(),
            mode: self.mode(),
            transition: self.transition_phase(),
            transitioning: self.is_transitioning(),
            transition_elapsed_ms: self.transition_elapsed_ms(),
            authorization: self.authorization(),
            gate: self.gate(),
            panel: self.panel(),
            verification: self.verification(),
            pending_timers: self.pending_timers(),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Request the NORMAL → ELEVATED transition
    pub fn begin_transition(&mut self) -> Vec<Notice> {
        let now_ms = self.now_ms();
        let effects = self.transition.handle(TransitionEvent::Begin { now_ms });
        self.apply(effects)
    }

    /// Tear down the transition sequencer, cancelling its pending timers
    pub fn teardown_transition(&mut self) -> Vec<Notice> {
        let effects = self.transition.handle(TransitionEvent::Teardown);
        self.apply(effects)
    }

    /// Terminal collaborator's unlock notification
    pub fn unlock(&mut self) {
        self.gate.unlock();
    }

    /// Click on the gated element
    pub fn click_gate(&mut self) -> GateOutcome {
        let mode = self.mode();
        self.gate.click(mode)
    }

    pub fn close_panel(&mut self) {
        self.gate.close_panel();
    }

    pub fn select_tab(&mut self, tab: PanelTab) -> bool {
        self.gate.select_tab(tab)
    }

    /// Start (or restart) the security check
    pub fn start_verification(&mut self) -> Vec<Notice> {
        let effects = self.verification.handle(VerificationEvent::Start);
        self.apply(effects)
    }

    /// Tear down the verification process, cancelling its pending timers
    pub fn teardown_verification(&mut self) -> Vec<Notice> {
        let effects = self.verification.handle(VerificationEvent::Teardown);
        self.apply(effects)
    }

    /// Move virtual time forward by `ms`, firing due timers in order.
    ///
    /// Stops at the restart instant if a restart is requested: the session
    /// is finished and must be replaced.
    pub fn advance(&mut self, ms: u64) -> Vec<Notice> {
        let until = self.now_ms().saturating_add(ms);
        let mut notices = Vec::new();

        while let Some(timer) = self.scheduler.pop_due(until) {
            let effects = match timer.owner() {
                Owner::Transition => self.transition.on_timer(timer),
                Owner::Verification => self.verification.on_timer(timer),
            };
            notices.extend(self.apply(effects));
            if notices.contains(&Notice::RestartRequested) {
                return notices;
            }
        }

        self.scheduler.advance_to(until);
        notices
    }

    /// Run until no timers remain or a restart is requested, bounded by
    /// `limit_ms` of virtual time
    pub fn run_until_idle(&mut self, limit_ms: u64) -> Vec<Notice> {
        let deadline = self.now_ms().saturating_add(limit_ms);
        let mut notices = Vec::new();
        while let Some(due) = self.scheduler.next_due() {
            if due > deadline {
                break;
            }
            let batch = self.advance(due - self.now_ms());
            let restart = batch.contains(&Notice::RestartRequested);
            notices.extend(batch);
            if restart {
                break;
            }
        }
        notices
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Vec<Notice> {
        let mut notices = Vec::new();
        for effect in effects {
            match effect {
                Effect::Schedule { delay_ms, event } => {
                    self.scheduler.schedule(delay_ms, event);
                }
                Effect::CancelOwner(owner) => {
                    let cancelled = self.scheduler.cancel_owner(owner);
                    if cancelled > 0 {
                        debug!(?owner, cancelled, "timers cancelled");
                    }
                }
                Effect::EnterElevated => {
                    if self.mode.enter_elevated() {
                        self.gate.reset();
                        notices.push(Notice::ModeElevated);
                        info!(now_ms = self.now_ms(), "elevated mode active");
                    }
                }
                Effect::SetTransitioning(playing) => self.mode.set_transitioning(playing),
                Effect::Notify(notice) => notices.push(notice),
            }
        }
        notices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::VerificationStatus;

    fn session() -> Session {
        Session::seeded(Timings::default(), 42)
    }

    #[test]
    fn test_boot_state() {
        let s = session();
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.authorization(), AuthorizationState::locked());
        assert!(!s.gate().granted);
        assert_eq!(s.verification().status, VerificationStatus::Idle);
        assert_eq!(s.pending_timers(), 0);
    }

    #[test]
    fn test_elevation_resets_authorization() {
        let mut s = session();
        s.unlock();
        assert_eq!(s.click_gate(), GateOutcome::Opened);

        s.begin_transition();
        let notices = s.advance(5000);
        assert!(notices.contains(&Notice::ModeElevated));
        assert_eq!(s.authorization(), AuthorizationState::locked());
        assert!(!s.panel().open);
        assert_eq!(s.click_gate(), GateOutcome::Denied);
    }

    #[test]
    fn test_transitioning_flag_follows_overlay() {
        let mut s = session();
        s.begin_transition();
        assert!(s.is_transitioning());
        s.advance(6999);
        assert!(s.is_transitioning());
        s.advance(1);
        assert!(!s.is_transitioning());
    }

    #[test]
    fn test_advance_stops_at_restart() {
        let mut s = session();
        s.start_verification();
        let notices = s.run_until_idle(60_000);
        assert_eq!(notices.last(), Some(&Notice::RestartRequested));
        assert_eq!(
            notices.iter().filter(|n| **n == Notice::RestartRequested).count(),
            1
        );
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut s = session();
        s.unlock();
        let snap = s.snapshot();
        assert!(snap.gate.granted);
        assert_eq!(snap.mode, Mode::Normal);
        assert!(snap.to_parseable_string().contains("status=GRANTED"));
    }
}
