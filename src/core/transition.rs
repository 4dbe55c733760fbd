//! Transition Sequencer: the NORMAL → ELEVATED overlay
//!
//! State transitions:
//! - IDLE → ENTERING: begin requested
//! - ENTERING → EXITING: D1 elapsed, mode flipped
//! - EXITING → IDLE: D2 elapsed, overlay finished
//! - any → IDLE: teardown (pending timers cancelled)

use tracing::{debug, info};

use crate::config::Timings;
use crate::core::scheduler::{Effect, Owner, RunId, TimerEvent};
use crate::types::{Notice, ReasonCode, TransitionPhase};

/// Input to the transition state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    Begin { now_ms: u64 },
    Elevate { run: RunId },
    Finish { run: RunId },
    Teardown,
}

/// Transition run state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransitionState {
    pub phase: TransitionPhase,
    /// Generation of the current (or last) run
    pub run: RunId,
    /// Virtual time the current run began
    pub started_at_ms: Option<u64>,
}

/// Pure transition function: `(state, event) → (state, effects)`
pub fn step(
    state: TransitionState,
    event: TransitionEvent,
    timings: &Timings,
) -> (TransitionState, Vec<Effect>) {
    match (state.phase, event) {
        (TransitionPhase::Idle, TransitionEvent::Begin { now_ms }) => {
            let run = state.run + 1;
            info!(run, reason = ReasonCode::V003_TRANSITION_ENTERING.code(), "transition started");
            (
                TransitionState {
                    phase: TransitionPhase::Entering,
                    run,
                    started_at_ms: Some(now_ms),
                },
                vec![
                    Effect::SetTransitioning(true),
                    Effect::Schedule {
                        delay_ms: timings.elevate_ms,
                        event: TimerEvent::Elevate { run },
                    },
                ],
            )
        }

        (_, TransitionEvent::Begin { .. }) => {
            debug!(
                run = state.run,
                reason = ReasonCode::V003_TRANSITION_BUSY.code(),
                "begin ignored"
            );
            (state, Vec::new())
        }

        (TransitionPhase::Entering, TransitionEvent::Elevate { run }) if run == state.run => {
            info!(run, reason = ReasonCode::V003_TRANSITION_EXITING.code(), "transition exiting");
            (
                TransitionState {
                    phase: TransitionPhase::Exiting,
                    ..state
                },
                vec![
                    Effect::EnterElevated,
                    Effect::Schedule {
                        delay_ms: timings.exit_ms,
                        event: TimerEvent::FinishTransition { run },
                    },
                ],
            )
        }

        (TransitionPhase::Exiting, TransitionEvent::Finish { run }) if run == state.run => {
            info!(run, reason = ReasonCode::V003_TRANSITION_FINISHED.code(), "transition finished");
            (
                TransitionState {
                    phase: TransitionPhase::Idle,
                    run,
                    started_at_ms: None,
                },
                vec![
                    Effect::SetTransitioning(false),
                    Effect::Notify(Notice::TransitionFinished),
                ],
            )
        }

        (_, TransitionEvent::Elevate { run }) | (_, TransitionEvent::Finish { run }) => {
            debug!(
                run,
                current = state.run,
                reason = ReasonCode::V005_STALE_TIMER.code(),
                "transition timer ignored"
            );
            (state, Vec::new())
        }

        (_, TransitionEvent::Teardown) => {
            if state.phase.is_active() {
                debug!(run = state.run, reason = ReasonCode::V005_TEARDOWN.code(), "transition torn down");
            }
            (
                TransitionState {
                    phase: TransitionPhase::Idle,
                    run: state.run,
                    started_at_ms: None,
                },
                vec![
                    Effect::CancelOwner(Owner::Transition),
                    Effect::SetTransitioning(false),
                ],
            )
        }
    }
}

/// Owns the transition state for one session
#[derive(Debug)]
pub struct TransitionSequencer {
    state: TransitionState,
    timings: Timings,
}

impl TransitionSequencer {
    pub fn new(timings: Timings) -> Self {
        Self {
            state: TransitionState::default(),
            timings,
        }
    }

    /// Feed one event, returning the effects to apply
    pub fn handle(&mut self, event: TransitionEvent) -> Vec<Effect> {
        let (next, effects) = step(self.state, event, &self.timings);
        self.state = next;
        effects
    }

    /// Route a fired timer
    pub fn on_timer(&mut self, timer: TimerEvent) -> Vec<Effect> {
        match timer {
            TimerEvent::Elevate { run } => self.handle(TransitionEvent::Elevate { run }),
            TimerEvent::FinishTransition { run } => self.handle(TransitionEvent::Finish { run }),
            _ => Vec::new(),
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.state.phase
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Time since the current run began
    pub fn elapsed_ms(&self, now_ms: u64) -> Option<u64> {
        self.state.started_at_ms.map(|s| now_ms.saturating_sub(s))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn timings() -> Timings {
        Timings::default()
    }

    #[test]
    fn test_begin_schedules_elevate() {
        let (next, effects) = step(
            TransitionState::default(),
            TransitionEvent::Begin { now_ms: 0 },
            &timings(),
        );
        assert_eq!(next.phase, TransitionPhase::Entering);
        assert_eq!(next.run, 1);
        assert_eq!(
            effects,
            vec![
                Effect::SetTransitioning(true),
                Effect::Schedule {
                    delay_ms: 5000,
                    event: TimerEvent::Elevate { run: 1 }
                },
            ]
        );
    }

    #[test]
    fn test_begin_while_running_is_ignored() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 0 });
        let effects = seq.handle(TransitionEvent::Begin { now_ms: 10 });
        assert!(effects.is_empty());
        assert_eq!(seq.state().run, 1);
    }

    #[test]
    fn test_full_run_phases() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 0 });

        let effects = seq.on_timer(TimerEvent::Elevate { run: 1 });
        assert_eq!(seq.phase(), TransitionPhase::Exiting);
        assert_eq!(effects[0], Effect::EnterElevated);

        let effects = seq.on_timer(TimerEvent::FinishTransition { run: 1 });
        assert_eq!(seq.phase(), TransitionPhase::Idle);
        assert!(effects.contains(&Effect::Notify(Notice::TransitionFinished)));
    }

    #[test]
    fn test_stale_timer_ignored() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 0 });
        seq.handle(TransitionEvent::Teardown);
        seq.handle(TransitionEvent::Begin { now_ms: 100 });

        // Timer from run 1 arrives during run 2
        let effects = seq.on_timer(TimerEvent::Elevate { run: 1 });
        assert!(effects.is_empty());
        assert_eq!(seq.phase(), TransitionPhase::Entering);
    }

    #[test]
    fn test_finish_before_elevate_ignored() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 0 });
        let effects = seq.on_timer(TimerEvent::FinishTransition { run: 1 });
        assert!(effects.is_empty());
        assert_eq!(seq.phase(), TransitionPhase::Entering);
    }

    #[test]
    fn test_teardown_cancels_owner() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 0 });
        let effects = seq.handle(TransitionEvent::Teardown);
        assert!(effects.contains(&Effect::CancelOwner(Owner::Transition)));
        assert_eq!(seq.phase(), TransitionPhase::Idle);
        assert_eq!(seq.elapsed_ms(100), None);
    }

    #[test]
    fn test_elapsed() {
        let mut seq = TransitionSequencer::new(timings());
        seq.handle(TransitionEvent::Begin { now_ms: 1000 });
        assert_eq!(seq.elapsed_ms(3500), Some(2500));
    }
}
