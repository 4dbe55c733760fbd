//! Verification Mini-Process: the fake security check
//!
//! State transitions:
//! - IDLE → CHECKING: user starts the check (any previous run is cancelled)
//! - CHECKING → FAILED: progress reaches 100
//! - FAILED: countdown 5 → 0, then restart after a short delay
//!
//! There is no success branch. The check is scripted to always detect an
//! intrusion.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::core::scheduler::{Effect, Owner, RunId, TimerEvent};
use crate::types::{Notice, ReasonCode, VerificationStatus, VerificationView};
use crate::{PROGRESS_COMPLETE, PROGRESS_STEP_MAX, PROGRESS_STEP_MIN};

/// Input to the verification state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VerificationEvent {
    Start,
    /// Progress tick carrying the already-drawn increment
    ProgressTick { run: RunId, step: f64 },
    CountdownTick { run: RunId },
    Restart { run: RunId },
    Teardown,
}

/// Verification run state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VerificationState {
    pub status: VerificationStatus,
    /// Raw progress, may overshoot 100
    pub progress: f64,
    pub countdown: u32,
    pub run: RunId,
}

impl VerificationState {
    /// Progress as displayed, clamped to 0..=100
    pub fn display_progress(&self) -> u32 {
        self.progress.clamp(0.0, PROGRESS_COMPLETE).floor() as u32
    }

    pub fn view(&self) -> VerificationView {
        VerificationView {
            status: self.status,
            progress: self.display_progress(),
            countdown: self.countdown,
        }
    }
}

/// Pure transition function: `(state, event) → (state, effects)`
pub fn step(
    state: VerificationState,
    event: VerificationEvent,
    timings: &Timings,
) -> (VerificationState, Vec<Effect>) {
    match event {
        VerificationEvent::Start => {
            let run = state.run + 1;
            info!(run, reason = ReasonCode::V004_CHECK_STARTED.code(), "verification started");
            (
                VerificationState {
                    status: VerificationStatus::Checking,
                    progress: 0.0,
                    countdown: timings.countdown_start,
                    run,
                },
                vec![
                    Effect::CancelOwner(Owner::Verification),
                    Effect::Notify(Notice::Progress { progress: 0 }),
                    Effect::Schedule {
                        delay_ms: timings.progress_tick_ms,
                        event: TimerEvent::ProgressTick { run },
                    },
                ],
            )
        }

        VerificationEvent::ProgressTick { run, step }
            if run == state.run && state.status == VerificationStatus::Checking =>
        {
            let progress = state.progress + step.max(PROGRESS_STEP_MIN);
            let next = VerificationState { progress, ..state };

            if progress >= PROGRESS_COMPLETE {
                warn!(run, reason = ReasonCode::V004_INTRUSION_DETECTED.code(), "intrusion detected");
                let failed = VerificationState {
                    status: VerificationStatus::Failed,
                    countdown: timings.countdown_start,
                    ..next
                };
                // An empty countdown arms the restart straight away
                let follow_up = if failed.countdown == 0 {
                    Effect::Schedule {
                        delay_ms: timings.restart_delay_ms,
                        event: TimerEvent::Restart { run },
                    }
                } else {
                    Effect::Schedule {
                        delay_ms: timings.countdown_tick_ms,
                        event: TimerEvent::CountdownTick { run },
                    }
                };
                (
                    failed,
                    vec![
                        Effect::Notify(Notice::Progress {
                            progress: failed.display_progress(),
                        }),
                        Effect::Notify(Notice::VerificationFailed),
                        Effect::Notify(Notice::Countdown {
                            remaining: failed.countdown,
                        }),
                        follow_up,
                    ],
                )
            } else {
                (
                    next,
                    vec![
                        Effect::Notify(Notice::Progress {
                            progress: next.display_progress(),
                        }),
                        Effect::Schedule {
                            delay_ms: timings.progress_tick_ms,
                            event: TimerEvent::ProgressTick { run },
                        },
                    ],
                )
            }
        }

        VerificationEvent::CountdownTick { run }
            if run == state.run
                && state.status == VerificationStatus::Failed
                && state.countdown > 0 =>
        {
            if state.countdown > 1 {
                let countdown = state.countdown - 1;
                debug!(run, countdown, reason = ReasonCode::V004_COUNTDOWN.code(), "countdown");
                (
                    VerificationState { countdown, ..state },
                    vec![
                        Effect::Notify(Notice::Countdown {
                            remaining: countdown,
                        }),
                        Effect::Schedule {
                            delay_ms: timings.countdown_tick_ms,
                            event: TimerEvent::CountdownTick { run },
                        },
                    ],
                )
            } else {
                // Last tick: show zero, stop decrementing, arm the restart
                (
                    VerificationState {
                        countdown: 0,
                        ..state
                    },
                    vec![
                        Effect::Notify(Notice::Countdown { remaining: 0 }),
                        Effect::Schedule {
                            delay_ms: timings.restart_delay_ms,
                            event: TimerEvent::Restart { run },
                        },
                    ],
                )
            }
        }

        VerificationEvent::Restart { run }
            if run == state.run
                && state.status == VerificationStatus::Failed
                && state.countdown == 0 =>
        {
            warn!(run, reason = ReasonCode::V004_RESTART.code(), "restart requested");
            (state, vec![Effect::Notify(Notice::RestartRequested)])
        }

        VerificationEvent::ProgressTick { run, .. }
        | VerificationEvent::CountdownTick { run }
        | VerificationEvent::Restart { run } => {
            debug!(
                run,
                current = state.run,
                reason = ReasonCode::V005_STALE_TIMER.code(),
                "verification timer ignored"
            );
            (state, Vec::new())
        }

        VerificationEvent::Teardown => {
            if state.status != VerificationStatus::Idle {
                debug!(run = state.run, reason = ReasonCode::V005_TEARDOWN.code(), "verification torn down");
            }
            (
                VerificationState {
                    status: VerificationStatus::Idle,
                    progress: 0.0,
                    countdown: 0,
                    run: state.run,
                },
                vec![Effect::CancelOwner(Owner::Verification)],
            )
        }
    }
}

/// Owns the verification state and the RNG driving the progress ramp
#[derive(Debug)]
pub struct VerificationProcess {
    state: VerificationState,
    timings: Timings,
    rng: StdRng,
}

impl VerificationProcess {
    pub fn new(timings: Timings) -> Self {
        Self::with_rng(timings, StdRng::from_entropy())
    }

    /// Deterministic progress ramp
    pub fn seeded(timings: Timings, seed: u64) -> Self {
        Self::with_rng(timings, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(timings: Timings, rng: StdRng) -> Self {
        Self {
            state: VerificationState::default(),
            timings,
            rng,
        }
    }

    pub fn handle(&mut self, event: VerificationEvent) -> Vec<Effect> {
        let (next, effects) = step(self.state, event, &self.timings);
        self.state = next;
        effects
    }

    /// Route a fired timer, drawing the progress increment on ticks
    pub fn on_timer(&mut self, timer: TimerEvent) -> Vec<Effect> {
        let event = match timer {
            TimerEvent::ProgressTick { run } => VerificationEvent::ProgressTick {
                run,
                step: self.rng.gen_range(PROGRESS_STEP_MIN..PROGRESS_STEP_MAX),
            },
            TimerEvent::CountdownTick { run } => VerificationEvent::CountdownTick { run },
            TimerEvent::Restart { run } => VerificationEvent::Restart { run },
            _ => return Vec::new(),
        };
        self.handle(event)
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn view(&self) -> VerificationView {
        self.state.view()
    }
}

// =============================================================================
// TESTS
// =============================================================================
