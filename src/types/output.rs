//! Output structures for terminal display and the API

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::types::{
    AuthorizationState, GateDecision, Mode, PanelState, TransitionPhase, VerificationStatus,
    VerificationView,
};

/// Something observable that happened while timers fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// Mode store flipped to ELEVATED
    ModeElevated,
    /// Transition overlay finished
    TransitionFinished,
    /// Progress meter moved
    Progress { progress: u32 },
    /// Progress reached 100, intrusion detected
    VerificationFailed,
    /// Countdown display changed
    Countdown { remaining: u32 },
    /// Full restart of the running application
    RestartRequested,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::ModeElevated => write!(f, "MODE -> ELEVATED"),
            Notice::TransitionFinished => write!(f, "TRANSITION FINISHED"),
            Notice::Progress { progress } => write!(f, "VERIFYING {:>3}%", progress),
            Notice::VerificationFailed => write!(f, "INTRUSION DETECTED"),
            Notice::Countdown { remaining } => write!(f, "RESTART IN {}", remaining),
            Notice::RestartRequested => write!(f, "SYSTEM RESTART"),
        }
    }
}

/// Full state of a session at one instant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Wall-clock timestamp
    pub timestamp: DateTime<Utc>,
    /// Virtual clock (milliseconds since session start)
    pub now_ms: u64,
    pub mode: Mode,
    pub transition: TransitionPhase,
    pub transitioning: bool,
    /// Virtual ms into the running transition
    pub transition_elapsed_ms: Option<u64>,
    pub authorization: AuthorizationState,
    pub gate: GateDecision,
    pub panel: PanelState,
    pub verification: VerificationView,
    pub pending_timers: usize,
}

impl SessionSnapshot {
    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.mode.color_code();
        let reset = Mode::color_reset();

        format!(
            "{}{} mode={} | transition={} | {} | panel={} | {}verify={} {}%{}{}",
            color,
            self.mode.glyph(),
            self.mode,
            self.transition,
            self.gate.label(),
            if self.panel.open { "OPEN" } else { "CLOSED" },
            self.verification.status.color_code(),
            self.verification.status,
            self.verification.progress,
            self.countdown_suffix(),
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "t={}ms | mode={} | transition={} | status={} | access={} | panel={} | verify={} {}%{} | reason={}",
            self.now_ms,
            self.mode,
            self.transition,
            self.gate.status,
            self.gate.access,
            if self.panel.open { "open" } else { "closed" },
            self.verification.status,
            self.verification.progress,
            self.countdown_suffix(),
            self.gate.reason.code()
        )
    }

    fn countdown_suffix(&self) -> String {
        if self.verification.status == VerificationStatus::Failed {
            format!(" (restart in {})", self.verification.countdown)
        } else {
            String::new()
        }
    }
}
