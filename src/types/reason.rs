//! Reason codes for gate decisions and state changes

use serde::{Deserialize, Serialize};

/// Reason codes for all state changes and decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // V001: Gate
    // =========================================================================
    /// NORMAL mode, panel unlocked
    V001_GRANTED_UNLOCKED,
    /// ELEVATED mode, terminal re-authorized and panel unlocked
    V001_GRANTED_REAUTHORIZED,
    /// Panel not unlocked
    V001_DENIED_LOCKED,
    /// ELEVATED mode without terminal re-authorization
    V001_DENIED_REAUTH_REQUIRED,

    // =========================================================================
    // V002: Mode
    // =========================================================================
    /// Mode flipped to ELEVATED
    V002_MODE_ELEVATED,
    /// Elevation requested while already ELEVATED
    V002_MODE_UNCHANGED,

    // =========================================================================
    // V003: Transition
    // =========================================================================
    /// Transition overlay started
    V003_TRANSITION_ENTERING,
    /// Transition overlay fading out
    V003_TRANSITION_EXITING,
    /// Transition overlay finished
    V003_TRANSITION_FINISHED,
    /// Begin requested while a transition is running
    V003_TRANSITION_BUSY,

    // =========================================================================
    // V004: Verification
    // =========================================================================
    /// Security check started
    V004_CHECK_STARTED,
    /// Progress reached completion, intrusion detected
    V004_INTRUSION_DETECTED,
    /// Countdown to restart running
    V004_COUNTDOWN,
    /// Restart requested
    V004_RESTART,

    // =========================================================================
    // V005: Timers
    // =========================================================================
    /// Timer fired for a superseded run
    V005_STALE_TIMER,
    /// Pending timers cancelled by teardown
    V005_TEARDOWN,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::V001_GRANTED_UNLOCKED => "V001_GRANTED_UNLOCKED",
            Self::V001_GRANTED_REAUTHORIZED => "V001_GRANTED_REAUTHORIZED",
            Self::V001_DENIED_LOCKED => "V001_DENIED_LOCKED",
            Self::V001_DENIED_REAUTH_REQUIRED => "V001_DENIED_REAUTH_REQUIRED",
            Self::V002_MODE_ELEVATED => "V002_MODE_ELEVATED",
            Self::V002_MODE_UNCHANGED => "V002_MODE_UNCHANGED",
            Self::V003_TRANSITION_ENTERING => "V003_TRANSITION_ENTERING",
            Self::V003_TRANSITION_EXITING => "V003_TRANSITION_EXITING",
            Self::V003_TRANSITION_FINISHED => "V003_TRANSITION_FINISHED",
            Self::V003_TRANSITION_BUSY => "V003_TRANSITION_BUSY",
            Self::V004_CHECK_STARTED => "V004_CHECK_STARTED",
            Self::V004_INTRUSION_DETECTED => "V004_INTRUSION_DETECTED",
            Self::V004_COUNTDOWN => "V004_COUNTDOWN",
            Self::V004_RESTART => "V004_RESTART",
            Self::V005_STALE_TIMER => "V005_STALE_TIMER",
            Self::V005_TEARDOWN => "V005_TEARDOWN",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::V001_GRANTED_UNLOCKED => "Vault unlocked",
            Self::V001_GRANTED_REAUTHORIZED => "Vault unlocked with terminal clearance",
            Self::V001_DENIED_LOCKED => "Vault locked",
            Self::V001_DENIED_REAUTH_REQUIRED => "Terminal clearance required",
            Self::V002_MODE_ELEVATED => "Entering ELEVATED mode",
            Self::V002_MODE_UNCHANGED => "Mode unchanged",
            Self::V003_TRANSITION_ENTERING => "Transition started",
            Self::V003_TRANSITION_EXITING => "Transition closing",
            Self::V003_TRANSITION_FINISHED => "Transition finished",
            Self::V003_TRANSITION_BUSY => "Transition already running",
            Self::V004_CHECK_STARTED => "Security check started",
            Self::V004_INTRUSION_DETECTED => "Intrusion detected",
            Self::V004_COUNTDOWN => "System restart pending",
            Self::V004_RESTART => "System restart",
            Self::V005_STALE_TIMER => "Stale timer ignored",
            Self::V005_TEARDOWN => "Pending timers cancelled",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
