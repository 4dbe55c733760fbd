//! Verification run definitions

use serde::{Deserialize, Serialize};

/// Status of the security-check mini-process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    /// Not started
    #[default]
    Idle,
    /// Progress meter running
    Checking,
    /// Intrusion detected, countdown to restart
    Failed,
}

impl VerificationStatus {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            VerificationStatus::Idle => "\x1b[90m",     // Gray
            VerificationStatus::Checking => "\x1b[33m", // Yellow
            VerificationStatus::Failed => "\x1b[31m",   // Red
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            VerificationStatus::Idle => "IDLE",
            VerificationStatus::Checking => "CHECKING",
            VerificationStatus::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// Observable view of the verification run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VerificationView {
    pub status: VerificationStatus,
    /// Displayed progress, clamped to 0..=100
    pub progress: u32,
    /// Only meaningful while FAILED
    pub countdown: u32,
}
