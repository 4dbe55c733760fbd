//! Authorization flags and access gate decisions

use serde::{Deserialize, Serialize};
use crate::types::{Mode, ReasonCode};

/// Flags produced by the terminal collaborator
///
/// Invariant: `panel_unlocked` implies `terminal_authorized`. The only
/// constructors that set flags set both together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationState {
    pub terminal_authorized: bool,
    pub panel_unlocked: bool,
}

impl AuthorizationState {
    /// Both flags cleared (boot and mode entry)
    pub fn locked() -> Self {
        Self::default()
    }

    /// State after the terminal's unlock notification
    pub fn unlocked() -> Self {
        Self {
            terminal_authorized: true,
            panel_unlocked: true,
        }
    }

    /// Ordering invariant holds
    pub fn is_consistent(&self) -> bool {
        !self.panel_unlocked || self.terminal_authorized
    }
}

/// Visible status label on the gated element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GateStatus {
    Granted,
    Blocked,
}

/// Visible access label on the gated element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLabel {
    Granted,
    Denied,
}

impl std::fmt::Display for GateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GateStatus::Granted => "GRANTED",
            GateStatus::Blocked => "BLOCKED",
        })
    }
}

impl std::fmt::Display for AccessLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AccessLabel::Granted => "GRANTED",
            AccessLabel::Denied => "DENIED",
        })
    }
}

/// Result of evaluating the gate predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub granted: bool,
    pub status: GateStatus,
    pub access: AccessLabel,
    pub reason: ReasonCode,
}

impl GateDecision {
    pub fn label(&self) -> String {
        format!("STATUS: {} | ACCESS: {}", self.status, self.access)
    }
}

/// Sub-tabs of the vault panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelTab {
    #[default]
    Overview,
    Records,
    Logs,
}

impl std::str::FromStr for PanelTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "overview" => Ok(PanelTab::Overview),
            "records" => Ok(PanelTab::Records),
            "logs" => Ok(PanelTab::Logs),
            other => Err(format!("unknown tab '{}'", other)),
        }
    }
}

/// Vault panel visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PanelState {
    pub open: bool,
    pub active_tab: PanelTab,
}

/// Outcome of clicking the gated element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateOutcome {
    /// Panel opened, tab reset to default
    Opened,
    /// Click ignored
    Denied,
}
