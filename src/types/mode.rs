//! Application mode definitions

use serde::{Deserialize, Serialize};

/// The two application modes of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mode {
    /// Boot mode, catalog browsing
    #[default]
    Normal,
    /// Restricted mode, terminal re-authorization required
    Elevated,
}

impl Mode {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            Mode::Normal => "\x1b[32m",   // Green
            Mode::Elevated => "\x1b[31m", // Red
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Mode::Normal => "▢",
            Mode::Elevated => "▣",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Normal => "NORMAL",
            Mode::Elevated => "ELEVATED",
        };
        write!(f, "{}", name)
    }
}

/// Phase of the mode-transition overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionPhase {
    /// No transition playing
    #[default]
    Idle,
    /// Overlay running, mode not yet flipped
    Entering,
    /// Mode flipped, overlay fading out
    Exiting,
}

impl TransitionPhase {
    pub fn is_active(&self) -> bool {
        !matches!(self, TransitionPhase::Idle)
    }
}

impl std::fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TransitionPhase::Idle => "IDLE",
            TransitionPhase::Entering => "ENTERING",
            TransitionPhase::Exiting => "EXITING",
        };
        write!(f, "{}", name)
    }
}
