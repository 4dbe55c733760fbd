//! Timing configuration
//!
//! Defaults come from the constants in `lib.rs`. A JSON file may override
//! any subset of fields.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::VaultError;
use crate::{
    COUNTDOWN_START, COUNTDOWN_TICK_MS, PROGRESS_TICK_MS, RESTART_DELAY_MS,
    TRANSITION_ELEVATE_MS, TRANSITION_EXIT_MS,
};

/// All delays used by the sequencers, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// D1: transition start → mode flip
    pub elevate_ms: u64,
    /// D2: mode flip → transition finished
    pub exit_ms: u64,
    pub progress_tick_ms: u64,
    pub countdown_tick_ms: u64,
    pub countdown_start: u32,
    pub restart_delay_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            elevate_ms: TRANSITION_ELEVATE_MS,
            exit_ms: TRANSITION_EXIT_MS,
            progress_tick_ms: PROGRESS_TICK_MS,
            countdown_tick_ms: COUNTDOWN_TICK_MS,
            countdown_start: COUNTDOWN_START,
            restart_delay_ms: RESTART_DELAY_MS,
        }
    }
}

impl Timings {
    /// Load timings from a JSON file, filling missing fields with defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, VaultError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| VaultError::ConfigRead {
            path: path.display().to_string(),
            source,
        })?;
        let timings: Timings =
            serde_json::from_str(&raw).map_err(|source| VaultError::ConfigParse {
                path: path.display().to_string(),
                source,
            })?;
        timings.validate()?;
        Ok(timings)
    }

    /// Reject timings that collapse the progress ramp or the countdown into
    /// a single instant, or that leave no countdown to show
    pub fn validate(&self) -> Result<(), VaultError> {
        if self.progress_tick_ms == 0 {
            return Err(VaultError::InvalidTimings(
                "progress_tick_ms must be > 0".to_string(),
            ));
        }
        if self.countdown_tick_ms == 0 {
            return Err(VaultError::InvalidTimings(
                "countdown_tick_ms must be > 0".to_string(),
            ));
        }
        if self.countdown_start == 0 {
            return Err(VaultError::InvalidTimings(
                "countdown_start must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Total length of one transition run
    pub fn transition_total_ms(&self) -> u64 {
        self.elevate_ms.saturating_add(self.exit_ms)
    }

    /// Upper bound on one verification run, start to restart
    pub fn verification_total_ms(&self) -> u64 {
        let ramp = self.progress_tick_ms.saturating_mul(100);
        let countdown = u64::from(self.countdown_start).saturating_mul(self.countdown_tick_ms);
        ramp.saturating_add(countdown).saturating_add(self.restart_delay_ms)
    }
}
