//! Vaultgate: access-gating and mode-transition state machine
//!
//! The terminal catalog hides a vault panel behind a staged authorization
//! flow. This crate holds the only real logic behind the show:
//! mode store → transition sequencer → access gate → verification process,
//! all driven by one virtual-time scheduler.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use config::Timings;
pub use error::VaultError;

// =============================================================================
// TRANSITION TIMINGS [C]
// =============================================================================

/// Delay from transition start until the mode flips to ELEVATED (milliseconds)
pub const TRANSITION_ELEVATE_MS: u64 = 5000;

/// Delay from the mode flip until the transition overlay finishes (milliseconds)
pub const TRANSITION_EXIT_MS: u64 = 2000;

// =============================================================================
// VERIFICATION TIMINGS [C]
// =============================================================================

/// Interval between progress increments while CHECKING (milliseconds)
pub const PROGRESS_TICK_MS: u64 = 50;

/// Smallest progress increment per tick (inclusive)
pub const PROGRESS_STEP_MIN: f64 = 1.0;

/// Largest progress increment per tick (exclusive)
pub const PROGRESS_STEP_MAX: f64 = 3.0;

/// Progress value that forces FAILED
pub const PROGRESS_COMPLETE: f64 = 100.0;

/// Interval between countdown decrements while FAILED (milliseconds)
pub const COUNTDOWN_TICK_MS: u64 = 1000;

/// Countdown start value on entering FAILED
pub const COUNTDOWN_START: u32 = 5;

/// Delay between the countdown hitting zero and the restart (milliseconds)
pub const RESTART_DELAY_MS: u64 = 500;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
