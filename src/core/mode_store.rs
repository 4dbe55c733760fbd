//! Mode Store: the session's current mode, observed reactively
//!
//! The mode lives in a `watch` channel so any number of consumers can
//! subscribe and re-evaluate on change. Elevation is one-way.

use tokio::sync::watch;
use tracing::{debug, info};

use crate::types::{Mode, ReasonCode};

#[derive(Debug)]
pub struct ModeStore {
    tx: watch::Sender<Mode>,
    /// Transition overlay currently playing
    transitioning: bool,
}

impl Default for ModeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeStore {
    /// Create store in NORMAL mode
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Mode::Normal);
        Self {
            tx,
            transitioning: false,
        }
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        *self.tx.borrow()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub(crate) fn set_transitioning(&mut self, playing: bool) {
        self.transitioning = playing;
    }

    /// Enter ELEVATED. Returns true only if the mode actually changed;
    /// observers are notified exactly once.
    pub fn enter_elevated(&self) -> bool {
        let changed = self.tx.send_if_modified(|mode| {
            if *mode == Mode::Normal {
                *mode = Mode::Elevated;
                true
            } else {
                false
            }
        });
        if changed {
            info!(reason = ReasonCode::V002_MODE_ELEVATED.code(), "mode changed");
        } else {
            debug!(reason = ReasonCode::V002_MODE_UNCHANGED.code(), "already elevated");
        }
        changed
    }

    /// Observe mode changes
    pub fn subscribe(&self) -> watch::Receiver<Mode> {
        self.tx.subscribe()
    }
}
