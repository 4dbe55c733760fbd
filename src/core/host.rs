//! Host: the "process" around a session
//!
//! A full restart discards the whole session and builds a fresh one. Only
//! the restart counter survives, because it belongs to the host.

use tracing::info;

use crate::config::Timings;
use crate::core::session::Session;
use crate::types::Notice;

#[derive(Debug)]
pub struct Host {
    timings: Timings,
    seed: Option<u64>,
    session: Session,
    restarts: u64,
}

impl Host {
    pub fn new(timings: Timings) -> Self {
        Self {
            timings,
            seed: None,
            session: Session::new(timings),
            restarts: 0,
        }
    }

    /// Host whose sessions use a reproducible progress ramp
    pub fn seeded(timings: Timings, seed: u64) -> Self {
        Self {
            timings,
            seed: Some(seed),
            session: Session::seeded(timings, seed),
            restarts: 0,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Number of full restarts performed
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Advance the session, restarting it if it asks for a restart
    pub fn advance(&mut self, ms: u64) -> Vec<Notice> {
        let notices = self.session.advance(ms);
        if notices.contains(&Notice::RestartRequested) {
            self.restart();
        }
        notices
    }

    /// Discard all in-memory state and boot a fresh session
    pub fn restart(&mut self) {
        self.restarts += 1;
        self.session = match self.seed {
            Some(seed) => Session::seeded(self.timings, seed.wrapping_add(self.restarts)),
            None => Session::new(self.timings),
        };
        info!(restarts = self.restarts, "session restarted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Mode, VerificationStatus};

    #[test]
    fn test_restart_resets_everything() {
        let mut host = Host::seeded(Timings::default(), 1);
        host.session_mut().unlock();
        host.session_mut().begin_transition();
        host.advance(7000);
        assert_eq!(host.session().mode(), Mode::Elevated);

        host.session_mut().start_verification();
        // 100 ticks max to fail, 5 countdown ticks, restart delay
        host.advance(50 * 100 + 5 * 1000 + 500);

        assert_eq!(host.restarts(), 1);
        let s = host.session();
        assert_eq!(s.mode(), Mode::Normal);
        assert_eq!(s.now_ms(), 0);
        assert!(!s.authorization().terminal_authorized);
        assert_eq!(s.verification().status, VerificationStatus::Idle);
        assert_eq!(s.pending_timers(), 0);
    }
}
