//! Pacer: converts real elapsed time into whole virtual milliseconds
//!
//! Sub-millisecond remainders carry over to the next call so the virtual
//! clock never drifts behind real time.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Pacer {
    last: Instant,
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new()
    }
}

impl Pacer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Whole milliseconds elapsed since the previous call
    pub fn elapsed_ms(&mut self) -> u64 {
        let ms = self.last.elapsed().as_millis() as u64;
        self.last += Duration::from_millis(ms);
        ms
    }
}
