//! Scheduler: one virtual-time timer queue per session
//!
//! Every delayed step of every sequencer is a timer here. Timers fire in
//! (due time, insertion order) and the clock jumps to each due time as it
//! fires, so the same script always produces the same timeline.

use std::collections::{BTreeMap, HashMap};
use tracing::trace;

use crate::types::Notice;

/// Handle for one scheduled timer
pub type TimerId = u64;

/// Generation counter of one sequencer run
pub type RunId = u64;

/// Sequencer that owns a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Transition,
    Verification,
}

/// Payload delivered when a timer fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// D1 elapsed: flip the mode
    Elevate { run: RunId },
    /// D2 elapsed: hide the overlay
    FinishTransition { run: RunId },
    /// Progress meter step
    ProgressTick { run: RunId },
    /// Countdown step
    CountdownTick { run: RunId },
    /// Countdown finished, restart delay elapsed
    Restart { run: RunId },
}

impl TimerEvent {
    pub fn owner(&self) -> Owner {
        match self {
            TimerEvent::Elevate { .. } | TimerEvent::FinishTransition { .. } => Owner::Transition,
            TimerEvent::ProgressTick { .. }
            | TimerEvent::CountdownTick { .. }
            | TimerEvent::Restart { .. } => Owner::Verification,
        }
    }

    pub fn run(&self) -> RunId {
        match *self {
            TimerEvent::Elevate { run }
            | TimerEvent::FinishTransition { run }
            | TimerEvent::ProgressTick { run }
            | TimerEvent::CountdownTick { run }
            | TimerEvent::Restart { run } => run,
        }
    }
}

/// Side effect requested by a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Schedule a timer relative to the current virtual time
    Schedule { delay_ms: u64, event: TimerEvent },
    /// Cancel every pending timer of one sequencer
    CancelOwner(Owner),
    /// Ask the mode store to enter ELEVATED
    EnterElevated,
    /// Toggle the mode store's "transition playing" flag
    SetTransitioning(bool),
    /// Surface a notice to the host
    Notify(Notice),
}

/// Virtual-time timer queue
#[derive(Debug, Default)]
pub struct Scheduler {
    now_ms: u64,
    next_id: TimerId,
    /// Ordered by due time, then by id (insertion order)
    queue: BTreeMap<(u64, TimerId), TimerEvent>,
    /// Timer id → due time
    index: HashMap<TimerId, u64>,
}

impl Scheduler {
    /// Create a scheduler with the clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Schedule `event` to fire `delay_ms` from now
    pub fn schedule(&mut self, delay_ms: u64, event: TimerEvent) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        let due = self.now_ms.saturating_add(delay_ms);
        self.queue.insert((due, id), event);
        self.index.insert(id, due);
        trace!(id, due, ?event, "timer scheduled");
        id
    }

    /// Cancel one timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.index.remove(&id) {
            Some(due) => self.queue.remove(&(due, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer owned by `owner`, returning how many
    pub fn cancel_owner(&mut self, owner: Owner) -> usize {
        let doomed: Vec<(u64, TimerId)> = self
            .queue
            .iter()
            .filter(|(_, event)| event.owner() == owner)
            .map(|(key, _)| *key)
            .collect();
        for key in &doomed {
            self.queue.remove(key);
            self.index.remove(&key.1);
        }
        doomed.len()
    }

    /// Pop the next timer due at or before `until_ms`, moving the clock to
    /// its due time
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerEvent> {
        let (&(due, id), _) = self.queue.iter().next()?;
        if due > until_ms {
            return None;
        }
        let event = self.queue.remove(&(due, id))?;
        self.index.remove(&id);
        self.now_ms = self.now_ms.max(due);
        Some(event)
    }

    /// Move the clock forward without firing anything. Never moves backwards.
    pub fn advance_to(&mut self, until_ms: u64) {
        self.now_ms = self.now_ms.max(until_ms);
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Number of pending timers owned by `owner`
    pub fn pending_for(&self, owner: Owner) -> usize {
        self.queue.values().filter(|e| e.owner() == owner).count()
    }

    /// Due time of the earliest pending timer
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }
}

// =============================================================================
// TESTS
// =============================================================================
