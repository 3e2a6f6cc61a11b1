//! Deadline-ordered queue of delayed session effects.
//!
//! Effects due at the same instant fire in the order they were scheduled.
//! Individual entries cannot be cancelled; [`TimerQueue::clear`] drops
//! everything on session teardown.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use chrono::{DateTime, Utc};

use dominion_types::{AgentId, EventId, PlayerId, TerritoryId};

/// A follow-up action the session performs when its deadline passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Move a deploying agent to active.
    CompleteDeployment(AgentId),
    /// Remove a recalling agent.
    CompleteRecall(AgentId),
    /// Let a rival challenge a freshly claimed territory.
    RivalContest {
        /// The territory claimed.
        territory: TerritoryId,
        /// The player who claimed it.
        claimant: PlayerId,
    },
    /// One synthetic rival action; re-arms itself.
    WorldTick,
    /// Close an unanswered trade offer.
    ExpireTrade(EventId),
}

#[derive(Debug, Clone)]
struct Entry {
    due: DateTime<Utc>,
    seq: u64,
    effect: Effect,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due
            .cmp(&other.due)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-heap of scheduled effects keyed by `(due, insertion order)`.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `effect` to fire at `due`.
    pub fn schedule(&mut self, due: DateTime<Utc>, effect: Effect) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.heap.push(Reverse(Entry { due, seq, effect }));
    }

    /// Earliest deadline in the queue.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.heap.peek().map(|Reverse(e)| e.due)
    }

    /// Pop the earliest effect if it is due at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, Effect)> {
        if self.next_due()? > now {
            return None;
        }
        self.heap.pop().map(|Reverse(e)| (e.due, e.effect))
    }

    /// Number of scheduled effects.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every scheduled effect, returning how many were cancelled.
    pub fn clear(&mut self) -> usize {
        let cancelled = self.heap.len();
        self.heap.clear();
        cancelled
    }
}
