//! Deferred actions keyed by simulation time
//!
//! Respawns, dash auto-end and the delayed boss spawn are queued here and
//! fired from the tick against the simulation clock. Clearing the queue on
//! reset cancels everything still pending.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::core::types::{Tier, Timestamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAction {
    RespawnNpc { tier: Tier },
    RespawnItem,
    EndDash,
    SpawnBoss,
}

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    at: OrderedFloat<f64>,
    seq: u64,
    action: TimedAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Scheduled {}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest entry; ties pop in insertion order
    fn cmp(&self, other: &Self) -> Ordering {
        other.at.cmp(&self.at).then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Timestamp, action: TimedAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            at: OrderedFloat(at),
            seq,
            action,
        });
    }

    /// Pop the earliest action due at or before `now`
    pub fn pop_due(&mut self, now: Timestamp) -> Option<TimedAction> {
        if self.heap.peek()?.at.0 > now {
            return None;
        }
        self.heap.pop().map(|s| s.action)
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.heap.peek().map(|s| s.at.0)
    }

    pub fn count(&self, action: TimedAction) -> usize {
        self.heap.iter().filter(|s| s.action == action).count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(5.0, TimedAction::RespawnItem);
        timers.schedule(1.0, TimedAction::EndDash);
        timers.schedule(3.0, TimedAction::RespawnNpc { tier: 2 });

        assert_eq!(timers.pop_due(10.0), Some(TimedAction::EndDash));
        assert_eq!(timers.pop_due(10.0), Some(TimedAction::RespawnNpc { tier: 2 }));
        assert_eq!(timers.pop_due(10.0), Some(TimedAction::RespawnItem));
        assert_eq!(timers.pop_due(10.0), None);
    }

    #[test]
    fn test_not_due_stays_queued() {
        let mut timers = TimerQueue::new();
        timers.schedule(2.0, TimedAction::SpawnBoss);
        assert_eq!(timers.pop_due(1.99), None);
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.next_due(), Some(2.0));
        assert_eq!(timers.pop_due(2.0), Some(TimedAction::SpawnBoss));
    }

    #[test]
    fn test_ties_fire_in_schedule_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, TimedAction::RespawnNpc { tier: 0 });
        timers.schedule(1.0, TimedAction::RespawnNpc { tier: 1 });
        timers.schedule(1.0, TimedAction::RespawnNpc { tier: 2 });
        assert_eq!(timers.pop_due(1.0), Some(TimedAction::RespawnNpc { tier: 0 }));
        assert_eq!(timers.pop_due(1.0), Some(TimedAction::RespawnNpc { tier: 1 }));
        assert_eq!(timers.pop_due(1.0), Some(TimedAction::RespawnNpc { tier: 2 }));
    }

    #[test]
    fn test_clear_cancels_pending() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, TimedAction::EndDash);
        timers.schedule(2.0, TimedAction::RespawnItem);
        timers.clear();
        assert!(timers.is_empty());
        assert_eq!(timers.pop_due(100.0), None);
    }

    #[test]
    fn test_count_by_action() {
        let mut timers = TimerQueue::new();
        timers.schedule(1.0, TimedAction::RespawnItem);
        timers.schedule(2.0, TimedAction::RespawnItem);
        timers.schedule(2.0, TimedAction::EndDash);
        assert_eq!(timers.count(TimedAction::RespawnItem), 2);
    }
}
