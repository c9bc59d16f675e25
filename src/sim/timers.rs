//! Deferred actions
//!
//! Knockback pulses, invulnerability windows, boss rituals and the run-over
//! transition are all "do this later" effects. They are queued here with a
//! due time on the simulation clock and fired by the tick once due. Every
//! action names its target by handle and is re-validated when it fires.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;

use super::registry::Handle;
use crate::presentation::EffectId;

/// Something to do once a delay elapses
#[derive(Debug, Clone, PartialEq)]
pub enum TimedAction {
    /// End a strike's knockback pulse on an actor: clear its velocity and
    /// taking-damage flag
    EndHitRecovery(Handle),
    /// End the shove of an enemy contact on both sides
    EndContactKnockback(Handle),
    /// Close the player's invulnerability window
    EndInvulnerability,
    /// Finish a boss ritual: spawn the boss where the ritual began
    CompleteBossRitual { pos: Vec2, fountain: EffectId },
    /// Play the boss roar cue
    BossRoar,
    /// Player death has played out; move to run-over
    EnterRunOver,
}

#[derive(Debug, Clone)]
struct Scheduled {
    due: f64,
    seq: u64,
    action: TimedAction,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed so the max-heap pops the earliest (due, seq) first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .total_cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Queue of actions ordered by due time, then scheduling order
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `action` to fire `delay` seconds after `now`
    pub fn schedule(&mut self, now: f64, delay: f32, action: TimedAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled {
            due: now + delay as f64,
            seq,
            action,
        });
    }

    /// Pop every action due at `now`, in firing order
    pub fn pop_due(&mut self, now: f64) -> Vec<TimedAction> {
        let mut due = Vec::new();
        // Small tolerance so a delay that is a whole number of ticks fires on
        // that tick despite accumulated float error in the clock
        while self.heap.peek().is_some_and(|s| s.due <= now + 1e-6) {
            if let Some(s) = self.heap.pop() {
                due.push(s.action);
            }
        }
        due
    }

    /// Whether any queued action matches
    pub fn contains(&self, pred: impl Fn(&TimedAction) -> bool) -> bool {
        self.heap.iter().any(|s| pred(&s.action))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop everything (run teardown). Returns the discarded actions.
    pub fn clear(&mut self) -> Vec<TimedAction> {
        self.heap.drain().map(|s| s.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_due_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 1.0, TimedAction::EndInvulnerability);
        q.schedule(0.0, 0.1, TimedAction::BossRoar);
        q.schedule(0.0, 2.0, TimedAction::EnterRunOver);

        assert!(q.pop_due(0.05).is_empty());
        assert_eq!(q.pop_due(0.1), vec![TimedAction::BossRoar]);
        assert_eq!(q.pop_due(1.5), vec![TimedAction::EndInvulnerability]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.pop_due(10.0), vec![TimedAction::EnterRunOver]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_same_due_time_keeps_schedule_order() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, 0.5, TimedAction::EnterRunOver);
        q.schedule(1.0, 0.5, TimedAction::BossRoar);
        assert_eq!(
            q.pop_due(1.5),
            vec![TimedAction::EnterRunOver, TimedAction::BossRoar]
        );
    }

    #[test]
    fn test_tick_accumulated_clock_fires_on_time() {
        let dt = 1.0f32 / 60.0;
        let mut q = TimerQueue::new();
        q.schedule(0.0, 0.1, TimedAction::EndInvulnerability);

        let mut now = 0.0f64;
        let mut fired_at = None;
        for tick in 1..=20 {
            now += dt as f64;
            if !q.pop_due(now).is_empty() {
                fired_at = Some(tick);
                break;
            }
        }
        assert_eq!(fired_at, Some(6));
    }

    #[test]
    fn test_clear_and_contains() {
        let mut q = TimerQueue::new();
        q.schedule(0.0, 2.0, TimedAction::EnterRunOver);
        assert!(q.contains(|a| matches!(a, TimedAction::EnterRunOver)));
        assert!(!q.contains(|a| matches!(a, TimedAction::BossRoar)));
        assert_eq!(q.clear().len(), 1);
        assert!(q.is_empty());
    }
}
