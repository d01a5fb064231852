//! Motion timer set.
//!
//! Pending delayed events are plain records (deadline + event), never
//! closures over engine state. `cancel_all()` drops every pending record and
//! bumps a generation counter so that handles issued earlier can never be
//! mistaken for live timers.

use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Identifies one scheduled event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    id: u64,
    generation: u64,
}

impl TimerHandle {
    /// Generation the handle was issued in.
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
struct PendingTimer<E> {
    id: u64,
    deadline: Instant,
    event: E,
}

/// Collection of pending, cancelable delayed events.
#[derive(Debug, Clone)]
pub struct TimerSet<E> {
    pending: Vec<PendingTimer<E>>,
    generation: u64,
    next_id: u64,
}

impl<E> TimerSet<E> {
    /// Create an empty timer set.
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            generation: 0,
            next_id: 0,
        }
    }

    /// Schedule `event` to fire `delay` after `now`.
    ///
    /// A deadline beyond the range of the monotonic clock can never be
    /// reached: the event is dropped and the returned handle is not live.
    pub fn schedule(&mut self, now: Instant, delay: Duration, event: E) -> TimerHandle {
        let id = self.next_id;
        self.next_id += 1;
        match now.checked_add(delay) {
            Some(deadline) => {
                self.pending.push(PendingTimer {
                    id,
                    deadline,
                    event,
                });
                trace!(id, generation = self.generation, ?delay, "timer scheduled");
            }
            None => warn!(id, ?delay, "timer deadline out of clock range, never fires"),
        }
        TimerHandle {
            id,
            generation: self.generation,
        }
    }

    /// Cancel every pending event. Returns how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        self.generation += 1;
        if cancelled > 0 {
            trace!(cancelled, generation = self.generation, "timers cancelled");
        }
        cancelled
    }

    /// True if `handle` was issued since the last `cancel_all` and has not fired.
    pub fn is_live(&self, handle: TimerHandle) -> bool {
        handle.generation == self.generation && self.pending.iter().any(|t| t.id == handle.id)
    }

    /// Remove and return the earliest event whose deadline is `<= now`,
    /// together with that deadline. Ties fire in scheduling order.
    pub fn pop_due(&mut self, now: Instant) -> Option<(Instant, E)> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.id))
            .map(|(idx, _)| idx)?;
        let timer = self.pending.remove(idx);
        Some((timer.deadline, timer.event))
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|t| t.deadline).min()
    }

    /// Number of pending events.
    #[inline]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True if nothing is pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Current generation (incremented by every `cancel_all`).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of pending events matching `pred`.
    pub fn count_matching(&self, pred: impl Fn(&E) -> bool) -> usize {
        self.pending.iter().filter(|t| pred(&t.event)).count()
    }

    /// Pending events in scheduling order.
    pub fn events(&self) -> impl Iterator<Item = &E> {
        self.pending.iter().map(|t| &t.event)
    }
}

impl<E> Default for TimerSet<E> {
    fn default() -> Self {
        Self::new()
    }
}
