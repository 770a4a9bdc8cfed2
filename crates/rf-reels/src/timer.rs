//! Cancellable one-shot timers
//!
//! Timers are keyed by [`TimerId`] and fire in deadline order when the owner
//! advances its clock. Cancelling a timer drops its payload unexecuted.

// ═══════════════════════════════════════════════════════════════════════════════
// TIMER ID
// ═══════════════════════════════════════════════════════════════════════════════

/// Unique identifier of a scheduled timer within one queue
pub type TimerId = u64;

/// Invalid timer ID (never handed out)
pub const INVALID_TIMER_ID: TimerId = 0;

// ═══════════════════════════════════════════════════════════════════════════════
// SCHEDULED TIMER
// ═══════════════════════════════════════════════════════════════════════════════

/// Payload scheduled for execution at an absolute time
#[derive(Debug)]
pub struct ScheduledTimer<K> {
    /// Timer identity
    pub id: TimerId,
    /// Absolute time at which to fire (seconds)
    pub due_at: f64,
    /// What to do when the timer fires
    pub payload: K,
}

impl<K> ScheduledTimer<K> {
    /// Check if the timer should fire at the given time
    #[inline]
    pub fn is_due(&self, now: f64) -> bool {
        now >= self.due_at
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TIMER QUEUE
// ═══════════════════════════════════════════════════════════════════════════════

/// One-shot timers ordered by deadline
///
/// Timers with equal deadlines fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<K> {
    timers: Vec<ScheduledTimer<K>>,
    next_id: TimerId,
}

impl<K> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: INVALID_TIMER_ID + 1,
        }
    }

    /// Schedule `payload` to fire at `due_at`
    pub fn schedule(&mut self, due_at: f64, payload: K) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.timers.push(ScheduledTimer {
            id,
            due_at,
            payload,
        });
        id
    }

    /// Cancel a timer, returning its payload if it was still pending
    pub fn cancel(&mut self, id: TimerId) -> Option<K> {
        let pos = self.timers.iter().position(|t| t.id == id)?;
        Some(self.timers.remove(pos).payload)
    }

    /// Cancel every pending timer, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let count = self.timers.len();
        self.timers.clear();
        count
    }

    /// Remove every pending timer in deadline order, regardless of due time
    pub fn drain(&mut self) -> Vec<ScheduledTimer<K>> {
        let mut drained: Vec<_> = self.timers.drain(..).collect();
        drained.sort_by(|a, b| a.due_at.total_cmp(&b.due_at).then(a.id.cmp(&b.id)));
        drained
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<f64> {
        self.timers
            .iter()
            .map(|t| t.due_at)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Pop the earliest timer that is due at `now`
    pub fn pop_due(&mut self, now: f64) -> Option<ScheduledTimer<K>> {
        let pos = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_due(now))
            .min_by(|(_, a), (_, b)| a.due_at.total_cmp(&b.due_at).then(a.id.cmp(&b.id)))
            .map(|(pos, _)| pos)?;
        Some(self.timers.remove(pos))
    }

    pub fn contains(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
