//! Virtual-time timers
//!
//! Scenes never sleep. They schedule [`TimerEvent`]s on the session's
//! [`Scheduler`] and keep the returned [`TimerGuard`]; dropping the guard
//! (for example because the scene itself was dropped) removes the timer, so
//! nothing ever fires into a disposed scene.
//!
//! Time only moves when the owner calls [`Scheduler::pop_due`] and
//! [`Scheduler::settle`]. The terminal front end feeds wall-clock deltas;
//! tests feed exact values.

use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// What a timer delivers when it fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Show the next intro message
    IntroTick,
    /// Song card delay elapsed; leave the intro
    SongCardAdvance,
    /// Reveal the next room decoration
    RoomReveal,
    /// Cake celebration finished
    CakeCelebrationDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct TimerId(u64);

#[derive(Debug)]
struct Entry {
    id: TimerId,
    deadline: Duration,
    interval: Option<Duration>,
    event: TimerEvent,
}

#[derive(Debug, Default)]
struct TimerQueue {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry>,
}

impl TimerQueue {
    fn insert(&mut self, delay: Duration, interval: Option<Duration>, event: TimerEvent) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            deadline: self.now + delay,
            interval,
            event,
        });
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    /// Index of the earliest entry due at or before `until`.
    /// Ties go to the entry scheduled first.
    fn earliest_due(&self, until: Duration) -> Option<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.deadline <= until)
            .min_by_key(|(_, e)| (e.deadline, e.id))
            .map(|(idx, _)| idx)
    }
}

/// Shared handle to the session's timer queue
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<TimerQueue>>,
}

impl Scheduler {
    /// Create an empty scheduler at time zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.queue.lock().now
    }

    /// Number of live timers
    pub fn pending(&self) -> usize {
        self.queue.lock().entries.len()
    }

    /// Fire `event` once after `delay`.
    pub fn schedule_once(&self, delay: Duration, event: TimerEvent) -> TimerGuard {
        let id = self.queue.lock().insert(delay, None, event);
        log::debug!("scheduled {event:?} once in {}ms ({id:?})", delay.as_millis());
        self.guard(id)
    }

    /// Fire `event` every `interval`, first after one interval.
    ///
    /// A zero interval is raised to one millisecond so the queue always
    /// makes progress.
    pub fn schedule_repeating(&self, interval: Duration, event: TimerEvent) -> TimerGuard {
        let interval = interval.max(Duration::from_millis(1));
        let id = self.queue.lock().insert(interval, Some(interval), event);
        log::debug!(
            "scheduled {event:?} every {}ms ({id:?})",
            interval.as_millis()
        );
        self.guard(id)
    }

    fn guard(&self, id: TimerId) -> TimerGuard {
        TimerGuard {
            id,
            queue: Arc::downgrade(&self.queue),
        }
    }

    /// Pop the earliest event due at or before `until`.
    ///
    /// The clock moves to that event's deadline and repeating timers are
    /// re-armed one interval later. Returns `None` when nothing is due.
    pub fn pop_due(&self, until: Duration) -> Option<TimerEvent> {
        let mut queue = self.queue.lock();
        let idx = queue.earliest_due(until)?;

        let deadline = queue.entries[idx].deadline;
        queue.now = queue.now.max(deadline);

        let event = queue.entries[idx].event;
        match queue.entries[idx].interval {
            Some(interval) => queue.entries[idx].deadline = deadline + interval,
            None => {
                queue.entries.swap_remove(idx);
            }
        }
        Some(event)
    }

    /// Move the clock forward to `until` once every due event has fired.
    pub fn settle(&self, until: Duration) {
        let mut queue = self.queue.lock();
        queue.now = queue.now.max(until);
    }
}

/// Ownership of one scheduled timer.
///
/// The timer is cancelled when the guard is dropped.
#[derive(Debug)]
#[must_use = "dropping a TimerGuard cancels its timer"]
pub struct TimerGuard {
    id: TimerId,
    queue: Weak<Mutex<TimerQueue>>,
}

impl TimerGuard {
    /// Whether the timer is still scheduled
    pub fn is_pending(&self) -> bool {
        self.queue
            .upgrade()
            .map(|q| q.lock().entries.iter().any(|e| e.id == self.id))
            .unwrap_or(false)
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(queue) = self.queue.upgrade() {
            if queue.lock().cancel(self.id) {
                log::debug!("cancelled timer {:?}", self.id);
            }
        }
    }
}
