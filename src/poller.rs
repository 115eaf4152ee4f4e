//! Fixed-interval refresh timer with an injectable clock.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

#[derive(Debug)]
pub struct Poller<C: Clock> {
    clock: C,
    interval: Duration,
    next_due: Option<Instant>,
}

impl<C: Clock> Poller<C> {
    pub fn new(clock: C, interval: Duration) -> Self {
        Self {
            clock,
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns false if already running; the schedule is left untouched.
    pub fn start(&mut self) -> bool {
        if self.next_due.is_some() {
            return false;
        }
        self.next_due = Some(self.clock.now() + self.interval);
        true
    }

    /// Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    /// True at most once per elapsed interval. Missed ticks collapse into one.
    pub fn poll_due(&mut self) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        let now = self.clock.now();
        if now < due {
            return false;
        }
        let mut next = due + self.interval;
        while next <= now {
            next += self.interval;
        }
        self.next_due = Some(next);
        true
    }
}
