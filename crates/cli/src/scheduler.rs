use std::collections::BTreeMap;
use std::time::Duration;

use tokio::time::Instant;

use tallyscan_scanner::{IdleScheduler, TimerId};

/// Idle timers as tokio deadlines. The driver sleeps until
/// [`next_deadline`](Self::next_deadline) and reports the timer back.
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    next_id: u64,
    deadlines: BTreeMap<TimerId, Instant>,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest armed timer.
    pub fn next_deadline(&self) -> Option<(TimerId, Instant)> {
        self.deadlines
            .iter()
            .min_by_key(|(id, at)| (**at, **id))
            .map(|(id, at)| (*id, *at))
    }

    /// Forget a timer that has fired.
    pub fn expire(&mut self, id: TimerId) {
        self.deadlines.remove(&id);
    }
}

impl IdleScheduler for DeadlineScheduler {
    fn arm(&mut self, timeout: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.deadlines.insert(id, Instant::now() + timeout);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.deadlines.remove(&id);
    }
}
