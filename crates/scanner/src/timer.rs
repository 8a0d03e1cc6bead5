//! Idle-timer scheduling seam.

use std::collections::BTreeMap;
use std::time::Duration;

/// Handle of one armed idle timer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

impl core::fmt::Display for TimerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Arms and cancels the assembler's idle timer.
///
/// When an armed timer elapses, the driver must call
/// [`ScanAssembler::on_idle_timeout`](crate::ScanAssembler::on_idle_timeout)
/// with its id. Cancelled timers must not fire; if one does anyway, the
/// assembler ignores it.
pub trait IdleScheduler {
    fn arm(&mut self, timeout: Duration) -> TimerId;

    fn cancel(&mut self, id: TimerId);
}

/// Scheduler over a simulated clock.
///
/// Nothing fires on its own: [`advance`](Self::advance) moves simulated time
/// forward and returns the timers that became due, in deadline order.
#[derive(Debug, Default)]
pub struct SimulatedScheduler {
    now: Duration,
    next_id: u64,
    pending: BTreeMap<TimerId, Duration>,
}

impl SimulatedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of armed, not yet fired or cancelled timers.
    pub fn live_timers(&self) -> usize {
        self.pending.len()
    }

    pub fn deadline_of(&self, id: TimerId) -> Option<Duration> {
        self.pending.get(&id).copied()
    }

    pub fn advance(&mut self, by: Duration) -> Vec<TimerId> {
        self.now += by;
        let now = self.now;

        let mut due: Vec<(Duration, TimerId)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(id, deadline)| (*deadline, *id))
            .collect();
        due.sort();

        for (_, id) in &due {
            self.pending.remove(id);
        }
        due.into_iter().map(|(_, id)| id).collect()
    }
}

impl IdleScheduler for SimulatedScheduler {
    fn arm(&mut self, timeout: Duration) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.insert(id, self.now + timeout);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.remove(&id);
    }
}
