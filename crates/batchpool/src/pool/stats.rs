use core::fmt;

/// Point-in-time occupancy of a [`WorkerPool`](crate::WorkerPool).
///
/// Taken without locking, so a snapshot read while tasks are starting or
/// finishing may be momentarily stale. It is never retained or pushed; callers
/// poll for a fresh one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Statistics {
    /// Maximum number of tasks allowed to run at once.
    pub capacity: usize,
    /// Tasks currently executing.
    pub running: usize,
    /// Unused execution slots (`capacity - running`).
    pub idle: usize,
    /// Tasks accepted but still waiting for a slot.
    pub queued: usize,
}

impl Statistics {
    pub(crate) const fn new(capacity: usize, running: usize, queued: usize) -> Self {
        Self {
            capacity,
            running,
            idle: capacity.saturating_sub(running),
            queued,
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity={} running={} idle={} queued={}",
            self.capacity, self.running, self.idle, self.queued
        )
    }
}
