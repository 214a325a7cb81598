use super::manager::PoolState;
use crate::Task;
use portable_atomic::Ordering;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Messages carried by the pool's submission queue.
pub(crate) enum WorkRequest {
    /// Run `task` once a slot frees up.
    Run { task: Box<dyn Task>, ticket: Ticket },
    /// Stop the dispatch loop and acknowledge on `response`.
    Shutdown { response: oneshot::Sender<()> },
}

/// Accounting handle for one submitted task.
///
/// Issuing a ticket bumps the pending and queued counters. Dropping it undoes
/// whatever the ticket still holds, so every exit path (rejected at enqueue,
/// discarded while queued, finished, panicked) settles the counters exactly
/// once.
pub(crate) struct Ticket {
    state: Arc<PoolState>,
    stage: Stage,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Stage {
    Queued,
    Running,
}

impl Ticket {
    pub(crate) fn issue(state: &Arc<PoolState>) -> Self {
        state.pending.send_modify(|pending| *pending += 1);
        state.queued.fetch_add(1, Ordering::AcqRel);
        Self {
            state: Arc::clone(state),
            stage: Stage::Queued,
        }
    }

    /// Moves the task from the queue into a running slot.
    pub(crate) fn start(&mut self) {
        if self.stage == Stage::Queued {
            self.state.queued.fetch_sub(1, Ordering::AcqRel);
            self.state.running.fetch_add(1, Ordering::AcqRel);
            self.stage = Stage::Running;
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        match self.stage {
            Stage::Queued => self.state.queued.fetch_sub(1, Ordering::AcqRel),
            Stage::Running => self.state.running.fetch_sub(1, Ordering::AcqRel),
        };
        // Last, so `await_all` never wakes before the other counters settle.
        self.state.pending.send_modify(|pending| *pending -= 1);
    }
}
