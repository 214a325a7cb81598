use super::request::{Ticket, WorkRequest};
use crate::Task;
use futures::FutureExt;
use std::{panic::AssertUnwindSafe, sync::Arc};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};

/// Admission loop that feeds queued tasks into execution slots.
///
/// The loop owns the receiving end of the pool's submission queue. For each
/// [`WorkRequest::Run`] it waits for a permit from `slots`, which bounds how
/// many tasks execute at once, and then spawns the task with the permit
/// attached. Tasks therefore start in submission order but may finish in any
/// order.
///
/// # Request Types
///
/// - [`WorkRequest::Run`] - admit one task.
/// - [`WorkRequest::Shutdown`] - acknowledge and stop. Requests queued behind
///   it are dropped with the receiver, settling their tickets.
///
/// If `slots` is closed while a task is waiting, that task is discarded without
/// running.
pub(crate) async fn dispatch_loop(mut rx: mpsc::Receiver<WorkRequest>, slots: Arc<Semaphore>) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Dispatch loop started");

    while let Some(request) = rx.recv().await {
        match request {
            WorkRequest::Run { task, mut ticket } => {
                let Ok(permit) = Arc::clone(&slots).acquire_owned().await else {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Pool capacity released, discarding queued task");
                    continue;
                };
                ticket.start();
                tokio::spawn(run_task(task, ticket, permit));
            }
            WorkRequest::Shutdown { response } => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Dispatch loop received shutdown signal");

                if response.send(()).is_err() {
                    #[cfg(feature = "tracing")]
                    tracing::error!("Dispatch loop failed to acknowledge shutdown");
                }
                break;
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!("Dispatch loop stopped");
}

/// Runs a single task inside its slot.
///
/// The task's own result is only logged. A panic is caught here so it cannot
/// leak the slot or the ticket.
async fn run_task(task: Box<dyn Task>, ticket: Ticket, permit: OwnedSemaphorePermit) {
    match AssertUnwindSafe(async move { task.run().await })
        .catch_unwind()
        .await
    {
        Ok(Ok(())) => {
            #[cfg(feature = "tracing")]
            tracing::trace!("Task completed");
        }
        Ok(Err(_e)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("Task returned an error: {_e}");
        }
        Err(_) => {
            #[cfg(feature = "tracing")]
            tracing::error!("Task panicked");
        }
    }

    // Leave the running count before the slot is handed to the next task.
    drop(ticket);
    drop(permit);
}
