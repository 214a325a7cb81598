//! The unit of work accepted by the pool.
//!
//! A [`Task`] is a zero-argument operation that runs to completion and yields
//! success or an [`Error`](crate::Error). The pool only schedules tasks; it
//! never inspects what a task returned beyond logging it. Callers that care
//! about the outcome wire up their own side channel inside the task body (see
//! [`BatchDispatcher`](crate::BatchDispatcher)).

use crate::Result;
use core::{fmt, future::Future, pin::Pin};

/// Future returned by [`Task::run`].
///
/// Boxed so the pool can hold heterogeneous tasks behind one queue.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// A schedulable unit of work.
pub trait Task: Send + 'static {
    /// Consumes the task and returns the future that performs its work.
    fn run(self: Box<Self>) -> TaskFuture;
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Task")
    }
}

/// Adapts a closure returning a future into a [`Task`].
pub struct FnTask<F> {
    f: F,
}

impl<F, Fut> Task for FnTask<F>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    fn run(self: Box<Self>) -> TaskFuture {
        let Self { f } = *self;
        Box::pin(f())
    }
}

/// Wraps `f` as a [`Task`].
///
/// ```
/// use batchpool::{Task, task_fn};
///
/// let task = task_fn(|| async { Ok(()) });
/// let _boxed: Box<dyn Task> = Box::new(task);
/// ```
pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    FnTask { f }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn fn_task_runs_closure_once() {
        let task: Box<dyn Task> = Box::new(task_fn(|| async {
            Err(Error::ChunkProcessing {
                chunk: 7,
                reason: "boom".to_string(),
            })
        }));

        let result = task.run().await;
        assert_eq!(
            result,
            Err(Error::ChunkProcessing {
                chunk: 7,
                reason: "boom".to_string()
            })
        );
    }
}
