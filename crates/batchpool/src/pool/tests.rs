use crate::{Error, PoolCell, PoolConfig, Statistics, WorkerPool, task_fn};
use core::time::Duration;
use portable_atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};

/// Polls the pool until `cond` holds, failing the test after a few seconds.
async fn wait_for_stats(pool: &WorkerPool, cond: impl Fn(&Statistics) -> bool) -> Statistics {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stats = pool.statistics();
            if cond(&stats) {
                return stats;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await
    .expect("pool statistics never reached the expected state")
}

/// Submits a task that parks on `gate` before finishing.
fn submit_gated(pool: &WorkerPool, gate: &Arc<Semaphore>, ran: &Arc<AtomicUsize>) {
    let gate = Arc::clone(gate);
    let ran = Arc::clone(ran);
    pool.submit(task_fn(move || async move {
        let _permit = gate.acquire().await;
        ran.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }))
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn running_never_exceeds_capacity() {
    const CAPACITY: usize = 3;
    const TASKS: usize = 24;

    let pool = Arc::new(WorkerPool::new(PoolConfig::new(CAPACITY)).unwrap());
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    let done = Arc::new(AtomicBool::new(false));
    let sampler = {
        let pool = Arc::clone(&pool);
        let done = Arc::clone(&done);
        tokio::spawn(async move {
            while !done.load(Ordering::SeqCst) {
                let stats = pool.statistics();
                assert!(stats.running <= CAPACITY, "over capacity: {stats}");
                tokio::task::yield_now().await;
            }
        })
    };

    for _ in 0..TASKS {
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        let completed = Arc::clone(&completed);
        pool.submit(task_fn(move || async move {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
            completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();
    }

    pool.await_all().await;
    done.store(true, Ordering::SeqCst);
    sampler.await.unwrap();

    assert_eq!(completed.load(Ordering::SeqCst), TASKS);
    assert_eq!(peak.load(Ordering::SeqCst), CAPACITY);
    assert_eq!(
        pool.statistics(),
        Statistics {
            capacity: CAPACITY,
            running: 0,
            idle: CAPACITY,
            queued: 0
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn await_all_observes_every_side_effect() {
    let pool = WorkerPool::new(PoolConfig::new(2)).unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();

    for i in 0..10_u64 {
        let tx = tx.clone();
        pool.submit(task_fn(move || async move {
            // Later submissions finish sooner.
            tokio::time::sleep(Duration::from_millis(10 - i)).await;
            tx.send(i).unwrap();
            Ok(())
        }))
        .unwrap();
    }
    drop(tx);

    pool.await_all().await;

    let mut seen = Vec::new();
    while let Ok(i) = rx.try_recv() {
        seen.push(i);
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..10).collect::<Vec<_>>());
}

#[tokio::test]
async fn await_all_is_reusable_across_drain_cycles() {
    let pool = WorkerPool::new(PoolConfig::new(2)).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    // Nothing pending: returns straight away.
    tokio::time::timeout(Duration::from_secs(1), pool.await_all())
        .await
        .unwrap();

    for round in 1..=2 {
        for _ in 0..5 {
            let counter = Arc::clone(&counter);
            pool.submit(task_fn(move || async move {
                tokio::time::sleep(Duration::from_millis(2)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }))
            .unwrap();
        }
        pool.await_all().await;
        assert_eq!(counter.load(Ordering::SeqCst), round * 5);
    }
}

#[tokio::test]
async fn statistics_track_queued_and_running() {
    let pool = WorkerPool::new(PoolConfig::new(2)).unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        submit_gated(&pool, &gate, &ran);
    }

    // Single-threaded runtime: the dispatch loop has not run yet.
    assert_eq!(
        pool.statistics(),
        Statistics {
            capacity: 2,
            running: 0,
            idle: 2,
            queued: 5
        }
    );

    let stats = wait_for_stats(&pool, |s| s.running == 2).await;
    assert_eq!(stats.idle, 0);
    assert_eq!(stats.queued, 3);

    gate.add_permits(5);
    pool.await_all().await;

    assert_eq!(ran.load(Ordering::SeqCst), 5);
    assert_eq!(
        pool.statistics(),
        Statistics {
            capacity: 2,
            running: 0,
            idle: 2,
            queued: 0
        }
    );
}

#[tokio::test]
async fn rejects_submissions_when_queue_is_full() {
    let pool = WorkerPool::new(PoolConfig::new(1).with_queue_capacity(1)).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    let mut results = Vec::new();
    for _ in 0..4 {
        let ran = Arc::clone(&ran);
        results.push(pool.submit(task_fn(move || async move {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })));
    }

    assert!(results[0].is_ok());
    for result in &results[1..] {
        assert!(matches!(result, Err(Error::SubmissionRejected { .. })));
    }
    // Rejected tasks leave no trace in the counters.
    assert_eq!(pool.statistics().queued, 1);

    pool.await_all().await;
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(pool.statistics().queued, 0);
}

#[tokio::test]
async fn submit_wait_holds_the_caller_until_the_queue_has_room() {
    let pool = WorkerPool::new(PoolConfig::new(1).with_queue_capacity(1)).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0..6 {
        let ran = Arc::clone(&ran);
        pool.submit_wait(task_fn(move || async move {
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .await
        .unwrap();
    }

    pool.await_all().await;
    assert_eq!(ran.load(Ordering::SeqCst), 6);
    let stats = pool.statistics();
    assert_eq!((stats.running, stats.queued), (0, 0));
}

#[tokio::test]
async fn submit_wait_refuses_a_closed_pool() {
    let pool = WorkerPool::new(PoolConfig::new(1)).unwrap();
    pool.close().await;

    let result = pool.submit_wait(task_fn(|| async { Ok(()) })).await;
    assert_eq!(result, Err(Error::PoolClosed));
    assert_eq!(pool.statistics().queued, 0);
    tokio::time::timeout(Duration::from_secs(1), pool.await_all())
        .await
        .unwrap();
}

async fn explode() -> crate::Result<()> {
    panic!("task blew up")
}

#[tokio::test]
async fn failing_and_panicking_tasks_still_complete() {
    let pool = WorkerPool::new(PoolConfig::new(2)).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    pool.submit(task_fn(|| async {
        Err(Error::ChunkProcessing {
            chunk: 0,
            reason: "bad input".to_string(),
        })
    }))
    .unwrap();
    pool.submit(task_fn(explode)).unwrap();

    tokio::time::timeout(Duration::from_secs(5), pool.await_all())
        .await
        .unwrap();

    // The pool keeps working afterwards.
    let counter = Arc::clone(&ran);
    pool.submit(task_fn(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }))
    .unwrap();
    pool.await_all().await;

    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(pool.statistics().running, 0);
}

#[tokio::test]
async fn close_refuses_new_work_and_is_idempotent() {
    let pool = WorkerPool::new(PoolConfig::new(2)).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&ran);
    pool.submit(task_fn(move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }))
    .unwrap();

    pool.await_all().await;
    pool.close().await;
    pool.close().await;

    assert!(pool.is_closed());
    let result = pool.submit(task_fn(|| async { Ok(()) }));
    assert_eq!(result, Err(Error::PoolClosed));
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_discards_tasks_still_waiting_for_a_slot() {
    let pool = WorkerPool::new(
        PoolConfig::new(1)
            .with_queue_capacity(4)
            .with_shutdown_timeout(Duration::from_millis(50)),
    )
    .unwrap();
    let gate = Arc::new(Semaphore::new(0));
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        submit_gated(&pool, &gate, &ran);
    }
    wait_for_stats(&pool, |s| s.running == 1).await;

    // The running task holds the only slot, so shutdown times out and the
    // two waiting tasks are dropped when capacity is released.
    pool.close().await;
    gate.add_permits(3);

    tokio::time::timeout(Duration::from_secs(5), pool.await_all())
        .await
        .unwrap();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
    assert_eq!(
        pool.statistics(),
        Statistics {
            capacity: 1,
            running: 0,
            idle: 1,
            queued: 0
        }
    );
}

#[tokio::test]
async fn new_rejects_invalid_config() {
    let err = WorkerPool::new(PoolConfig::new(0)).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn new_outside_runtime_fails() {
    let err = WorkerPool::new(PoolConfig::new(1)).unwrap_err();
    assert!(matches!(err, Error::Runtime { .. }));
}

#[tokio::test]
async fn unset_cell_reports_not_initialized_without_side_effects() {
    let cell = PoolCell::new();
    let ran = Arc::new(AtomicBool::new(false));

    assert!(!cell.is_initialized());
    assert_eq!(cell.get().unwrap_err(), Error::NotInitialized);
    assert_eq!(cell.statistics(), Err(Error::NotInitialized));

    let flag = Arc::clone(&ran);
    let result = cell.submit(task_fn(move || async move {
        flag.store(true, Ordering::SeqCst);
        Ok(())
    }));
    assert_eq!(result, Err(Error::NotInitialized));

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!ran.load(Ordering::SeqCst));

    // Closing an absent pool is a no-op.
    cell.close_pool().await;
    assert!(!cell.is_initialized());
}

#[tokio::test]
async fn init_is_first_writer_wins() {
    let cell = PoolCell::new();

    let first = cell.init(PoolConfig::new(2)).unwrap();
    let second = cell.init(PoolConfig::new(8)).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &cell.get().unwrap()));
    assert_eq!(second.capacity(), 2);
    assert_eq!(cell.statistics().unwrap().capacity, 2);
}

#[tokio::test]
async fn failed_init_leaves_cell_empty() {
    let cell = PoolCell::new();

    let err = cell.init(PoolConfig::new(0)).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
    assert_eq!(cell.get().unwrap_err(), Error::NotInitialized);

    let pool = cell.init(PoolConfig::new(3)).unwrap();
    assert_eq!(pool.capacity(), 3);
}

#[tokio::test]
async fn close_pool_drains_then_closes() {
    let cell = PoolCell::new();
    let pool = cell.init(PoolConfig::new(2)).unwrap();
    let ran = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let ran = Arc::clone(&ran);
        cell.submit(task_fn(move || async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            ran.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }))
        .unwrap();
    }

    cell.close_pool().await;

    assert_eq!(ran.load(Ordering::SeqCst), 4);
    assert!(pool.is_closed());
    assert_eq!(
        cell.submit(task_fn(|| async { Ok(()) })),
        Err(Error::PoolClosed)
    );
}
