//! Bounded worker thread pool for blocking work.
//!
//! A fixed set of long-lived native threads drains a shared FIFO of
//! boxed task closures. The queue, the pending counter, and the drain
//! flag are the only shared mutable state, guarded by one mutex per
//! pool; two condition variables ("work available" and "pool idle")
//! keep unrelated waiters from being woken.
//!
//! Dequeue order is FIFO; completion order across workers is not
//! guaranteed. A running task is never interrupted; shutdown is
//! cooperative at task-boundary granularity.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, info};

/// A unit of work. Ownership moves into the queue on submit and to the
/// claiming worker on dequeue.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// Errors from pool construction.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("worker pool requires at least one worker")]
    NoWorkers,

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

struct PoolState {
    queue: VecDeque<Task>,
    /// Tasks accepted but not yet completed. Only decremented after a
    /// task's callback has fully returned; never negative.
    pending: usize,
    draining: bool,
}

struct PoolInner {
    state: Mutex<PoolState>,
    work_available: Condvar,
    pool_idle: Condvar,
}

/// Fixed-size worker pool executing submitted closures in FIFO order.
pub struct TaskPool {
    inner: Arc<PoolInner>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskPool").finish_non_exhaustive()
    }
}

impl TaskPool {
    /// Create a pool with `worker_count` threads.
    ///
    /// If any thread fails to spawn, the already-started workers are
    /// signalled and joined before the error is returned.
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        if worker_count == 0 {
            return Err(PoolError::NoWorkers);
        }

        let inner = Arc::new(PoolInner {
            state: Mutex::new(PoolState {
                queue: VecDeque::new(),
                pending: 0,
                draining: false,
            }),
            work_available: Condvar::new(),
            pool_idle: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(worker_count);
        for i in 0..worker_count {
            let worker_inner = Arc::clone(&inner);
            let spawned = thread::Builder::new()
                .name(format!("ott-worker-{}", i))
                .spawn(move || worker_loop(worker_inner));

            match spawned {
                Ok(handle) => workers.push(handle),
                Err(e) => {
                    // Tear down whatever already started before failing.
                    let partial = TaskPool {
                        inner,
                        workers: Mutex::new(workers),
                    };
                    partial.shutdown();
                    return Err(PoolError::Spawn(e));
                }
            }
        }

        info!(worker_count, "worker pool started");
        Ok(Self {
            inner,
            workers: Mutex::new(workers),
        })
    }

    /// Submit a task for execution.
    ///
    /// Returns `false` without enqueuing when the pool is draining or
    /// stopped; otherwise the task joins the FIFO tail and one idle
    /// worker is woken.
    pub fn submit<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.draining {
            return false;
        }

        state.queue.push_back(Box::new(task));
        state.pending += 1;
        self.inner.work_available.notify_one();
        true
    }

    /// Block until every accepted task has completed and the queue is
    /// empty. Safe against tasks being submitted concurrently: the
    /// condition is re-checked after every wakeup.
    pub fn wait_idle(&self) {
        let mut state = self.inner.state.lock();
        while state.pending > 0 || !state.queue.is_empty() {
            self.inner.pool_idle.wait(&mut state);
        }
    }

    /// Number of tasks accepted but not yet completed.
    pub fn pending(&self) -> usize {
        self.inner.state.lock().pending
    }

    /// Drain and stop the pool, joining every worker.
    ///
    /// New submissions are refused from this point on. Workers finish
    /// their current and queued tasks, never interrupting a callback
    /// mid-execution, then exit on seeing the drain flag with an empty
    /// queue. Idempotent; also invoked on `Drop`.
    pub fn shutdown(&self) {
        let handles: Vec<JoinHandle<()>> = {
            let mut workers = self.workers.lock();
            let mut state = self.inner.state.lock();
            if state.draining && workers.is_empty() {
                return;
            }
            state.draining = true;
            self.inner.work_available.notify_all();
            workers.drain(..).collect()
        };

        for handle in handles {
            let _ = handle.join();
        }

        // Nothing runs anymore; drop whatever is still queued and
        // release anyone stuck in wait_idle.
        let mut state = self.inner.state.lock();
        let discarded = state.queue.len();
        state.queue.clear();
        state.pending = state.pending.saturating_sub(discarded);
        if discarded > 0 {
            debug!(discarded, "discarded queued tasks at shutdown");
        }
        if state.pending == 0 {
            self.inner.pool_idle.notify_all();
        }

        info!("worker pool stopped");
    }
}

impl Drop for TaskPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(inner: Arc<PoolInner>) {
    loop {
        let task = {
            let mut state = inner.state.lock();
            while state.queue.is_empty() && !state.draining {
                inner.work_available.wait(&mut state);
            }
            if state.draining && state.queue.is_empty() {
                return;
            }
            state.queue.pop_front()
        };

        if let Some(task) = task {
            // The callback owns its own failure handling; from the
            // pool's perspective every dequeued task ran to completion.
            task();

            let mut state = inner.state.lock();
            state.pending -= 1;
            if state.pending == 0 {
                inner.pool_idle.notify_all();
            }
        }
    }
}
