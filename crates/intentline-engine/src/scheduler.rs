//! Bounded-concurrency priority scheduler
//!
//! Work items wait in a max-heap keyed by `(priority, submission order)` and
//! are started by a drain step whenever a worker slot frees up. Draining after
//! `submit` is deferred to a spawned task. A burst of synchronous submissions
//! is therefore fully ordered by priority before the first item starts.
//!
//! There is no per-item cancellation. `pause` stops new starts, and in-flight
//! work always runs to completion or failure. A worker slot is released before
//! the work's outcome is delivered to its handle.

use futures::future::BoxFuture;
use futures::FutureExt;
use intentline_core::{Error, Result};
use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::{oneshot, Notify};
use tracing::{debug, warn};

type Job = Box<dyn FnOnce(SlotGuard) -> BoxFuture<'static, ()> + Send>;

/// Priority scheduler with a fixed worker budget
///
/// Cheap to clone; all clones share the same queue and worker budget.
#[derive(Clone)]
pub struct PriorityScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    concurrency: usize,
    state: Mutex<SchedulerState>,
    idle: Notify,
}

#[derive(Default)]
struct SchedulerState {
    queue: BinaryHeap<QueuedJob>,
    running: usize,
    paused: bool,
    next_seq: u64,
}

struct QueuedJob {
    priority: i32,
    seq: u64,
    job: Job,
}

impl QueuedJob {
    fn key(&self) -> (i32, Reverse<u64>) {
        (self.priority, Reverse(self.seq))
    }
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then lower sequence (earlier submission)
        self.key().cmp(&other.key())
    }
}

/// Handle to the eventual outcome of submitted work
///
/// Resolves to the work's own result, or to `Error::Scheduler` if the work was
/// lost before completing (for example because it panicked).
#[must_use = "dropping a TaskHandle discards the work's outcome"]
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> Future for TaskHandle<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|received| match received {
            Ok(outcome) => outcome,
            Err(_) => Err(Error::scheduler("work item dropped before completion")),
        })
    }
}

/// Holds one worker slot while a job runs
///
/// `finish` releases the slot and starts waiting work. A guard dropped without
/// `finish` belongs to a task the runtime cancelled; it releases the slot but
/// starts nothing.
struct SlotGuard {
    inner: Arc<SchedulerInner>,
    finished: bool,
}

impl SlotGuard {
    fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        {
            let mut state = self.inner.state.lock();
            state.running -= 1;
            if state.running == 0 && state.queue.is_empty() {
                self.inner.idle.notify_waiters();
            }
        }
        if self.finished {
            SchedulerInner::drain(&self.inner);
        }
    }
}

impl SchedulerInner {
    fn drain(this: &Arc<Self>) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("Scheduler drain requested outside a tokio runtime");
            return;
        };

        let mut ready = Vec::new();
        {
            let mut state = this.state.lock();
            while !state.paused && state.running < this.concurrency {
                let Some(queued) = state.queue.pop() else {
                    break;
                };
                state.running += 1;

                debug!(
                    priority = queued.priority,
                    seq = queued.seq,
                    running = state.running,
                    "Starting scheduled work"
                );

                let guard = SlotGuard {
                    inner: Arc::clone(this),
                    finished: false,
                };
                ready.push((queued.job, guard));
            }
        }

        // Spawning on a runtime that is shutting down drops the future at once,
        // and with it the guard, which takes the state lock.
        for (job, guard) in ready {
            runtime.spawn(job(guard));
        }
    }

    fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.running == 0 && state.queue.is_empty()
    }
}

impl PriorityScheduler {
    /// Create a scheduler running at most `concurrency` items at once
    ///
    /// A concurrency of zero is raised to one.
    pub fn new(concurrency: usize) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                concurrency: concurrency.max(1),
                state: Mutex::new(SchedulerState::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Queue work and return a handle to its outcome
    ///
    /// Never blocks. The work starts once a worker slot is free and no
    /// higher-priority or earlier equal-priority item is waiting.
    ///
    /// Must be called from within a tokio runtime. Outside one, nothing is
    /// queued and the handle resolves to `Error::Scheduler`.
    pub fn submit<F, Fut, T>(&self, priority: i32, work: F) -> TaskHandle<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(priority, "Work submitted outside a tokio runtime");
            let _ = tx.send(Err(Error::scheduler(
                "work submitted outside a tokio runtime",
            )));
            return TaskHandle { rx };
        };

        let job: Job = Box::new(move |slot: SlotGuard| {
            async move {
                let outcome = AssertUnwindSafe(async move { work().await })
                    .catch_unwind()
                    .await;
                slot.finish();

                let outcome = outcome.unwrap_or_else(|_| {
                    warn!("Scheduled work panicked");
                    Err(Error::scheduler("work item panicked"))
                });
                // Receiver may have been dropped; the work still ran
                let _ = tx.send(outcome);
            }
            .boxed()
        });

        {
            let mut state = self.inner.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            state.queue.push(QueuedJob { priority, seq, job });
            debug!(priority, seq, queued = state.queue.len(), "Work submitted");
        }

        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move { SchedulerInner::drain(&inner) });
        TaskHandle { rx }
    }

    /// Stop starting new work; in-flight work continues
    pub fn pause(&self) {
        self.inner.state.lock().paused = true;
        debug!("Scheduler paused");
    }

    /// Resume draining the queue
    pub fn resume(&self) {
        self.inner.state.lock().paused = false;
        debug!("Scheduler resumed");
        SchedulerInner::drain(&self.inner);
    }

    pub fn is_paused(&self) -> bool {
        self.inner.state.lock().paused
    }

    /// Number of items waiting for a worker slot
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    /// Number of items currently executing
    pub fn running_count(&self) -> usize {
        self.inner.state.lock().running
    }

    pub fn concurrency(&self) -> usize {
        self.inner.concurrency
    }

    /// Wait until nothing is queued or running
    ///
    /// Does not resolve while the scheduler is paused with items queued.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.inner.is_idle() {
                return;
            }
            notified.await;
        }
    }
}
