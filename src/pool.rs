//! Worker pool
//!
//! A fixed number of named threads pull [`GameJob`]s from a shared
//! [`WorkQueue`] and hand them to a [`GameHandler`]. Every dequeued job is
//! marked done exactly once, whatever the handler does:
//!
//! - a panicking handler is contained and reported as a failed game
//! - after [`CancellationToken::cancel`], remaining jobs are drained as
//!   cancelled without being processed
//! - a panicking observer is logged and the worker keeps going
//!
//! Workers share nothing but the queue, the handler, the observer and the
//! run summary. Each game's rows stay inside the handler call that builds
//! them.

use crate::discovery::GameJob;
use crate::error::{Result, TrackingError};
use crate::observer::PipelineObserver;
use crate::queue::WorkQueue;
use crate::report::{GameReport, RunSummary};
use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Processes one game to a terminal report
pub trait GameHandler: Send + Sync {
    /// Convert `job`. Must not return until the game has reached a terminal
    /// state.
    fn process(&self, job: &GameJob) -> GameReport;
}

/// Shared flag asking workers to stop processing new games
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the running state
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Games already being processed run to completion.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// State shared by every worker thread
struct WorkerContext {
    queue: Arc<WorkQueue<GameJob>>,
    handler: Arc<dyn GameHandler>,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancellationToken,
    summary: Arc<Mutex<RunSummary>>,
}

/// Marks one dequeued job done when dropped, including during unwinding
struct DoneGuard<'a>(&'a WorkQueue<GameJob>);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.mark_done();
    }
}

impl WorkerContext {
    fn run(&self) {
        while let Some(job) = self.queue.dequeue() {
            let _done = DoneGuard(&self.queue);
            self.notify(|| self.observer.game_started(&job, self.queue.len()));

            let report = if self.cancel.is_cancelled() {
                GameReport::cancelled(&job.game_id)
            } else {
                panic::catch_unwind(AssertUnwindSafe(|| self.handler.process(&job)))
                    .unwrap_or_else(|payload| {
                        GameReport::failed(
                            &job.game_id,
                            format!("worker panicked: {}", panic_message(payload.as_ref())),
                        )
                    })
            };

            self.summary.lock().record(&report);
            self.notify(|| self.observer.game_finished(&report));
        }
    }

    /// Run an observer callback; a panicking observer must not take the worker down
    fn notify(&self, event: impl FnOnce()) {
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(event)) {
            log::error!("observer panicked: {}", panic_message(payload.as_ref()));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

/// Fixed-size set of worker threads draining one queue
pub struct WorkerPool {
    queue: Arc<WorkQueue<GameJob>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `size` workers on `queue`.
    ///
    /// Workers idle until jobs arrive and exit once the queue is closed and
    /// empty.
    pub fn spawn(
        size: usize,
        queue: Arc<WorkQueue<GameJob>>,
        handler: Arc<dyn GameHandler>,
        observer: Arc<dyn PipelineObserver>,
        cancel: CancellationToken,
        summary: Arc<Mutex<RunSummary>>,
    ) -> Result<Self> {
        if size == 0 {
            return Err(TrackingError::Config("worker count must be greater than 0".into()));
        }

        let context = Arc::new(WorkerContext {
            queue: Arc::clone(&queue),
            handler,
            observer,
            cancel,
            summary,
        });

        let mut pool = WorkerPool {
            queue,
            workers: Vec::with_capacity(size),
        };

        for index in 0..size {
            let context = Arc::clone(&context);
            let spawned = thread::Builder::new()
                .name(format!("sportvu-worker-{index}"))
                .spawn(move || context.run());

            match spawned {
                Ok(handle) => pool.workers.push(handle),
                Err(err) => {
                    pool.shutdown();
                    return Err(err.into());
                }
            }
        }

        Ok(pool)
    }

    /// Number of worker threads
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Close the queue and wait for every worker to exit.
    ///
    /// Jobs still pending are processed (or drained as cancelled) first.
    pub fn shutdown(&mut self) {
        self.queue.close();
        for handle in self.workers.drain(..) {
            // Panics are caught per job, so a worker can only die outside a handler
            if handle.join().is_err() {
                log::error!("worker thread exited abnormally");
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::SilentObserver;
    use crate::report::GameStatus;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    struct FakeHandler {
        seen: Mutex<Vec<String>>,
    }

    impl FakeHandler {
        fn new() -> Self {
            FakeHandler {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl GameHandler for FakeHandler {
        fn process(&self, job: &GameJob) -> GameReport {
            self.seen.lock().push(job.game_id.clone());
            match job.game_id.as_str() {
                "panic" => panic!("boom"),
                "skip" => GameReport::skipped(&job.game_id, "no data"),
                _ => GameReport::done(&job.game_id, PathBuf::from("x.csv"), 1, 1),
            }
        }
    }

    fn job(id: &str) -> GameJob {
        GameJob::new(id, PathBuf::from("/data/s").join(id), "s")
    }

    type Started = (WorkerPool, Arc<WorkQueue<GameJob>>, Arc<Mutex<RunSummary>>);

    fn start(size: usize, handler: Arc<FakeHandler>, cancel: CancellationToken) -> Started {
        let queue = Arc::new(WorkQueue::new());
        let summary = Arc::new(Mutex::new(RunSummary::default()));
        let pool = WorkerPool::spawn(
            size,
            Arc::clone(&queue),
            handler,
            Arc::new(SilentObserver),
            cancel,
            Arc::clone(&summary),
        )
        .unwrap();
        (pool, queue, summary)
    }

    #[test]
    fn test_every_job_processed_once() {
        let handler = Arc::new(FakeHandler::new());
        let (mut pool, queue, summary) = start(4, Arc::clone(&handler), CancellationToken::new());
        assert_eq!(pool.size(), 4);

        for i in 0..50 {
            queue.enqueue(job(&format!("g{i:02}")));
        }
        queue.wait_until_drained();
        pool.shutdown();

        let seen = handler.seen.lock();
        assert_eq!(seen.len(), 50);
        assert_eq!(seen.iter().collect::<HashSet<_>>().len(), 50);
        assert_eq!(summary.lock().done, 50);
    }

    #[test]
    fn test_panic_is_contained() {
        let handler = Arc::new(FakeHandler::new());
        let (mut pool, queue, summary) = start(1, Arc::clone(&handler), CancellationToken::new());

        queue.enqueue(job("panic"));
        queue.enqueue(job("ok"));
        queue.enqueue(job("skip"));
        queue.wait_until_drained();
        pool.shutdown();

        let summary = summary.lock();
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures[0].0, "panic");
        assert!(summary.failures[0].1.contains("boom"));
    }

    struct PanickingObserver;

    impl PipelineObserver for PanickingObserver {
        fn game_finished(&self, report: &GameReport) {
            if report.game_id == "g1" {
                panic!("observer failure");
            }
        }
    }

    #[test]
    fn test_observer_panic_does_not_stall_drain() {
        let handler = Arc::new(FakeHandler::new());
        let queue = Arc::new(WorkQueue::new());
        let summary = Arc::new(Mutex::new(RunSummary::default()));
        let mut pool = WorkerPool::spawn(
            1,
            Arc::clone(&queue),
            handler.clone(),
            Arc::new(PanickingObserver),
            CancellationToken::new(),
            Arc::clone(&summary),
        )
        .unwrap();

        for id in ["g0", "g1", "g2"] {
            queue.enqueue(job(id));
        }

        let (tx, rx) = mpsc::channel();
        let waiter = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                queue.wait_until_drained();
                let _ = tx.send(());
            })
        };
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok(), "queue never drained");
        waiter.join().unwrap();
        pool.shutdown();

        // The single worker survived and processed the job after the panic
        assert_eq!(*handler.seen.lock(), vec!["g0", "g1", "g2"]);
        assert_eq!(summary.lock().done, 3);
        assert_eq!(queue.outstanding(), 0);
    }

    #[test]
    fn test_cancelled_jobs_are_drained_unprocessed() {
        let handler = Arc::new(FakeHandler::new());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (mut pool, queue, summary) = start(2, Arc::clone(&handler), cancel);

        for i in 0..5 {
            queue.enqueue(job(&format!("g{i}")));
        }
        queue.wait_until_drained();
        pool.shutdown();

        assert!(handler.seen.lock().is_empty());
        let summary = summary.lock();
        assert_eq!(summary.cancelled, 5);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let queue = Arc::new(WorkQueue::new());
        let result = WorkerPool::spawn(
            0,
            queue,
            Arc::new(FakeHandler::new()),
            Arc::new(SilentObserver),
            CancellationToken::new(),
            Arc::new(Mutex::new(RunSummary::default())),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_report_status_for_cancel_token_clone() {
        let cancel = CancellationToken::new();
        let other = cancel.clone();
        other.cancel();
        assert!(cancel.is_cancelled());
        assert_eq!(GameReport::cancelled("g").status, GameStatus::Cancelled);
    }
}
