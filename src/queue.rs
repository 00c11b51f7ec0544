//! Work queue shared by the worker pool
//!
//! A FIFO of pending jobs plus a count of outstanding jobs (enqueued but not
//! yet marked done). Workers block in [`WorkQueue::dequeue`] while the queue
//! is empty; the driver blocks in [`WorkQueue::wait_until_drained`] until the
//! outstanding count returns to zero.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;

#[derive(Debug)]
struct QueueState<T> {
    pending: VecDeque<T>,
    /// Jobs enqueued and not yet marked done (pending + in flight)
    outstanding: usize,
    closed: bool,
}

/// Thread-safe FIFO with a join/drain signal
///
/// # Thread Safety
/// - Any number of producers and consumers
/// - One `parking_lot::Mutex` guards the deque and counters
/// - `available` wakes dequeuers, `drained` wakes drain waiters
#[derive(Debug)]
pub struct WorkQueue<T> {
    state: Mutex<QueueState<T>>,
    available: Condvar,
    drained: Condvar,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> WorkQueue<T> {
    /// Create an empty, open queue
    pub fn new() -> Self {
        WorkQueue {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                outstanding: 0,
                closed: false,
            }),
            available: Condvar::new(),
            drained: Condvar::new(),
        }
    }

    /// Add a pending job.
    ///
    /// Returns `false` (and drops the job) if the queue has been closed.
    pub fn enqueue(&self, job: T) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.pending.push_back(job);
        state.outstanding += 1;
        drop(state);

        self.available.notify_one();
        true
    }

    /// Block until a job is available.
    ///
    /// Returns `None` once the queue is closed and no jobs remain, which is the
    /// worker's signal to exit.
    pub fn dequeue(&self) -> Option<T> {
        let mut state = self.state.lock();
        loop {
            if let Some(job) = state.pending.pop_front() {
                return Some(job);
            }
            if state.closed {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Record completion of one previously dequeued job
    pub fn mark_done(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.outstanding > 0, "mark_done called more often than enqueue");
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            self.drained.notify_all();
        }
    }

    /// Block until every enqueued job has been dequeued and marked done
    pub fn wait_until_drained(&self) {
        let mut state = self.state.lock();
        while state.outstanding > 0 {
            self.drained.wait(&mut state);
        }
    }

    /// Stop accepting jobs and wake every blocked dequeuer.
    ///
    /// Jobs already pending are still handed out.
    pub fn close(&self) {
        self.state.lock().closed = true;
        self.available.notify_all();
    }

    /// Number of jobs waiting to be dequeued
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Check if no jobs are waiting
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of jobs enqueued but not yet marked done
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_order() {
        let queue = WorkQueue::new();
        for i in 0..4 {
            assert!(queue.enqueue(i));
        }
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.dequeue(), Some(0));
        assert_eq!(queue.dequeue(), Some(1));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.outstanding(), 4);
    }

    #[test]
    fn test_drained_when_nothing_enqueued() {
        let queue: WorkQueue<u32> = WorkQueue::new();
        // Must return immediately
        queue.wait_until_drained();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_outstanding_counts_in_flight_jobs() {
        let queue = WorkQueue::new();
        queue.enqueue("a");
        queue.enqueue("b");

        let _ = queue.dequeue();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.outstanding(), 2);

        queue.mark_done();
        assert_eq!(queue.outstanding(), 1);
    }

    #[test]
    fn test_close_releases_blocked_dequeue() {
        let queue: Arc<WorkQueue<u32>> = Arc::new(WorkQueue::new());
        let worker = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || queue.dequeue())
        };

        thread::sleep(Duration::from_millis(20));
        queue.close();

        assert_eq!(worker.join().unwrap(), None);
    }

    #[test]
    fn test_close_still_hands_out_pending_jobs() {
        let queue = WorkQueue::new();
        queue.enqueue(7);
        queue.close();

        assert!(!queue.enqueue(8));
        assert_eq!(queue.dequeue(), Some(7));
        assert_eq!(queue.dequeue(), None);
    }

    #[test]
    fn test_wait_until_drained_blocks_for_workers() {
        let queue: Arc<WorkQueue<usize>> = Arc::new(WorkQueue::new());
        let processed = Arc::new(AtomicUsize::new(0));

        for i in 0..50 {
            queue.enqueue(i);
        }

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                let processed = Arc::clone(&processed);
                thread::spawn(move || {
                    while let Some(_job) = queue.dequeue() {
                        thread::sleep(Duration::from_millis(1));
                        processed.fetch_add(1, Ordering::SeqCst);
                        queue.mark_done();
                    }
                })
            })
            .collect();

        queue.wait_until_drained();
        assert_eq!(processed.load(Ordering::SeqCst), 50);
        assert_eq!(queue.outstanding(), 0);

        queue.close();
        for worker in workers {
            worker.join().unwrap();
        }
    }
}
