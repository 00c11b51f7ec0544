//! Pipeline driver
//!
//! Wires discovery, the work queue and the worker pool together:
//!
//! 1. validate the configuration
//! 2. start the worker pool
//! 3. enqueue every discovered game
//! 4. wait until every job is marked done, then stop the workers
//!
//! Games are processed concurrently and independently; a failing game
//! never aborts the run.

use crate::config::PipelineConfig;
use crate::convert::GameConverter;
use crate::discovery::GameJobSource;
use crate::error::Result;
use crate::observer::{PipelineObserver, SilentObserver};
use crate::pool::{CancellationToken, GameHandler, WorkerPool};
use crate::queue::WorkQueue;
use crate::report::RunSummary;
use parking_lot::Mutex;
use std::sync::Arc;

/// One conversion run over a set of seasons
pub struct Pipeline {
    config: PipelineConfig,
    handler: Arc<dyn GameHandler>,
    observer: Arc<dyn PipelineObserver>,
    cancel: CancellationToken,
}

impl Pipeline {
    /// Create a pipeline converting games with a [`GameConverter`]
    pub fn new(config: PipelineConfig) -> Self {
        let handler = Arc::new(GameConverter::from_config(&config));
        Pipeline {
            config,
            handler,
            observer: Arc::new(SilentObserver),
            cancel: CancellationToken::new(),
        }
    }

    /// Report progress to `observer`
    pub fn with_observer(mut self, observer: Arc<dyn PipelineObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Process games with a custom handler
    pub fn with_handler(mut self, handler: Arc<dyn GameHandler>) -> Self {
        self.handler = handler;
        self
    }

    /// Token that cancels this pipeline's run when triggered
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert every game of the configured seasons.
    ///
    /// Returns once every discovered game has reached a terminal state.
    ///
    /// # Errors
    ///
    /// Only configuration problems and failure to start worker threads are
    /// errors; per-game failures are counted in the returned [`RunSummary`].
    pub fn run(&self) -> Result<RunSummary> {
        self.config.validate()?;

        let queue = Arc::new(WorkQueue::new());
        let summary = Arc::new(Mutex::new(RunSummary::default()));

        let mut pool = WorkerPool::spawn(
            self.config.workers,
            Arc::clone(&queue),
            Arc::clone(&self.handler),
            Arc::clone(&self.observer),
            self.cancel.clone(),
            Arc::clone(&summary),
        )?;
        log::debug!("started {} workers", pool.size());

        let source = GameJobSource::new(&self.config.data_root, self.config.seasons.clone());
        for job in source.jobs() {
            match job {
                Ok(job) => {
                    queue.enqueue(job);
                }
                Err(err) => {
                    self.observer.discovery_failed(&err);
                    summary.lock().discovery_errors += 1;
                }
            }
        }

        queue.wait_until_drained();
        pool.shutdown();

        let summary = summary.lock().clone();
        self.observer.run_finished(&summary);
        Ok(summary)
    }
}
