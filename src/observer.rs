//! Progress reporting
//!
//! Pipeline components report through an injected [`PipelineObserver`]
//! instead of a process-wide logger, so tests can capture events directly.
//! [`LogObserver`] forwards everything to the `log` facade.

use crate::discovery::GameJob;
use crate::error::TrackingError;
use crate::report::{GameReport, GameStatus, RunSummary};
use log::{error, info, warn};

/// Receives pipeline events. Called concurrently from worker threads.
pub trait PipelineObserver: Send + Sync {
    /// A worker picked up `job`; `remaining` jobs are still queued
    fn game_started(&self, _job: &GameJob, _remaining: usize) {}

    /// A game reached a terminal state
    fn game_finished(&self, _report: &GameReport) {}

    /// A season directory could not be listed
    fn discovery_failed(&self, _error: &TrackingError) {}

    /// All jobs drained
    fn run_finished(&self, _summary: &RunSummary) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentObserver;

impl PipelineObserver for SilentObserver {}

/// Observer writing through the `log` crate
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PipelineObserver for LogObserver {
    fn game_started(&self, job: &GameJob, remaining: usize) {
        info!("game_id: {}, remaining: {}", job.game_id, remaining);
    }

    fn game_finished(&self, report: &GameReport) {
        for warning in &report.warnings {
            warn!("game_id {}: {}", report.game_id, warning);
        }

        let detail = report.detail.as_deref().unwrap_or_default();
        match report.status {
            GameStatus::Done => info!(
                "game_id {} quarters: {}, rows: {}, time: {:.2?}",
                report.game_id, report.quarters, report.rows, report.elapsed
            ),
            GameStatus::Skipped => info!("game_id {} skipped: {}", report.game_id, detail),
            GameStatus::Failed => error!("game_id {} failed: {}", report.game_id, detail),
            GameStatus::Cancelled => info!("game_id {} cancelled", report.game_id),
        }
    }

    fn discovery_failed(&self, error: &TrackingError) {
        error!("{error}");
    }

    fn run_finished(&self, summary: &RunSummary) {
        info!("done! {summary}");
    }
}
