//! Per-game reports and the run summary

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Terminal state of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// CSV written
    Done,
    /// No tracking data; nothing written
    Skipped,
    /// Parse or write error; nothing written
    Failed,
    /// Not processed because the run was cancelled
    Cancelled,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStatus::Done => "done",
            GameStatus::Skipped => "skipped",
            GameStatus::Failed => "failed",
            GameStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Outcome of processing one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    /// Game identifier
    pub game_id: String,
    /// Terminal state
    pub status: GameStatus,
    /// Reason for a skip or failure
    pub detail: Option<String>,
    /// CSV written (done games only)
    pub output: Option<PathBuf>,
    /// Quarter documents parsed
    pub quarters: usize,
    /// Rows written
    pub rows: usize,
    /// Wall time spent on the game
    pub elapsed: Duration,
    /// Non-fatal problems found while converting
    pub warnings: Vec<String>,
}

impl GameReport {
    fn with_status(game_id: &str, status: GameStatus, detail: Option<String>) -> Self {
        GameReport {
            game_id: game_id.to_string(),
            status,
            detail,
            output: None,
            quarters: 0,
            rows: 0,
            elapsed: Duration::ZERO,
            warnings: Vec::new(),
        }
    }

    /// Report for a game whose CSV was written
    pub fn done(game_id: &str, output: PathBuf, quarters: usize, rows: usize) -> Self {
        GameReport {
            output: Some(output),
            quarters,
            rows,
            ..Self::with_status(game_id, GameStatus::Done, None)
        }
    }

    /// Report for a game without tracking data
    pub fn skipped(game_id: &str, reason: impl Into<String>) -> Self {
        Self::with_status(game_id, GameStatus::Skipped, Some(reason.into()))
    }

    /// Report for a game that could not be converted
    pub fn failed(game_id: &str, reason: impl Into<String>) -> Self {
        Self::with_status(game_id, GameStatus::Failed, Some(reason.into()))
    }

    /// Report for a game left unprocessed after cancellation
    pub fn cancelled(game_id: &str) -> Self {
        Self::with_status(game_id, GameStatus::Cancelled, None)
    }
}

/// Counts of game outcomes for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Games written
    pub done: usize,
    /// Games without tracking data
    pub skipped: usize,
    /// Games that failed
    pub failed: usize,
    /// Games not processed because of cancellation
    pub cancelled: usize,
    /// Failed game ids with their error messages, sorted by game id
    pub failures: Vec<(String, String)>,
    /// Season directories that could not be listed
    pub discovery_errors: usize,
}

impl RunSummary {
    /// Fold one game report into the counts
    pub fn record(&mut self, report: &GameReport) {
        match report.status {
            GameStatus::Done => self.done += 1,
            GameStatus::Skipped => self.skipped += 1,
            GameStatus::Cancelled => self.cancelled += 1,
            GameStatus::Failed => {
                self.failed += 1;
                let reason = report.detail.clone().unwrap_or_default();
                let at = self
                    .failures
                    .partition_point(|(id, _)| id.as_str() <= report.game_id.as_str());
                self.failures.insert(at, (report.game_id.clone(), reason));
            }
        }
    }

    /// Total games seen
    pub fn total(&self) -> usize {
        self.done + self.skipped + self.failed + self.cancelled
    }

    /// True when no game failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games: {} done, {} skipped, {} failed",
            self.total(),
            self.done,
            self.skipped,
            self.failed
        )?;
        if self.cancelled > 0 {
            write!(f, ", {} cancelled", self.cancelled)?;
        }
        if self.discovery_errors > 0 {
            write!(f, ", {} unreadable seasons", self.discovery_errors)?;
        }
        Ok(())
    }
}
