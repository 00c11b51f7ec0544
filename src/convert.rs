//! Per-game conversion
//!
//! [`GameConverter`] runs one game through the whole chain: locate quarter
//! documents, parse them, build fixed-width rows into a game-local buffer and
//! hand the buffer to the [`CsvSink`].

use crate::config::PipelineConfig;
use crate::discovery::GameJob;
use crate::error::{Result, TrackingError};
use crate::pool::GameHandler;
use crate::report::GameReport;
use crate::row::{OutputRow, RowBuilder, SlotOverflow};
use crate::sink::CsvSink;
use crate::tracking::{GameParser, QuarterHeader};
use std::path::PathBuf;
use std::time::Instant;

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct ConvertedGame {
    /// CSV written
    pub output: PathBuf,
    /// Header used for the file name (from the last quarter)
    pub header: QuarterHeader,
    /// Quarter documents parsed
    pub quarters: usize,
    /// Rows written
    pub rows: usize,
    /// Non-fatal problems
    pub warnings: Vec<String>,
}

/// Converts one game from quarter documents to a CSV file
#[derive(Debug, Clone)]
pub struct GameConverter {
    parser: GameParser,
    sink: CsvSink,
}

impl GameConverter {
    /// Create a converter from its parts
    pub fn new(parser: GameParser, sink: CsvSink) -> Self {
        GameConverter { parser, sink }
    }

    /// Create a converter for a pipeline configuration
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            GameParser::new(config.location_policy),
            CsvSink::new(config.output_dir()),
        )
    }

    /// Convert one game.
    ///
    /// # Errors
    ///
    /// [`TrackingError::MissingData`] when the game has no tracking data;
    /// any other error means the game failed and no file was written.
    pub fn convert(&self, job: &GameJob) -> Result<ConvertedGame> {
        let quarter_paths = self.parser.quarter_documents(job)?;

        let mut rows: Vec<OutputRow> = Vec::new();
        let mut warnings = Vec::new();
        let mut header: Option<QuarterHeader> = None;
        let mut truncated = SlotOverflow::default();
        let mut truncated_moments = 0;
        let mut malformed = Vec::new();

        for path in &quarter_paths {
            let document = self.parser.parse_quarter(path)?;

            if let Some(previous) = &header {
                if previous != &document.header {
                    warnings.push(format!(
                        "{} disagrees on game header ({} vs {}); using the later one",
                        path.display(),
                        describe(&document.header),
                        describe(previous)
                    ));
                }
            }

            rows.reserve(document.moments.len());
            for moment in &document.moments {
                let (row, overflow) = RowBuilder::build(moment);
                if !overflow.is_empty() {
                    truncated_moments += 1;
                    truncated.ball += overflow.ball;
                    truncated.home += overflow.home;
                    truncated.away += overflow.away;
                }
                rows.push(row);
            }

            malformed.extend(document.malformed_entries);
            header = Some(document.header);
        }

        let Some(header) = header else {
            return Err(TrackingError::MissingData(format!(
                "game {} has no tracking data files",
                job.game_id
            )));
        };

        if truncated_moments > 0 {
            warnings.push(format!(
                "{} moments exceeded the slot count; truncated {} ball, {} home, {} away entries",
                truncated_moments, truncated.ball, truncated.home, truncated.away
            ));
        }
        if let Some(first) = malformed.first() {
            warnings.push(format!(
                "skipped {} malformed location entries (first: '{}')",
                malformed.len(),
                first
            ));
        }

        let output = self.sink.write_game(&job.game_id, &header, &rows)?;

        Ok(ConvertedGame {
            output,
            header,
            quarters: quarter_paths.len(),
            rows: rows.len(),
            warnings,
        })
    }
}

impl GameHandler for GameConverter {
    fn process(&self, job: &GameJob) -> GameReport {
        let start = Instant::now();

        let mut report = match self.convert(job) {
            Ok(game) => {
                let mut report =
                    GameReport::done(&job.game_id, game.output, game.quarters, game.rows);
                report.warnings = game.warnings;
                report
            }
            Err(err) if err.is_missing_data() => {
                GameReport::skipped(&job.game_id, err.to_string())
            }
            Err(err) => GameReport::failed(&job.game_id, err.to_string()),
        };

        report.elapsed = start.elapsed();
        report
    }
}

fn describe(header: &QuarterHeader) -> String {
    format!(
        "game-type {}, home {}, visiting {}",
        header.game_type, header.home_id, header.away_id
    )
}
