//! CSV output
//!
//! One file per game, named `<game_id>_<game_type>_<home_id>_<away_id>.csv`.
//! Rows are written to a temporary file in the output directory which is
//! renamed over the target only once everything has been flushed, so a
//! failed write never leaves a partial CSV behind.

use crate::error::{Result, TrackingError};
use crate::row::{OutputRow, HEADER};
use crate::tracking::QuarterHeader;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes per-game CSV files into an existing directory
#[derive(Debug, Clone)]
pub struct CsvSink {
    output_dir: PathBuf,
}

impl CsvSink {
    /// Create a sink writing into `output_dir` (which must already exist)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        CsvSink {
            output_dir: output_dir.into(),
        }
    }

    /// Output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Target path for a game
    pub fn output_path(&self, game_id: &str, header: &QuarterHeader) -> PathBuf {
        let file_name = format!(
            "{}_{}_{}_{}.csv",
            game_id, header.game_type, header.home_id, header.away_id
        );
        self.output_dir.join(file_name)
    }

    /// Write the header and all rows for one game, replacing any previous file.
    ///
    /// Returns the path written.
    pub fn write_game(
        &self,
        game_id: &str,
        header: &QuarterHeader,
        rows: &[OutputRow],
    ) -> Result<PathBuf> {
        let path = self.output_path(game_id, header);
        let fail = |e: std::io::Error| TrackingError::write_failure(&path, e);

        let mut temp_file = NamedTempFile::new_in(&self.output_dir).map_err(fail)?;
        {
            let mut writer = csv::Writer::from_writer(temp_file.as_file_mut());
            writer.write_record(HEADER).map_err(|e| fail(e.into()))?;
            for row in rows {
                writer.write_record(row.fields()).map_err(|e| fail(e.into()))?;
            }
            writer.flush().map_err(fail)?;
        }
        temp_file.as_file_mut().flush().map_err(fail)?;
        temp_file.as_file().sync_all().map_err(fail)?;

        // Rename over the target; the temp file is removed on drop if this fails
        temp_file.persist(&path).map_err(|e| fail(e.error))?;
        Ok(path)
    }
}
