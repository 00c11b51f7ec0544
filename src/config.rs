//! Pipeline configuration
//!
//! Settings can come from defaults, a JSON file, or the command line (the
//! CLI overrides file values). Call [`PipelineConfig::validate`] before
//! running a pipeline.

use crate::error::{Result, TrackingError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default number of worker threads
pub const DEFAULT_WORKERS: usize = 8;

/// Name of the output directory under the data root
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "parsed";

/// What to do with a `locations` entry that does not have five fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationPolicy {
    /// Drop the entry and record a warning for the game
    #[default]
    Lenient,
    /// Fail the whole game
    Strict,
}

/// Settings for one conversion run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory holding one subdirectory per season
    pub data_root: PathBuf,
    /// Season directory names to convert
    #[serde(default)]
    pub seasons: Vec<String>,
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Output directory; `<data_root>/parsed` when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Handling of malformed location entries
    #[serde(default)]
    pub location_policy: LocationPolicy,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

impl PipelineConfig {
    /// Create a configuration with default worker count and output directory
    pub fn new(data_root: impl Into<PathBuf>, seasons: Vec<String>) -> Self {
        PipelineConfig {
            data_root: data_root.into(),
            seasons,
            workers: DEFAULT_WORKERS,
            output_dir: None,
            location_policy: LocationPolicy::default(),
        }
    }

    /// Load a configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            TrackingError::Config(format!("failed to read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Directory the CSV files are written to
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.data_root.join(DEFAULT_OUTPUT_DIR_NAME))
    }

    /// Check the settings before a run.
    ///
    /// The output directory must already exist; it is never created here.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(TrackingError::Config("worker count must be greater than 0".into()));
        }
        if self.seasons.is_empty() {
            return Err(TrackingError::Config("at least one season is required".into()));
        }
        let output_dir = self.output_dir();
        if !output_dir.is_dir() {
            return Err(TrackingError::Config(format!(
                "output directory '{}' does not exist",
                output_dir.display()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new("/data", vec!["2015-2016".into()]);
        assert_eq!(config.workers, 8);
        assert_eq!(config.location_policy, LocationPolicy::Lenient);
        assert_eq!(config.output_dir(), PathBuf::from("/data/parsed"));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = PipelineConfig::from_json_str(
            r#"{ "data_root": "/data", "seasons": ["2015-2016"], "location_policy": "strict" }"#,
        )
        .unwrap();
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(config.seasons, vec!["2015-2016".to_string()]);
        assert_eq!(config.location_policy, LocationPolicy::Strict);
        assert!(config.output_dir.is_none());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = PipelineConfig::from_json_str("{ \"workers\": 3 }").unwrap_err();
        assert!(matches!(err, TrackingError::Config(_)));
    }

    #[test]
    fn test_validate() {
        let root = TempDir::new().unwrap();
        let mut config = PipelineConfig::new(root.path(), vec!["s".into()]);

        // parsed/ does not exist yet
        assert!(config.validate().is_err());

        std::fs::create_dir(root.path().join("parsed")).unwrap();
        assert!(config.validate().is_ok());

        config.workers = 0;
        assert!(config.validate().unwrap_err().to_string().contains("worker count"));

        config.workers = 2;
        config.seasons.clear();
        assert!(config.validate().is_err());
    }
}
