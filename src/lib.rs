//! SportVU Tracking Log Converter
//!
//! Converts SportVU player-tracking logs (one XML document per quarter) into
//! one flat CSV file per game. Games are discovered under
//! `<data_root>/<season>/<game_id>/Player Tracking/` and processed
//! concurrently by a fixed pool of worker threads.
//!
//! # Features
//! - Lazy, restartable discovery of games across seasons
//! - Streaming quick-xml parsing of quarter documents
//! - Fixed-width 36-column rows (ball plus five players per team)
//! - Atomic per-game CSV writes; a failed game never leaves a partial file
//! - Per-game failure isolation, including handler panics
//! - Cooperative cancellation
//!
//! # Crate feature flags
//! - `cli` (default): the `sportvu` binary (enables `clap` and `env_logger`)
//!
//! # Quick start
//! ```no_run
//! use std::sync::Arc;
//! use sportvu::{LogObserver, Pipeline, PipelineConfig};
//!
//! let mut config = PipelineConfig::new("/data/sportvu", vec!["2015-2016".into()]);
//! config.workers = 4;
//!
//! let summary = Pipeline::new(config)
//!     .with_observer(Arc::new(LogObserver))
//!     .run()
//!     .unwrap();
//! println!("{summary}");
//! ```

#![warn(missing_docs)]

pub mod config; // Run Settings
pub mod convert; // Per-Game Conversion
pub mod discovery; // Game Discovery
pub mod error; // Error Types
pub mod observer; // Progress Reporting
pub mod pipeline; // Pipeline Driver
pub mod pool; // Worker Threads
pub mod queue; // Shared Work Queue
pub mod report; // Game Reports & Run Summary
pub mod row; // Fixed-Width Rows
pub mod sink; // CSV Output
pub mod tracking; // Quarter Document Parsing

// Public API exports
pub use config::{LocationPolicy, PipelineConfig};
pub use convert::{ConvertedGame, GameConverter};
pub use discovery::{GameJob, GameJobSource};
pub use error::{Result, TrackingError};
pub use observer::{LogObserver, PipelineObserver, SilentObserver};
pub use pipeline::Pipeline;
pub use pool::{CancellationToken, GameHandler, WorkerPool};
pub use queue::WorkQueue;
pub use report::{GameReport, GameStatus, RunSummary};
pub use row::{OutputRow, RowBuilder, HEADER, ROW_WIDTH};
pub use sink::CsvSink;
pub use tracking::{
    BallLocation, GameParser, Moment, PlayerLocation, QuarterDocument, QuarterHeader,
};
