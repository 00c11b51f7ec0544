//! Tracking Data Domain
//!
//! Locates a game's per-quarter XML documents and parses them into
//! [`QuarterDocument`]s: header metadata plus one [`Moment`] per sampled
//! instant, with locations already partitioned into home, away and ball.
//!
//! # Module Structure
//!
//! - [`document`] - quick-xml parsing of one quarter document
//! - [`locations`] - splitting and partitioning of the `locations` attribute

pub mod document;
pub mod locations;

pub use document::{parse_quarter_document, parse_quarter_xml};
pub use locations::{
    classify, partition_locations, LocationEntry, PartitionedLocations, Slot, BALL_TEAM_ID,
};

use crate::config::LocationPolicy;
use crate::discovery::GameJob;
use crate::error::{Result, TrackingError};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Player position within one moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerLocation {
    /// Player id
    pub player_id: String,
    /// X coordinate
    pub x: String,
    /// Y coordinate
    pub y: String,
}

impl PlayerLocation {
    /// Create a player location from raw text fields
    pub fn new(player_id: impl Into<String>, x: impl Into<String>, y: impl Into<String>) -> Self {
        PlayerLocation {
            player_id: player_id.into(),
            x: x.into(),
            y: y.into(),
        }
    }

    pub(crate) fn from_entry(entry: LocationEntry) -> Self {
        PlayerLocation {
            player_id: entry.player_id,
            x: entry.x,
            y: entry.y,
        }
    }
}

/// Ball position within one moment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallLocation {
    /// X coordinate
    pub x: String,
    /// Y coordinate
    pub y: String,
    /// Height
    pub z: String,
}

impl BallLocation {
    /// Create a ball location from raw text fields
    pub fn new(x: impl Into<String>, y: impl Into<String>, z: impl Into<String>) -> Self {
        BallLocation {
            x: x.into(),
            y: y.into(),
            z: z.into(),
        }
    }

    pub(crate) fn from_entry(entry: LocationEntry) -> Self {
        BallLocation {
            x: entry.x,
            y: entry.y,
            z: entry.z,
        }
    }
}

/// One sampled instant of ball and player positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    /// Quarter (period) number, as text
    pub quarter: String,
    /// Game clock, as text
    pub game_clock: String,
    /// Shot clock, as text
    pub shot_clock: String,
    /// Ball readings (one expected)
    pub ball: Vec<BallLocation>,
    /// Home players (up to five expected)
    pub home_players: Vec<PlayerLocation>,
    /// Visiting players (up to five expected)
    pub away_players: Vec<PlayerLocation>,
}

/// Header fields identifying the game a document belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterHeader {
    /// `game-type[@id]`
    pub game_type: String,
    /// `home-team/team-code[@id]`
    pub home_id: String,
    /// `visiting-team/team-code[@id]`
    pub away_id: String,
}

/// One parsed quarter document
#[derive(Debug, Clone)]
pub struct QuarterDocument {
    /// Source file
    pub path: PathBuf,
    /// Game identification
    pub header: QuarterHeader,
    /// `sequences[@period]`
    pub period: String,
    /// Moments in document order
    pub moments: Vec<Moment>,
    /// Entries with an unknown team id
    pub dropped_entries: usize,
    /// Entries skipped because they did not parse (lenient policy)
    pub malformed_entries: Vec<String>,
}

/// Locates and parses the quarter documents of one game
#[derive(Debug, Clone, Copy, Default)]
pub struct GameParser {
    policy: LocationPolicy,
}

impl GameParser {
    /// Create a parser applying `policy` to malformed location entries
    pub fn new(policy: LocationPolicy) -> Self {
        GameParser { policy }
    }

    /// Policy for malformed location entries
    pub fn policy(&self) -> LocationPolicy {
        self.policy
    }

    /// List the game's quarter documents in file-name order.
    ///
    /// # Errors
    ///
    /// [`TrackingError::MissingData`] when the tracking directory is absent or
    /// holds no `.xml` files.
    pub fn quarter_documents(&self, job: &GameJob) -> Result<Vec<PathBuf>> {
        let tracking_dir = job.tracking_dir();
        if !tracking_dir.is_dir() {
            return Err(TrackingError::MissingData(format!(
                "game {} has no tracking folder",
                job.game_id
            )));
        }

        let mut quarters = Vec::new();
        for entry in WalkDir::new(&tracking_dir)
            .follow_links(true)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_xml(entry.path()) {
                quarters.push(entry.into_path());
            }
        }

        if quarters.is_empty() {
            return Err(TrackingError::MissingData(format!(
                "game {} has no tracking data files",
                job.game_id
            )));
        }
        Ok(quarters)
    }

    /// Parse one quarter document
    pub fn parse_quarter(&self, path: &Path) -> Result<QuarterDocument> {
        parse_quarter_document(path, self.policy)
    }
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}
