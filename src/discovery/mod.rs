//! Game Discovery Domain
//!
//! Enumerates `<data_root>/<season>/<game_id>` directories and turns each
//! into a [`GameJob`]. Enumeration is lazy and restartable: calling
//! [`GameJobSource::jobs`] again walks the filesystem from scratch.

use crate::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the per-game subdirectory holding quarter documents
pub const TRACKING_DIR_NAME: &str = "Player Tracking";

/// One game to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameJob {
    /// Game identifier (the game directory name)
    pub game_id: String,
    /// Path of the game directory
    pub game_dir: PathBuf,
    /// Season the game was found under
    pub season: String,
}

impl GameJob {
    /// Create a job for a game directory
    pub fn new(
        game_id: impl Into<String>,
        game_dir: impl Into<PathBuf>,
        season: impl Into<String>,
    ) -> Self {
        GameJob {
            game_id: game_id.into(),
            game_dir: game_dir.into(),
            season: season.into(),
        }
    }

    /// Directory expected to hold this game's quarter documents
    pub fn tracking_dir(&self) -> PathBuf {
        self.game_dir.join(TRACKING_DIR_NAME)
    }
}

/// Produces game jobs for a list of seasons under a data root
#[derive(Debug, Clone)]
pub struct GameJobSource {
    data_root: PathBuf,
    seasons: Vec<String>,
}

impl GameJobSource {
    /// Create a source for the given seasons
    pub fn new(data_root: impl Into<PathBuf>, seasons: Vec<String>) -> Self {
        GameJobSource {
            data_root: data_root.into(),
            seasons,
        }
    }

    /// Data root the seasons live under
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Lazily enumerate game jobs, season by season, in file-name order.
    ///
    /// Only directories are reported as games. A season that cannot be read
    /// yields one `Err` item and enumeration moves on to the next season.
    pub fn jobs(&self) -> GameJobs<'_> {
        GameJobs {
            data_root: &self.data_root,
            seasons: self.seasons.iter(),
            current: None,
        }
    }
}

/// Iterator returned by [`GameJobSource::jobs`]
pub struct GameJobs<'a> {
    data_root: &'a Path,
    seasons: std::slice::Iter<'a, String>,
    current: Option<(&'a str, walkdir::IntoIter)>,
}

impl Iterator for GameJobs<'_> {
    type Item = Result<GameJob>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((season, entries)) = self.current.as_mut() {
                match entries.next() {
                    Some(Ok(entry)) => {
                        if !entry.file_type().is_dir() {
                            continue;
                        }
                        let game_id = entry.file_name().to_string_lossy().into_owned();
                        return Some(Ok(GameJob::new(game_id, entry.into_path(), *season)));
                    }
                    Some(Err(err)) => {
                        // An unreadable season root ends that season
                        if err.depth() == 0 {
                            self.current = None;
                        }
                        return Some(Err(err.into()));
                    }
                    None => self.current = None,
                }
            }

            let season = self.seasons.next()?;
            let entries = WalkDir::new(self.data_root.join(season))
                .follow_links(true)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
                .into_iter();
            self.current = Some((season.as_str(), entries));
        }
    }
}
