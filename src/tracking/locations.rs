//! `locations` attribute parsing
//!
//! A moment's `locations` attribute is a `;`-separated list of
//! `team_id,player_id,x,y,z` entries. Team id `-1` marks the ball.

use super::{BallLocation, PlayerLocation};
use crate::error::{Result, TrackingError};

/// Team id marking an entry as the ball rather than a player
pub const BALL_TEAM_ID: &str = "-1";

/// Number of comma-separated fields in one entry
pub const LOCATION_FIELDS: usize = 5;

/// One parsed entry of a `locations` attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    /// Team id, or `-1` for the ball
    pub team_id: String,
    /// Player id (empty for the ball)
    pub player_id: String,
    /// X coordinate
    pub x: String,
    /// Y coordinate
    pub y: String,
    /// Z coordinate (only meaningful for the ball)
    pub z: String,
}

impl LocationEntry {
    /// Split one entry on `,`, requiring exactly [`LOCATION_FIELDS`] fields
    pub fn parse(entry: &str) -> Result<Self> {
        let fields: Vec<&str> = entry.split(',').collect();
        if fields.len() != LOCATION_FIELDS {
            return Err(TrackingError::MalformedLocationEntry {
                entry: entry.to_string(),
                expected: LOCATION_FIELDS,
                found: fields.len(),
            });
        }

        let field = |index: usize| fields[index].to_string();
        Ok(LocationEntry {
            team_id: field(0),
            player_id: field(1),
            x: field(2),
            y: field(3),
            z: field(4),
        })
    }
}

/// Which side of the partition an entry landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Home team player
    Home,
    /// Visiting team player
    Away,
    /// The ball
    Ball,
    /// Unknown team id, discarded
    Dropped,
}

/// Classify a team id against the game's home and away ids.
///
/// Total and disjoint: every id maps to exactly one [`Slot`].
pub fn classify(team_id: &str, home_id: &str, away_id: &str) -> Slot {
    if team_id == home_id {
        Slot::Home
    } else if team_id == away_id {
        Slot::Away
    } else if team_id == BALL_TEAM_ID {
        Slot::Ball
    } else {
        Slot::Dropped
    }
}

/// Entries of one moment, partitioned by team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionedLocations {
    /// Home players in encounter order
    pub home: Vec<PlayerLocation>,
    /// Visiting players in encounter order
    pub away: Vec<PlayerLocation>,
    /// Ball readings in encounter order
    pub ball: Vec<BallLocation>,
    /// Entries whose team id matched nothing
    pub dropped: usize,
    /// Entries that failed to parse (lenient mode only)
    pub malformed: Vec<String>,
}

/// Split a `locations` attribute and partition its entries.
///
/// Empty entries (such as the one after a trailing `;`) are ignored. With
/// `strict` set, the first malformed entry is returned as an error; otherwise
/// malformed entries are collected in [`PartitionedLocations::malformed`] and
/// skipped.
pub fn partition_locations(
    locations: &str,
    home_id: &str,
    away_id: &str,
    strict: bool,
) -> Result<PartitionedLocations> {
    let mut parts = PartitionedLocations::default();

    for raw in locations.split(';').filter(|raw| !raw.is_empty()) {
        let entry = match LocationEntry::parse(raw) {
            Ok(entry) => entry,
            Err(err) if strict => return Err(err),
            Err(_) => {
                parts.malformed.push(raw.to_string());
                continue;
            }
        };

        match classify(&entry.team_id, home_id, away_id) {
            Slot::Home => parts.home.push(PlayerLocation::from_entry(entry)),
            Slot::Away => parts.away.push(PlayerLocation::from_entry(entry)),
            Slot::Ball => parts.ball.push(BallLocation::from_entry(entry)),
            Slot::Dropped => parts.dropped += 1,
        }
    }

    Ok(parts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_entry() {
        let entry = LocationEntry::parse("1610612737,201143,49.1,25.3,0").unwrap();
        assert_eq!(entry.team_id, "1610612737");
        assert_eq!(entry.player_id, "201143");
        assert_eq!(entry.x, "49.1");
        assert_eq!(entry.y, "25.3");
        assert_eq!(entry.z, "0");
    }

    #[test]
    fn test_parse_ball_entry_with_empty_player() {
        let entry = LocationEntry::parse("-1,,5,5,10").unwrap();
        assert_eq!(entry.team_id, BALL_TEAM_ID);
        assert_eq!(entry.player_id, "");
        assert_eq!(entry.z, "10");
    }

    #[test]
    fn test_parse_wrong_arity() {
        match LocationEntry::parse("1,P1,10,20") {
            Err(TrackingError::MalformedLocationEntry { entry, found, .. }) => {
                assert_eq!(entry, "1,P1,10,20");
                assert_eq!(found, 4);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(
            LocationEntry::parse("1,P1,10,20,0,9"),
            Err(TrackingError::MalformedLocationEntry { found: 6, .. })
        ));
        assert_eq!(LOCATION_FIELDS, 5);
    }

    #[test]
    fn test_classify_is_disjoint() {
        assert_eq!(classify("1", "1", "2"), Slot::Home);
        assert_eq!(classify("2", "1", "2"), Slot::Away);
        assert_eq!(classify("-1", "1", "2"), Slot::Ball);
        assert_eq!(classify("3", "1", "2"), Slot::Dropped);
        assert_eq!(classify("", "1", "2"), Slot::Dropped);
    }

    #[test]
    fn test_partition_single_moment() {
        let parts =
            partition_locations("1,P1,10,20,0;2,P2,15,25,0;-1,,5,5,10", "1", "2", true).unwrap();

        assert_eq!(parts.home, vec![PlayerLocation::new("P1", "10", "20")]);
        assert_eq!(parts.away, vec![PlayerLocation::new("P2", "15", "25")]);
        assert_eq!(parts.ball, vec![BallLocation::new("5", "5", "10")]);
        assert_eq!(parts.dropped, 0);
    }

    #[test]
    fn test_partition_drops_foreign_team() {
        let parts = partition_locations("1,P1,1,1,0;99,PX,2,2,0;2,P2,3,3,0", "1", "2", true).unwrap();

        assert_eq!(parts.dropped, 1);
        let everyone: Vec<_> = parts.home.iter().chain(parts.away.iter()).collect();
        assert!(everyone.iter().all(|p| p.player_id != "PX"));
    }

    #[test]
    fn test_partition_ignores_empty_entries() {
        let parts = partition_locations("1,P1,1,1,0;;", "1", "2", true).unwrap();
        assert_eq!(parts.home.len(), 1);
        assert!(parts.malformed.is_empty());

        let empty = partition_locations("", "1", "2", true).unwrap();
        assert_eq!(empty, PartitionedLocations::default());
    }

    #[test]
    fn test_partition_lenient_collects_malformed() {
        let parts =
            partition_locations("1,P1,1,1,0;garbage;2,P2,3,3,0", "1", "2", false).unwrap();

        assert_eq!(parts.home.len(), 1);
        assert_eq!(parts.away.len(), 1);
        assert_eq!(parts.malformed, vec!["garbage".to_string()]);
    }

    #[test]
    fn test_partition_strict_rejects_malformed() {
        let result = partition_locations("1,P1,1,1,0;garbage", "1", "2", true);
        assert!(matches!(
            result,
            Err(TrackingError::MalformedLocationEntry { found: 1, .. })
        ));
    }
}
