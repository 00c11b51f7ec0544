//! Quarter document parsing.
//!
//! Streams a SportVU quarter document with quick-xml and picks out:
//!
//! - `game-type[@id]`
//! - `home-team/team-code[@id]` and `visiting-team/team-code[@id]`
//! - `sequences[@period]`
//! - every `moment[@game-clock, @shot-clock, @locations]`
//!
//! The first occurrence of each header element wins. Moments are collected
//! raw and partitioned only after the whole document has been read, so the
//! header may appear anywhere in the file.

use super::locations::partition_locations;
use super::{Moment, QuarterDocument, QuarterHeader};
use crate::config::LocationPolicy;
use crate::error::{Result, TrackingError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamSide {
    Home,
    Visiting,
}

#[derive(Debug)]
struct RawMoment {
    game_clock: String,
    shot_clock: String,
    locations: String,
}

#[derive(Debug, Default)]
struct DocumentBuilder {
    game_type: Option<String>,
    home_id: Option<String>,
    away_id: Option<String>,
    period: Option<String>,
    moments: Vec<RawMoment>,
}

/// Read and parse a quarter document from disk
pub fn parse_quarter_document(path: &Path, policy: LocationPolicy) -> Result<QuarterDocument> {
    let data = fs::read(path)
        .map_err(|e| TrackingError::malformed(path, format!("failed to read file: {e}")))?;
    parse_quarter_xml(&data, path, policy)
}

/// Parse quarter document bytes. `path` is only used in error messages and
/// recorded on the result.
pub fn parse_quarter_xml(
    data: &[u8],
    path: &Path,
    policy: LocationPolicy,
) -> Result<QuarterDocument> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().trim_text(true);

    let mut builder = DocumentBuilder::default();
    let mut side: Option<TeamSide> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            TrackingError::malformed(
                path,
                format!("XML error at byte {}: {e}", reader.buffer_position()),
            )
        })?;

        match event {
            Event::Start(e) => {
                match e.local_name().as_ref() {
                    b"home-team" => side = Some(TeamSide::Home),
                    b"visiting-team" => side = Some(TeamSide::Visiting),
                    _ => {}
                }
                handle_element(&e, side, &mut builder, path)?;
            }
            Event::Empty(e) => handle_element(&e, side, &mut builder, path)?,
            Event::End(e) => {
                if matches!(e.local_name().as_ref(), b"home-team" | b"visiting-team") {
                    side = None;
                }
            }
            Event::Eof => break,
            _ => {}
        }

        buf.clear();
    }

    builder.finish(path, policy)
}

fn handle_element(
    e: &BytesStart<'_>,
    side: Option<TeamSide>,
    builder: &mut DocumentBuilder,
    path: &Path,
) -> Result<()> {
    match e.local_name().as_ref() {
        b"game-type" if builder.game_type.is_none() => {
            builder.game_type = Some(required_attribute(e, "id", path)?);
        }
        b"team-code" => match side {
            Some(TeamSide::Home) if builder.home_id.is_none() => {
                builder.home_id = Some(required_attribute(e, "id", path)?);
            }
            Some(TeamSide::Visiting) if builder.away_id.is_none() => {
                builder.away_id = Some(required_attribute(e, "id", path)?);
            }
            _ => {}
        },
        b"sequences" if builder.period.is_none() => {
            builder.period = Some(required_attribute(e, "period", path)?);
        }
        b"moment" => {
            builder.moments.push(RawMoment {
                game_clock: required_attribute(e, "game-clock", path)?,
                shot_clock: required_attribute(e, "shot-clock", path)?,
                locations: required_attribute(e, "locations", path)?,
            });
        }
        _ => {}
    }
    Ok(())
}

fn required_attribute(e: &BytesStart<'_>, name: &str, path: &Path) -> Result<String> {
    let element = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();

    let attr = e
        .try_get_attribute(name)
        .map_err(|err| {
            TrackingError::malformed(path, format!("invalid attributes on <{element}>: {err}"))
        })?
        .ok_or_else(|| {
            TrackingError::malformed(path, format!("<{element}> lacks the '{name}' attribute"))
        })?;

    let value = attr.unescape_value().map_err(|err| {
        TrackingError::malformed(path, format!("invalid '{name}' value on <{element}>: {err}"))
    })?;
    Ok(value.into_owned())
}

fn file_name_safe(value: String, field: &str, path: &Path) -> Result<String> {
    if value.contains(|c: char| c == '/' || c == '\\') {
        return Err(TrackingError::malformed(
            path,
            format!("{field} id '{value}' contains a path separator"),
        ));
    }
    Ok(value)
}

impl DocumentBuilder {
    fn finish(self, path: &Path, policy: LocationPolicy) -> Result<QuarterDocument> {
        let missing = |what: &str| TrackingError::malformed(path, format!("missing {what}"));

        let game_type = self.game_type.ok_or_else(|| missing("<game-type> element"))?;
        let home_id = self.home_id.ok_or_else(|| missing("<home-team><team-code> element"))?;
        let away_id = self
            .away_id
            .ok_or_else(|| missing("<visiting-team><team-code> element"))?;

        // Header ids end up in the output file name
        let header = QuarterHeader {
            game_type: file_name_safe(game_type, "game-type", path)?,
            home_id: file_name_safe(home_id, "home team-code", path)?,
            away_id: file_name_safe(away_id, "visiting team-code", path)?,
        };
        let period = self.period.ok_or_else(|| missing("<sequences> element"))?;

        let strict = policy == LocationPolicy::Strict;
        let mut moments = Vec::with_capacity(self.moments.len());
        let mut dropped_entries = 0;
        let mut malformed_entries = Vec::new();

        for raw in self.moments {
            let parts =
                partition_locations(&raw.locations, &header.home_id, &header.away_id, strict)?;
            dropped_entries += parts.dropped;
            malformed_entries.extend(parts.malformed);

            moments.push(Moment {
                quarter: period.clone(),
                game_clock: raw.game_clock,
                shot_clock: raw.shot_clock,
                ball: parts.ball,
                home_players: parts.home,
                away_players: parts.away,
            });
        }

        Ok(QuarterDocument {
            path: path.to_path_buf(),
            header,
            period,
            moments,
            dropped_entries,
            malformed_entries,
        })
    }
}
