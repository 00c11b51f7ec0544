//! Fixed-width row building
//!
//! Every output row has [`ROW_WIDTH`] fields: quarter, game clock, shot clock,
//! one ball slot and five slots per team, three fields per slot. Short lists
//! are padded with empty triples; lists longer than their slot count are
//! truncated and the overflow is reported back to the caller.

use crate::tracking::Moment;

/// Fields per slot
pub const SLOT_WIDTH: usize = 3;
/// Ball slots per row
pub const BALL_SLOTS: usize = 1;
/// Home player slots per row
pub const HOME_SLOTS: usize = 5;
/// Visiting player slots per row
pub const AWAY_SLOTS: usize = 5;

const PREFIX_WIDTH: usize = 3;
const BALL_START: usize = PREFIX_WIDTH;
const HOME_START: usize = BALL_START + BALL_SLOTS * SLOT_WIDTH;
const AWAY_START: usize = HOME_START + HOME_SLOTS * SLOT_WIDTH;

/// Number of fields in every row
pub const ROW_WIDTH: usize = AWAY_START + AWAY_SLOTS * SLOT_WIDTH;

/// CSV header, one name per field
#[rustfmt::skip]
pub const HEADER: [&str; ROW_WIDTH] = [
    "quarter", "game_clock", "shot_clock", "ball_x", "ball_y", "ball_z",
    "h1_id", "h1_x", "h1_y",
    "h2_id", "h2_x", "h2_y",
    "h3_id", "h3_x", "h3_y",
    "h4_id", "h4_x", "h4_y",
    "h5_id", "h5_x", "h5_y",
    "a1_id", "a1_x", "a1_y",
    "a2_id", "a2_x", "a2_y",
    "a3_id", "a3_x", "a3_y",
    "a4_id", "a4_x", "a4_y",
    "a5_id", "a5_x", "a5_y",
];

/// One CSV row; always exactly [`ROW_WIDTH`] fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRow {
    fields: Vec<String>,
}

impl OutputRow {
    /// All fields in column order
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Ball segment (x, y, z)
    pub fn ball(&self) -> &[String] {
        &self.fields[BALL_START..HOME_START]
    }

    /// Home segment, five (id, x, y) triples
    pub fn home(&self) -> &[String] {
        &self.fields[HOME_START..AWAY_START]
    }

    /// Visiting segment, five (id, x, y) triples
    pub fn away(&self) -> &[String] {
        &self.fields[AWAY_START..ROW_WIDTH]
    }
}

/// Entries cut off because a list was longer than its slot count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotOverflow {
    /// Extra ball readings
    pub ball: usize,
    /// Extra home players
    pub home: usize,
    /// Extra visiting players
    pub away: usize,
}

impl SlotOverflow {
    /// True when nothing was truncated
    pub fn is_empty(&self) -> bool {
        self.ball == 0 && self.home == 0 && self.away == 0
    }
}

/// Pad (or truncate) a list of triples to exactly `target` slots.
///
/// Appends `target * SLOT_WIDTH` fields to `out` and returns how many
/// triples did not fit.
pub fn pad_slots<'a, I>(out: &mut Vec<String>, triples: I, target: usize) -> usize
where
    I: IntoIterator<Item = [&'a str; SLOT_WIDTH]>,
{
    let mut used = 0;
    let mut overflow = 0;

    for triple in triples {
        if used == target {
            overflow += 1;
            continue;
        }
        out.extend(triple.iter().map(|field| field.to_string()));
        used += 1;
    }

    out.extend(std::iter::repeat_with(String::new).take((target - used) * SLOT_WIDTH));
    overflow
}

/// Builds fixed-width rows from moments
pub struct RowBuilder;

impl RowBuilder {
    /// Build the row for one moment
    pub fn build(moment: &Moment) -> (OutputRow, SlotOverflow) {
        let mut fields = Vec::with_capacity(ROW_WIDTH);
        fields.push(moment.quarter.clone());
        fields.push(moment.game_clock.clone());
        fields.push(moment.shot_clock.clone());

        let overflow = SlotOverflow {
            ball: pad_slots(
                &mut fields,
                moment.ball.iter().map(|b| [b.x.as_str(), b.y.as_str(), b.z.as_str()]),
                BALL_SLOTS,
            ),
            home: pad_slots(
                &mut fields,
                moment
                    .home_players
                    .iter()
                    .map(|p| [p.player_id.as_str(), p.x.as_str(), p.y.as_str()]),
                HOME_SLOTS,
            ),
            away: pad_slots(
                &mut fields,
                moment
                    .away_players
                    .iter()
                    .map(|p| [p.player_id.as_str(), p.x.as_str(), p.y.as_str()]),
                AWAY_SLOTS,
            ),
        };

        debug_assert_eq!(fields.len(), ROW_WIDTH);
        (OutputRow { fields }, overflow)
    }
}
