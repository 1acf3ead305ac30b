//! Persisted id sequences for boards and graphs.
//!
//! # Responsibility
//! - Allocate strictly increasing counter values per sequence.
//! - Format and parse prefixed identifiers (`B<n>`, `G<n>`).
//!
//! # Invariants
//! - Both sequences start at [`SEQUENCE_START`] and are independent.
//! - An allocated value is never handed out again, even when the insert that
//!   requested it fails or the caller's transaction rolls back.
//! - Counters are rows in the `sequences` table, so they survive restarts.
//! - Values issued by this process are also tracked in memory per database,
//!   so a rolled-back counter row cannot re-issue them.

use super::{in_write_transaction, DbError, DbResult};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// First value issued by every sequence.
pub const SEQUENCE_START: i64 = 1_000_000_000_000;

static SEQUENCE_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([BG])(\d+)$").expect("valid sequence id regex"));

/// Highest value issued per (database instance token, sequence) in this process.
static ISSUED_HIGH_WATER: Lazy<Mutex<HashMap<(String, Sequence), i64>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Identifier sequences backed by the `sequences` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sequence {
    /// Mints `board.id` values.
    Board,
    /// Mints `graph.id` values.
    Graph,
}

impl Sequence {
    /// Row name in the `sequences` table.
    pub fn name(self) -> &'static str {
        match self {
            Self::Board => "board_id",
            Self::Graph => "graph_id",
        }
    }

    /// Letter prepended to allocated values.
    pub fn prefix(self) -> char {
        match self {
            Self::Board => 'B',
            Self::Graph => 'G',
        }
    }

    /// Formats one counter value as a prefixed identifier.
    pub fn format_id(self, value: i64) -> String {
        format!("{}{value}", self.prefix())
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "B" => Some(Self::Board),
            "G" => Some(Self::Graph),
            _ => None,
        }
    }
}

/// Allocates the next value of `sequence`.
///
/// In autocommit mode the allocation commits on its own, like a server-side
/// `nextval`, so a later failed insert leaves a gap instead of reissuing the
/// value. Inside an open transaction the counter update joins it; if that
/// transaction rolls back, the in-process high-water mark still moves the
/// next allocation past every value already handed out.
///
/// # Errors
/// - [`DbError::MissingSequence`] when the counter row is absent.
/// - [`DbError::Sqlite`] on engine failures (for example a busy lock).
pub fn allocate(conn: &Connection, sequence: Sequence) -> DbResult<i64> {
    let value = in_write_transaction(conn, |conn| -> DbResult<i64> {
        // The counter update takes the write lock first, so no other
        // connection can allocate between here and recording the value.
        let persisted: i64 = conn
            .query_row(
                "UPDATE sequences
                 SET next_value = next_value + 1
                 WHERE name = ?1
                 RETURNING next_value - 1;",
                [sequence.name()],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(DbError::MissingSequence(sequence.name()))?;

        let key = (instance_token(conn)?, sequence);
        let mut issued = ISSUED_HIGH_WATER
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let value = match issued.get(&key) {
            Some(&high_water) if high_water >= persisted => {
                let value = high_water + 1;
                conn.execute(
                    "UPDATE sequences SET next_value = ?2 WHERE name = ?1;",
                    params![sequence.name(), value + 1],
                )?;
                value
            }
            _ => persisted,
        };
        issued.insert(key, value);
        Ok(value)
    })?;

    debug!(
        "event=sequence_allocate module=db status=ok sequence={} value={}",
        sequence.name(),
        value
    );
    Ok(value)
}

fn instance_token(conn: &Connection) -> DbResult<String> {
    conn.query_row("SELECT token FROM sequence_instance LIMIT 1;", [], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or(DbError::MissingSequence("sequence_instance"))
}

/// Allocates the next value of `sequence` and formats it as an identifier.
pub fn allocate_id(conn: &Connection, sequence: Sequence) -> DbResult<String> {
    allocate(conn, sequence).map(|value| sequence.format_id(value))
}

/// Returns the value the next allocation will hand out, without consuming it.
pub fn peek_next(conn: &Connection, sequence: Sequence) -> DbResult<i64> {
    let persisted: i64 = conn
        .query_row(
            "SELECT next_value FROM sequences WHERE name = ?1;",
            [sequence.name()],
            |row| row.get(0),
        )
        .optional()?
        .ok_or(DbError::MissingSequence(sequence.name()))?;

    let key = (instance_token(conn)?, sequence);
    let issued = ISSUED_HIGH_WATER
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Ok(issued
        .get(&key)
        .map_or(persisted, |high_water| persisted.max(high_water + 1)))
}

/// Splits a prefixed identifier into its sequence and numeric value.
///
/// Returns `None` for ids that do not match `^[BG]\d+$` or overflow `i64`.
pub fn parse_sequence_id(id: &str) -> Option<(Sequence, i64)> {
    let captures = SEQUENCE_ID_RE.captures(id)?;
    let sequence = Sequence::from_prefix(captures.get(1)?.as_str())?;
    let value = captures.get(2)?.as_str().parse::<i64>().ok()?;
    Some((sequence, value))
}
