//! Record projection into plain column-to-value mappings.
//!
//! # Invariants
//! - Keys are exactly the table's declared columns, in declared order.
//! - Null columns are kept as JSON `null`.
//! - Projection is pure and reads only the in-memory record.

use crate::model::Record;
use serde_json::{Map, Value as JsonValue};

/// Insertion-ordered mapping from column name to value.
pub type RecordMap = Map<String, JsonValue>;

/// Projects one record into a mapping keyed by column name.
pub fn to_mapping<R: Record>(record: &R) -> RecordMap {
    R::TABLE
        .columns
        .iter()
        .zip(record.values())
        .map(|(column, value)| (column.name.to_string(), value.into_json()))
        .collect()
}

/// Projects every record of a slice, preserving slice order.
pub fn to_mappings<R: Record>(records: &[R]) -> Vec<RecordMap> {
    records.iter().map(to_mapping).collect()
}
