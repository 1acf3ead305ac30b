//! Entity structs and the record contract that binds them to the catalog.
//!
//! # Responsibility
//! - Define one struct per table with fields in declared column order.
//! - Convert between structs, bound SQL parameters and result rows.
//!
//! # Invariants
//! - `Record::values()` yields exactly one value per catalog column, in order.
//! - Unset generated or defaulted columns are `None` until persisted.
//! - Denormalized counters are plain fields; callers keep them consistent.

use crate::schema::TableDef;
use rusqlite::types::{ToSqlOutput, Value};
use rusqlite::{Row, ToSql};
use serde_json::Value as JsonValue;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod account;
pub mod billing;
pub mod content;
pub mod discussion;
pub mod equity;
pub mod notification;

/// Epoch milliseconds, UTC.
pub type EpochMillis = i64;

/// One column value ready to bind or project.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
    Json(JsonValue),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Converts into the JSON shape used by record projection.
    pub fn into_json(self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(value) => JsonValue::Bool(value),
            Self::Integer(value) => JsonValue::from(value),
            Self::Real(value) => serde_json::Number::from_f64(value)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Self::Text(value) => JsonValue::String(value),
            Self::Json(value) => value,
        }
    }
}

/// SQLite stores NaN as NULL, so non-finite reals are refused at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonFiniteReal(pub f64);

impl Display for NonFiniteReal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "non-finite real value {} cannot be stored", self.0)
    }
}

impl Error for NonFiniteReal {}

impl ToSql for FieldValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let value = match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Integer(i64::from(*value)),
            Self::Integer(value) => Value::Integer(*value),
            Self::Real(value) if !value.is_finite() => {
                return Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                    NonFiniteReal(*value),
                )));
            }
            Self::Real(value) => Value::Real(*value),
            Self::Text(value) => Value::Text(value.clone()),
            Self::Json(value) => Value::Text(value.to_string()),
        };
        Ok(ToSqlOutput::Owned(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Primary-key shapes accepted by keyed lookups.
pub trait KeyValues {
    /// Key components in primary-key order.
    fn key_values(&self) -> Vec<FieldValue>;
}

impl KeyValues for String {
    fn key_values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Text(self.clone())]
    }
}

impl KeyValues for i64 {
    fn key_values(&self) -> Vec<FieldValue> {
        vec![FieldValue::Integer(*self)]
    }
}

impl KeyValues for (String, String) {
    fn key_values(&self) -> Vec<FieldValue> {
        vec![self.0.clone().into(), self.1.clone().into()]
    }
}

impl KeyValues for (String, String, String) {
    fn key_values(&self) -> Vec<FieldValue> {
        vec![
            self.0.clone().into(),
            self.1.clone().into(),
            self.2.clone().into(),
        ]
    }
}

/// Binds an entity struct to its catalog table.
pub trait Record: Sized {
    /// Primary-key type used by keyed lookups.
    type Key: KeyValues;

    /// Catalog entry for the backing table.
    const TABLE: &'static TableDef;

    /// Column values in declared column order.
    fn values(&self) -> Vec<FieldValue>;

    /// Builds a record from a row selected with every catalog column.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Builds a `(String, String, String)` key from borrowed parts.
pub fn key3(
    a: impl Into<String>,
    b: impl Into<String>,
    c: impl Into<String>,
) -> (String, String, String) {
    (a.into(), b.into(), c.into())
}

/// Builds a `(String, String)` key from borrowed parts.
pub fn key2(a: impl Into<String>, b: impl Into<String>) -> (String, String) {
    (a.into(), b.into())
}
