//! Static schema catalog.
//!
//! # Responsibility
//! - Describe every table: columns in declared order, nullability, defaults,
//!   primary keys, id sequences and foreign-key actions.
//! - Drive generic record persistence and projection from one description.
//!
//! # Invariants
//! - The catalog mirrors the SQL migrations exactly; drift is a test failure.
//! - Column order here is the column order of projected mappings.

use crate::db::sequence::Sequence;

pub mod catalog;

/// Logical column type and its SQLite storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    Real,
    /// Stored as 0/1.
    Boolean,
    /// Epoch milliseconds, UTC.
    Timestamp,
    /// Compact JSON text.
    Json,
}

impl ColumnType {
    /// Declared SQLite type used in the migrations.
    pub fn declared_type(self) -> &'static str {
        match self {
            Self::Text | Self::Json => "TEXT",
            Self::Integer | Self::Timestamp => "INTEGER",
            Self::Real => "REAL",
            Self::Boolean => "BOOLEAN",
        }
    }
}

/// Value supplied when an insert leaves a column unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// Constant SQL literal, e.g. `'[]'` or `0`.
    Literal(&'static str),
    /// Statement time in epoch milliseconds.
    CurrentTimestamp,
    /// Statement time plus one day, in epoch milliseconds.
    CurrentTimestampPlusDay,
    /// `INTEGER PRIMARY KEY` alias of the SQLite rowid.
    RowId,
    /// Prefixed value minted from a persisted sequence.
    Sequence(Sequence),
}

impl ColumnDefault {
    /// Whether SQLite itself stores a default expression for the column.
    pub fn is_declared_in_sql(self) -> bool {
        matches!(
            self,
            Self::Literal(_) | Self::CurrentTimestamp | Self::CurrentTimestampPlusDay
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
    pub default: Option<ColumnDefault>,
}

/// Referential action as reported by `PRAGMA foreign_key_list`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FkAction {
    Cascade,
    NoAction,
}

impl FkAction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::NoAction => "NO ACTION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
    pub on_delete: FkAction,
    pub on_update: FkAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableDef {
    pub name: &'static str,
    pub columns: &'static [ColumnDef],
    /// Primary-key columns in key order.
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKeyDef],
    /// Rows are only ever inserted.
    pub append_only: bool,
}

impl TableDef {
    /// Declared column names in order.
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn is_primary_key(&self, name: &str) -> bool {
        self.primary_key.contains(&name)
    }

    /// Sequence that mints the primary key, if any.
    pub fn sequence(&self) -> Option<(usize, Sequence)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(index, column)| match column.default {
                Some(ColumnDefault::Sequence(sequence)) => Some((index, sequence)),
                _ => None,
            })
    }

    /// Comma-separated, quoted column list for generated SQL.
    pub(crate) fn select_list(&self) -> String {
        self.columns
            .iter()
            .map(|column| quote_ident(column.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{name}\"")
}
