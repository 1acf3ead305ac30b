//! Classification of SQLite constraint failures.
//!
//! # Invariants
//! - Only `SQLITE_CONSTRAINT*` failures become [`ConstraintViolation`]s; every
//!   other engine error passes through unchanged.
//! - Column names are taken from the engine message when it reports them
//!   (`UNIQUE constraint failed: account.email`); foreign-key and named check
//!   failures carry none.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{ffi, ErrorCode};
use std::error::Error;
use std::fmt::{Display, Formatter};

static QUALIFIED_COLUMN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\.(\w+)").expect("valid qualified column regex"));

/// Constraint family reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    PrimaryKey,
    NotNull,
    ForeignKey,
    Check,
    Other,
}

impl ConstraintKind {
    fn from_extended_code(code: i32) -> Self {
        match code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => Self::Unique,
            ffi::SQLITE_CONSTRAINT_PRIMARYKEY => Self::PrimaryKey,
            ffi::SQLITE_CONSTRAINT_NOTNULL => Self::NotNull,
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => Self::ForeignKey,
            ffi::SQLITE_CONSTRAINT_CHECK => Self::Check,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::PrimaryKey => "primary_key",
            Self::NotNull => "not_null",
            Self::ForeignKey => "foreign_key",
            Self::Check => "check",
            Self::Other => "other",
        }
    }
}

/// A write rejected by a declared constraint. The statement had no effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintViolation {
    /// Table the failed statement targeted.
    pub table: &'static str,
    pub kind: ConstraintKind,
    /// Offending columns, when the engine names them.
    pub columns: Vec<String>,
    /// Raw engine message.
    pub message: String,
}

impl Display for ConstraintViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} constraint violated on `{}`",
            self.kind.as_str(),
            self.table
        )?;
        if !self.columns.is_empty() {
            write!(f, " ({})", self.columns.join(", "))?;
        }
        write!(f, ": {}", self.message)
    }
}

impl Error for ConstraintViolation {}

/// Extracts a constraint violation from an engine error, or hands the error
/// back untouched.
pub fn classify_constraint(
    table: &'static str,
    err: rusqlite::Error,
) -> Result<ConstraintViolation, rusqlite::Error> {
    match err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            let message = message.unwrap_or_else(|| failure.to_string());
            let columns = QUALIFIED_COLUMN_RE
                .captures_iter(&message)
                .map(|captures| captures[2].to_string())
                .collect();
            Ok(ConstraintViolation {
                table,
                kind: ConstraintKind::from_extended_code(failure.extended_code),
                columns,
                message,
            })
        }
        other => Err(other),
    }
}
