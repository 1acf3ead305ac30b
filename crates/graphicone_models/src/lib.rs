//! Relational data model for the graphicone platform.
//!
//! This crate is the single source of truth for the persisted schema:
//! tables, keys, defaults, foreign-key actions and id sequences, plus the
//! record types and generic persistence that sit on top of them.

pub mod db;
pub mod logging;
pub mod model;
pub mod projection;
pub mod repo;
pub mod schema;

pub use db::sequence::{Sequence, SEQUENCE_START};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, flush_logging, init_logging, logging_status};
pub use model::{EpochMillis, FieldValue, Record};
pub use projection::{to_mapping, to_mappings, RecordMap};
pub use repo::{
    ConstraintKind, ConstraintViolation, RecordStore, RepoError, RepoResult, SqliteRecordStore,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the models crate version.
pub fn models_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
