//! Persistence gateway over the catalogued schema.
//!
//! # Responsibility
//! - Define the generic keyed record-store contract.
//! - Isolate SQL generation and engine error mapping from callers.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `AppendOnly`,
//!   `Constraint`) in addition to DB transport errors.
//! - Stores refuse connections that are not migrated to the latest schema.

pub mod constraint;
pub mod record_store;

pub use constraint::{ConstraintKind, ConstraintViolation};
pub use record_store::{RecordStore, RepoError, RepoResult, SqliteRecordStore};
