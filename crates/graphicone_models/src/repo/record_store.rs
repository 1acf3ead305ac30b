//! Generic record persistence over the catalogued SQLite schema.
//!
//! # Responsibility
//! - Provide keyed CRUD for every [`Record`] from its [`TableDef`].
//! - Mint Board/Graph ids and fill SQL defaults on insert.
//! - Translate engine constraint failures into [`ConstraintViolation`]s.
//!
//! # Invariants
//! - Every write runs in one atomic scope; a rejected write leaves no row.
//! - Unset (`None`) columns that carry a default are never written as NULL.
//! - Append-only tables accept inserts only.
//! - Generated SQL only ever names catalogued tables and columns.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::sequence::allocate_id;
use crate::db::{in_write_transaction, DbError};
use crate::model::{FieldValue, KeyValues, Record};
use crate::repo::constraint::{classify_constraint, ConstraintViolation};
use crate::schema::catalog::ALL_TABLES;
use crate::schema::{quote_ident, ColumnDef, ColumnDefault, TableDef};
use log::{debug, warn};
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from record persistence and lookup.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Write rejected by a declared constraint.
    Constraint(ConstraintViolation),
    /// Keyed update/delete matched no row.
    NotFound { table: &'static str, key: String },
    /// Update or delete attempted on an append-only table.
    AppendOnly(&'static str),
    /// Filter named a column the table does not declare.
    UnknownColumn { table: &'static str, column: String },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Record or persisted row does not fit the catalog.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Constraint(violation) => write!(f, "{violation}"),
            Self::NotFound { table, key } => write!(f, "no `{table}` row with key ({key})"),
            Self::AppendOnly(table) => {
                write!(f, "table `{table}` is append-only; rows cannot be changed")
            }
            Self::UnknownColumn { table, column } => {
                write!(f, "table `{table}` has no column `{column}`")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "record store requires column `{column}` in table `{table}`"
            ),
            Self::InvalidData(message) => write!(f, "invalid record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Constraint(violation) => Some(violation),
            Self::NotFound { .. } => None,
            Self::AppendOnly(_) => None,
            Self::UnknownColumn { .. } => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ConstraintViolation> for RepoError {
    fn from(value: ConstraintViolation) -> Self {
        Self::Constraint(value)
    }
}

/// Keyed persistence for any catalogued record type.
pub trait RecordStore {
    /// Inserts a new row and returns it as persisted, defaults filled.
    fn insert<R: Record>(&self, record: &R) -> RepoResult<R>;
    /// Inserts, or overwrites the supplied non-key columns of the row with
    /// the same primary key in place.
    fn upsert<R: Record>(&self, record: &R) -> RepoResult<R>;
    fn get<R: Record>(&self, key: &R::Key) -> RepoResult<Option<R>>;
    /// Overwrites the non-key columns of an existing row.
    ///
    /// A `None` in a column that carries a default (for example
    /// `account.interests` or `board.graphs_count`) means "not set" and keeps
    /// the stored value; such columns cannot be cleared back to NULL here.
    fn update<R: Record>(&self, record: &R) -> RepoResult<()>;
    fn delete<R: Record>(&self, key: &R::Key) -> RepoResult<()>;
    /// All rows ordered by primary key.
    fn list<R: Record>(&self) -> RepoResult<Vec<R>>;
    /// Rows whose `column` equals `value` (`NULL` matches `NULL`), ordered by
    /// primary key.
    fn find_by<R: Record>(&self, column: &str, value: FieldValue) -> RepoResult<Vec<R>>;
    fn count<R: Record>(&self) -> RepoResult<u64>;
}

/// SQLite-backed record store.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - [`RepoError::UninitializedConnection`] when `user_version` is not the
    ///   latest migration.
    /// - [`RepoError::MissingRequiredTable`] / [`RepoError::MissingRequiredColumn`]
    ///   when the schema lacks anything the catalog declares.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn insert<R: Record>(&self, record: &R) -> RepoResult<R> {
        let table = R::TABLE;
        let result = self.insert_row::<R>(record, false);
        log_write("record_insert", table, &result);
        result
    }

    fn upsert<R: Record>(&self, record: &R) -> RepoResult<R> {
        let table = R::TABLE;
        let result = self.insert_row::<R>(record, true);
        log_write("record_upsert", table, &result);
        result
    }

    fn get<R: Record>(&self, key: &R::Key) -> RepoResult<Option<R>> {
        let key = key_values::<R>(key)?;
        fetch_by_key::<R>(self.conn, &key)
    }

    fn update<R: Record>(&self, record: &R) -> RepoResult<()> {
        let table = R::TABLE;
        let result = self.update_row::<R>(record);
        log_write("record_update", table, &result);
        result
    }

    fn delete<R: Record>(&self, key: &R::Key) -> RepoResult<()> {
        let table = R::TABLE;
        let result = self.delete_row::<R>(key);
        log_write("record_delete", table, &result);
        result
    }

    fn list<R: Record>(&self) -> RepoResult<Vec<R>> {
        let table = R::TABLE;
        let sql = format!(
            "SELECT {} FROM {} ORDER BY {};",
            table.select_list(),
            quote_ident(table.name),
            order_by(table)
        );
        query_records::<R>(self.conn, &sql, &[])
    }

    fn find_by<R: Record>(&self, column: &str, value: FieldValue) -> RepoResult<Vec<R>> {
        let table = R::TABLE;
        let column = table
            .column(column)
            .ok_or_else(|| RepoError::UnknownColumn {
                table: table.name,
                column: column.to_string(),
            })?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} IS ?1 ORDER BY {};",
            table.select_list(),
            quote_ident(table.name),
            quote_ident(column.name),
            order_by(table)
        );
        query_records::<R>(self.conn, &sql, &[value])
    }

    fn count<R: Record>(&self) -> RepoResult<u64> {
        let table = R::TABLE;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", quote_ident(table.name)),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count for {}", table.name)))
    }
}

impl SqliteRecordStore<'_> {
    fn insert_row<R: Record>(&self, record: &R, upsert: bool) -> RepoResult<R> {
        let table = R::TABLE;
        let mut values = record_values(record)?;

        // Allocated before the write scope so a failed insert burns the id.
        if let Some((index, sequence)) = table.sequence() {
            if values[index].is_null() {
                values[index] = FieldValue::Text(allocate_id(self.conn, sequence)?);
            }
        }

        let supplied: Vec<(&ColumnDef, &FieldValue)> = table
            .columns
            .iter()
            .zip(values.iter())
            .filter(|(column, value)| is_supplied(column, value))
            .collect();

        let mut sql = if supplied.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table.name))
        } else {
            let names: Vec<String> = supplied
                .iter()
                .map(|(column, _)| quote_ident(column.name))
                .collect();
            let placeholders: Vec<String> =
                (1..=supplied.len()).map(|index| format!("?{index}")).collect();
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(table.name),
                names.join(", "),
                placeholders.join(", ")
            )
        };

        if upsert && !supplied.is_empty() {
            let assignments: Vec<String> = supplied
                .iter()
                .filter(|(column, _)| !table.is_primary_key(column.name))
                .map(|(column, _)| {
                    let name = quote_ident(column.name);
                    format!("{name} = excluded.{name}")
                })
                .collect();
            let conflict_target: Vec<String> =
                table.primary_key.iter().map(|name| quote_ident(name)).collect();
            if assignments.is_empty() {
                sql.push_str(&format!(
                    " ON CONFLICT ({}) DO NOTHING",
                    conflict_target.join(", ")
                ));
            } else {
                sql.push_str(&format!(
                    " ON CONFLICT ({}) DO UPDATE SET {}",
                    conflict_target.join(", "),
                    assignments.join(", ")
                ));
            }
        }
        sql.push(';');

        let params: Vec<&FieldValue> = supplied.iter().map(|(_, value)| *value).collect();
        in_write_transaction(self.conn, |conn| -> RepoResult<R> {
            conn.execute(&sql, params_from_iter(params.iter()))
                .map_err(|err| write_error(table, err))?;
            let key = persisted_key(conn, table, &values)?;
            fetch_by_key::<R>(conn, &key)?.ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "row written to {} could not be read back",
                    table.name
                ))
            })
        })
    }

    fn update_row<R: Record>(&self, record: &R) -> RepoResult<()> {
        let table = R::TABLE;
        if table.append_only {
            return Err(RepoError::AppendOnly(table.name));
        }

        let values = record_values(record)?;
        let key = key_of(table, &values);
        let assigned: Vec<(&ColumnDef, &FieldValue)> = table
            .columns
            .iter()
            .zip(values.iter())
            .filter(|(column, value)| {
                !table.is_primary_key(column.name) && is_supplied(column, value)
            })
            .collect();

        in_write_transaction(self.conn, |conn| -> RepoResult<()> {
            let changed = if assigned.is_empty() {
                // Key-only tables: nothing to overwrite, only existence matters.
                usize::from(fetch_by_key::<R>(conn, &key)?.is_some())
            } else {
                let set_clause: Vec<String> = assigned
                    .iter()
                    .enumerate()
                    .map(|(index, (column, _))| {
                        format!("{} = ?{}", quote_ident(column.name), index + 1)
                    })
                    .collect();
                let sql = format!(
                    "UPDATE {} SET {} WHERE {};",
                    quote_ident(table.name),
                    set_clause.join(", "),
                    key_predicate(table, assigned.len() + 1)
                );
                let params: Vec<&FieldValue> = assigned
                    .iter()
                    .map(|(_, value)| *value)
                    .chain(key.iter())
                    .collect();
                conn.execute(&sql, params_from_iter(params.iter()))
                    .map_err(|err| write_error(table, err))?
            };

            if changed == 0 {
                return Err(RepoError::NotFound {
                    table: table.name,
                    key: describe_key(&key),
                });
            }
            Ok(())
        })
    }

    fn delete_row<R: Record>(&self, key: &R::Key) -> RepoResult<()> {
        let table = R::TABLE;
        if table.append_only {
            return Err(RepoError::AppendOnly(table.name));
        }

        let key = key_values::<R>(key)?;
        let sql = format!(
            "DELETE FROM {} WHERE {};",
            quote_ident(table.name),
            key_predicate(table, 1)
        );
        in_write_transaction(self.conn, |conn| -> RepoResult<()> {
            let changed = conn
                .execute(&sql, params_from_iter(key.iter()))
                .map_err(|err| write_error(table, err))?;
            if changed == 0 {
                return Err(RepoError::NotFound {
                    table: table.name,
                    key: describe_key(&key),
                });
            }
            Ok(())
        })
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ALL_TABLES {
        let present = table_columns(conn, table.name)?;
        if present.is_empty() {
            return Err(RepoError::MissingRequiredTable(table.name));
        }
        for column in table.columns {
            if !present.iter().any(|name| name == column.name) {
                return Err(RepoError::MissingRequiredColumn {
                    table: table.name,
                    column: column.name,
                });
            }
        }
    }

    Ok(())
}

/// Column names reported by `PRAGMA table_info`; empty when the table is absent.
fn table_columns(conn: &Connection, table: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", quote_ident(table)))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}

fn record_values<R: Record>(record: &R) -> RepoResult<Vec<FieldValue>> {
    let values = record.values();
    let expected = R::TABLE.columns.len();
    if values.len() != expected {
        return Err(RepoError::InvalidData(format!(
            "{} record yields {} values for {} columns",
            R::TABLE.name,
            values.len(),
            expected
        )));
    }
    Ok(values)
}

fn key_values<R: Record>(key: &R::Key) -> RepoResult<Vec<FieldValue>> {
    let values = key.key_values();
    let expected = R::TABLE.primary_key.len();
    if values.len() != expected {
        return Err(RepoError::InvalidData(format!(
            "{} key has {} parts, expected {}",
            R::TABLE.name,
            values.len(),
            expected
        )));
    }
    Ok(values)
}

/// A NULL in a defaulted column means "not set"; let SQLite fill it.
fn is_supplied(column: &ColumnDef, value: &FieldValue) -> bool {
    !(value.is_null() && column.default.is_some())
}

fn key_of(table: &TableDef, values: &[FieldValue]) -> Vec<FieldValue> {
    table
        .primary_key
        .iter()
        .filter_map(|name| table.column_index(name))
        .map(|index| values[index].clone())
        .collect()
}

/// Primary key of the row just written, resolving rowid aliases.
fn persisted_key(
    conn: &Connection,
    table: &TableDef,
    values: &[FieldValue],
) -> RepoResult<Vec<FieldValue>> {
    let mut key = Vec::with_capacity(table.primary_key.len());
    for name in table.primary_key {
        let index = table.column_index(name).ok_or_else(|| {
            RepoError::InvalidData(format!("{}.{name} is not declared", table.name))
        })?;
        let value = match (&values[index], table.columns[index].default) {
            (FieldValue::Null, Some(ColumnDefault::RowId)) => {
                FieldValue::Integer(conn.last_insert_rowid())
            }
            (value, _) => value.clone(),
        };
        key.push(value);
    }
    Ok(key)
}

/// `"a" = ?n AND "b" = ?n+1 ...` over the primary key.
fn key_predicate(table: &TableDef, first_placeholder: usize) -> String {
    table
        .primary_key
        .iter()
        .enumerate()
        .map(|(offset, name)| format!("{} = ?{}", quote_ident(name), first_placeholder + offset))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn order_by(table: &TableDef) -> String {
    table
        .primary_key
        .iter()
        .map(|name| format!("{} ASC", quote_ident(name)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn fetch_by_key<R: Record>(conn: &Connection, key: &[FieldValue]) -> RepoResult<Option<R>> {
    let table = R::TABLE;
    let sql = format!(
        "SELECT {} FROM {} WHERE {};",
        table.select_list(),
        quote_ident(table.name),
        key_predicate(table, 1)
    );
    Ok(query_records::<R>(conn, &sql, key)?.into_iter().next())
}

fn query_records<R: Record>(
    conn: &Connection,
    sql: &str,
    params: &[FieldValue],
) -> RepoResult<Vec<R>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params_from_iter(params.iter()))?;
    let mut records = Vec::new();
    while let Some(row) = rows.next()? {
        let record = R::from_row(row).map_err(|err| match err {
            rusqlite::Error::FromSqlConversionFailure(index, _, source) => {
                RepoError::InvalidData(format!(
                    "invalid value in {}.{}: {source}",
                    R::TABLE.name,
                    R::TABLE.columns.get(index).map_or("?", |column| column.name)
                ))
            }
            other => RepoError::from(other),
        })?;
        records.push(record);
    }
    Ok(records)
}

fn write_error(table: &'static TableDef, err: rusqlite::Error) -> RepoError {
    if let rusqlite::Error::ToSqlConversionFailure(source) = &err {
        return RepoError::InvalidData(format!("cannot bind value for {}: {source}", table.name));
    }
    match classify_constraint(table.name, err) {
        Ok(violation) => RepoError::Constraint(violation),
        Err(other) => RepoError::from(other),
    }
}

fn describe_key(key: &[FieldValue]) -> String {
    key.iter()
        .map(|value| match value {
            FieldValue::Text(text) => text.clone(),
            other => other.clone().into_json().to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn log_write<T>(event: &str, table: &TableDef, result: &RepoResult<T>) {
    match result {
        Ok(_) => debug!("event={event} module=repo status=ok table={}", table.name),
        Err(RepoError::Constraint(violation)) => warn!(
            "event={event} module=repo status=error table={} error_code=constraint_{} error={}",
            table.name,
            violation.kind.as_str(),
            violation
        ),
        Err(err) => warn!(
            "event={event} module=repo status=error table={} error={}",
            table.name, err
        ),
    }
}
