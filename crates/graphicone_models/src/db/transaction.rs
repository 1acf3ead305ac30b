//! Write-scope helper shared by sequence allocation and record writes.

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `body` inside one atomic write scope.
///
/// In autocommit mode a new `IMMEDIATE` transaction is opened and committed
/// when `body` succeeds; on error it is rolled back when dropped. When the
/// caller already holds an open transaction, `body` joins it and the caller
/// decides commit or rollback.
pub fn in_write_transaction<T, E>(
    conn: &Connection,
    body: impl FnOnce(&Connection) -> Result<T, E>,
) -> Result<T, E>
where
    E: From<rusqlite::Error>,
{
    if !conn.is_autocommit() {
        return body(conn);
    }

    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let value = body(&tx)?;
    tx.commit()?;
    Ok(value)
}
