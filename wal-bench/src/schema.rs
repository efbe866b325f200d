//! Connection setup and the benchmark table.
//!
//! Every worker operation targets one table:
//!
//! | column       | type                               |
//! |--------------|------------------------------------|
//! | `id`         | INTEGER PRIMARY KEY AUTOINCREMENT  |
//! | `user_id`    | INTEGER, indexed                   |
//! | `amount`     | REAL                               |
//! | `created_at` | TEXT, `datetime('now')` at insert  |

use anyhow::{Context, Result};
use rusqlite::Connection;
use std::time::Duration;

pub const INSERT_EXPENSE_SQL: &str =
    "INSERT INTO expenses (user_id, amount, created_at) VALUES (?1, ?2, datetime('now'))";

pub const LOOKUP_EXPENSES_SQL: &str = "SELECT user_id FROM expenses WHERE user_id = ?1 LIMIT ?2";

/// Put the connection into WAL mode and install a busy handler.
///
/// Returns the journal mode SQLite actually selected: in-memory databases
/// answer `memory` no matter what was asked for.
pub fn configure_connection(conn: &Connection, busy_timeout: Duration) -> Result<String> {
    let mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .context("failed to set journal_mode")?;
    conn.busy_timeout(busy_timeout)
        .context("failed to set busy timeout")?;
    Ok(mode.to_lowercase())
}

/// Create the `expenses` table and its `user_id` index if they do not exist yet.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS expenses (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id     INTEGER,
            amount      REAL,
            created_at  TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_expenses_user_id ON expenses (user_id);
        ",
    )
    .context("failed to create benchmark schema")?;
    Ok(())
}

/// Number of rows currently stored. Used by tests and the post-run summary.
pub fn row_count(conn: &Connection) -> Result<u64> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))?;
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::params;

    #[test]
    fn create_tables_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        create_tables(&conn).unwrap();

        let indexes: u32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name = 'idx_expenses_user_id'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 1);
    }

    #[test]
    fn in_memory_reports_memory_journal() {
        let conn = Connection::open_in_memory().unwrap();
        let mode = configure_connection(&conn, Duration::from_millis(100)).unwrap();
        assert_eq!(mode, "memory");
    }

    #[test]
    fn file_database_switches_to_wal() {
        let dir = tempfile::tempdir().unwrap();
        let conn = Connection::open(dir.path().join("wal.db")).unwrap();
        let mode = configure_connection(&conn, Duration::from_millis(100)).unwrap();
        assert_eq!(mode, "wal");
    }

    #[test]
    fn lookup_is_bounded_by_limit() {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        for _ in 0..25 {
            conn.execute(INSERT_EXPENSE_SQL, params![7, 1.5]).unwrap();
        }

        let mut stmt = conn.prepare(LOOKUP_EXPENSES_SQL).unwrap();
        let rows = stmt
            .query_map(params![7, 10], |r| r.get::<_, i64>(0))
            .unwrap()
            .count();
        assert_eq!(rows, 10);
        assert_eq!(row_count(&conn).unwrap(), 25);
    }
}
