//! The storage handle shared by every worker.
//!
//! [`BenchStore`] is the seam between the workers and the database: one insert,
//! one bounded lookup. [`SqliteStore`] is the real implementation; tests plug in
//! fakes to exercise failure and slow-operation paths.

use crate::schema::{self, INSERT_EXPENSE_SQL, LOOKUP_EXPENSES_SQL};
use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};
use std::time::Duration;

/// Operations the workers issue. Implementations must tolerate concurrent calls
/// from many threads; any serialization is theirs to do.
pub trait BenchStore: Sync {
    /// Insert one record for `user_id` with the given amount, stamped with the
    /// current time.
    fn insert(&self, user_id: u32, amount: f64) -> Result<()>;

    /// Look up at most `limit` records for `user_id`, draining every row.
    /// Returns the number of rows seen.
    fn lookup(&self, user_id: u32, limit: u32) -> Result<usize>;
}

/// Where the database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageTarget {
    File(PathBuf),
    /// Private in-memory database. Always served by a single connection.
    Memory,
}

impl StorageTarget {
    pub fn is_memory(&self) -> bool {
        matches!(self, StorageTarget::Memory)
    }
}

impl fmt::Display for StorageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageTarget::File(path) => write!(f, "{}", path.display()),
            StorageTarget::Memory => f.write_str(":memory:"),
        }
    }
}

/// SQLite-backed store with a small fixed pool of connections.
///
/// File mode opens `pool_size` connections to the same file, so every worker can
/// hold one at a time and SQLite's WAL locking is the only thing arbitrating
/// between them.
///
/// In-memory mode is different: each connection to `:memory:` would be its own
/// private database, so exactly one connection is opened and shared. Every
/// worker then queues on that single connection, and the numbers measure a
/// serialized store rather than WAL concurrency.
pub struct SqliteStore {
    target: StorageTarget,
    connections: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
    journal_mode: String,
}

impl SqliteStore {
    /// Open the database and configure every pooled connection.
    ///
    /// `pool_size` is clamped to at least one, and forced to one for
    /// [`StorageTarget::Memory`].
    pub fn open(target: StorageTarget, pool_size: usize, busy_timeout: Duration) -> Result<Self> {
        let pool_size = match target {
            StorageTarget::Memory => {
                if pool_size > 1 {
                    log::warn!(
                        "in-memory store uses one shared connection; {pool_size} workers will serialize on it"
                    );
                }
                1
            }
            StorageTarget::File(_) => pool_size.max(1),
        };

        let mut connections = Vec::with_capacity(pool_size);
        let mut journal_mode = String::new();
        for i in 0..pool_size {
            let conn = open_connection(&target)?;
            let mode = schema::configure_connection(&conn, busy_timeout)
                .with_context(|| format!("failed to configure connection {i} to {target}"))?;
            if i == 0 {
                journal_mode = mode;
            }
            connections.push(Mutex::new(conn));
        }

        log::debug!("opened {pool_size} connection(s) to {target} (journal_mode={journal_mode})");

        Ok(Self {
            target,
            connections,
            cursor: AtomicUsize::new(0),
            journal_mode,
        })
    }

    /// Create the benchmark table and index. Must run before any worker starts.
    pub fn init_schema(&self) -> Result<()> {
        schema::create_tables(&self.connection())
    }

    pub fn target(&self) -> &StorageTarget {
        &self.target
    }

    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }

    /// Journal mode reported by SQLite when the pool was opened.
    pub fn journal_mode(&self) -> &str {
        &self.journal_mode
    }

    pub fn row_count(&self) -> Result<u64> {
        schema::row_count(&self.connection())
    }

    /// Check out a connection, preferring one nobody else holds.
    ///
    /// Starts at a rotating offset and only blocks when every connection is busy,
    /// which with a pool sized to the worker count only happens in memory mode.
    fn connection(&self) -> MutexGuard<'_, Connection> {
        let len = self.connections.len();
        let start = self.cursor.fetch_add(1, Ordering::Relaxed);
        for i in 0..len {
            match self.connections[(start + i) % len].try_lock() {
                Ok(guard) => return guard,
                Err(TryLockError::Poisoned(poisoned)) => return poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => continue,
            }
        }
        self.connections[start % len]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl BenchStore for SqliteStore {
    fn insert(&self, user_id: u32, amount: f64) -> Result<()> {
        let conn = self.connection();
        let mut stmt = conn.prepare_cached(INSERT_EXPENSE_SQL)?;
        stmt.execute(params![user_id, amount])?;
        Ok(())
    }

    fn lookup(&self, user_id: u32, limit: u32) -> Result<usize> {
        let conn = self.connection();
        let mut stmt = conn.prepare_cached(LOOKUP_EXPENSES_SQL)?;
        let mut rows = stmt.query(params![user_id, limit])?;
        let mut seen = 0;
        while let Some(row) = rows.next()? {
            let _user_id: i64 = row.get(0)?;
            seen += 1;
        }
        Ok(seen)
    }
}

fn open_connection(target: &StorageTarget) -> Result<Connection> {
    match target {
        StorageTarget::File(path) => Connection::open(path)
            .with_context(|| format!("failed to open database file {}", path.display())),
        StorageTarget::Memory => {
            Connection::open_in_memory().context("failed to open in-memory database")
        }
    }
}
