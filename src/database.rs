//! SQLite-backed scrollback history
//!
//! [`SqliteHistory`] satisfies the same [`History`] contract as the
//! in-memory store but keeps its entries in a SQLite database, so history
//! survives the process without an explicit save. Capacity eviction and
//! immediate-duplicate suppression behave exactly like
//! [`crate::MemoryHistory`]; every operation is serialized through one
//! connection.

use crate::backend::{History, ManagedHistory};
use crate::codec::{self, DEFAULT_MAX_LINE_LENGTH};
use crate::error::Result;
use crate::history::HISTORY_LIMIT;
use crate::search;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Statistics about the stored history
#[derive(Debug, Clone, Default)]
pub struct HistoryStats {
    pub total_entries: usize,
    pub oldest_entry: Option<DateTime<Utc>>,
    pub newest_entry: Option<DateTime<Utc>>,
}

/// History stored in a SQLite database
pub struct SqliteHistory {
    conn: Mutex<Connection>,
    capacity: usize,
    max_line_length: usize,
}

impl SqliteHistory {
    /// Open (or create) the history database at `db_path`
    #[must_use = "History database must be used"]
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                line TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            capacity: HISTORY_LIMIT,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        })
    }

    /// Keep at most `capacity` entries
    ///
    /// Takes effect on the next append or restore.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the longest line accepted by restore, in bytes
    pub fn with_max_line_length(mut self, max_line_length: usize) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    /// Maximum number of entries kept
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an entry unless it repeats the newest one
    ///
    /// Returns whether the entry was stored.
    pub fn try_append(&self, item: &str) -> Result<bool> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let last: Option<String> = tx
            .query_row(
                "SELECT line FROM history ORDER BY id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if last.as_deref() == Some(item) {
            return Ok(false);
        }

        insert_line(&tx, item)?;
        evict_oldest(&tx, self.capacity)?;
        tx.commit()?;
        Ok(true)
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Result<Vec<String>> {
        load_lines(&self.lock())
    }

    /// Number of entries
    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .lock()
            .query_row("SELECT COUNT(*) FROM history", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Whether the history is empty
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Remove all entries
    pub fn clear(&self) -> Result<()> {
        self.lock().execute("DELETE FROM history", [])?;
        Ok(())
    }

    /// Get history statistics
    pub fn stats(&self) -> Result<HistoryStats> {
        let conn = self.lock();
        let (total, oldest, newest): (i64, Option<DateTime<Utc>>, Option<DateTime<Utc>>) = conn
            .query_row(
                "SELECT COUNT(*), MIN(created_at), MAX(created_at) FROM history",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )?;

        Ok(HistoryStats {
            total_entries: total as usize,
            oldest_entry: oldest,
            newest_entry: newest,
        })
    }

    /// Load history lines from `reader` without duplicate suppression
    ///
    /// Lines read before a failure are committed and the error carries
    /// their count.
    pub fn restore<R: Read>(&self, reader: R) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let result = codec::read_lines(BufReader::new(reader), self.max_line_length, |line| {
            insert_line(&tx, &line)
        });

        evict_oldest(&tx, self.capacity)?;
        tx.commit()?;

        match &result {
            Ok(count) => tracing::debug!(count, "restored history into database"),
            Err(e) => tracing::debug!(count = e.processed(), error = %e, "database restore stopped"),
        }
        result
    }

    /// Write every entry to `writer`, one per line, oldest first
    pub fn persist<W: Write>(&self, mut writer: W) -> Result<usize> {
        // Snapshot first so slow writers do not hold the connection.
        let lines = self.entries()?;
        codec::write_lines(&mut writer, lines.iter().map(String::as_str))
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn insert_line(conn: &Connection, line: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO history (line, created_at) VALUES (?1, ?2)",
        params![line, Utc::now()],
    )?;
    Ok(())
}

fn evict_oldest(conn: &Connection, capacity: usize) -> Result<()> {
    // A negative OFFSET reads as 0 in SQLite, which would empty the table.
    let keep = i64::try_from(capacity).unwrap_or(i64::MAX);
    let evicted = conn.execute(
        "DELETE FROM history WHERE id <= (
            SELECT id FROM history ORDER BY id DESC LIMIT 1 OFFSET ?1
        )",
        params![keep],
    )?;
    if evicted > 0 {
        tracing::trace!(evicted, "evicted oldest history entries");
    }
    Ok(())
}

fn load_lines(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT line FROM history ORDER BY id")?;
    let lines = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(lines)
}

impl History for SqliteHistory {
    fn append_history(&self, item: &str) {
        if let Err(e) = self.try_append(item) {
            tracing::warn!(error = %e, "failed to append history entry");
        }
    }

    fn find_by_prefix(&self, prefix: &str) -> Vec<String> {
        match self.entries() {
            Ok(lines) => search::find_by_prefix(lines.iter().map(String::as_str), prefix),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read history for prefix search");
                Vec::new()
            }
        }
    }

    fn find_by_pattern(&self, pattern: &str) -> (Vec<String>, Vec<usize>) {
        match self.entries() {
            Ok(lines) => search::find_by_pattern(lines.iter().map(String::as_str), pattern),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read history for pattern search");
                (Vec::new(), Vec::new())
            }
        }
    }
}

impl ManagedHistory for SqliteHistory {
    fn entries(&self) -> Result<Vec<String>> {
        SqliteHistory::entries(self)
    }

    fn len(&self) -> Result<usize> {
        SqliteHistory::len(self)
    }

    fn clear(&self) -> Result<()> {
        SqliteHistory::clear(self)
    }

    fn restore(&self, reader: &mut dyn Read) -> Result<usize> {
        SqliteHistory::restore(self, reader)
    }

    fn persist(&self, writer: &mut dyn Write) -> Result<usize> {
        SqliteHistory::persist(self, writer)
    }
}
