//! SQLite row sink
//!
//! Stores rows in an `articles` table, one transaction per batch, and keeps a
//! `runs` record with the final status and row total.

use crate::catalog::Row;
use crate::sink::schema::initialize_schema;
use crate::sink::traits::{RowSink, RunMetadata, RunStatus, SinkResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::Path;

/// SQLite sink backend
pub struct SqliteSink {
    conn: Connection,
    run_id: i64,
}

impl SqliteSink {
    /// Opens or creates the database and registers a new run
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `metadata` - Description of the run being recorded
    pub fn new(path: &Path, metadata: &RunMetadata) -> SinkResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::with_connection(conn, metadata)
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(metadata: &RunMetadata) -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, metadata)
    }

    fn with_connection(conn: Connection, metadata: &RunMetadata) -> SinkResult<Self> {
        initialize_schema(&conn)?;

        conn.execute(
            "INSERT INTO runs (started_at, category, start_date, config_hash, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                Utc::now().to_rfc3339(),
                metadata.category,
                metadata.start_date,
                metadata.config_hash,
                RunStatus::Running.to_db_string()
            ],
        )?;
        let run_id = conn.last_insert_rowid();

        Ok(Self { conn, run_id })
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Counts the rows stored for this run (for testing)
    #[cfg(test)]
    pub fn count_rows(&self) -> SinkResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM articles WHERE run_id = ?1",
            params![self.run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Reads back the status and row total recorded for this run (for testing)
    #[cfg(test)]
    pub fn run_status(&self) -> SinkResult<(Option<RunStatus>, u64)> {
        let (status, total): (String, i64) = self.conn.query_row(
            "SELECT status, total_rows FROM runs WHERE id = ?1",
            params![self.run_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((RunStatus::from_db_string(&status), total as u64))
    }
}

impl RowSink for SqliteSink {
    fn append(&mut self, rows: &[Row]) -> SinkResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO articles
                 (run_id, id, publication_date, title, author, content, url, section)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;

            for row in rows {
                stmt.execute(params![
                    self.run_id,
                    row.id,
                    row.publication_date,
                    row.title,
                    row.author,
                    row.content,
                    row.url,
                    row.section
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn finalize(&mut self, status: RunStatus, total_rows: u64) -> SinkResult<()> {
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, total_rows = ?3 WHERE id = ?4",
            params![
                status.to_db_string(),
                Utc::now().to_rfc3339(),
                total_rows as i64,
                self.run_id
            ],
        )?;
        Ok(())
    }
}
