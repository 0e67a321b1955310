//! Sink traits and error types
//!
//! This module defines the trait interface for tabular row sinks and the
//! metadata recorded alongside a run.

use crate::catalog::Row;
use thiserror::Error;

/// Errors that can occur while persisting rows
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Sink lock poisoned by a panicking writer")]
    Poisoned,
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Final status of a run as recorded by the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Describes the run a sink is recording
#[derive(Debug, Clone, Default)]
pub struct RunMetadata {
    /// Category being harvested
    pub category: String,

    /// Start date, `YYYY-MM-DD`
    pub start_date: String,

    /// Hash of the config file, when one was used
    pub config_hash: Option<String>,
}

/// Trait for durable, append-only row stores
///
/// Implementations create their backing store if it is absent and never
/// truncate it between `append` calls. Callers serialize access; see
/// [`crate::sink::Aggregator`].
pub trait RowSink: Send {
    /// Durably appends a batch, keeping the order of `rows`
    fn append(&mut self, rows: &[Row]) -> SinkResult<()>;

    /// Records the end of the run
    ///
    /// # Arguments
    ///
    /// * `status` - How the run ended
    /// * `total_rows` - Rows appended over the whole run
    fn finalize(&mut self, status: RunStatus, total_rows: u64) -> SinkResult<()> {
        let _ = (status, total_rows);
        Ok(())
    }
}
