//! Sink module for persisting harvested rows
//!
//! This module handles:
//! - The `RowSink` trait and its CSV and SQLite backends
//! - The `Aggregator`, which serializes appends from concurrent collectors
//!   and keeps the running row total
//! - Clearing a previous run's output before a new run starts

mod aggregator;
mod csv_sink;
mod schema;
mod sqlite_sink;
mod traits;

pub use aggregator::{AggregateState, Aggregator};
pub use csv_sink::{CsvSink, CsvTarget};
pub use sqlite_sink::SqliteSink;
pub use traits::{RowSink, RunMetadata, RunStatus, SinkError, SinkResult};

use crate::config::{OutputConfig, OutputFormat};
use std::path::{Path, PathBuf};

/// Opens the sink described by the output configuration
///
/// # Arguments
///
/// * `output` - Output path and format
/// * `metadata` - Run description (recorded by the SQLite backend)
///
/// # Returns
///
/// * `Ok(Box<dyn RowSink>)` - Sink ready for appends
/// * `Err(SinkError)` - The backing file could not be opened
pub fn open_sink(output: &OutputConfig, metadata: &RunMetadata) -> SinkResult<Box<dyn RowSink>> {
    let path = Path::new(&output.path);
    match output.resolved_format() {
        OutputFormat::Csv => {
            tracing::debug!("Opening CSV sink at {}", path.display());
            Ok(Box::new(CsvSink::open(path)?))
        }
        OutputFormat::Sqlite => {
            tracing::debug!("Opening SQLite sink at {}", path.display());
            Ok(Box::new(SqliteSink::new(path, metadata)?))
        }
    }
}

/// Removes a previous run's output at `path`
///
/// Sinks only ever append, so a fresh run must start from a cleared target.
/// For SQLite targets the `-wal` and `-shm` side files are removed too.
///
/// # Returns
///
/// * `Ok(true)` - Something was removed
/// * `Ok(false)` - Nothing existed at the target
pub fn clear_output(path: &Path) -> std::io::Result<bool> {
    let mut removed = false;

    let mut candidates = vec![path.to_path_buf()];
    if OutputFormat::from_path(path) == OutputFormat::Sqlite {
        candidates.push(side_file(path, "-wal"));
        candidates.push(side_file(path, "-shm"));
    }

    for candidate in candidates {
        match std::fs::remove_file(&candidate) {
            Ok(()) => removed = true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
    }

    Ok(removed)
}

fn side_file(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}
