//! CSV row sink
//!
//! Appends rows to a CSV file. The header is written once, only when the
//! file is empty, so reopening an existing file keeps appending. A batch is
//! encoded in memory and written in one go; if the write fails the file is
//! cut back to its length before the batch.

use crate::catalog::{Row, ROW_HEADERS};
use crate::sink::traits::{RowSink, SinkResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Byte destination a `CsvSink` can roll back
pub trait CsvTarget: Write + Send {
    /// Current length in bytes
    fn byte_len(&self) -> io::Result<u64>;

    /// Discards everything past `len`
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl CsvTarget for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// CSV file sink
pub struct CsvSink<T: CsvTarget = File> {
    target: T,
    path: PathBuf,
    needs_header: bool,
}

impl CsvSink<File> {
    /// Opens (creating if absent) a CSV file for appending
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the CSV file
    ///
    /// # Returns
    ///
    /// * `Ok(CsvSink)` - File is open in append mode
    /// * `Err(SinkError)` - The file or its parent directory could not be created
    pub fn open(path: &Path) -> SinkResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::with_target(file, path)
    }
}

impl<T: CsvTarget> CsvSink<T> {
    /// Wraps an already-open target; `path` is only used in logs
    pub fn with_target(target: T, path: &Path) -> SinkResult<Self> {
        let needs_header = target.byte_len()? == 0;
        Ok(Self {
            target,
            path: path.to_path_buf(),
            needs_header,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn encode(&self, rows: &[Row]) -> SinkResult<Vec<u8>> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());

        if self.needs_header {
            writer.write_record(ROW_HEADERS)?;
        }
        for row in rows {
            writer.serialize(row)?;
        }

        Ok(writer.into_inner().map_err(|e| e.into_error())?)
    }

    fn write_batch(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.target.write_all(bytes)?;
        self.target.flush()
    }
}

impl<T: CsvTarget> RowSink for CsvSink<T> {
    fn append(&mut self, rows: &[Row]) -> SinkResult<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let bytes = self.encode(rows)?;
        let start_len = self.target.byte_len()?;

        if let Err(e) = self.write_batch(&bytes) {
            if let Err(rollback) = self.target.truncate(start_len) {
                tracing::error!(
                    "Failed to roll back partial batch in {}: {}",
                    self.path.display(),
                    rollback
                );
            }
            return Err(e.into());
        }

        self.needs_header = false;
        tracing::trace!("Appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }
}
