//! Shared row aggregator
//!
//! Every collector hands its finished batch to one `Aggregator`. A single
//! mutex guards both the sink and the running total, so the durable append
//! and the counter increment happen as one serialized step.

use crate::catalog::Row;
use crate::sink::traits::{RowSink, RunStatus, SinkError, SinkResult};
use std::sync::Mutex;

/// Running totals for a harvest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateState {
    /// Rows durably appended so far
    pub total_rows: u64,

    /// Batches durably appended so far
    pub batches: u64,
}

struct Inner {
    sink: Box<dyn RowSink>,
    state: AggregateState,
}

/// Serializes appends from concurrent collectors into one sink
pub struct Aggregator {
    inner: Mutex<Inner>,
}

impl Aggregator {
    pub fn new(sink: Box<dyn RowSink>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sink,
                state: AggregateState::default(),
            }),
        }
    }

    /// Appends one complete batch and bumps the total by its length
    ///
    /// The batch is consumed. The counter only moves after the sink reports
    /// success; a failed append leaves the total unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of rows appended
    /// * `Err(SinkError)` - The sink failed; nothing was counted
    pub fn append(&self, rows: Vec<Row>) -> SinkResult<usize> {
        let mut inner = self.inner.lock().map_err(|_| SinkError::Poisoned)?;

        if rows.is_empty() {
            return Ok(0);
        }

        inner.sink.append(&rows)?;
        inner.state.total_rows += rows.len() as u64;
        inner.state.batches += 1;

        Ok(rows.len())
    }

    /// Rows durably appended so far
    pub fn total_rows(&self) -> u64 {
        self.snapshot().total_rows
    }

    /// Copy of the current totals
    pub fn snapshot(&self) -> AggregateState {
        match self.inner.lock() {
            Ok(inner) => inner.state,
            Err(poisoned) => poisoned.into_inner().state,
        }
    }

    /// Lets the sink record the end of the run
    pub fn finalize(&self, status: RunStatus) -> SinkResult<()> {
        let mut inner = self.inner.lock().map_err(|_| SinkError::Poisoned)?;
        let total = inner.state.total_rows;
        inner.sink.finalize(status, total)
    }
}
