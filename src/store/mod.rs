//! Persistence for trial results.
//!
//! A batch hands every [`TrialResult`] to a [`TrialSink`] exactly once, in trial order, from a
//! single thread, and calls [`TrialSink::finish`] after the last one.

pub mod csv;
pub mod sqlite;

use thiserror::Error;

use crate::combat::TrialResult;

pub use self::csv::CsvSink;
pub use self::sqlite::{load_trials, SqliteStore, DEFAULT_DB_PATH};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("csv: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store is already finished")]
    Closed,
    #[error("malformed row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },
}

pub trait TrialSink {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError>;

    /// Make everything recorded so far durable. Called once at the end of a batch.
    fn finish(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl TrialSink for Vec<TrialResult> {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError> {
        self.push(*result);
        Ok(())
    }
}

impl<S: TrialSink + ?Sized> TrialSink for Box<S> {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError> {
        (**self).record_trial(result)
    }

    fn finish(&mut self) -> Result<(), StoreError> {
        (**self).finish()
    }
}

/// Forwards every result to each inner sink in turn.
#[derive(Default)]
pub struct MultiSink {
    sinks: Vec<Box<dyn TrialSink>>,
}

impl MultiSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl TrialSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl TrialSink for MultiSink {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError> {
        self.sinks
            .iter_mut()
            .try_for_each(|sink| sink.record_trial(result))
    }

    fn finish(&mut self) -> Result<(), StoreError> {
        self.sinks.iter_mut().try_for_each(|sink| sink.finish())
    }
}
