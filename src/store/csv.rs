//! CSV export of trial results, same columns as the SQLite table.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::Writer;

use crate::combat::TrialResult;
use crate::store::{StoreError, TrialSink};

pub struct CsvSink<W: Write> {
    writer: Writer<W>,
}

impl CsvSink<File> {
    /// Create (or truncate) `path` and write the header on the first row.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            writer: Writer::from_path(path)?,
        })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn from_writer(inner: W) -> Self {
        Self {
            writer: Writer::from_writer(inner),
        }
    }

    /// Flush and hand back the underlying writer.
    pub fn into_inner(self) -> Result<W, StoreError> {
        self.writer
            .into_inner()
            .map_err(|err| StoreError::Io(err.into_error()))
    }
}

impl<W: Write> TrialSink for CsvSink<W> {
    fn record_trial(&mut self, result: &TrialResult) -> Result<(), StoreError> {
        self.writer.serialize(result)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), StoreError> {
        self.writer.flush()?;
        Ok(())
    }
}
