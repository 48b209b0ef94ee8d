//! Reading the columnar tick table, batch by batch or all at once

use std::fs::File;
use std::path::{Path, PathBuf};

use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use tracing::{debug, error};

use crate::infrastructure::storage::tick_batch::decode_tick_batch;
use crate::shared::errors::AnalysisError;
use crate::shared::types::{ScanMode, TickRow};

pub struct TickScanner {
    path: PathBuf,
    batch_size: usize,
}

impl TickScanner {
    pub fn open(path: &Path, batch_size: usize) -> Result<Self, AnalysisError> {
        if !path.exists() {
            error!("Parquet file not found at {}", path.display());
            return Err(AnalysisError::SourceNotFound(path.to_path_buf()));
        }
        Ok(Self {
            path: path.to_path_buf(),
            batch_size: batch_size.max(1),
        })
    }

    fn builder(&self) -> Result<ParquetRecordBatchReaderBuilder<File>, AnalysisError> {
        Ok(ParquetRecordBatchReaderBuilder::try_new(File::open(&self.path)?)?)
    }

    /// Row count from the file footer, without decoding any page
    pub fn row_count(&self) -> Result<u64, AnalysisError> {
        let rows = self.builder()?.metadata().file_metadata().num_rows();
        Ok(rows.max(0) as u64)
    }

    /// Lazily decoded batches, in file order
    pub fn batches(&self) -> Result<TickBatches, AnalysisError> {
        let reader = self.builder()?.with_batch_size(self.batch_size).build()?;
        Ok(TickBatches { reader })
    }

    /// Every row in memory
    pub fn collect(&self) -> Result<Vec<TickRow>, AnalysisError> {
        let mut rows = Vec::new();
        for batch in self.batches()? {
            rows.extend(batch?);
        }
        debug!("Materialised {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Visit every row in file order, reading according to `mode`
    pub fn for_each_batch<F>(&self, mode: ScanMode, mut visit: F) -> Result<(), AnalysisError>
    where
        F: FnMut(Vec<TickRow>) -> Result<(), AnalysisError>,
    {
        match mode {
            ScanMode::Streaming => {
                for batch in self.batches()? {
                    visit(batch?)?;
                }
                Ok(())
            }
            ScanMode::Eager => visit(self.collect()?),
        }
    }
}

pub struct TickBatches {
    reader: ParquetRecordBatchReader,
}

impl Iterator for TickBatches {
    type Item = Result<Vec<TickRow>, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.next().map(|batch| {
            let batch = batch?;
            decode_tick_batch(&batch)
        })
    }
}
