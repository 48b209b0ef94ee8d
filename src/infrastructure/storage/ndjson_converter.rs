//! Newline-delimited JSON tick log -> Parquet

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, error, info};

use crate::infrastructure::storage::tick_batch::{tick_batch, tick_schema};
use crate::shared::errors::AnalysisError;
use crate::shared::types::TickRow;

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub rows_written: usize,
    pub destination: PathBuf,
}

/// Convert `source` into a Snappy-compressed Parquet file at `destination`.
///
/// Every non-blank line must deserialize into a [`TickRow`]; the first line
/// that does not aborts the conversion. The destination may be left partially
/// written in that case.
pub fn convert_ndjson_to_parquet(
    source: &Path,
    destination: &Path,
    batch_size: usize,
) -> Result<ConversionReport, AnalysisError> {
    if !source.exists() {
        error!("Error: Source file not found at {}", source.display());
        return Err(AnalysisError::SourceNotFound(source.to_path_buf()));
    }

    info!("Starting conversion of {}...", source.display());

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let reader = BufReader::new(File::open(source)?);
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(File::create(destination)?, Arc::new(tick_schema()), Some(props))?;

    let batch_size = batch_size.max(1);
    let mut pending: Vec<TickRow> = Vec::with_capacity(batch_size);
    let mut rows_written = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let row: TickRow = serde_json::from_str(trimmed).map_err(|e| {
            error!("An error occurred during conversion at line {}: {}", idx + 1, e);
            error!("This could be due to an invalid JSON line in the source file.");
            AnalysisError::SchemaViolation {
                line: idx + 1,
                message: e.to_string(),
            }
        })?;
        pending.push(row);

        if pending.len() == batch_size {
            writer.write(&tick_batch(&pending)?)?;
            rows_written += pending.len();
            debug!("Wrote batch, {} rows so far", rows_written);
            pending.clear();
        }
    }

    if !pending.is_empty() {
        writer.write(&tick_batch(&pending)?)?;
        rows_written += pending.len();
    }
    writer.close()?;

    info!("Conversion complete! {} rows", rows_written);
    info!("Parquet file saved to: {}", destination.display());

    Ok(ConversionReport {
        rows_written,
        destination: destination.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LINE: &str = r#"{"bottleneckLeg":"ETHUSDT","unrealisedPnl":0.0012,"tradedNotional":0.5,"orderBookLevels":"[]","tickProcessTime":1700000000000000100,"tickReceiveTime":1700000000000000000,"rate1":1.0001,"rate2":0.9999,"rate3":1.0002,"isArbitrageOpportunity":true}"#;

    #[test]
    fn test_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_ndjson_to_parquet(&dir.path().join("nope.txt"), &dir.path().join("out.parquet"), 16);

        assert!(matches!(result, Err(AnalysisError::SourceNotFound(_))));
        assert!(!dir.path().join("out.parquet").exists());
    }

    #[test]
    fn test_schema_violation_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ticks.txt");
        let mut f = File::create(&source).unwrap();
        writeln!(f, "{}", LINE).unwrap();
        writeln!(f).unwrap();
        writeln!(f, r#"{{"bottleneckLeg":"ETHUSDT","unrealisedPnl":"oops"}}"#).unwrap();

        let result = convert_ndjson_to_parquet(&source, &dir.path().join("out.parquet"), 16);
        match result {
            Err(AnalysisError::SchemaViolation { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_batches_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ticks.txt");
        let mut f = File::create(&source).unwrap();
        for _ in 0..5 {
            writeln!(f, "{}", LINE).unwrap();
            writeln!(f, "   ").unwrap();
        }

        let report = convert_ndjson_to_parquet(&source, &dir.path().join("nested/out.parquet"), 2).unwrap();
        assert_eq!(report.rows_written, 5);
        assert!(report.destination.exists());
    }
}
