//! Columnar storage of tick data

pub mod ndjson_converter;
pub mod tick_batch;
pub mod tick_scanner;

pub use ndjson_converter::{convert_ndjson_to_parquet, ConversionReport};
pub use tick_batch::{decode_tick_batch, tick_batch, tick_schema};
pub use tick_scanner::{TickBatches, TickScanner};
