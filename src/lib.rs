//! Triarb Analysis - offline inspection of recorded triangular arbitrage ticks
//! Built with Domain-Driven Design principles

pub mod domain;
pub mod infrastructure;
pub mod application;
pub mod shared;

// Re-export main types for convenience
pub use application::AnalysisService;
pub use domain::fees::FeeSchedule;
pub use domain::opportunity::{OpportunitySummarizer, RunDetector};
pub use domain::stats::FrequencyTable;
pub use shared::config::{AnalysisConfig, ConfigLoader};
pub use shared::errors::AnalysisError;
