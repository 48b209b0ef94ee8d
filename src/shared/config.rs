use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::shared::errors::AnalysisError;
use crate::shared::types::{ImageFormat, ReturnColumn, ScanMode};

pub const DEFAULT_CONFIG_FILE: &str = "Config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsCfg {
    pub resources_dir: PathBuf,
    pub file_name: String,
    /// Defaults to `resources_dir`
    pub results_dir: Option<PathBuf>,
}

impl Default for PathsCfg {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            file_name: "example_trade_data".to_string(),
            results_dir: None,
        }
    }
}

impl PathsCfg {
    pub fn json_path(&self) -> PathBuf {
        self.resources_dir.join(format!("{}.txt", self.file_name))
    }

    pub fn parquet_path(&self) -> PathBuf {
        self.resources_dir.join(format!("{}.parquet", self.file_name))
    }

    pub fn results_dir(&self) -> &Path {
        self.results_dir.as_deref().unwrap_or(&self.resources_dir)
    }

    /// `<results_dir>/<file_name>_<artifact>.<extension>`
    pub fn artifact_path(&self, artifact: &str, extension: &str) -> PathBuf {
        self.results_dir()
            .join(format!("{}_{}.{}", self.file_name, artifact, extension))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanCfg {
    pub mode: ScanMode,
    pub batch_size: usize,
}

impl Default for ScanCfg {
    fn default() -> Self {
        Self {
            mode: ScanMode::Streaming,
            batch_size: 64 * 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTierCfg {
    pub label: String,
    /// Fraction, not percentage
    pub taker_fee: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeesCfg {
    pub effective_date: NaiveDate,
    /// Tier used for raw (pre-fee) statistics
    pub baseline_tier: String,
    pub tiers: Vec<FeeTierCfg>,
}

impl Default for FeesCfg {
    fn default() -> Self {
        // Binance spot taker fees, last updated 01/09/2025
        let tiers = [
            ("VIP_9", 0.00023),
            ("VIP_8", 0.00025),
            ("VIP_7", 0.00028),
            ("VIP_6", 0.00029),
            ("VIP_5", 0.00031),
            ("VIP_4", 0.00052),
            ("VIP_3", 0.0006),
            ("VIP_2", 0.001),
            ("VIP_1", 0.001),
            ("Regular", 0.001),
            ("None", 0.0),
        ]
        .into_iter()
        .map(|(label, taker_fee)| FeeTierCfg {
            label: label.to_string(),
            taker_fee,
        })
        .collect();

        Self {
            effective_date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap_or_default(),
            baseline_tier: "None".to_string(),
            tiers,
        }
    }
}

/// Bin edges, either listed or generated as an arithmetic range.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    Edges(Vec<f64>),
    Range { start: f64, end: f64, step: f64 },
}

impl BinSpec {
    pub fn edges(&self) -> Result<Vec<f64>, AnalysisError> {
        match self {
            BinSpec::Edges(edges) => Ok(edges.clone()),
            BinSpec::Range { start, end, step } => {
                if !(*step > 0.0) || !start.is_finite() || !end.is_finite() || end < start {
                    return Err(AnalysisError::InvalidBins(format!(
                        "bad range start={} end={} step={}",
                        start, end, step
                    )));
                }
                let count = ((end - start) / step).round() as usize + 1;
                Ok((0..count).map(|i| start + i as f64 * step).collect())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BinsCfg {
    pub return_pct: BinSpec,
    pub duration_secs: BinSpec,
    pub traded_notional: BinSpec,
}

impl Default for BinsCfg {
    fn default() -> Self {
        Self {
            return_pct: BinSpec::Edges(vec![
                0.0, 0.025, 0.05, 0.075, 0.100, 0.200, 0.300, 0.400, 0.500,
            ]),
            duration_secs: BinSpec::Edges(vec![0.0, 0.5, 1.0, 2.0, 3.0, 4.0, 5.0]),
            traded_notional: BinSpec::Range {
                start: 0.001,
                end: 0.999,
                step: 0.001,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportCfg {
    pub image_format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// Longer frequency tables drop empty buckets in the rendered image
    pub max_table_rows: usize,
    /// Rows shown when printing summaries to the terminal
    pub print_limit: usize,
    pub return_column: ReturnColumn,
    /// Tier labels compared by the `compare` and `all` commands
    pub compare_tiers: [String; 2],
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self {
            image_format: ImageFormat::Png,
            width: 1200,
            height: 600,
            max_table_rows: 40,
            print_limit: 20,
            return_column: ReturnColumn::MaxReturn,
            compare_tiers: ["VIP_9".to_string(), "Regular".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub paths: PathsCfg,
    pub scan: ScanCfg,
    pub fees: FeesCfg,
    pub bins: BinsCfg,
    pub report: ReportCfg,
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, AnalysisError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.scan.batch_size == 0 {
            return Err(AnalysisError::ConfigError("scan.batch_size must be positive".to_string()));
        }
        if self.report.width == 0 || self.report.height == 0 {
            return Err(AnalysisError::ConfigError("report image size must be positive".to_string()));
        }

        let mut seen = HashSet::new();
        for tier in &self.fees.tiers {
            if !seen.insert(tier.label.as_str()) {
                return Err(AnalysisError::ConfigError(format!("duplicate fee tier: {}", tier.label)));
            }
            if !(0.0..1.0).contains(&tier.taker_fee) {
                return Err(AnalysisError::ConfigError(format!(
                    "taker fee for {} must be a fraction in [0, 1), got {}",
                    tier.label, tier.taker_fee
                )));
            }
        }
        let referenced = std::iter::once(&self.fees.baseline_tier).chain(&self.report.compare_tiers);
        for label in referenced {
            if !seen.contains(label.as_str()) {
                return Err(AnalysisError::UnknownFeeTier(label.clone()));
            }
        }
        Ok(())
    }
}

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from an explicit path, or from `Config.toml` when present, or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<AnalysisConfig, AnalysisError> {
        let path = match path {
            Some(p) => {
                if !p.exists() {
                    return Err(AnalysisError::ConfigError(format!(
                        "config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default_path.exists() {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    let cfg = AnalysisConfig::default();
                    cfg.validate()?;
                    return Ok(cfg);
                }
                default_path
            }
        };

        let content = fs::read_to_string(&path)
            .map_err(|e| AnalysisError::ConfigError(format!("Failed to read config file: {}", e)))?;
        let cfg = AnalysisConfig::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }
}
