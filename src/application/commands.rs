//! CLI commands and handlers
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::application::services::AnalysisService;
use crate::shared::config::AnalysisConfig;
use crate::shared::errors::AnalysisError;
use crate::shared::types::{ImageFormat, ReturnColumn, ScanMode};

#[derive(Parser)]
#[command(name = "triarb-analysis")]
#[command(version, about = "Offline analysis of recorded triangular arbitrage ticks")]
pub struct Cli {
    /// Path to config file (defaults to Config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How the tick file is read (overrides config)
    #[arg(long, value_enum, global = true)]
    pub scan: Option<ScanMode>,

    /// Image encoding for charts and tables (overrides config)
    #[arg(long, value_enum, global = true)]
    pub format: Option<ImageFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut AnalysisConfig) {
        if let Some(mode) = self.scan {
            config.scan.mode = mode;
        }
        if let Some(format) = self.format {
            config.report.image_format = format;
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert the NDJSON tick log to Parquet
    Convert {
        /// Source file (defaults to <resources_dir>/<file_name>.txt)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Destination file (defaults to <resources_dir>/<file_name>.parquet)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count data points, opportunity ticks and distinct opportunities
    Stats,

    /// Plot the return curve of one opportunity
    Opportunity {
        /// Zero-based opportunity index
        #[arg(default_value_t = 0)]
        n: usize,
    },

    /// Plot the exchange rate product over time
    ExchangeRate,

    /// Print per-opportunity statistics for a fee tier
    Summarise {
        /// Fee tier label (defaults to the baseline tier)
        #[arg(short, long)]
        tier: Option<String>,

        /// Rows to print (defaults to report.print_limit)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Profitable opportunities under every fee tier
    Fees {
        /// Return column judged against each tier's break-even
        #[arg(short, long, value_enum)]
        column: Option<ReturnColumn>,
    },

    /// Frequency tables and charts for return, duration and traded notional
    Distributions {
        /// Fee tier label (defaults to the baseline tier)
        #[arg(short, long)]
        tier: Option<String>,
    },

    /// Compare fee-adjusted outcomes of two tiers
    Compare {
        /// First tier label (defaults to report.compare_tiers[0])
        #[arg(long)]
        tier_a: Option<String>,

        /// Second tier label (defaults to report.compare_tiers[1])
        #[arg(long)]
        tier_b: Option<String>,
    },

    /// Run every stage in order
    All,
}

pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute the selected command
    pub fn execute(command: Commands, config: AnalysisConfig) -> Result<(), AnalysisError> {
        let service = AnalysisService::new(&config)?;
        let baseline = config.fees.baseline_tier.as_str();

        match command {
            Commands::Convert { input, output } => {
                let report = service.convert(input.as_deref(), output.as_deref())?;
                info!("Wrote {} rows to {}", report.rows_written, report.destination.display());
                Ok(())
            }
            Commands::Stats => service.print_stats(),
            Commands::Opportunity { n } => {
                if let Some(path) = service.plot_nth_opportunity(n)? {
                    info!("Opportunity {} plotted at {}", n, path.display());
                }
                Ok(())
            }
            Commands::ExchangeRate => {
                service.plot_exchange_rate()?;
                Ok(())
            }
            Commands::Summarise { tier, limit } => {
                let summaries = service.summarise(tier.as_deref().unwrap_or(baseline))?;
                service.print_summaries(&summaries, limit.unwrap_or(config.report.print_limit))?;
                service.print_averages(&summaries);
                Ok(())
            }
            Commands::Fees { column } => {
                let column = column.unwrap_or(config.report.return_column);
                let sweep = service.profitability_sweep(column)?;
                service.report_profitability(&sweep)?;
                Ok(())
            }
            Commands::Distributions { tier } => {
                let summaries = service.summarise(tier.as_deref().unwrap_or(baseline))?;
                let written = service.report_distributions(&summaries)?;
                info!("Wrote {} distribution images", written.len());
                Ok(())
            }
            Commands::Compare { tier_a, tier_b } => {
                let [default_a, default_b] = &config.report.compare_tiers;
                let tier_a = tier_a.as_deref().unwrap_or(default_a);
                let tier_b = tier_b.as_deref().unwrap_or(default_b);
                let outcomes = service.compare_tiers(tier_a, tier_b)?;
                service.report_comparison(&outcomes)
            }
            Commands::All => service.run_all(),
        }
    }
}
