//! Application services and use cases

use std::path::{Path, PathBuf};

use arrow::record_batch::RecordBatch;
use tracing::{info, warn};

use crate::domain::fees::FeeSchedule;
use crate::domain::opportunity::{
    profitable_opportunities_by_tier, OpportunitySummarizer, RunDetector, TierOutcome, TierProfitability,
};
use crate::domain::stats::FrequencyTable;
use crate::infrastructure::rendering::terminal_table::{
    format_batch, frequency_batch, outcomes_batch, profitability_batch, summaries_batch,
};
use crate::infrastructure::rendering::{
    render, ExchangeRateChart, Figure, FrequencyChart, ReturnCurveChart, TableImage,
};
use crate::infrastructure::storage::{convert_ndjson_to_parquet, ConversionReport, TickScanner};
use crate::shared::config::AnalysisConfig;
use crate::shared::errors::AnalysisError;
use crate::shared::types::{OpportunitySummary, OpportunityTick, ReturnColumn, SummaryColumn};
use crate::shared::utils::{format_opt, mean};

/// One histogram panel of the distribution report
struct Panel {
    column: SummaryColumn,
    edges: Vec<f64>,
    title: &'static str,
    x_desc: &'static str,
    artifact: &'static str,
}

/// Analysis use cases over one tick file
pub struct AnalysisService {
    config: AnalysisConfig,
    schedule: FeeSchedule,
}

impl AnalysisService {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            schedule: FeeSchedule::from_config(&config.fees),
        })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn schedule(&self) -> &FeeSchedule {
        &self.schedule
    }

    fn scanner(&self) -> Result<TickScanner, AnalysisError> {
        TickScanner::open(&self.config.paths.parquet_path(), self.config.scan.batch_size)
    }

    fn image_path(&self, artifact: &str) -> PathBuf {
        self.config
            .paths
            .artifact_path(artifact, self.config.report.image_format.extension())
    }

    fn draw<F: Figure>(&self, figure: &F, artifact: &str) -> Result<PathBuf, AnalysisError> {
        let path = self.image_path(artifact);
        let report = &self.config.report;
        render(figure, &path, report.image_format, (report.width, report.height))?;
        Ok(path)
    }

    fn print(&self, title: &str, batch: &RecordBatch) -> Result<(), AnalysisError> {
        println!("{}\n{}", title, format_batch(batch)?);
        Ok(())
    }

    /// Convert the NDJSON tick log into the Parquet file the other use cases read
    pub fn convert(&self, input: Option<&Path>, output: Option<&Path>) -> Result<ConversionReport, AnalysisError> {
        let input = input.map(Path::to_path_buf).unwrap_or_else(|| self.config.paths.json_path());
        let output = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.paths.parquet_path());
        convert_ndjson_to_parquet(&input, &output, self.config.scan.batch_size)
    }

    pub fn count_data_points(&self) -> Result<u64, AnalysisError> {
        self.scanner()?.row_count()
    }

    pub fn count_opportunity_ticks(&self) -> Result<u64, AnalysisError> {
        let mut count = 0u64;
        self.scanner()?.for_each_batch(self.config.scan.mode, |rows| {
            count += rows.iter().filter(|r| r.is_arbitrage_opportunity).count() as u64;
            Ok(())
        })?;
        Ok(count)
    }

    pub fn count_distinct_opportunities(&self) -> Result<u64, AnalysisError> {
        let mut detector = RunDetector::new();
        self.scanner()?.for_each_batch(self.config.scan.mode, |rows| {
            for row in &rows {
                detector.observe(row.is_arbitrage_opportunity);
            }
            Ok(())
        })?;
        Ok(detector.runs())
    }

    pub fn print_stats(&self) -> Result<(), AnalysisError> {
        info!("Number of data points: {}", self.count_data_points()?);
        info!("Number of arbitrage opportunities: {}", self.count_opportunity_ticks()?);
        info!(
            "Number of distinct arbitrage opportunities: {}",
            self.count_distinct_opportunities()?
        );
        Ok(())
    }

    /// Rows of the `n`-th run (zero-based); empty when it does not exist
    pub fn nth_opportunity(&self, n: usize) -> Result<Vec<OpportunityTick>, AnalysisError> {
        let target = n as u64 + 1;
        let mut detector = RunDetector::new();
        let mut path = Vec::new();
        self.scanner()?.for_each_batch(self.config.scan.mode, |rows| {
            path.extend(
                detector
                    .tag_opportunities(rows)
                    .into_iter()
                    .filter(|t| t.group_id == target),
            );
            Ok(())
        })?;

        let runs = detector.runs();
        if runs == 0 {
            warn!("No arbitrage opportunities found.");
        } else if target > runs {
            warn!("Opportunity {} not found. Only {} opportunities exist.", n, runs);
        }
        Ok(path)
    }

    /// Raw return curve of the `n`-th run; `None` when there is nothing to draw
    pub fn plot_nth_opportunity(&self, n: usize) -> Result<Option<PathBuf>, AnalysisError> {
        let path = self.nth_opportunity(n)?;
        if path.is_empty() {
            return Ok(None);
        }
        let chart = ReturnCurveChart::from_ticks(
            "Percentage Return over Time for a Combined Arbitrage Opportunity",
            &path,
        );
        self.draw(&chart, &format!("opportunity_{}_return", n)).map(Some)
    }

    /// `(tickProcessTime, rate1 * rate2 * rate3)` for every row
    pub fn exchange_rate_series(&self) -> Result<Vec<(i64, f64)>, AnalysisError> {
        let mut points = Vec::new();
        self.scanner()?.for_each_batch(self.config.scan.mode, |rows| {
            points.extend(rows.iter().map(|r| (r.tick_process_time, r.exchange_rate_product())));
            Ok(())
        })?;
        Ok(points)
    }

    pub fn plot_exchange_rate(&self) -> Result<Option<PathBuf>, AnalysisError> {
        let points = self.exchange_rate_series()?;
        if points.is_empty() {
            warn!("No ticks to plot");
            return Ok(None);
        }
        let chart = ExchangeRateChart {
            title: "Exchange Rate over Time".to_string(),
            points,
        };
        self.draw(&chart, "exchange_rate_product_over_time").map(Some)
    }

    /// Summaries of every run, one list per tier, from a single scan
    pub fn summarise_tiers(&self, tiers: &[&str]) -> Result<Vec<Vec<OpportunitySummary>>, AnalysisError> {
        let mut summarizers = tiers
            .iter()
            .map(|t| self.schedule.taker_fee(t).map(OpportunitySummarizer::new))
            .collect::<Result<Vec<_>, _>>()?;

        let mut detector = RunDetector::new();
        self.scanner()?.for_each_batch(self.config.scan.mode, |rows| {
            let ticks = detector.tag_opportunities(rows);
            for summarizer in summarizers.iter_mut() {
                summarizer.extend(&ticks);
            }
            Ok(())
        })?;

        Ok(summarizers.into_iter().map(OpportunitySummarizer::finish).collect())
    }

    pub fn summarise(&self, tier: &str) -> Result<Vec<OpportunitySummary>, AnalysisError> {
        let summaries = self.summarise_tiers(&[tier])?.pop().unwrap_or_default();
        info!("Summarised {} opportunities at tier {}", summaries.len(), tier);
        Ok(summaries)
    }

    /// Profitable runs per tier, judged on `column` computed at the baseline tier
    pub fn profitability_sweep(&self, column: ReturnColumn) -> Result<Vec<TierProfitability>, AnalysisError> {
        let baseline = self.summarise(&self.config.fees.baseline_tier)?;
        Ok(profitable_opportunities_by_tier(&baseline, column, &self.schedule))
    }

    pub fn compare_tiers(&self, tier_a: &str, tier_b: &str) -> Result<Vec<TierOutcome>, AnalysisError> {
        let per_tier = self.summarise_tiers(&[tier_a, tier_b])?;
        Ok([tier_a, tier_b]
            .iter()
            .zip(&per_tier)
            .map(|(tier, summaries)| TierOutcome::from_summaries(tier, summaries))
            .collect())
    }

    pub fn print_summaries(&self, summaries: &[OpportunitySummary], limit: usize) -> Result<(), AnalysisError> {
        let title = format!("Opportunity summaries ({} of {})", limit.min(summaries.len()), summaries.len());
        self.print(&title, &summaries_batch(summaries, limit)?)
    }

    pub fn print_averages(&self, summaries: &[OpportunitySummary]) {
        let average_return = mean(summaries.iter().filter_map(|s| s.average_return));
        let average_notional = mean(summaries.iter().map(|s| s.average_traded_notional));
        info!("Average Return: {}%", format_opt(average_return, 5));
        info!("Average Traded Notional: {}", format_opt(average_notional, 5));
    }

    /// Print the sweep and save it as a table image
    pub fn report_profitability(&self, sweep: &[TierProfitability]) -> Result<PathBuf, AnalysisError> {
        self.print("Profitable opportunities by fee tier", &profitability_batch(sweep)?)?;

        let table = TableImage {
            title: format!("Profitable Opportunities by Taker Fee Tier ({})", self.schedule.effective_date),
            header: ["Tier", "Taker Fee", "Multiplier", "Break-even (%)", "Profitable", "Total", "Profitable (%)"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: sweep
                .iter()
                .map(|t| {
                    vec![
                        t.tier.clone(),
                        format!("{:.5}", t.taker_fee),
                        format!("{:.6}", t.multiplier),
                        format!("{:.4}", t.break_even_return_pct),
                        t.profitable.to_string(),
                        t.total.to_string(),
                        format!("{:.2}", t.profitable_pct),
                    ]
                })
                .collect(),
        };
        self.draw(&table, "fee_tier_profitability_table")
    }

    pub fn report_comparison(&self, outcomes: &[TierOutcome]) -> Result<(), AnalysisError> {
        self.print("Fee tier comparison", &outcomes_batch(outcomes)?)
    }

    fn panels(&self) -> Result<Vec<Panel>, AnalysisError> {
        let bins = &self.config.bins;
        Ok(vec![
            Panel {
                column: self.config.report.return_column.into(),
                edges: bins.return_pct.edges()?,
                title: "Panel A: Return",
                x_desc: "Return (%)",
                artifact: "return_distribution",
            },
            Panel {
                column: SummaryColumn::Duration,
                edges: bins.duration_secs.edges()?,
                title: "Panel B: Duration",
                x_desc: "Duration (s)",
                artifact: "duration_distribution",
            },
            Panel {
                column: SummaryColumn::MaxTradedNotional,
                edges: bins.traded_notional.edges()?,
                title: "Panel C: Tradable Value",
                x_desc: "Traded Notional",
                artifact: "traded_notional_distribution",
            },
        ])
    }

    pub fn frequency_table(
        &self,
        summaries: &[OpportunitySummary],
        column: SummaryColumn,
        edges: &[f64],
    ) -> Result<FrequencyTable, AnalysisError> {
        FrequencyTable::build(summaries.iter().filter_map(|s| column.value(s)), edges)
    }

    fn frequency_image(&self, title: &str, table: &FrequencyTable) -> TableImage {
        let rows: Vec<_> = if table.rows.len() > self.config.report.max_table_rows {
            table.non_empty_rows().collect()
        } else {
            table.rows.iter().collect()
        };
        TableImage {
            title: title.to_string(),
            header: ["Bin", "Count", "Relative (%)", "Cumulative Count", "Cumulative (%)"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rows: rows
                .into_iter()
                .map(|r| {
                    vec![
                        r.label.clone(),
                        r.count.to_string(),
                        format!("{:.2}", r.relative_pct),
                        r.cumulative_count.to_string(),
                        format!("{:.2}", r.cumulative_pct),
                    ]
                })
                .collect(),
        }
    }

    /// Frequency tables, charts and table images for return, duration and notional
    pub fn report_distributions(&self, summaries: &[OpportunitySummary]) -> Result<Vec<PathBuf>, AnalysisError> {
        if summaries.is_empty() {
            warn!("No opportunity summaries, skipping distribution report");
            return Ok(Vec::new());
        }

        let mut written = Vec::new();
        for panel in self.panels()? {
            let table = self.frequency_table(summaries, panel.column, &panel.edges)?;
            if table.is_empty() {
                warn!("No {} values to bucket, skipping {}", panel.column.as_str(), panel.title);
                continue;
            }
            if table.skipped > 0 {
                warn!("{} non-finite {} values left out", table.skipped, panel.column.as_str());
            }
            self.print(panel.title, &frequency_batch(&table)?)?;

            let chart = FrequencyChart {
                title: format!("{} ({})", panel.title, panel.column.as_str()),
                x_desc: panel.x_desc.to_string(),
                table: &table,
            };
            written.push(self.draw(&chart, panel.artifact)?);
            written.push(self.draw(
                &self.frequency_image(panel.title, &table),
                &format!("{}_table", panel.artifact),
            )?);
        }
        Ok(written)
    }

    /// Every stage in order, converting first when no Parquet file exists yet
    pub fn run_all(&self) -> Result<(), AnalysisError> {
        if !self.config.paths.parquet_path().exists() {
            self.convert(None, None)?;
        }

        self.print_stats()?;
        self.plot_nth_opportunity(0)?;
        self.plot_exchange_rate()?;

        let baseline_tier = self.config.fees.baseline_tier.clone();
        let baseline = self.summarise(&baseline_tier)?;
        let sweep = profitable_opportunities_by_tier(&baseline, self.config.report.return_column, &self.schedule);
        self.report_profitability(&sweep)?;

        self.report_distributions(&baseline)?;
        self.print_averages(&baseline);
        self.print_summaries(&baseline, self.config.report.print_limit)?;

        let [tier_a, tier_b] = &self.config.report.compare_tiers;
        let outcomes = self.compare_tiers(tier_a, tier_b)?;
        self.report_comparison(&outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::{tick_batch, tick_schema};
    use crate::shared::types::{ImageFormat, ScanMode, TickRow};
    use parquet::arrow::ArrowWriter;
    use std::fs::File;
    use std::sync::Arc;

    fn tick(ts: i64, pnl: f64, notional: f64, flag: bool) -> TickRow {
        TickRow {
            bottleneck_leg: "BTCUSDT".to_string(),
            unrealised_pnl: pnl,
            traded_notional: notional,
            order_book_levels: "[]".to_string(),
            tick_process_time: ts + 10,
            tick_receive_time: ts,
            rate1: 1.0,
            rate2: 1.0,
            rate3: 1.0 + pnl / notional,
            is_arbitrage_opportunity: flag,
        }
    }

    fn service_with(rows: &[TickRow], dir: &Path, mode: ScanMode) -> AnalysisService {
        let mut config = AnalysisConfig::default();
        config.paths.resources_dir = dir.to_path_buf();
        config.scan.mode = mode;
        config.scan.batch_size = 2;
        config.report.image_format = ImageFormat::Svg;

        let path = config.paths.parquet_path();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), Arc::new(tick_schema()), None).unwrap();
        writer.write(&tick_batch(rows).unwrap()).unwrap();
        writer.close().unwrap();

        AnalysisService::new(&config).unwrap()
    }

    fn sample() -> Vec<TickRow> {
        vec![
            tick(0, 0.0, 100.0, false),
            tick(1_000_000_000, 0.2, 100.0, true),
            tick(2_500_000_000, 0.3, 100.0, true),
            tick(3_000_000_000, 0.0, 100.0, false),
            tick(4_000_000_000, 0.05, 50.0, true),
        ]
    }

    #[test]
    fn test_counts() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Streaming);

        assert_eq!(service.count_data_points().unwrap(), 5);
        assert_eq!(service.count_opportunity_ticks().unwrap(), 3);
        assert_eq!(service.count_distinct_opportunities().unwrap(), 2);
    }

    #[test]
    fn test_nth_opportunity() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Streaming);

        let first = service.nth_opportunity(0).unwrap();
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|t| t.group_id == 1));
        assert_eq!(service.nth_opportunity(1).unwrap().len(), 1);
        assert!(service.nth_opportunity(2).unwrap().is_empty());
    }

    #[test]
    fn test_summaries_agree_across_scan_modes() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let streaming = service_with(&sample(), dir_a.path(), ScanMode::Streaming);
        let eager = service_with(&sample(), dir_b.path(), ScanMode::Eager);

        let a = streaming.summarise("VIP_9").unwrap();
        assert_eq!(a, eager.summarise("VIP_9").unwrap());
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].duration_ns, 1_500_000_000);
    }

    #[test]
    fn test_unknown_tier() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Streaming);

        assert!(matches!(service.summarise("VIP_42"), Err(AnalysisError::UnknownFeeTier(_))));
    }

    #[test]
    fn test_compare_tiers_orders_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Eager);

        let outcomes = service.compare_tiers("VIP_9", "Regular").unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].tier, "VIP_9");
        assert_eq!(outcomes[1].opportunities, 2);
        // Regular break-even is ~0.3006%, above both raw max returns
        assert_eq!(outcomes[0].profitable, 2);
        assert_eq!(outcomes[1].profitable, 0);
    }

    #[test]
    fn test_exchange_rate_chart_title() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Eager);

        let path = service.plot_exchange_rate().unwrap().unwrap();
        let svg = std::fs::read_to_string(path).unwrap();
        assert!(svg.contains("Exchange Rate over Time"));
    }

    #[test]
    fn test_distributions_write_images() {
        let dir = tempfile::tempdir().unwrap();
        let service = service_with(&sample(), dir.path(), ScanMode::Streaming);

        let summaries = service.summarise("None").unwrap();
        let written = service.report_distributions(&summaries).unwrap();
        assert_eq!(written.len(), 6);
        assert!(written.iter().all(|p| p.exists()));

        assert!(service.report_distributions(&[]).unwrap().is_empty());
    }
}
