use std::fs::File;
use std::io::Write;
use std::path::Path;

use triarb_analysis::shared::config::{AnalysisConfig, FeeTierCfg};
use triarb_analysis::shared::types::{ImageFormat, ReturnColumn, ScanMode};
use triarb_analysis::AnalysisService;

fn tick_line(receive_ns: i64, pnl: f64, notional: f64, flag: bool) -> String {
    format!(
        r#"{{"bottleneckLeg":"ETHBTC","unrealisedPnl":{},"tradedNotional":{},"orderBookLevels":"[[1.0,2.0]]","tickProcessTime":{},"tickReceiveTime":{},"rate1":1.0001,"rate2":0.99995,"rate3":1.0,"isArbitrageOpportunity":{},"extra":"ignored"}}"#,
        pnl,
        notional,
        receive_ns + 250,
        receive_ns,
        flag
    )
}

/// `[F, T, T, F, T]` as an NDJSON file under `dir`
fn write_fixture(dir: &Path, config: &AnalysisConfig) {
    std::fs::create_dir_all(dir).unwrap();
    let mut f = File::create(config.paths.json_path()).unwrap();
    let rows = [
        (1_700_000_000_000_000_000, 0.0, 1000.0, false),
        (1_700_000_000_100_000_000, 5.0, 1000.0, true),
        (1_700_000_000_600_000_000, 2.0, 1000.0, true),
        (1_700_000_001_000_000_000, 0.0, 1000.0, false),
        (1_700_000_002_000_000_000, 1.0, 200.0, true),
    ];
    for (ts, pnl, notional, flag) in rows {
        writeln!(f, "{}", tick_line(ts, pnl, notional, flag)).unwrap();
    }
    writeln!(f).unwrap();
}

fn config_in(dir: &Path, mode: ScanMode) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    config.paths.resources_dir = dir.join("resources");
    config.paths.results_dir = Some(dir.join("results"));
    config.scan.mode = mode;
    config.scan.batch_size = 2;
    config.report.image_format = ImageFormat::Svg;
    config
}

fn prepared(dir: &Path, mode: ScanMode) -> AnalysisService {
    let config = config_in(dir, mode);
    write_fixture(&config.paths.resources_dir, &config);
    let service = AnalysisService::new(&config).unwrap();
    let report = service.convert(None, None).unwrap();
    assert_eq!(report.rows_written, 5);
    service
}

#[test]
fn test_round_trip_counts_and_runs() {
    let dir = tempfile::tempdir().unwrap();
    let service = prepared(dir.path(), ScanMode::Streaming);

    assert_eq!(service.count_data_points().unwrap(), 5);
    assert_eq!(service.count_opportunity_ticks().unwrap(), 3);
    assert_eq!(service.count_distinct_opportunities().unwrap(), 2);

    let first = service.nth_opportunity(0).unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].tick.unrealised_pnl, 5.0);
    assert_eq!(first[0].tick.order_book_levels, "[[1.0,2.0]]");
    assert_eq!(first[1].tick.tick_receive_time, 1_700_000_000_600_000_000);

    let second = service.nth_opportunity(1).unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].group_id, 2);
}

#[test]
fn test_streaming_and_eager_summaries_match() {
    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    let streaming = prepared(dir_a.path(), ScanMode::Streaming);
    let eager = prepared(dir_b.path(), ScanMode::Eager);

    for tier in ["None", "VIP_9", "Regular"] {
        assert_eq!(streaming.summarise(tier).unwrap(), eager.summarise(tier).unwrap());
    }

    let summaries = streaming.summarise("Regular").unwrap();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].tick_count, 2);
    assert_eq!(summaries[0].duration_ns, 500_000_000);
    // ((1000 + 5) * 0.999^3 - 1000) / 1000 * 100
    let max = summaries[0].max_return.unwrap();
    assert!((max - 0.19880).abs() < 1e-4, "max return {}", max);
    assert_eq!(summaries[1].duration_ns, 0);
}

#[test]
fn test_fee_sweep_is_monotone_in_fee() {
    let dir = tempfile::tempdir().unwrap();
    let service = prepared(dir.path(), ScanMode::Streaming);

    let sweep = service.profitability_sweep(ReturnColumn::MaxReturn).unwrap();
    assert_eq!(sweep.len(), 11);
    assert!(sweep.iter().all(|t| t.total == 2));

    let none = sweep.iter().find(|t| t.tier == "None").unwrap();
    let regular = sweep.iter().find(|t| t.tier == "Regular").unwrap();
    assert_eq!(none.profitable, 2);
    assert!(regular.profitable <= none.profitable);
}

#[test]
fn test_reports_land_in_results_dir() {
    let dir = tempfile::tempdir().unwrap();
    let service = prepared(dir.path(), ScanMode::Streaming);
    let results = dir.path().join("results");

    let curve = service.plot_nth_opportunity(0).unwrap().unwrap();
    assert_eq!(curve, results.join("example_trade_data_opportunity_0_return.svg"));
    assert!(curve.exists());
    assert!(service.plot_nth_opportunity(7).unwrap().is_none());

    let rates = service.plot_exchange_rate().unwrap().unwrap();
    assert!(rates.exists());

    let sweep = service.profitability_sweep(ReturnColumn::MaxReturn).unwrap();
    assert!(service.report_profitability(&sweep).unwrap().exists());

    let summaries = service.summarise("None").unwrap();
    let written = service.report_distributions(&summaries).unwrap();
    assert!(written.contains(&results.join("example_trade_data_duration_distribution.svg")));
    assert!(written.contains(&results.join("example_trade_data_traded_notional_distribution_table.svg")));
}

#[test]
fn test_run_all_converts_when_parquet_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), ScanMode::Eager);
    write_fixture(&config.paths.resources_dir, &config);

    let service = AnalysisService::new(&config).unwrap();
    service.run_all().unwrap();

    assert!(config.paths.parquet_path().exists());
    assert!(config.paths.artifact_path("return_distribution", "svg").exists());
}

#[test]
fn test_run_all_uses_configured_tier_table() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path(), ScanMode::Streaming);
    config.fees.baseline_tier = "None".to_string();
    config.fees.tiers = vec![
        FeeTierCfg { label: "None".to_string(), taker_fee: 0.0 },
        FeeTierCfg { label: "Maker".to_string(), taker_fee: 0.0002 },
    ];
    config.report.compare_tiers = ["Maker".to_string(), "None".to_string()];
    write_fixture(&config.paths.resources_dir, &config);

    let service = AnalysisService::new(&config).unwrap();
    service.run_all().unwrap();
    assert!(config.paths.artifact_path("fee_tier_profitability_table", "svg").exists());

    let outcomes = service.compare_tiers("Maker", "None").unwrap();
    assert_eq!(outcomes[0].tier, "Maker");
    assert_eq!(outcomes[1].opportunities, 2);

    config.report.compare_tiers = ["VIP_9".to_string(), "None".to_string()];
    assert!(AnalysisService::new(&config).is_err());
}

#[test]
fn test_default_format_writes_png_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AnalysisConfig::default();
    config.paths.resources_dir = dir.path().join("resources");
    config.paths.results_dir = Some(dir.path().join("results"));
    assert_eq!(config.report.image_format, ImageFormat::Png);
    write_fixture(&config.paths.resources_dir, &config);

    let service = AnalysisService::new(&config).unwrap();
    service.run_all().unwrap();

    for artifact in [
        "opportunity_0_return",
        "exchange_rate_product_over_time",
        "fee_tier_profitability_table",
        "return_distribution",
        "return_distribution_table",
        "duration_distribution",
        "traded_notional_distribution_table",
    ] {
        let path = config.paths.artifact_path(artifact, "png");
        let bytes = std::fs::read(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
        assert_eq!(&bytes[1..4], b"PNG", "{}", path.display());
    }
}
