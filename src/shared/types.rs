//! Common types used across the application

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// One recorded tick, as written by the arbitrage server's trade file writer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRow {
    pub bottleneck_leg: String,
    pub unrealised_pnl: f64,
    pub traded_notional: f64,
    pub order_book_levels: String,
    pub tick_process_time: i64,
    pub tick_receive_time: i64,
    pub rate1: f64,
    pub rate2: f64,
    pub rate3: f64,
    pub is_arbitrage_opportunity: bool,
}

impl TickRow {
    /// Product of the three leg rates; 1.0 means the cycle nets to zero.
    pub fn exchange_rate_product(&self) -> f64 {
        self.rate1 * self.rate2 * self.rate3
    }
}

/// A tick that belongs to an opportunity run.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityTick {
    pub group_id: u64,
    pub tick: TickRow,
}

/// Per-run statistics. Returns are percentages, already fee adjusted.
///
/// Return fields are `None` when no row of the run had a positive notional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunitySummary {
    pub group_id: u64,
    pub tick_count: usize,
    pub first_return: Option<f64>,
    pub max_return: Option<f64>,
    pub traded_notional_for_max_return: Option<f64>,
    pub return_for_max_traded_notional: Option<f64>,
    pub first_traded_notional: f64,
    pub max_traded_notional: f64,
    pub average_return: Option<f64>,
    pub average_traded_notional: f64,
    pub duration_ns: i64,
}

impl OpportunitySummary {
    pub fn duration_secs(&self) -> f64 {
        self.duration_ns as f64 / 1_000_000_000.0
    }
}

/// Return columns of [`OpportunitySummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReturnColumn {
    FirstReturn,
    MaxReturn,
    ReturnForMaxTradedNotional,
    AverageReturn,
}

impl ReturnColumn {
    pub fn value(&self, summary: &OpportunitySummary) -> Option<f64> {
        SummaryColumn::from(*self).value(summary)
    }
}

/// Numeric columns of [`OpportunitySummary`] that can be bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SummaryColumn {
    FirstReturn,
    MaxReturn,
    TradedNotionalForMaxReturn,
    ReturnForMaxTradedNotional,
    FirstTradedNotional,
    MaxTradedNotional,
    AverageReturn,
    AverageTradedNotional,
    /// Seconds
    Duration,
}

impl SummaryColumn {
    pub fn value(&self, summary: &OpportunitySummary) -> Option<f64> {
        match self {
            SummaryColumn::FirstReturn => summary.first_return,
            SummaryColumn::MaxReturn => summary.max_return,
            SummaryColumn::TradedNotionalForMaxReturn => summary.traded_notional_for_max_return,
            SummaryColumn::ReturnForMaxTradedNotional => summary.return_for_max_traded_notional,
            SummaryColumn::FirstTradedNotional => Some(summary.first_traded_notional),
            SummaryColumn::MaxTradedNotional => Some(summary.max_traded_notional),
            SummaryColumn::AverageReturn => summary.average_return,
            SummaryColumn::AverageTradedNotional => Some(summary.average_traded_notional),
            SummaryColumn::Duration => Some(summary.duration_secs()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryColumn::FirstReturn => "FirstReturn",
            SummaryColumn::MaxReturn => "MaxReturn",
            SummaryColumn::TradedNotionalForMaxReturn => "TradedNotionalForMaxReturn",
            SummaryColumn::ReturnForMaxTradedNotional => "ReturnForMaxTradedNotional",
            SummaryColumn::FirstTradedNotional => "FirstTradedNotional",
            SummaryColumn::MaxTradedNotional => "MaxTradedNotional",
            SummaryColumn::AverageReturn => "AverageReturn",
            SummaryColumn::AverageTradedNotional => "AverageTradedNotional",
            SummaryColumn::Duration => "Duration",
        }
    }
}

impl From<ReturnColumn> for SummaryColumn {
    fn from(column: ReturnColumn) -> Self {
        match column {
            ReturnColumn::FirstReturn => SummaryColumn::FirstReturn,
            ReturnColumn::MaxReturn => SummaryColumn::MaxReturn,
            ReturnColumn::ReturnForMaxTradedNotional => SummaryColumn::ReturnForMaxTradedNotional,
            ReturnColumn::AverageReturn => SummaryColumn::AverageReturn,
        }
    }
}

/// How tick data is read from the columnar file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScanMode {
    /// Decode and fold one record batch at a time.
    #[default]
    Streaming,
    /// Materialise every row before processing.
    Eager,
}

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_row_deserializes_camel_case() {
        let line = r#"{"bottleneckLeg":"BTCUSDT","unrealisedPnl":0.5,"tradedNotional":100.0,
            "orderBookLevels":"[]","tickProcessTime":2,"tickReceiveTime":1,
            "rate1":1.0,"rate2":0.5,"rate3":2.0,"isArbitrageOpportunity":true}"#;
        let tick: TickRow = serde_json::from_str(line).unwrap();

        assert_eq!(tick.bottleneck_leg, "BTCUSDT");
        assert_eq!(tick.tick_receive_time, 1);
        assert!(tick.is_arbitrage_opportunity);
        assert_eq!(tick.exchange_rate_product(), 1.0);
    }

    #[test]
    fn test_duration_column_is_seconds() {
        let summary = OpportunitySummary {
            group_id: 1,
            tick_count: 2,
            first_return: Some(0.1),
            max_return: Some(0.2),
            traded_notional_for_max_return: Some(10.0),
            return_for_max_traded_notional: Some(0.2),
            first_traded_notional: 5.0,
            max_traded_notional: 10.0,
            average_return: Some(0.15),
            average_traded_notional: 7.5,
            duration_ns: 1_500_000_000,
        };

        assert_eq!(SummaryColumn::Duration.value(&summary), Some(1.5));
        assert_eq!(ReturnColumn::MaxReturn.value(&summary), Some(0.2));
    }
}
