//! Result tables as Arrow record batches, for pretty printing

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, StringArray, UInt64Array};
use arrow::record_batch::RecordBatch;
use arrow::util::pretty::pretty_format_batches;

use crate::domain::opportunity::{TierOutcome, TierProfitability};
use crate::domain::stats::FrequencyTable;
use crate::shared::errors::AnalysisError;
use crate::shared::types::OpportunitySummary;

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>())) as ArrayRef
}

fn optional_floats(values: impl Iterator<Item = Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>())) as ArrayRef
}

fn counts(values: impl Iterator<Item = u64>) -> ArrayRef {
    Arc::new(UInt64Array::from(values.collect::<Vec<_>>())) as ArrayRef
}

fn strings(values: impl Iterator<Item = String>) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>())) as ArrayRef
}

/// One row per run, at most `limit` rows
pub fn summaries_batch(summaries: &[OpportunitySummary], limit: usize) -> Result<RecordBatch, AnalysisError> {
    let s = &summaries[..summaries.len().min(limit)];
    Ok(RecordBatch::try_from_iter(vec![
        ("group_id", counts(s.iter().map(|r| r.group_id))),
        ("TickCount", counts(s.iter().map(|r| r.tick_count as u64))),
        ("FirstReturn", optional_floats(s.iter().map(|r| r.first_return))),
        ("MaxReturn", optional_floats(s.iter().map(|r| r.max_return))),
        (
            "TradedNotionalForMaxReturn",
            optional_floats(s.iter().map(|r| r.traded_notional_for_max_return)),
        ),
        (
            "ReturnForMaxTradedNotional",
            optional_floats(s.iter().map(|r| r.return_for_max_traded_notional)),
        ),
        ("FirstTradedNotional", floats(s.iter().map(|r| r.first_traded_notional))),
        ("MaxTradedNotional", floats(s.iter().map(|r| r.max_traded_notional))),
        ("AverageReturn", optional_floats(s.iter().map(|r| r.average_return))),
        ("AverageTradedNotional", floats(s.iter().map(|r| r.average_traded_notional))),
        ("Duration", floats(s.iter().map(|r| r.duration_secs()))),
    ])?)
}

pub fn frequency_batch(table: &FrequencyTable) -> Result<RecordBatch, AnalysisError> {
    let rows = &table.rows;
    Ok(RecordBatch::try_from_iter(vec![
        ("Bin", strings(rows.iter().map(|r| r.label.clone()))),
        ("Count", counts(rows.iter().map(|r| r.count as u64))),
        ("Relative Frequency (%)", floats(rows.iter().map(|r| r.relative_pct))),
        ("Cumulative Count", counts(rows.iter().map(|r| r.cumulative_count as u64))),
        ("Cumulative Frequency (%)", floats(rows.iter().map(|r| r.cumulative_pct))),
    ])?)
}

pub fn profitability_batch(sweep: &[TierProfitability]) -> Result<RecordBatch, AnalysisError> {
    Ok(RecordBatch::try_from_iter(vec![
        ("Tier", strings(sweep.iter().map(|t| t.tier.clone()))),
        ("TakerFee", floats(sweep.iter().map(|t| t.taker_fee))),
        ("Multiplier", floats(sweep.iter().map(|t| t.multiplier))),
        ("BreakEvenReturn (%)", floats(sweep.iter().map(|t| t.break_even_return_pct))),
        ("Profitable", counts(sweep.iter().map(|t| t.profitable as u64))),
        ("Total", counts(sweep.iter().map(|t| t.total as u64))),
        ("Profitable (%)", floats(sweep.iter().map(|t| t.profitable_pct))),
    ])?)
}

pub fn outcomes_batch(outcomes: &[TierOutcome]) -> Result<RecordBatch, AnalysisError> {
    Ok(RecordBatch::try_from_iter(vec![
        ("Tier", strings(outcomes.iter().map(|o| o.tier.clone()))),
        ("Opportunities", counts(outcomes.iter().map(|o| o.opportunities as u64))),
        ("ProfitableAfterFees", counts(outcomes.iter().map(|o| o.profitable as u64))),
        ("MeanAverageReturn", optional_floats(outcomes.iter().map(|o| o.mean_average_return))),
        (
            "MeanAverageTradedNotional",
            optional_floats(outcomes.iter().map(|o| o.mean_average_traded_notional)),
        ),
    ])?)
}

/// Box-drawn text rendering of `batch`
pub fn format_batch(batch: &RecordBatch) -> Result<String, AnalysisError> {
    Ok(pretty_format_batches(std::slice::from_ref(batch))?.to_string())
}
