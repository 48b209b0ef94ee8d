//! Profitability of opportunities across fee tiers

use crate::domain::fees::{is_profitable_net_of_fees, FeeSchedule};
use crate::shared::types::{OpportunitySummary, ReturnColumn};
use crate::shared::utils::{mean, percentage};

/// How many opportunities survive one tier's fees
#[derive(Debug, Clone, PartialEq)]
pub struct TierProfitability {
    pub tier: String,
    pub taker_fee: f64,
    pub multiplier: f64,
    pub break_even_return_pct: f64,
    pub profitable: usize,
    pub total: usize,
    pub profitable_pct: f64,
}

/// Count, per tier, the summaries whose raw `column` return clears the tier's break-even.
///
/// `summaries` must be computed without fees. Rows with no return in `column`
/// count towards the total but never as profitable.
pub fn profitable_opportunities_by_tier(
    summaries: &[OpportunitySummary],
    column: ReturnColumn,
    schedule: &FeeSchedule,
) -> Vec<TierProfitability> {
    let total = summaries.len();
    schedule
        .tiers()
        .iter()
        .map(|tier| {
            let profitable = summaries
                .iter()
                .filter_map(|s| column.value(s))
                .filter(|&r| is_profitable_net_of_fees(r, tier.taker_fee))
                .count();
            TierProfitability {
                tier: tier.label.clone(),
                taker_fee: tier.taker_fee,
                multiplier: tier.multiplier(),
                break_even_return_pct: tier.break_even_return_pct(),
                profitable,
                total,
                profitable_pct: percentage(profitable, total),
            }
        })
        .collect()
}

/// Headline numbers for one tier's fee-adjusted summaries
#[derive(Debug, Clone, PartialEq)]
pub struct TierOutcome {
    pub tier: String,
    pub opportunities: usize,
    /// Runs whose fee-adjusted max return is positive
    pub profitable: usize,
    pub mean_average_return: Option<f64>,
    pub mean_average_traded_notional: Option<f64>,
}

impl TierOutcome {
    pub fn from_summaries(tier: &str, summaries: &[OpportunitySummary]) -> Self {
        Self {
            tier: tier.to_string(),
            opportunities: summaries.len(),
            profitable: summaries
                .iter()
                .filter(|s| s.max_return.map_or(false, |r| r > 0.0))
                .count(),
            mean_average_return: mean(summaries.iter().filter_map(|s| s.average_return)),
            mean_average_traded_notional: mean(summaries.iter().map(|s| s.average_traded_notional)),
        }
    }
}
