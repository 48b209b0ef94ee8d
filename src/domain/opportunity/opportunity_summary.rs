//! Per-run statistics

use std::collections::BTreeMap;

use crate::domain::fees::fee_adjusted_return_pct;
use crate::shared::types::{OpportunitySummary, OpportunityTick, TickRow};

#[derive(Debug, Clone)]
struct RunAccumulator {
    tick_count: usize,
    first_return: Option<f64>,
    first_traded_notional: f64,
    first_receive_time: i64,
    last_receive_time: i64,
    /// (return, notional) of the earliest row with the highest return
    best_return: Option<(f64, f64)>,
    /// (notional, pnl) of the earliest row with the highest notional
    max_notional: (f64, f64),
    return_sum: f64,
    return_count: usize,
    notional_sum: f64,
}

impl RunAccumulator {
    fn start(tick: &TickRow, taker_fee: f64) -> Self {
        let ret = fee_adjusted_return_pct(tick.traded_notional, tick.unrealised_pnl, taker_fee);
        Self {
            tick_count: 1,
            first_return: ret,
            first_traded_notional: tick.traded_notional,
            first_receive_time: tick.tick_receive_time,
            last_receive_time: tick.tick_receive_time,
            best_return: ret.map(|r| (r, tick.traded_notional)),
            max_notional: (tick.traded_notional, tick.unrealised_pnl),
            return_sum: ret.unwrap_or(0.0),
            return_count: ret.is_some() as usize,
            notional_sum: tick.traded_notional,
        }
    }

    fn push(&mut self, tick: &TickRow, taker_fee: f64) {
        self.tick_count += 1;
        self.last_receive_time = tick.tick_receive_time;
        self.notional_sum += tick.traded_notional;

        // strict comparisons: on exact ties the earliest row wins
        if tick.traded_notional > self.max_notional.0 {
            self.max_notional = (tick.traded_notional, tick.unrealised_pnl);
        }

        if let Some(r) = fee_adjusted_return_pct(tick.traded_notional, tick.unrealised_pnl, taker_fee) {
            self.return_sum += r;
            self.return_count += 1;
            match self.best_return {
                Some((best, _)) if r <= best => {}
                _ => self.best_return = Some((r, tick.traded_notional)),
            }
        }
    }

    fn finish(self, group_id: u64, taker_fee: f64) -> OpportunitySummary {
        let (max_traded_notional, pnl_at_max_notional) = self.max_notional;
        OpportunitySummary {
            group_id,
            tick_count: self.tick_count,
            first_return: self.first_return,
            max_return: self.best_return.map(|(r, _)| r),
            traded_notional_for_max_return: self.best_return.map(|(_, n)| n),
            return_for_max_traded_notional: fee_adjusted_return_pct(
                max_traded_notional,
                pnl_at_max_notional,
                taker_fee,
            ),
            first_traded_notional: self.first_traded_notional,
            max_traded_notional,
            average_return: (self.return_count > 0).then(|| self.return_sum / self.return_count as f64),
            average_traded_notional: self.notional_sum / self.tick_count as f64,
            duration_ns: self.last_receive_time.saturating_sub(self.first_receive_time),
        }
    }
}

/// Folds opportunity ticks into one [`OpportunitySummary`] per group.
///
/// Ticks may arrive in any number of batches; within a group they must be in
/// row order. Output is ordered by group id.
#[derive(Debug, Clone)]
pub struct OpportunitySummarizer {
    taker_fee: f64,
    runs: BTreeMap<u64, RunAccumulator>,
}

impl OpportunitySummarizer {
    pub fn new(taker_fee: f64) -> Self {
        Self {
            taker_fee,
            runs: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, tick: &OpportunityTick) {
        let fee = self.taker_fee;
        self.runs
            .entry(tick.group_id)
            .and_modify(|acc| acc.push(&tick.tick, fee))
            .or_insert_with(|| RunAccumulator::start(&tick.tick, fee));
    }

    pub fn extend<'a>(&mut self, ticks: impl IntoIterator<Item = &'a OpportunityTick>) {
        for tick in ticks {
            self.push(tick);
        }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn finish(self) -> Vec<OpportunitySummary> {
        let fee = self.taker_fee;
        self.runs
            .into_iter()
            .map(|(group_id, acc)| acc.finish(group_id, fee))
            .collect()
    }
}

/// Summaries of already grouped ticks
pub fn summarise_opportunities(ticks: &[OpportunityTick], taker_fee: f64) -> Vec<OpportunitySummary> {
    let mut summarizer = OpportunitySummarizer::new(taker_fee);
    summarizer.extend(ticks);
    summarizer.finish()
}
