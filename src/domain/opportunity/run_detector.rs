//! Grouping of consecutive opportunity ticks into runs

use crate::shared::types::{OpportunityTick, TickRow};

/// Running count of run starts over the opportunity flag.
///
/// A run starts at a flagged row whose predecessor is not flagged; the row
/// before the first one counts as not flagged. State is kept between calls so
/// a table can be fed batch by batch.
#[derive(Debug, Default, Clone)]
pub struct RunDetector {
    previous: bool,
    runs: u64,
}

impl RunDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group id for the next row. Only meaningful when `is_opportunity` is true.
    pub fn observe(&mut self, is_opportunity: bool) -> u64 {
        if is_opportunity && !self.previous {
            self.runs += 1;
        }
        self.previous = is_opportunity;
        self.runs
    }

    /// Number of runs seen so far
    pub fn runs(&self) -> u64 {
        self.runs
    }

    /// Feed a batch and keep only the opportunity rows, tagged with their group id
    pub fn tag_opportunities<I>(&mut self, rows: I) -> Vec<OpportunityTick>
    where
        I: IntoIterator<Item = TickRow>,
    {
        rows.into_iter()
            .filter_map(|tick| {
                let group_id = self.observe(tick.is_arbitrage_opportunity);
                tick.is_arbitrage_opportunity
                    .then_some(OpportunityTick { group_id, tick })
            })
            .collect()
    }
}

/// Group id for every row, including non-opportunity rows (which carry the last id)
pub fn assign_group_ids(flags: &[bool]) -> Vec<u64> {
    let mut detector = RunDetector::new();
    flags.iter().map(|&f| detector.observe(f)).collect()
}

/// Opportunity rows of an in-memory table with their group ids
pub fn group_opportunities(rows: &[TickRow]) -> Vec<OpportunityTick> {
    RunDetector::new().tag_opportunities(rows.iter().cloned())
}
