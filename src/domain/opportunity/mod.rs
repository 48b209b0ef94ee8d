//! Opportunity domain - run detection, per-run statistics and fee-tier profitability

pub mod opportunity_summary;
pub mod profitability;
pub mod run_detector;

pub use opportunity_summary::{summarise_opportunities, OpportunitySummarizer};
pub use profitability::{profitable_opportunities_by_tier, TierOutcome, TierProfitability};
pub use run_detector::{assign_group_ids, group_opportunities, RunDetector};
