//! Fee domain - taker fee tiers and fee-adjusted returns

pub mod fee_adjustment;
pub mod fee_schedule;

pub use fee_adjustment::{
    break_even_return_pct, effective_multiplier, fee_adjusted_return_pct, is_profitable_net_of_fees,
    raw_return_pct,
};
pub use fee_schedule::{FeeSchedule, FeeTier};
