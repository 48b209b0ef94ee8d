//! Taker fee tiers

use chrono::NaiveDate;

use crate::domain::fees::fee_adjustment::{break_even_return_pct, effective_multiplier};
use crate::shared::config::FeesCfg;
use crate::shared::errors::AnalysisError;

/// One VIP level and its per-fill taker fee (fraction)
#[derive(Debug, Clone, PartialEq)]
pub struct FeeTier {
    pub label: String,
    pub taker_fee: f64,
}

impl FeeTier {
    pub fn multiplier(&self) -> f64 {
        effective_multiplier(self.taker_fee)
    }

    pub fn break_even_return_pct(&self) -> f64 {
        break_even_return_pct(self.taker_fee)
    }
}

/// Ordered tier table, as published on `effective_date`
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    pub effective_date: NaiveDate,
    tiers: Vec<FeeTier>,
}

impl FeeSchedule {
    pub fn new(effective_date: NaiveDate, tiers: Vec<FeeTier>) -> Self {
        Self { effective_date, tiers }
    }

    pub fn from_config(cfg: &FeesCfg) -> Self {
        let tiers = cfg
            .tiers
            .iter()
            .map(|t| FeeTier {
                label: t.label.clone(),
                taker_fee: t.taker_fee,
            })
            .collect();
        Self::new(cfg.effective_date, tiers)
    }

    pub fn tiers(&self) -> &[FeeTier] {
        &self.tiers
    }

    pub fn tier(&self, label: &str) -> Result<&FeeTier, AnalysisError> {
        self.tiers
            .iter()
            .find(|t| t.label == label)
            .ok_or_else(|| AnalysisError::UnknownFeeTier(label.to_string()))
    }

    pub fn taker_fee(&self, label: &str) -> Result<f64, AnalysisError> {
        self.tier(label).map(|t| t.taker_fee)
    }
}
