//! Fee-adjusted return arithmetic for a three-leg cycle

/// Number of taker fills in one triangular cycle
pub const LEGS: i32 = 3;

/// Compounded multiplier `(1 - fee)^3` applied across the three legs
pub fn effective_multiplier(taker_fee: f64) -> f64 {
    (1.0 - taker_fee).powi(LEGS)
}

/// Raw return in percent, `None` unless the notional is finite and positive
pub fn raw_return_pct(traded_notional: f64, unrealised_pnl: f64) -> Option<f64> {
    fee_adjusted_return_pct(traded_notional, unrealised_pnl, 0.0)
}

/// `((N + P) * m - N) / N * 100`
pub fn fee_adjusted_return_pct(traded_notional: f64, unrealised_pnl: f64, taker_fee: f64) -> Option<f64> {
    if !traded_notional.is_finite() || traded_notional <= 0.0 {
        return None;
    }
    let m = effective_multiplier(taker_fee);
    Some(((traded_notional + unrealised_pnl) * m - traded_notional) / traded_notional * 100.0)
}

/// Minimum raw gain (percent) needed to break even after fees: `(1 - m) / m * 100`
pub fn break_even_return_pct(taker_fee: f64) -> f64 {
    let m = effective_multiplier(taker_fee);
    (1.0 - m) / m * 100.0
}

/// Whether a raw return (percent) stays positive after paying `taker_fee` on every leg
pub fn is_profitable_net_of_fees(raw_return_pct: f64, taker_fee: f64) -> bool {
    raw_return_pct / 100.0 > break_even_return_pct(taker_fee) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_multiplier() {
        assert!((effective_multiplier(0.001) - 0.997002999).abs() < 1e-12);
        assert_eq!(effective_multiplier(0.0), 1.0);
    }

    #[test]
    fn test_fee_adjusted_return() {
        let adjusted = fee_adjusted_return_pct(1000.0, 5.0, 0.001).unwrap();
        assert!((adjusted - 0.1988).abs() < 1e-3, "got {}", adjusted);
        assert!(fee_adjusted_return_pct(0.0, 5.0, 0.001).is_none());
        assert!(fee_adjusted_return_pct(-1.0, 5.0, 0.001).is_none());
        assert!(fee_adjusted_return_pct(f64::NAN, 5.0, 0.001).is_none());
    }

    #[test]
    fn test_raw_return_matches_pnl_ratio() {
        assert!((raw_return_pct(200.0, 1.0).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_higher_fee_never_increases_return() {
        let fees = [0.0, 0.00023, 0.00031, 0.0006, 0.001, 0.01];
        for &(n, p) in &[(1000.0, 5.0), (1.0, -0.2), (0.05, 0.0001), (250.0, 0.0)] {
            let returns: Vec<f64> = fees
                .iter()
                .map(|&f| fee_adjusted_return_pct(n, p, f).unwrap())
                .collect();
            assert!(returns.windows(2).all(|w| w[1] <= w[0]), "{:?}", returns);
        }
    }

    #[test]
    fn test_profitability_threshold_agrees_with_adjusted_return() {
        for &(n, p) in &[(1000.0, 5.0), (1000.0, 2.0), (1000.0, 3.1), (10.0, 0.0)] {
            for &f in &[0.0, 0.00023, 0.001] {
                let raw = raw_return_pct(n, p).unwrap();
                let adjusted = fee_adjusted_return_pct(n, p, f).unwrap();
                assert_eq!(is_profitable_net_of_fees(raw, f), adjusted > 1e-12, "n={} p={} f={}", n, p, f);
            }
        }
    }
}
