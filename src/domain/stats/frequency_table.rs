//! Fixed-edge histograms with relative and cumulative frequencies

use crate::shared::errors::AnalysisError;
use crate::shared::utils::percentage;

#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRow {
    pub label: String,
    /// Exclusive lower bound, `-inf` for the first bucket
    pub lower: f64,
    /// Inclusive upper bound, `inf` for the last bucket
    pub upper: f64,
    pub count: usize,
    pub relative_pct: f64,
    pub cumulative_count: usize,
    pub cumulative_pct: f64,
}

/// Buckets `(-inf, e0]`, `(e0, e1]`, ..., `(e_last, inf)` in edge order.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    pub rows: Vec<FrequencyRow>,
    pub total: usize,
    /// Non-finite inputs left out of every bucket
    pub skipped: usize,
}

impl FrequencyTable {
    pub fn build(values: impl IntoIterator<Item = f64>, edges: &[f64]) -> Result<Self, AnalysisError> {
        validate_edges(edges)?;

        let mut counts = vec![0usize; edges.len() + 1];
        let mut skipped = 0;
        for v in values {
            if !v.is_finite() {
                skipped += 1;
                continue;
            }
            // first edge >= v; everything above the last edge lands in the overflow bucket
            let bucket = edges.partition_point(|&e| e < v);
            counts[bucket] += 1;
        }

        let total: usize = counts.iter().sum();
        let mut cumulative = 0;
        let rows = counts
            .iter()
            .enumerate()
            .map(|(i, &count)| {
                let lower = if i == 0 { f64::NEG_INFINITY } else { edges[i - 1] };
                let upper = edges.get(i).copied().unwrap_or(f64::INFINITY);
                cumulative += count;
                FrequencyRow {
                    label: bucket_label(lower, upper),
                    lower,
                    upper,
                    count,
                    relative_pct: percentage(count, total),
                    cumulative_count: cumulative,
                    cumulative_pct: percentage(cumulative, total),
                }
            })
            .collect();

        Ok(Self { rows, total, skipped })
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Rows with a non-zero count; cumulative columns keep their full-table values
    pub fn non_empty_rows(&self) -> impl Iterator<Item = &FrequencyRow> {
        self.rows.iter().filter(|r| r.count > 0)
    }
}

fn validate_edges(edges: &[f64]) -> Result<(), AnalysisError> {
    if edges.is_empty() {
        return Err(AnalysisError::InvalidBins("at least one edge is required".to_string()));
    }
    if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
        return Err(AnalysisError::InvalidBins(format!("non-finite edge {}", bad)));
    }
    if let Some(w) = edges.windows(2).find(|w| w[0] >= w[1]) {
        return Err(AnalysisError::InvalidBins(format!(
            "edges must be strictly ascending ({} >= {})",
            w[0], w[1]
        )));
    }
    Ok(())
}

fn bucket_label(lower: f64, upper: f64) -> String {
    format!("({}, {}]", fmt_edge(lower), fmt_edge(upper)).replace("inf]", "inf)")
}

fn fmt_edge(edge: f64) -> String {
    match edge {
        e if e == f64::INFINITY => "inf".to_string(),
        e if e == f64::NEG_INFINITY => "-inf".to_string(),
        e => format!("{}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_assignment_is_right_closed() {
        let table = FrequencyTable::build(vec![-1.0, 0.0, 0.01, 0.025, 0.03, 0.05, 0.6], &[0.0, 0.025, 0.05]).unwrap();

        let counts: Vec<usize> = table.rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![2, 2, 2, 1]);
        let labels: Vec<&str> = table.rows.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["(-inf, 0]", "(0, 0.025]", "(0.025, 0.05]", "(0.05, inf)"]);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let values: Vec<f64> = (0..997).map(|i| (i as f64 * 0.37).sin() * 3.0).collect();
        let table = FrequencyTable::build(values, &[-2.0, -1.0, 0.0, 0.5, 1.0, 2.5]).unwrap();

        let sum: f64 = table.rows.iter().map(|r| r.relative_pct).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        let last = table.rows.last().unwrap();
        assert_eq!(last.cumulative_count, 997);
        assert!((last.cumulative_pct - 100.0).abs() < 1e-9);
        assert!(table.rows.windows(2).all(|w| w[0].cumulative_count <= w[1].cumulative_count));
    }

    #[test]
    fn test_edges_validation() {
        assert!(matches!(FrequencyTable::build(vec![1.0], &[]), Err(AnalysisError::InvalidBins(_))));
        assert!(FrequencyTable::build(vec![1.0], &[1.0, 1.0]).is_err());
        assert!(FrequencyTable::build(vec![1.0], &[2.0, 1.0]).is_err());
        assert!(FrequencyTable::build(vec![1.0], &[0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_empty_and_non_finite_values() {
        let table = FrequencyTable::build(vec![f64::NAN, f64::INFINITY], &[0.0, 1.0]).unwrap();

        assert!(table.is_empty());
        assert_eq!(table.skipped, 2);
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|r| r.relative_pct == 0.0 && r.cumulative_pct == 0.0));
        assert_eq!(table.non_empty_rows().count(), 0);
    }
}
