use std::ops::Range;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::domain::fees::raw_return_pct;
use crate::domain::stats::FrequencyTable;
use crate::infrastructure::rendering::{Figure, FONT};
use crate::shared::types::OpportunityTick;
use crate::shared::utils::format_epoch_ns;

const MAX_X_LABELS: usize = 20;

fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = (max - min).max(max.abs() * 1e-6).max(1e-9);
    (min - span * 0.05)..(max + span * 0.05)
}

/// Raw return of each tick of one opportunity, against tick index
pub struct ReturnCurveChart {
    pub title: String,
    /// One entry per tick; `None` where the tick has no return
    pub returns: Vec<Option<f64>>,
}

impl ReturnCurveChart {
    pub fn from_ticks(title: &str, ticks: &[OpportunityTick]) -> Self {
        Self {
            title: title.to_string(),
            returns: ticks
                .iter()
                .map(|t| raw_return_pct(t.tick.traded_notional, t.tick.unrealised_pnl))
                .collect(),
        }
    }

    /// (tick index, return) for ticks that have a return
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.returns
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.map(|r| (i as f64, r)))
            .collect()
    }
}

impl Figure for ReturnCurveChart {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let points = self.points();
        let x_max = (self.returns.len().saturating_sub(1)).max(1) as f64;
        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, (FONT, 22))
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..x_max, padded_range(points.iter().map(|(_, r)| *r)))?;

        chart
            .configure_mesh()
            .x_labels(10)
            .x_label_formatter(&|x: &f64| format!("{}", x.round() as i64))
            .x_desc("Tick Index")
            .y_desc("Return")
            .draw()?;

        chart.draw_series(LineSeries::new(points, BLUE.stroke_width(2)))?;
        Ok(())
    }
}

/// Seconds from `start` to `t`, without intermediate i64 overflow
fn seconds_since(start: i64, t: i64) -> f64 {
    (t as i128 - start as i128) as f64 / 1e9
}

/// `rate1 * rate2 * rate3` over processing time, with the break-even line at 1.0
pub struct ExchangeRateChart {
    pub title: String,
    /// (tickProcessTime ns, rate product)
    pub points: Vec<(i64, f64)>,
}

impl Figure for ExchangeRateChart {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let start = self.points.iter().map(|(t, _)| *t).min().unwrap_or(0);
        let end = self.points.iter().map(|(t, _)| *t).max().unwrap_or(start);
        let x_max = seconds_since(start, end).max(1e-9);
        let y_range = padded_range(self.points.iter().map(|(_, p)| *p).chain(std::iter::once(1.0)));

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, (FONT, 22))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .build_cartesian_2d(0f64..x_max, y_range)?;

        chart
            .configure_mesh()
            .x_labels(6)
            .x_label_formatter(&|x: &f64| format_epoch_ns(start.saturating_add((x * 1e9) as i64)))
            .y_label_formatter(&|y: &f64| format!("{:.6}", y))
            .x_desc("Time")
            .y_desc("Product of Exchange Rates")
            .draw()?;

        chart.draw_series(LineSeries::new(
            self.points
                .iter()
                .map(|(t, p)| (seconds_since(start, *t), *p)),
            BLACK.stroke_width(1),
        ))?;
        chart.draw_series(LineSeries::new(vec![(0.0, 1.0), (x_max, 1.0)], RED.stroke_width(2)))?;
        Ok(())
    }
}

/// Relative frequency bars with the cumulative percentage on a secondary axis
pub struct FrequencyChart<'a> {
    pub title: String,
    pub x_desc: String,
    pub table: &'a FrequencyTable,
}

impl Figure for FrequencyChart<'_> {
    fn draw<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
    ) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
        root.fill(&WHITE)?;

        let rows = &self.table.rows;
        let n = rows.len().max(1) as f64;
        let y_max = rows.iter().map(|r| r.relative_pct).fold(0.0, f64::max).max(1.0) * 1.1;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.title, (FONT, 24))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(60)
            .right_y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n - 0.5), 0f64..y_max)?
            .set_secondary_coord(-0.5f64..(n - 0.5), 0f64..100f64);

        let label_at = |x: &f64| {
            let i = x.round();
            if (x - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            rows.get(i as usize).map(|r| r.label.clone()).unwrap_or_default()
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(rows.len().min(MAX_X_LABELS))
            .x_label_formatter(&label_at)
            .x_label_style((FONT, 11))
            .x_desc(self.x_desc.as_str())
            .y_desc("Relative frequency (%)")
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Cumulative frequency (%)")
            .draw()?;

        chart.draw_series(rows.iter().enumerate().map(|(i, r)| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, r.relative_pct)], BLUE.mix(0.6).filled())
        }))?;
        chart.draw_secondary_series(LineSeries::new(
            rows.iter().enumerate().map(|(i, r)| (i as f64, r.cumulative_pct)),
            RED.stroke_width(2),
        ))?;
        Ok(())
    }
}
