//! Chart layout planners: pure functions from tables to [`Figure`]s.
//!
//! No planner mutates its input or touches process-wide state; style comes
//! in through an explicit [`ChartStyle`](crate::style::ChartStyle).

pub mod bar;
pub mod boxplot;
pub mod bubble;
pub mod energy;
pub mod figure;
pub mod heatmap;
pub mod kinetics;
pub mod polar;
pub mod radar;

use std::ops::Range;

pub use figure::*;

use crate::data::model::RawTable;

/// Relative padding added around auto-scaled data ranges.
pub const AUTO_MARGIN: f64 = 0.05;

/// Data range of `values` padded by [`AUTO_MARGIN`] on both sides.
///
/// Non-finite values are ignored; an empty input gives `0..1`.
pub fn auto_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span == 0.0 {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * AUTO_MARGIN };
        return lo - pad..hi + pad;
    }
    lo - span * AUTO_MARGIN..hi + span * AUTO_MARGIN
}

/// Round tick positions covering `range`, about `target` of them.
pub fn nice_ticks(range: &Range<f64>, target: usize) -> Vec<f64> {
    let span = range.end - range.start;
    if !span.is_finite() || span <= 0.0 || target == 0 {
        return vec![range.start];
    }
    let raw_step = span / target as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw_step)
        .unwrap_or(10.0 * magnitude);

    let first = (range.start / step).ceil() as i64;
    let last = (range.end / step + 1e-9).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Short decimal form of a tick value (`20`, `2.5`, `-0.75`).
pub fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let s = format!("{rounded:.6}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

/// Ticks for a numeric axis.
pub fn numeric_ticks(range: &Range<f64>) -> Vec<Tick> {
    nice_ticks(range, 6)
        .into_iter()
        .map(|at| Tick {
            at,
            label: format_tick(at),
        })
        .collect()
}

/// Ticks at integer positions `0..labels.len()` (plus `offset`).
pub fn category_ticks<S: AsRef<str>>(labels: &[S], offset: f64) -> Vec<Tick> {
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| Tick {
            at: i as f64 + offset,
            label: label.as_ref().to_string(),
        })
        .collect()
}

/// Like [`auto_range`] but never pads across zero, so bars grow from the axis.
pub fn bar_range(values: impl IntoIterator<Item = f64>) -> Range<f64> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    let padded = auto_range(values.iter().copied().chain([0.0]));
    let start = if values.iter().all(|&v| v >= 0.0) { 0.0 } else { padded.start };
    let end = if values.iter().all(|&v| v <= 0.0) && !values.is_empty() {
        0.0
    } else {
        padded.end
    };
    start..end
}

/// Numeric view of one raw column; unparsable cells become 0 with a warning.
pub(crate) fn coerced_column(raw: &RawTable, idx: usize) -> Vec<f64> {
    let mut coerced = 0;
    let values = raw
        .column(idx)
        .map(|cell| {
            cell.as_f64().unwrap_or_else(|| {
                coerced += 1;
                0.0
            })
        })
        .collect();
    if coerced > 0 {
        log::warn!(
            "column '{}': {coerced} non-numeric cell(s) coerced to 0",
            raw.headers[idx]
        );
    }
    values
}

/// `n` evenly spaced samples from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..n)
            .map(|i| start + (end - start) * i as f64 / (n - 1) as f64)
            .collect(),
    }
}
