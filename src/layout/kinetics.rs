use std::ops::Range;

use crate::color::{LIGHT_GRAY, SERIES_COLORS, cycle};
use crate::config::{ChartKind, ColumnRoles, Role};
use crate::data::columns::{ColumnRule, resolve_column};
use crate::data::model::RawTable;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Axis, AxisSide, Figure, Fill, Legend, LegendEntry, LegendPlacement, MarkerShape, Plane,
    Primitive, Stroke, Swatch, auto_range, numeric_ticks,
};

/// Y range used when every value looks like a percentage.
pub const PERCENT_RANGE: Range<f64> = -2.0..105.0;
const PERCENT_BOUNDS: (f64, f64) = (-5.0, 105.0);

const Y_LABEL: &str = "Yield / Conversion (%)";
const TITLE: &str = "Reaction Kinetics Monitoring";

#[derive(Debug, Clone, PartialEq)]
pub struct KineticSeries {
    pub name: String,
    /// `(time, value)` pairs with missing cells removed.
    pub points: Vec<(f64, f64)>,
}

/// The time axis: `None` for empty cells, error for anything non-numeric.
pub fn time_axis(raw: &RawTable, col: usize) -> Result<Vec<Option<f64>>> {
    raw.column(col)
        .enumerate()
        .map(|(row, cell)| {
            if cell.is_empty() {
                return Ok(None);
            }
            cell.as_f64().map(Some).ok_or_else(|| {
                ChartError::shape(format!(
                    "time column '{}' must be numeric, row {} holds '{cell}'",
                    raw.headers[col],
                    row + 1
                ))
            })
        })
        .collect()
}

pub fn kinetic_series(raw: &RawTable, time_col: usize, times: &[Option<f64>]) -> Vec<KineticSeries> {
    (0..raw.n_cols())
        .filter(|&c| c != time_col)
        .map(|c| KineticSeries {
            name: raw.headers[c].clone(),
            points: times
                .iter()
                .zip(raw.column(c))
                .filter_map(|(t, cell)| Some(((*t)?, cell.as_f64()?)))
                .collect(),
        })
        .collect()
}

/// Every numeric cell outside the time column, timed or not.
fn series_cells(raw: &RawTable, time_col: usize) -> impl Iterator<Item = f64> + '_ {
    (0..raw.n_cols())
        .filter(move |&c| c != time_col)
        .flat_map(move |c| raw.column(c).filter_map(|cell| cell.as_f64()))
}

/// Fixed percentage range when all values fit it, else `None`.
pub fn y_clamp(values: impl IntoIterator<Item = f64>) -> Option<Range<f64>> {
    let mut any = false;
    for v in values {
        if !(PERCENT_BOUNDS.0..=PERCENT_BOUNDS.1).contains(&v) {
            return None;
        }
        any = true;
    }
    any.then_some(PERCENT_RANGE)
}

pub fn plan_kinetics(raw: &RawTable, roles: &ColumnRoles, style: &ChartStyle) -> Result<Figure> {
    let time_col = resolve_column(raw, roles, ColumnRule::positional(Role::Time, 0))?;
    let times = time_axis(raw, time_col)?;
    let series = kinetic_series(raw, time_col, &times);
    if series.is_empty() {
        return Err(ChartError::shape("kinetics chart needs at least one series column"));
    }

    let y = y_clamp(series_cells(raw, time_col)).unwrap_or_else(|| {
        auto_range(series.iter().flat_map(|s| s.points.iter().map(|p| p.1)))
    });
    let x = auto_range(times.iter().flatten().copied());
    let plane = Plane::Cartesian {
        x: x.clone(),
        y: y.clone(),
        y_inverted: false,
    };
    let mut fig = Figure::new(ChartKind::Kinetics, (10.0, 6.0), &style.font_family, plane)
        .with_title(TITLE, style.scaled(1.5));

    let x_ticks = numeric_ticks(&x);
    let y_ticks = numeric_ticks(&y);
    let grid = Stroke::dashed(LIGHT_GRAY, 0.8).with_alpha(0.3);
    for t in &x_ticks {
        fig.push(Primitive::Line {
            points: vec![(t.at, y.start), (t.at, y.end)],
            stroke: grid,
        });
    }
    for t in &y_ticks {
        fig.push(Primitive::Line {
            points: vec![(x.start, t.at), (x.end, t.at)],
            stroke: grid,
        });
    }

    for (i, s) in series.iter().enumerate() {
        let color = cycle(&SERIES_COLORS, i);
        let shape = MarkerShape::CYCLE[i % MarkerShape::CYCLE.len()];
        if s.points.len() > 1 {
            fig.push(Primitive::Line {
                points: s.points.clone(),
                stroke: Stroke::solid(color, 2.5).with_alpha(0.85),
            });
        }
        for &at in &s.points {
            fig.push(Primitive::Marker {
                at,
                shape,
                size: 8.0,
                fill: Fill::translucent(color, 0.85),
                stroke: None,
            });
        }
    }

    let label_size = style.scaled(1.2);
    fig.x_axis = Some(
        Axis::new(AxisSide::Bottom, x_ticks, style.font_size)
            .labeled(raw.headers[time_col].as_str(), label_size)
            .bold_label(),
    );
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, y_ticks, style.font_size)
            .labeled(Y_LABEL, label_size)
            .bold_label(),
    );
    fig.legend = Some(Legend {
        title: None,
        entries: series
            .iter()
            .enumerate()
            .map(|(i, s)| LegendEntry {
                label: s.name.clone(),
                swatch: Swatch::LineMarker(
                    cycle(&SERIES_COLORS, i),
                    MarkerShape::CYCLE[i % MarkerShape::CYCLE.len()],
                ),
            })
            .collect(),
        placement: LegendPlacement::UpperRight,
        font_size: style.font_size,
    });
    Ok(fig)
}
