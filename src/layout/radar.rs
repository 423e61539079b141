use std::f64::consts::TAU;

use crate::color::{GRAY, LIGHT_GRAY, SERIES_COLORS, cycle};
use crate::config::ChartKind;
use crate::data::model::Table;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Figure, Fill, HAlign, Legend, LegendEntry, LegendPlacement, Plane, Primitive, Stroke, Swatch,
    TextLabel, VAlign, format_tick, linspace, nice_ticks,
};

/// Rows beyond this are not drawn.
pub const MAX_SERIES: usize = 6;

const TITLE: &str = "多靶标广谱活性评价";

/// One closed polygon of the radar chart.
#[derive(Debug, Clone, PartialEq)]
pub struct RadarSeries {
    pub name: String,
    /// `(theta, r)` vertices; the first one is repeated at the end.
    pub points: Vec<(f64, f64)>,
}

/// Axis angle of category `k` out of `n`.
pub fn axis_angle(k: usize, n: usize) -> f64 {
    k as f64 / n as f64 * TAU
}

/// Closed loops for the first [`MAX_SERIES`] rows; missing (NaN) values
/// leave their vertex out.
pub fn radar_series(table: &Table) -> Vec<RadarSeries> {
    let n = table.n_cols();
    if table.n_rows() > MAX_SERIES {
        log::warn!(
            "radar chart shows {MAX_SERIES} of {} rows, the rest are dropped",
            table.n_rows()
        );
    }
    table
        .labels
        .iter()
        .zip(&table.values)
        .take(MAX_SERIES)
        .map(|(name, row)| {
            let mut points: Vec<(f64, f64)> = row
                .iter()
                .enumerate()
                .filter(|(_, v)| !v.is_nan())
                .map(|(k, &v)| (axis_angle(k, n), v))
                .collect();
            if let Some(&first) = points.first() {
                points.push(first);
            }
            RadarSeries {
                name: name.clone(),
                points,
            }
        })
        .collect()
}

pub fn plan_radar(table: &Table, style: &ChartStyle) -> Result<Figure> {
    let n = table.n_cols();
    if n == 0 {
        return Err(ChartError::NoDataColumns);
    }
    let series = radar_series(table);

    let top = table.head(MAX_SERIES).max_value().unwrap_or(0.0).max(0.0);
    let rings: Vec<f64> = nice_ticks(&(0.0..top.max(1.0)), 5)
        .into_iter()
        .filter(|&r| r > 0.0)
        .collect();
    let r_max = rings.last().copied().unwrap_or(1.0).max(top);

    let plane = Plane::Polar {
        r_max,
        zero_at_top: false,
        clockwise: false,
    };
    let mut fig = Figure::new(ChartKind::Radar, (10.0, 10.0), &style.font_family, plane)
        .with_title(TITLE, style.scaled(1.4));

    let grid = Stroke::solid(LIGHT_GRAY, 0.8);
    let tick_size = style.scaled(0.7);
    for &r in &rings {
        fig.push(Primitive::Line {
            points: linspace(0.0, TAU, 120).into_iter().map(|t| (t, r)).collect(),
            stroke: grid,
        });
        fig.text(
            TextLabel::new((axis_angle(1, 16), r), format_tick(r), tick_size)
                .align(HAlign::Left, VAlign::Bottom)
                .colored(GRAY),
        );
    }
    for k in 0..n {
        let theta = axis_angle(k, n);
        fig.push(Primitive::Line {
            points: vec![(theta, 0.0), (theta, r_max)],
            stroke: grid,
        });
    }

    for (i, s) in series.iter().enumerate() {
        let color = cycle(&SERIES_COLORS, i);
        fig.push(Primitive::Area {
            points: s.points.clone(),
            fill: Fill::translucent(color, 0.1),
        });
        fig.push(Primitive::Line {
            points: s.points.clone(),
            stroke: Stroke::solid(color, 2.0),
        });
    }

    for (k, category) in table.columns.iter().enumerate() {
        fig.text(TextLabel::new(
            (axis_angle(k, n), r_max * 1.1),
            category.as_str(),
            style.font_size,
        ));
    }

    fig.legend = Some(Legend {
        title: None,
        entries: series
            .iter()
            .enumerate()
            .map(|(i, s)| LegendEntry {
                label: s.name.clone(),
                swatch: Swatch::Line(cycle(&SERIES_COLORS, i)),
            })
            .collect(),
        placement: LegendPlacement::UpperLeft,
        font_size: style.font_size,
    });
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMapName;

    fn table(n_rows: usize) -> Table {
        Table {
            index_name: "化合物".into(),
            labels: (0..n_rows).map(|i| format!("C{i}")).collect(),
            columns: vec!["灰霉".into(), "赤霉".into(), "白粉".into()],
            values: (0..n_rows).map(|i| vec![i as f64, 50.0, 90.0]).collect(),
        }
    }

    #[test]
    fn at_most_six_series() {
        assert_eq!(radar_series(&table(20)).len(), 6);
        assert_eq!(radar_series(&table(3)).len(), 3);

        let style = ChartStyle::new(14.0, ColorMapName::AcademicRed);
        let fig = plan_radar(&table(20), &style).unwrap();
        let areas = fig
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Area { .. }))
            .count();
        assert_eq!(areas, 6);
        assert_eq!(fig.legend.unwrap().entries.len(), 6);
    }

    #[test]
    fn series_are_closed_loops() {
        let series = radar_series(&table(1));
        let points = &series[0].points;
        assert_eq!(points.len(), 4);
        assert_eq!(points.first(), points.last());
        assert!((points[1].0 - TAU / 3.0).abs() < 1e-12);
        assert_eq!(points[1].1, 50.0);
    }

    #[test]
    fn missing_values_drop_their_vertex() {
        let mut t = table(1);
        t.values[0][1] = f64::NAN;
        let points = &radar_series(&t)[0].points;
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], (axis_angle(2, 3), 90.0));
        assert_eq!(points.first(), points.last());
    }

    #[test]
    fn categories_follow_column_order() {
        let style = ChartStyle::new(14.0, ColorMapName::AcademicRed);
        let fig = plan_radar(&table(2), &style).unwrap();
        let labels: Vec<&str> = fig
            .texts()
            .filter(|t| t.size == 14.0)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(labels, vec!["灰霉", "赤霉", "白粉"]);
        assert_eq!(fig.title.unwrap().size, 19.0);
    }

    #[test]
    fn no_columns_is_an_error() {
        let empty = Table {
            index_name: "化合物".into(),
            labels: vec!["a".into()],
            columns: vec![],
            values: vec![vec![]],
        };
        let style = ChartStyle::new(14.0, ColorMapName::AcademicRed);
        assert!(matches!(plan_radar(&empty, &style), Err(ChartError::NoDataColumns)));
    }
}
