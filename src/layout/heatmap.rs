use crate::color::{BLACK, ColorMap, WHITE};
use crate::config::ChartKind;
use crate::data::model::Table;
use crate::style::ChartStyle;

use super::{Axis, AxisSide, ColorBar, Figure, Fill, HAlign, Plane, Primitive, Stroke, TextLabel, VAlign, category_ticks};

/// Width of one heatmap cell in inches.
pub const CELL_WIDTH_IN: f64 = 1.15;
/// Height of one heatmap cell in inches.
pub const CELL_HEIGHT_IN: f64 = 0.65;
const MARGIN_WIDTH_IN: f64 = 3.0;
const MARGIN_HEIGHT_IN: f64 = 2.0;

/// Fixed colour scale; values outside are clipped.
pub const VALUE_RANGE: std::ops::Range<f64> = 0.0..100.0;

const ROW_AXIS_LABEL: &str = "生测编号";
const COLUMN_HEADER: &str = "处理浓度 (ppm)";
const COLORBAR_LABEL: &str = "死亡率 (%)";

/// Figure size in inches for a `n_rows` × `n_cols` matrix.
pub fn figure_size(n_rows: usize, n_cols: usize) -> (f64, f64) {
    (
        n_cols as f64 * CELL_WIDTH_IN + MARGIN_WIDTH_IN,
        n_rows as f64 * CELL_HEIGHT_IN + MARGIN_HEIGHT_IN,
    )
}

/// Integer overlay text; halves round to even.
pub fn cell_text(value: f64) -> String {
    format!("{}", value.round_ties_even() as i64)
}

/// One figure per non-empty segment.
pub fn plan_heatmaps(segments: &[Table], style: &ChartStyle) -> Vec<Figure> {
    segments
        .iter()
        .filter(|segment| !segment.is_empty())
        .map(|segment| plan_heatmap(segment, style))
        .collect()
}

pub fn plan_heatmap(table: &Table, style: &ChartStyle) -> Figure {
    let n_rows = table.n_rows();
    let n_cols = table.n_cols();
    let map = ColorMap::new(style.color_map);

    let plane = Plane::Cartesian {
        x: 0.0..n_cols as f64,
        y: 0.0..n_rows as f64,
        y_inverted: true,
    };
    let mut fig = Figure::new(
        ChartKind::Heatmap,
        figure_size(n_rows, n_cols),
        &style.font_family,
        plane,
    )
    .with_title(COLUMN_HEADER, style.font_size);

    let value_size = style.scaled(1.125);
    for (i, row) in table.values.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            let (x, y) = (j as f64, i as f64);
            fig.push(Primitive::Rect {
                x0: x,
                y0: y,
                x1: x + 1.0,
                y1: y + 1.0,
                fill: Fill::solid(map.scaled(v, VALUE_RANGE.start, VALUE_RANGE.end)),
                stroke: Some(Stroke::solid(WHITE, 0.4)),
            });
            fig.text(
                TextLabel::new((x + 0.5, y + 0.5), cell_text(v), value_size)
                    .align(HAlign::Center, VAlign::Middle)
                    .colored(BLACK)
                    .bold(),
            );
        }
    }

    fig.x_axis = Some(
        Axis::new(AxisSide::Top, category_ticks(&table.columns, 0.5), style.font_size)
            .without_spine(),
    );
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, category_ticks(&table.labels, 0.5), style.font_size)
            .labeled(ROW_AXIS_LABEL, style.scaled(1.5))
            .without_spine(),
    );
    fig.colorbar = Some(ColorBar {
        map,
        range: VALUE_RANGE,
        label: COLORBAR_LABEL.to_string(),
        label_size: style.scaled(0.875),
        tick_size: style.scaled(0.75),
    });
    fig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::to_hex;
    use crate::config::ColorMapName;

    fn table(rows: &[(&str, &[f64])]) -> Table {
        Table {
            index_name: "生测编号".into(),
            labels: rows.iter().map(|(l, _)| l.to_string()).collect(),
            columns: vec!["100 ppm".into(), "50 ppm".into()],
            values: rows.iter().map(|(_, v)| v.to_vec()).collect(),
        }
    }

    #[test]
    fn size_grows_with_table() {
        assert_eq!(figure_size(10, 6), (6.0 * 1.15 + 3.0, 10.0 * 0.65 + 2.0));
        let (w1, h1) = figure_size(4, 2);
        let (w2, h2) = figure_size(8, 4);
        assert!(w2 > w1 && h2 > h1);
    }

    #[test]
    fn overlay_rounds_half_to_even() {
        assert_eq!(cell_text(12.5), "12");
        assert_eq!(cell_text(13.5), "14");
        assert_eq!(cell_text(99.6), "100");
        assert_eq!(cell_text(-0.2), "0");
    }

    #[test]
    fn one_cell_and_label_per_value() {
        let style = ChartStyle::new(16.0, ColorMapName::AcademicRed);
        let fig = plan_heatmap(&table(&[("Ⅰ1-1", &[95.0, 40.0]), ("CK", &[0.0, 0.0])]), &style);
        let rects = fig
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { .. }))
            .count();
        assert_eq!(rects, 4);
        let texts: Vec<&str> = fig.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["95", "40", "0", "0"]);
        assert_eq!(fig.texts().next().unwrap().size, 18.0);
    }

    #[test]
    fn color_scale_is_fixed_and_clipped() {
        let style = ChartStyle::new(16.0, ColorMapName::AcademicRed);
        let fig = plan_heatmap(&table(&[("a", &[150.0, 100.0])]), &style);
        let fills: Vec<String> = fig
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect { fill, .. } => Some(to_hex(fill.color)),
                _ => None,
            })
            .collect();
        assert_eq!(fills[0], fills[1]);
        assert_eq!(fills[0], "#a50f15");
        assert_eq!(fig.colorbar.as_ref().unwrap().range, 0.0..100.0);
    }

    #[test]
    fn empty_segments_are_skipped() {
        let style = ChartStyle::new(16.0, ColorMapName::AcademicRed);
        let full = table(&[("a", &[1.0, 2.0])]);
        let empty = full.slice_rows(0..0);
        assert_eq!(plan_heatmaps(&[full, empty], &style).len(), 1);
    }
}
