use crate::color::{BLACK, FUNGICIDE_COLORS};
use crate::config::{ChartKind, ColumnRoles, Role};
use crate::data::columns::{ColumnRule, resolve_distinct};
use crate::data::model::RawTable;
use crate::data::normalize::IDENTIFIER_COLUMN;
use crate::error::Result;
use crate::style::ChartStyle;

use super::{
    Axis, AxisSide, Figure, Fill, Legend, LegendEntry, LegendPlacement, Plane, Primitive, Stroke,
    Swatch, bar_range, category_ticks, coerced_column, numeric_ticks,
};

pub const GRAY_MOLD: &str = "灰霉";
pub const HEAD_BLIGHT: &str = "赤霉";
/// Width of each of the two bars in a group.
pub const BAR_WIDTH: f64 = 0.35;

const Y_LABEL: &str = "抑制率 / 相对值";

const RULES: [ColumnRule<'static>; 3] = [
    ColumnRule::named(Role::Label, IDENTIFIER_COLUMN, 0),
    ColumnRule::named(Role::GrayMold, GRAY_MOLD, 1),
    ColumnRule::named(Role::HeadBlight, HEAD_BLIGHT, 2),
];

/// Grouped gray-mold / head-blight bars per sample.
pub fn plan_fungicide_bar(raw: &RawTable, roles: &ColumnRoles, style: &ChartStyle) -> Result<Figure> {
    let cols = resolve_distinct(raw, roles, &RULES)?;
    let labels: Vec<String> = raw.column(cols[0]).map(|c| c.label()).collect();
    let series = [coerced_column(raw, cols[1]), coerced_column(raw, cols[2])];
    let n = labels.len();

    let y = bar_range(series.iter().flatten().copied());
    let plane = Plane::Cartesian {
        x: -0.6..(n as f64 - 0.4).max(0.6),
        y: y.clone(),
        y_inverted: false,
    };
    let mut fig = Figure::new(ChartKind::FungicideBar, (14.0, 7.0), &style.font_family, plane);

    for (s, values) in series.iter().enumerate() {
        let color = FUNGICIDE_COLORS[s];
        for (i, &v) in values.iter().enumerate() {
            let (x0, x1) = if s == 0 {
                (i as f64 - BAR_WIDTH, i as f64)
            } else {
                (i as f64, i as f64 + BAR_WIDTH)
            };
            fig.push(Primitive::Rect {
                x0,
                y0: 0.0,
                x1,
                y1: v,
                fill: Fill::solid(color),
                stroke: None,
            });
        }
    }
    fig.push(Primitive::Line {
        points: vec![(-0.6, 0.0), ((n as f64 - 0.4).max(0.6), 0.0)],
        stroke: Stroke::solid(BLACK, 1.5),
    });

    fig.x_axis = Some(
        Axis::new(AxisSide::Bottom, category_ticks(&labels, 0.0), style.font_size)
            .labeled(IDENTIFIER_COLUMN, style.font_size),
    );
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, numeric_ticks(&y), style.font_size)
            .labeled(Y_LABEL, style.font_size),
    );
    fig.legend = Some(Legend {
        title: None,
        entries: [GRAY_MOLD, HEAD_BLIGHT]
            .iter()
            .zip(FUNGICIDE_COLORS)
            .map(|(name, color)| LegendEntry {
                label: name.to_string(),
                swatch: Swatch::Patch(color),
            })
            .collect(),
        placement: LegendPlacement::UpperLeft,
        font_size: style.font_size,
    });
    Ok(fig)
}
