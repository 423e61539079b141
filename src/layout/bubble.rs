use std::collections::{BTreeMap, BTreeSet};

use crate::color::{BLACK, ColorMap, LIGHT_GRAY};
use crate::config::{ChartKind, ColumnRoles, Role};
use crate::data::columns::{ColumnRule, resolve_distinct};
use crate::data::model::RawTable;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Axis, AxisSide, ColorBar, Figure, Fill, Legend, LegendEntry, LegendPlacement, MarkerShape,
    Plane, Primitive, Stroke, Swatch, category_ticks, coerced_column,
};

/// Marker area in pt² per unit of the size column.
pub const SIZE_SCALE: f64 = 12.0;
/// Size values shown in the size legend.
pub const LEGEND_SIZES: [f64; 3] = [20.0, 50.0, 80.0];

const TITLE: &str = "反应条件筛选结果 (Reaction Optimization)";

const RULES: [ColumnRule<'static>; 4] = [
    ColumnRule::positional(Role::X, 0),
    ColumnRule::positional(Role::Y, 1),
    ColumnRule::positional(Role::Size, 2),
    ColumnRule::positional(Role::Color, 3),
];

/// Sorted unique categories and the grid position of each one.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAxis {
    pub labels: Vec<String>,
    rank: BTreeMap<String, usize>,
}

impl CategoryAxis {
    pub fn new<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let unique: BTreeSet<&str> = values.into_iter().collect();
        let labels: Vec<String> = unique.into_iter().map(str::to_string).collect();
        let rank = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        CategoryAxis { labels, rank }
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.rank.get(value).copied()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Marker diameter in points for a size value; non-positive sizes vanish.
pub fn marker_diameter(size: f64) -> f64 {
    (size * SIZE_SCALE).max(0.0).sqrt()
}

pub fn plan_bubble(raw: &RawTable, roles: &ColumnRoles, style: &ChartStyle) -> Result<Figure> {
    if raw.n_cols() < 4 {
        return Err(ChartError::shape(format!(
            "bubble chart needs 4 columns (x, y, size, color), table has {}",
            raw.n_cols()
        )));
    }
    let cols = resolve_distinct(raw, roles, &RULES)?;
    let (x_col, y_col, size_col, color_col) = (cols[0], cols[1], cols[2], cols[3]);

    let xs: Vec<String> = raw.column(x_col).map(|c| c.label()).collect();
    let ys: Vec<String> = raw.column(y_col).map(|c| c.label()).collect();
    let sizes = coerced_column(raw, size_col);
    let colors = coerced_column(raw, color_col);

    let x_axis = CategoryAxis::new(xs.iter().map(String::as_str));
    let y_axis = CategoryAxis::new(ys.iter().map(String::as_str));

    let (c_min, c_max) = colors
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let c_range = if c_min <= c_max { c_min..c_max } else { 0.0..1.0 };
    let map = ColorMap::new(style.color_map);

    let plane = Plane::Cartesian {
        x: -0.5..x_axis.len().max(1) as f64 - 0.5,
        y: -0.5..y_axis.len().max(1) as f64 - 0.5,
        y_inverted: false,
    };
    let mut fig = Figure::new(ChartKind::Bubble, (11.0, 9.0), &style.font_family, plane)
        .with_title(TITLE, style.scaled(1.5));

    let grid = Stroke::dashed(LIGHT_GRAY, 0.8).with_alpha(0.3);
    for i in 0..x_axis.len() {
        let x = i as f64;
        fig.push(Primitive::Line {
            points: vec![(x, -0.5), (x, y_axis.len() as f64 - 0.5)],
            stroke: grid,
        });
    }
    for j in 0..y_axis.len() {
        let y = j as f64;
        fig.push(Primitive::Line {
            points: vec![(-0.5, y), (x_axis.len() as f64 - 0.5, y)],
            stroke: grid,
        });
    }

    for (row, (x, y)) in xs.iter().zip(&ys).enumerate() {
        let (Some(gx), Some(gy)) = (x_axis.position(x), y_axis.position(y)) else {
            continue;
        };
        fig.push(Primitive::Marker {
            at: (gx as f64, gy as f64),
            shape: MarkerShape::Circle,
            size: marker_diameter(sizes[row]),
            fill: Fill::translucent(map.scaled(colors[row], c_range.start, c_range.end), 0.8),
            stroke: Some(Stroke::solid(BLACK, 1.0)),
        });
    }

    fig.x_axis = Some(
        Axis::new(AxisSide::Bottom, category_ticks(&x_axis.labels, 0.0), style.font_size)
            .labeled(raw.headers[x_col].as_str(), style.scaled(1.2))
            .bold_label(),
    );
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, category_ticks(&y_axis.labels, 0.0), style.font_size)
            .labeled(raw.headers[y_col].as_str(), style.scaled(1.2))
            .bold_label(),
    );
    fig.colorbar = Some(ColorBar {
        map,
        range: c_range,
        label: format!("{} (Color)", raw.headers[color_col]),
        label_size: style.font_size,
        tick_size: style.scaled(0.85),
    });
    fig.legend = Some(Legend {
        title: Some(format!("{} (Size)", raw.headers[size_col])),
        entries: LEGEND_SIZES
            .iter()
            .map(|&s| LegendEntry {
                label: format!("{s}%"),
                swatch: Swatch::Bubble(marker_diameter(s)),
            })
            .collect(),
        placement: LegendPlacement::OutsideRight,
        font_size: style.font_size,
    });
    Ok(fig)
}
