use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::{DARK_GRAY, LIGHT_GRAY, generate_palette};
use crate::config::ChartKind;
use crate::data::model::RawTable;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Axis, AxisSide, Figure, Fill, MarkerShape, Plane, Primitive, Stroke, auto_range, category_ticks,
    numeric_ticks,
};

pub const BOX_WIDTH: f64 = 0.5;
/// Half-width of the horizontal jitter of strip points.
pub const JITTER: f64 = 0.1;
/// Whiskers reach the furthest point within this many IQRs of the box.
pub const WHISKER_IQR: f64 = 1.5;
const STRIP_SEED: u64 = 0x5eed;

const TITLE: &str = "各指标活性数据分布";
const Y_LABEL: &str = "活性数值";
const X_LABEL: &str = "测试指标";

/// Five-number summary of one column plus its fliers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_low: f64,
    pub whisker_high: f64,
    pub outliers: Vec<f64>,
}

/// Percentile `p` in `[0, 100]` of sorted data, linear interpolation.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = p / 100.0 * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
        }
    }
}

impl BoxStats {
    /// `None` for an empty column.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = percentile(&sorted, 25.0);
        let q3 = percentile(&sorted, 75.0);
        let iqr = q3 - q1;
        let (lo_fence, hi_fence) = (q1 - WHISKER_IQR * iqr, q3 + WHISKER_IQR * iqr);

        let inside = || sorted.iter().copied().filter(move |v| (lo_fence..=hi_fence).contains(v));
        Some(BoxStats {
            q1,
            median: percentile(&sorted, 50.0),
            q3,
            whisker_low: inside().fold(q1, f64::min),
            whisker_high: inside().fold(q3, f64::max),
            outliers: sorted
                .iter()
                .copied()
                .filter(|v| !(lo_fence..=hi_fence).contains(v))
                .collect(),
        })
    }
}

/// Numeric columns of a box plot with their non-empty values.
fn numeric_columns(raw: &RawTable) -> Vec<(String, Vec<f64>)> {
    let skip_first = raw.n_cols() > 0 && !raw.is_numeric_column(0);
    (0..raw.n_cols())
        .skip(usize::from(skip_first))
        .filter(|&c| raw.is_numeric_column(c))
        .map(|c| {
            let values = raw.column(c).filter_map(|cell| cell.as_f64()).collect();
            (raw.headers[c].clone(), values)
        })
        .collect()
}

pub fn plan_boxplot(raw: &RawTable, style: &ChartStyle) -> Result<Figure> {
    let columns = numeric_columns(raw);
    if columns.is_empty() {
        return Err(ChartError::shape("box plot needs at least one numeric column"));
    }
    let n = columns.len();
    let names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();

    let y = auto_range(columns.iter().flat_map(|(_, v)| v.iter().copied()));
    let x = -0.5..n as f64 - 0.5;
    let plane = Plane::Cartesian {
        x: x.clone(),
        y: y.clone(),
        y_inverted: false,
    };
    let mut fig = Figure::new(ChartKind::Boxplot, (12.0, 8.0), &style.font_family, plane)
        .with_title(TITLE, style.scaled(1.3));

    let y_ticks = numeric_ticks(&y);
    for tick in &y_ticks {
        fig.push(Primitive::Line {
            points: vec![(x.start, tick.at), (x.end, tick.at)],
            stroke: Stroke::dashed(LIGHT_GRAY, 0.8).with_alpha(0.5),
        });
    }

    let colors = generate_palette(n, 0.8);
    let edge = Stroke::solid(DARK_GRAY, 1.2);
    let half = BOX_WIDTH / 2.0;
    for (i, ((_, values), color)) in columns.iter().zip(colors).enumerate() {
        let Some(stats) = BoxStats::from_values(values) else {
            continue;
        };
        let cx = i as f64;
        fig.push(Primitive::Line {
            points: vec![(cx, stats.whisker_low), (cx, stats.q1)],
            stroke: edge,
        });
        fig.push(Primitive::Line {
            points: vec![(cx, stats.q3), (cx, stats.whisker_high)],
            stroke: edge,
        });
        for w in [stats.whisker_low, stats.whisker_high] {
            fig.push(Primitive::Line {
                points: vec![(cx - half / 2.0, w), (cx + half / 2.0, w)],
                stroke: edge,
            });
        }
        fig.push(Primitive::Rect {
            x0: cx - half,
            y0: stats.q1,
            x1: cx + half,
            y1: stats.q3,
            fill: Fill::solid(color),
            stroke: Some(edge),
        });
        fig.push(Primitive::Line {
            points: vec![(cx - half, stats.median), (cx + half, stats.median)],
            stroke: edge,
        });
        for &o in &stats.outliers {
            fig.push(Primitive::Marker {
                at: (cx, o),
                shape: MarkerShape::Diamond,
                size: 5.0,
                fill: Fill::solid(DARK_GRAY),
                stroke: None,
            });
        }
    }

    let mut rng = StdRng::seed_from_u64(STRIP_SEED);
    for (i, (_, values)) in columns.iter().enumerate() {
        for &v in values {
            let dx = rng.gen_range(-JITTER..=JITTER);
            fig.push(Primitive::Marker {
                at: (i as f64 + dx, v),
                shape: MarkerShape::Circle,
                size: 4.0,
                fill: Fill::translucent(DARK_GRAY, 0.6),
                stroke: None,
            });
        }
    }

    fig.x_axis = Some(
        Axis::new(AxisSide::Bottom, category_ticks(&names, 0.0), style.scaled(0.85))
            .labeled(X_LABEL, style.font_size)
            .rotate_ticks(45.0),
    );
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, y_ticks, style.font_size).labeled(Y_LABEL, style.font_size),
    );
    Ok(fig)
}
