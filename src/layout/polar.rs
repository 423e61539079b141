use std::f64::consts::TAU;

use crate::color::{BLACK, CROP_COLORS, GRAY, LIGHT_GRAY, cycle};
use crate::config::ChartKind;
use crate::data::model::Table;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Figure, Fill, HAlign, Legend, LegendEntry, LegendPlacement, Plane, Primitive, Stroke, Swatch,
    TextLabel, VAlign, linspace,
};

/// Share of each row's slice left empty between sectors.
pub const GAP_RATIO: f64 = 0.05;
/// Radius where every bar starts (value 0).
pub const INNER_RADIUS: f64 = 50.0;
/// Radius of a 100 % bar and of the sector outline arcs.
pub const OUTER_RADIUS: f64 = 100.0;
pub const LABEL_RADIUS: f64 = INNER_RADIUS - 8.0;
/// Drawn bar width relative to its slot.
pub const BAR_FILL: f64 = 0.9;

const GUIDE_VALUES: [u32; 6] = [0, 20, 40, 60, 80, 100];
const GUIDE_SAMPLES: usize = 200;
const ARC_SAMPLES: usize = 100;

/// Angular layout of a polar bar chart with `n_rows` sectors of `n_cols` bars.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarGeometry {
    pub sector: f64,
    pub gap: f64,
    pub bar_width: f64,
}

impl PolarGeometry {
    pub fn new(n_rows: usize, n_cols: usize) -> Self {
        let slice = TAU / n_rows.max(1) as f64;
        let sector = slice * (1.0 - GAP_RATIO);
        PolarGeometry {
            sector,
            gap: slice * GAP_RATIO,
            bar_width: sector / (n_cols + 1) as f64,
        }
    }

    /// Angle where sector `i` begins.
    pub fn sector_start(&self, i: usize) -> f64 {
        i as f64 * (self.sector + self.gap)
    }

    /// Centre angle of bar `j` inside sector `i`.
    pub fn bar_center(&self, i: usize, j: usize) -> f64 {
        self.sector_start(i) + (j as f64 + 0.5) * self.bar_width
    }

    pub fn sector_center(&self, i: usize) -> f64 {
        self.sector_start(i) + self.sector / 2.0
    }
}

/// Outer radius of a bar for a percentage value.
pub fn radius(value: f64) -> f64 {
    INNER_RADIUS + value / 100.0 * (OUTER_RADIUS - INNER_RADIUS)
}

/// Text rotation in degrees keeping a sector label upright.
pub fn label_rotation(angle_rad: f64) -> f64 {
    let deg = angle_rad.to_degrees().rem_euclid(360.0);
    let rotation = 90.0 - deg;
    if deg > 180.0 && deg < 360.0 {
        rotation + 180.0
    } else {
        rotation
    }
}

pub fn plan_polar_bar(table: &Table, style: &ChartStyle) -> Result<Figure> {
    if table.n_rows() == 0 {
        return Err(ChartError::shape("polar bar chart needs at least one row"));
    }
    let geo = PolarGeometry::new(table.n_rows(), table.n_cols());

    let plane = Plane::Polar {
        r_max: OUTER_RADIUS + 5.0,
        zero_at_top: true,
        clockwise: true,
    };
    let mut fig = Figure::new(ChartKind::PolarBar, (12.0, 11.0), &style.font_family, plane);

    let tick_size = style.scaled(0.7);
    let tick_angle = -geo.gap * 3.7;
    for value in GUIDE_VALUES {
        let r = radius(value as f64);
        fig.push(Primitive::Line {
            points: linspace(0.0, TAU, GUIDE_SAMPLES)
                .into_iter()
                .map(|theta| (theta, r))
                .collect(),
            stroke: Stroke::dashed(GRAY, 0.5).with_alpha(0.3),
        });
        fig.text(
            TextLabel::new((tick_angle, r), value.to_string(), tick_size)
                .align(HAlign::Left, VAlign::Middle)
                .colored(GRAY),
        );
    }

    for (i, row) in table.values.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            let center = geo.bar_center(i, j);
            let half = geo.bar_width * BAR_FILL / 2.0;
            fig.push(Primitive::Wedge {
                theta0: center - half,
                theta1: center + half,
                r0: INNER_RADIUS,
                r1: radius(value),
                fill: Fill::translucent(cycle(&CROP_COLORS, j), 0.85),
                stroke: Some(Stroke::solid(BLACK, 0.2)),
            });
        }
    }

    for i in 0..table.n_rows() {
        let start = geo.sector_start(i);
        fig.push(Primitive::Line {
            points: linspace(start, start + geo.sector, ARC_SAMPLES)
                .into_iter()
                .map(|theta| (theta, OUTER_RADIUS))
                .collect(),
            stroke: Stroke::solid(LIGHT_GRAY, 2.0),
        });
    }

    for (i, label) in table.labels.iter().enumerate() {
        let angle = geo.sector_center(i);
        fig.text(
            TextLabel::new((angle, LABEL_RADIUS), label.as_str(), style.font_size)
                .rotated(label_rotation(angle)),
        );
    }

    fig.legend = Some(Legend {
        title: None,
        entries: table
            .columns
            .iter()
            .enumerate()
            .map(|(j, name)| LegendEntry {
                label: name.clone(),
                swatch: Swatch::Patch(cycle(&CROP_COLORS, j)),
            })
            .collect(),
        placement: LegendPlacement::Center,
        font_size: style.scaled(1.1),
    });
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMapName;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn geometry_divides_the_circle() {
        let geo = PolarGeometry::new(4, 3);
        assert!(approx(geo.sector, TAU / 4.0 * 0.95));
        assert!(approx(geo.gap, TAU / 4.0 * 0.05));
        assert!(approx(geo.bar_width, geo.sector / 4.0));
        assert!(approx(geo.sector_start(4), TAU));
        assert!(approx(geo.bar_center(1, 0), TAU / 4.0 + geo.bar_width / 2.0));
    }

    #[test]
    fn radius_starts_at_inner_ring() {
        assert_eq!(radius(0.0), 50.0);
        assert_eq!(radius(50.0), 75.0);
        assert_eq!(radius(100.0), 100.0);
    }

    #[test]
    fn labels_stay_upright() {
        assert!(approx(label_rotation(0.0), 90.0));
        assert!(approx(label_rotation(90f64.to_radians()), 0.0));
        assert!(approx(label_rotation(180f64.to_radians()), -90.0));
        assert!(approx(label_rotation(270f64.to_radians()), 0.0));
        assert!(approx(label_rotation(-90f64.to_radians()), 0.0));
    }

    #[test]
    fn one_wedge_per_value() {
        let table = Table {
            index_name: "样品".into(),
            labels: vec!["A".into(), "B".into()],
            columns: vec!["小麦".into(), "玉米".into(), "水稻".into()],
            values: vec![vec![80.0, 20.0, 0.0], vec![100.0, 55.0, 10.0]],
        };
        let style = ChartStyle::new(12.0, ColorMapName::AcademicRed);
        let fig = plan_polar_bar(&table, &style).unwrap();

        let wedges: Vec<(f64, f64)> = fig
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Wedge { r0, r1, .. } => Some((*r0, *r1)),
                _ => None,
            })
            .collect();
        assert_eq!(wedges.len(), 6);
        assert!(wedges.iter().all(|(r0, _)| *r0 == INNER_RADIUS));
        assert_eq!(wedges[0].1, 90.0);

        let legend = fig.legend.unwrap();
        assert_eq!(legend.entries.len(), 3);
        assert_eq!(legend.font_size, 13.0);
    }

    #[test]
    fn empty_table_is_rejected() {
        let table = Table {
            index_name: "样品".into(),
            labels: vec![],
            columns: vec!["小麦".into()],
            values: vec![],
        };
        let style = ChartStyle::new(12.0, ColorMapName::AcademicRed);
        assert!(matches!(
            plan_polar_bar(&table, &style),
            Err(ChartError::InputShape(_))
        ));
    }
}
