use std::f64::consts::PI;

use crate::color::{PATH_COLORS, cycle};
use crate::config::{ChartKind, ColumnRoles, Role};
use crate::data::columns::{ColumnRule, resolve_column};
use crate::data::model::RawTable;
use crate::error::{ChartError, Result};
use crate::style::ChartStyle;

use super::{
    Axis, AxisSide, Figure, HAlign, Legend, LegendEntry, LegendPlacement, Plane, Primitive, Stroke,
    Swatch, TextLabel, VAlign, auto_range, category_ticks, linspace, numeric_ticks,
};

pub const LEVEL_WIDTH: f64 = 0.6;
pub const LEVEL_GAP: f64 = 0.4;
pub const CONNECTOR_SAMPLES: usize = 50;

const Y_LABEL: &str = "相对吉布斯自由能 (kcal/mol)";
const TITLE: &str = "反应能级图 (Reaction Energy Profile)";

/// One reaction path: an energy per step, `None` where the cell is missing.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyPath {
    pub name: String,
    pub energies: Vec<Option<f64>>,
}

/// Centre of the level drawn for step `i`.
pub fn level_center(i: usize) -> f64 {
    i as f64 * (LEVEL_WIDTH + LEVEL_GAP)
}

/// Legend text for an energy column header.
pub fn path_label(header: &str) -> String {
    header.replace("_Energy", "").replace('_', " ")
}

/// Cosine-eased curve from `from` to `to`.
pub fn connector(from: (f64, f64), to: (f64, f64)) -> Vec<(f64, f64)> {
    linspace(0.0, 1.0, CONNECTOR_SAMPLES)
        .into_iter()
        .map(|t| {
            let ease = (1.0 - (t * PI).cos()) / 2.0;
            (from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * ease)
        })
        .collect()
}

/// Columns other than the step column holding at least one number.
pub fn energy_paths(raw: &RawTable, step_col: usize) -> Vec<EnergyPath> {
    (0..raw.n_cols())
        .filter(|&c| c != step_col)
        .filter_map(|c| {
            let energies: Vec<Option<f64>> = raw.column(c).map(|cell| cell.as_f64()).collect();
            energies.iter().any(Option::is_some).then(|| EnergyPath {
                name: path_label(&raw.headers[c]),
                energies,
            })
        })
        .collect()
}

pub fn plan_energy_profile(raw: &RawTable, roles: &ColumnRoles, style: &ChartStyle) -> Result<Figure> {
    if raw.n_cols() < 2 {
        return Err(ChartError::shape(format!(
            "energy profile needs a step column and at least one energy column, table has {}",
            raw.n_cols()
        )));
    }
    let step_col = resolve_column(raw, roles, ColumnRule::positional(Role::Step, 0))?;
    let steps: Vec<String> = raw.column(step_col).map(|c| c.label()).collect();
    let paths = energy_paths(raw, step_col);
    if paths.is_empty() {
        return Err(ChartError::NoDataColumns);
    }

    let half = LEVEL_WIDTH / 2.0;
    let y = auto_range(
        paths
            .iter()
            .flat_map(|p| p.energies.iter().flatten())
            .flat_map(|&e| [e, e + 3.0, e - 3.0]),
    );
    let n = steps.len();
    let plane = Plane::Cartesian {
        x: -half - 0.2..level_center(n.saturating_sub(1)) + half + 0.2,
        y: y.clone(),
        y_inverted: false,
    };
    let mut fig = Figure::new(ChartKind::EnergyProfile, (10.0, 7.0), &style.font_family, plane)
        .with_title(TITLE, style.scaled(1.3));

    let value_size = style.scaled(0.8);
    for (p, path) in paths.iter().enumerate() {
        let color = cycle(&PATH_COLORS, p);
        for (i, energy) in path.energies.iter().enumerate() {
            let Some(e) = *energy else { continue };
            let cx = level_center(i);
            fig.push(Primitive::Line {
                points: vec![(cx - half, e), (cx + half, e)],
                stroke: Stroke::solid(color, 2.5),
            });
            let offset = if e >= 0.0 { 1.0 } else { -1.5 };
            fig.text(
                TextLabel::new((cx, e + offset), format!("{e:.1}"), value_size)
                    .align(HAlign::Center, VAlign::Bottom)
                    .colored(color)
                    .bold(),
            );
        }
        for (i, pair) in path.energies.windows(2).enumerate() {
            let (Some(a), Some(b)) = (pair[0], pair[1]) else {
                continue;
            };
            fig.push(Primitive::Line {
                points: connector((level_center(i) + half, a), (level_center(i + 1) - half, b)),
                stroke: Stroke::dashed(color, 1.2).with_alpha(0.6),
            });
        }
    }

    let step_ticks = category_ticks(&steps, 0.0)
        .into_iter()
        .map(|mut t| {
            t.at = level_center(t.at as usize);
            t
        })
        .collect();
    fig.x_axis = Some(Axis::new(AxisSide::Bottom, step_ticks, style.font_size).bold_ticks());
    fig.y_axis = Some(
        Axis::new(AxisSide::Left, numeric_ticks(&y), style.font_size).labeled(Y_LABEL, style.font_size),
    );
    fig.legend = Some(Legend {
        title: None,
        entries: paths
            .iter()
            .enumerate()
            .map(|(p, path)| LegendEntry {
                label: path.name.clone(),
                swatch: Swatch::Line(cycle(&PATH_COLORS, p)),
            })
            .collect(),
        placement: LegendPlacement::UpperRight,
        font_size: style.font_size,
    });
    Ok(fig)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColorMapName;
    use crate::data::model::Cell;

    fn style() -> ChartStyle {
        ChartStyle::new(12.0, ColorMapName::AcademicRed)
    }

    fn lines(fig: &Figure) -> Vec<&Vec<(f64, f64)>> {
        fig.primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Line { points, .. } => Some(points),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn missing_energy_breaks_both_connectors() {
        let raw = RawTable::new(
            vec!["Step".into(), "Path_A_Energy".into()],
            vec![
                vec![Cell::Text("R".into()), Cell::Float(0.0)],
                vec![Cell::Text("TS".into()), Cell::Float(f64::NAN)],
                vec![Cell::Text("P".into()), Cell::Float(5.0)],
            ],
        );
        let fig = plan_energy_profile(&raw, &ColumnRoles::new(), &style()).unwrap();
        let all = lines(&fig);
        let levels: Vec<_> = all.iter().filter(|l| l.len() == 2).collect();
        let connectors = all.iter().filter(|l| l.len() == CONNECTOR_SAMPLES).count();
        assert_eq!(levels.len(), 2);
        assert_eq!(connectors, 0);
        assert_eq!(levels[1][0], (level_center(2) - 0.3, 5.0));

        let texts: Vec<&str> = fig.texts().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["0.0", "5.0"]);
    }

    #[test]
    fn connector_eases_between_levels() {
        let curve = connector((0.3, 0.0), (0.7, 10.0));
        assert_eq!(curve.len(), 50);
        assert_eq!(curve[0], (0.3, 0.0));
        let last = curve[49];
        assert!((last.0 - 0.7).abs() < 1e-12 && (last.1 - 10.0).abs() < 1e-12);
        assert!(curve[1].1 < 10.0 / 49.0);
    }

    #[test]
    fn text_columns_are_not_paths() {
        let raw = RawTable::new(
            vec!["Step".into(), "Note".into(), "Cat_B_Energy".into()],
            vec![
                vec![Cell::Text("R".into()), Cell::Text("start".into()), Cell::Float(0.0)],
                vec![Cell::Text("P".into()), Cell::Empty, Cell::Float(-12.5)],
            ],
        );
        let paths = energy_paths(&raw, 0);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].name, "Cat B");
        assert_eq!(paths[0].energies, vec![Some(0.0), Some(-12.5)]);
    }

    #[test]
    fn labels_sit_above_or_below() {
        let raw = RawTable::new(
            vec!["Step".into(), "E".into()],
            vec![
                vec![Cell::Text("R".into()), Cell::Float(4.0)],
                vec![Cell::Text("P".into()), Cell::Float(-4.0)],
            ],
        );
        let fig = plan_energy_profile(&raw, &ColumnRoles::new(), &style()).unwrap();
        let ys: Vec<f64> = fig.texts().map(|t| t.at.1).collect();
        assert_eq!(ys, vec![5.0, -5.5]);
    }

    #[test]
    fn single_column_is_rejected() {
        let raw = RawTable::new(vec!["Step".into()], vec![vec![Cell::Text("R".into())]]);
        assert!(matches!(
            plan_energy_profile(&raw, &ColumnRoles::new(), &style()),
            Err(ChartError::InputShape(_))
        ));
    }
}
