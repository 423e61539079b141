use std::path::{Path, PathBuf};

use crate::config::{ChartKind, ChartOptions};
use crate::data::model::RawTable;
use crate::data::normalize::{ColumnPolicy, NormalizeOptions, Normalized, normalize};
use crate::data::split::split_at;
use crate::error::Result;
use crate::layout::{Figure, bar, boxplot, bubble, energy, heatmap, kinetics, polar, radar};
use crate::render::{SvgRenderer, write_figures};
use crate::style::StyleHandle;

// ---------------------------------------------------------------------------
// Chart session
// ---------------------------------------------------------------------------

/// One configured charting run: validated options plus the shared style.
#[derive(Debug, Clone)]
pub struct ChartSession {
    style: StyleHandle,
    options: ChartOptions,
}

impl ChartSession {
    /// Validate `options` once; planning never sees an invalid option.
    pub fn new(style: StyleHandle, options: ChartOptions) -> Result<Self> {
        options.validate()?;
        Ok(ChartSession { style, options })
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    pub fn style(&self) -> &StyleHandle {
        &self.style
    }

    /// Plan all figures of one chart type for a loaded sheet.
    pub fn generate(&self, kind: ChartKind, raw: &RawTable) -> Result<Vec<Figure>> {
        let style = self.style.chart_style(kind, &self.options);
        let roles = &self.options.column_roles;
        log::debug!(
            "planning {kind} for {} rows x {} columns",
            raw.n_rows(),
            raw.n_cols()
        );

        let figures = match kind {
            ChartKind::Heatmap => {
                let Normalized { table, report } =
                    normalize(raw, &NormalizeOptions::dose_response().with_roles(roles))?;
                log::debug!("heatmap rows: {:?}", report.sort);
                let segments = split_at(&table, self.options.split_point());
                heatmap::plan_heatmaps(&segments, &style)
            }
            ChartKind::PolarBar => {
                let opts = NormalizeOptions::positional().with_roles(roles);
                vec![polar::plan_polar_bar(&normalize(raw, &opts)?.table, &style)?]
            }
            ChartKind::Radar => {
                let opts = NormalizeOptions::positional()
                    .with_columns(ColumnPolicy::NumericOnly)
                    .with_roles(roles);
                vec![radar::plan_radar(&normalize(raw, &opts)?.table, &style)?]
            }
            ChartKind::FungicideBar => vec![bar::plan_fungicide_bar(raw, roles, &style)?],
            ChartKind::Boxplot => vec![boxplot::plan_boxplot(raw, &style)?],
            ChartKind::Bubble => vec![bubble::plan_bubble(raw, roles, &style)?],
            ChartKind::EnergyProfile => vec![energy::plan_energy_profile(raw, roles, &style)?],
            ChartKind::Kinetics => vec![kinetics::plan_kinetics(raw, roles, &style)?],
        };
        Ok(figures)
    }

    /// Plan and write one chart type; returns the files written.
    pub fn export(
        &self,
        kind: ChartKind,
        raw: &RawTable,
        sheet: &str,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>> {
        let figures = self.generate(kind, raw)?;
        let renderer = SvgRenderer::new(self.style.clone());
        write_figures(&renderer, &figures, sheet, self.options.format, out_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Role;
    use crate::data::model::Cell;
    use crate::error::ChartError;
    use clap::ValueEnum;
    use resvg::usvg::fontdb::Database;

    fn session(options: ChartOptions) -> ChartSession {
        ChartSession::new(StyleHandle::from_database(Database::new(), None), options).unwrap()
    }

    fn dose_table() -> RawTable {
        let rows = ["CK", "Ⅱ1-2", "Ⅰ3-1", "阿维菌素", "Ⅰ1-5"]
            .iter()
            .enumerate()
            .map(|(i, id)| {
                vec![
                    Cell::Text(id.to_string()),
                    Cell::Float(0.1 * i as f64),
                    Cell::Float(0.05 * i as f64),
                ]
            })
            .collect();
        RawTable::new(
            vec!["生测编号".into(), "100 ppm".into(), "50 ppm".into()],
            rows,
        )
    }

    #[test]
    fn heatmap_splits_at_the_configured_row() {
        let s = session(ChartOptions {
            split_index: Some("Ⅰ3-1".into()),
            ..Default::default()
        });
        let figures = s.generate(ChartKind::Heatmap, &dose_table()).unwrap();
        assert_eq!(figures.len(), 2);

        let labels = |fig: &Figure| -> Vec<String> {
            fig.y_axis.as_ref().unwrap().ticks.iter().map(|t| t.label.clone()).collect()
        };
        assert_eq!(labels(&figures[0]), vec!["Ⅰ1-5", "Ⅰ3-1"]);
        assert_eq!(labels(&figures[1]), vec!["Ⅱ1-2", "阿维菌素", "CK"]);
    }

    #[test]
    fn heatmap_without_split_is_one_figure() {
        let figures = session(ChartOptions::default())
            .generate(ChartKind::Heatmap, &dose_table())
            .unwrap();
        assert_eq!(figures.len(), 1);
        assert_eq!(figures[0].texts().count(), 10);
    }

    #[test]
    fn invalid_options_are_rejected_up_front() {
        let err = ChartSession::new(
            StyleHandle::from_database(Database::new(), None),
            ChartOptions {
                font_size: Some(8),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, ChartError::InvalidOption(_)));
    }

    #[test]
    fn every_chart_kind_plans_from_a_generic_table() {
        let raw = RawTable::new(
            vec!["Catalyst".into(), "Solvent".into(), "Yield".into(), "ee".into()],
            vec![
                vec![Cell::Integer(1), Cell::Integer(2), Cell::Float(50.0), Cell::Float(90.0)],
                vec![Cell::Integer(2), Cell::Integer(3), Cell::Float(70.0), Cell::Float(80.0)],
            ],
        );
        let s = session(ChartOptions::default());
        for kind in ChartKind::value_variants() {
            let figures = s.generate(*kind, &raw).unwrap();
            assert!(!figures.is_empty(), "{kind} produced no figure");
            assert!(figures.iter().all(|f| f.chart == *kind));
        }
    }

    #[test]
    fn role_bindings_reach_the_planners() {
        let mut options = ChartOptions::default();
        options.column_roles.insert(Role::Time, "missing".into());
        let raw = RawTable::new(
            vec!["t".into(), "y".into()],
            vec![vec![Cell::Integer(0), Cell::Float(1.0)]],
        );
        assert!(matches!(
            session(options).generate(ChartKind::Kinetics, &raw),
            Err(ChartError::InputShape(_))
        ));
    }
}
