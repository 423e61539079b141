use std::collections::HashSet;

use crate::config::{ColumnRoles, Role};
use crate::error::{ChartError, Result};

use super::columns::{resolve_column, ColumnRule};
use super::model::{Cell, RawTable, Table};
use super::sort_key::sort_key;

/// Header recognised as the bioassay identifier column.
pub const IDENTIFIER_COLUMN: &str = "生测编号";

/// How non-numeric data columns are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Keep every column; cells that fail coercion become 0.
    Coerce,
    /// Drop columns that are not numeric as loaded; empty cells stay NaN gaps.
    NumericOnly,
}

/// Which steps of the cleaning pipeline run.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Look for [`IDENTIFIER_COLUMN`] before falling back to the first column.
    pub detect_identifier: bool,
    pub columns: ColumnPolicy,
    /// Rescale decimal fractions to percent when the table maximum is ≤ 1.
    pub percent_scale: bool,
    /// Reorder rows by [`sort_key`].
    pub sort_rows: bool,
    pub roles: ColumnRoles,
}

impl NormalizeOptions {
    /// The full dose-response pipeline used for heatmaps.
    pub fn dose_response() -> Self {
        NormalizeOptions {
            detect_identifier: true,
            columns: ColumnPolicy::Coerce,
            percent_scale: true,
            sort_rows: true,
            roles: ColumnRoles::new(),
        }
    }

    /// First column as labels, rows and values left as given.
    pub fn positional() -> Self {
        NormalizeOptions {
            detect_identifier: false,
            columns: ColumnPolicy::Coerce,
            percent_scale: false,
            sort_rows: false,
            roles: ColumnRoles::new(),
        }
    }

    pub fn with_columns(mut self, policy: ColumnPolicy) -> Self {
        self.columns = policy;
        self
    }

    pub fn with_roles(mut self, roles: &ColumnRoles) -> Self {
        self.roles = roles.clone();
        self
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions::dose_response()
    }
}

/// Result of the row-ordering step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    Sorted,
    /// Duplicate labels made the reorder ambiguous; input order kept.
    FellBack,
    Skipped,
}

/// What cleaning did to the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeReport {
    pub dropped_rows: usize,
    pub dropped_columns: usize,
    /// Data cells that failed numeric coercion and became 0.
    pub coerced_cells: usize,
    pub scaled_to_percent: bool,
    pub sort: SortOutcome,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub table: Table,
    pub report: NormalizeReport,
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Clean a raw sheet into a labelled numeric [`Table`].
///
/// Never fails on bad cells; the only error is a table with no data columns
/// left next to the identifier column.
pub fn normalize(raw: &RawTable, opts: &NormalizeOptions) -> Result<Normalized> {
    let (trimmed, dropped_rows, dropped_columns) = drop_empty(raw);

    if trimmed.n_cols() == 0 {
        return Err(ChartError::NoDataColumns);
    }
    let id_col = identifier_column(&trimmed, opts)?;

    let data_cols: Vec<usize> = (0..trimmed.n_cols())
        .filter(|&c| c != id_col)
        .filter(|&c| match opts.columns {
            ColumnPolicy::Coerce => true,
            ColumnPolicy::NumericOnly => trimmed.is_numeric_column(c),
        })
        .collect();
    if data_cols.is_empty() {
        return Err(ChartError::NoDataColumns);
    }

    let keep_gaps = opts.columns == ColumnPolicy::NumericOnly;
    let mut coerced_cells = 0;
    let values: Vec<Vec<f64>> = trimmed
        .rows
        .iter()
        .map(|row| {
            data_cols
                .iter()
                .map(|&c| match row[c].as_f64() {
                    Some(v) => v,
                    None if keep_gaps && row[c].is_empty() => f64::NAN,
                    None => {
                        coerced_cells += 1;
                        0.0
                    }
                })
                .collect()
        })
        .collect();
    if coerced_cells > 0 {
        log::warn!("{coerced_cells} non-numeric cell(s) coerced to 0");
    }

    let mut table = Table {
        index_name: trimmed.headers[id_col].clone(),
        labels: trimmed.rows.iter().map(|row| row[id_col].label()).collect(),
        columns: data_cols.iter().map(|&c| trimmed.headers[c].clone()).collect(),
        values,
    };

    let scaled_to_percent = opts.percent_scale && scale_fractions(&mut table);
    let sort = if opts.sort_rows {
        sort_rows(&mut table)
    } else {
        SortOutcome::Skipped
    };

    log::debug!(
        "normalized '{}': {} rows x {} columns (dropped {dropped_rows} rows, {dropped_columns} columns)",
        table.index_name,
        table.n_rows(),
        table.n_cols()
    );

    Ok(Normalized {
        table,
        report: NormalizeReport {
            dropped_rows,
            dropped_columns,
            coerced_cells,
            scaled_to_percent,
            sort,
        },
    })
}

/// Remove rows and columns whose cells are all empty.
fn drop_empty(raw: &RawTable) -> (RawTable, usize, usize) {
    let keep_cols: Vec<usize> = (0..raw.n_cols())
        .filter(|&c| raw.column(c).any(|cell| !cell.is_empty()))
        .collect();
    let rows: Vec<Vec<Cell>> = raw
        .rows
        .iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .map(|row| keep_cols.iter().map(|&c| row[c].clone()).collect())
        .collect();

    let dropped_rows = raw.n_rows() - rows.len();
    let dropped_cols = raw.n_cols() - keep_cols.len();
    let headers = keep_cols.iter().map(|&c| raw.headers[c].clone()).collect();
    (RawTable { headers, rows }, dropped_rows, dropped_cols)
}

fn identifier_column(raw: &RawTable, opts: &NormalizeOptions) -> Result<usize> {
    let rule = if opts.detect_identifier {
        ColumnRule::named(Role::Label, IDENTIFIER_COLUMN, 0)
    } else {
        ColumnRule::positional(Role::Label, 0)
    };
    resolve_column(raw, &opts.roles, rule)
}

/// Multiply everything by 100 when the global maximum is at most 1.
fn scale_fractions(table: &mut Table) -> bool {
    match table.max_value() {
        Some(max) if max <= 1.0 => {
            table.values.iter_mut().flatten().for_each(|v| *v *= 100.0);
            true
        }
        _ => false,
    }
}

/// Stable reorder by sort key; duplicated labels keep the input order.
fn sort_rows(table: &mut Table) -> SortOutcome {
    if let Some(dup) = first_duplicate(&table.labels) {
        log::warn!("duplicate identifier '{dup}', keeping original row order");
        return SortOutcome::FellBack;
    }

    let mut order: Vec<usize> = (0..table.n_rows()).collect();
    order.sort_by_cached_key(|&i| sort_key(&table.labels[i]));

    table.labels = order.iter().map(|&i| table.labels[i].clone()).collect();
    table.values = order.iter().map(|&i| table.values[i].clone()).collect();
    SortOutcome::Sorted
}

fn first_duplicate(labels: &[String]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(labels.len());
    labels
        .iter()
        .map(String::as_str)
        .find(|label| !seen.insert(*label))
}
