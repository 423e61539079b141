use std::path::PathBuf;

use clap::Parser;

use crate::config::{ChartKind, ChartOptions, ColorMapName, ImageFormat, Role};
use crate::error::{ChartError, Result};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Render bioassay and reaction tables as publication charts")]
pub struct Args {
    /// Input table (.xlsx, .xls, .csv, .json or .parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Chart type to draw
    #[arg(long, value_enum)]
    pub chart: ChartKind,

    /// Worksheet to read from a workbook (defaults to the first one); for
    /// other inputs, the name used in output files (defaults to the file stem)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Identifier of the last row of the first heatmap
    #[arg(long)]
    pub split_index: Option<String>,

    /// Base font size (10-24)
    #[arg(long)]
    pub font_size: Option<u32>,

    #[arg(long, value_enum)]
    pub color_map: Option<ColorMapName>,

    /// Bind a role to a column, e.g. `--role size=Yield` (repeatable)
    #[arg(long = "role", value_name = "ROLE=COLUMN", value_parser = parse_role)]
    pub roles: Vec<(Role, String)>,

    #[arg(long, value_enum)]
    pub format: Option<ImageFormat>,

    /// Output directory
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// JSON options file; flags given on the command line win
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Preferred font family for labels
    #[arg(long)]
    pub font: Option<String>,
}

impl Args {
    /// Overlay the command-line flags on options read from a file.
    pub fn apply_to(&self, mut options: ChartOptions) -> ChartOptions {
        if let Some(split) = &self.split_index {
            options.split_index = Some(split.clone());
        }
        if self.font_size.is_some() {
            options.font_size = self.font_size;
        }
        if self.color_map.is_some() {
            options.color_map = self.color_map;
        }
        if let Some(format) = self.format {
            options.format = format;
        }
        for (role, column) in &self.roles {
            options.column_roles.insert(*role, column.clone());
        }
        options
    }
}

fn parse_role(s: &str) -> Result<(Role, String)> {
    let (role, column) = s
        .split_once('=')
        .ok_or_else(|| ChartError::InvalidOption(format!("expected ROLE=COLUMN, got '{s}'")))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(ChartError::InvalidOption(format!("no column given for role '{role}'")));
    }
    Ok((role.trim().parse()?, column.to_string()))
}
