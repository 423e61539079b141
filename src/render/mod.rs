//! Render adapters: turn a planned [`Figure`] into image bytes and files.

pub mod svg;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ChartKind, ImageFormat};
use crate::error::Result;
use crate::layout::Figure;

pub use svg::SvgRenderer;

/// Figure sizes are in inches; canvases are laid out in points.
pub const POINTS_PER_INCH: f64 = 72.0;
/// Raster resolution of PNG output.
pub const PNG_DPI: f64 = 300.0;

/// A backend that draws figures.
pub trait RenderAdapter {
    fn render(&self, fig: &Figure, format: ImageFormat) -> Result<Vec<u8>>;
}

/// `{chart}_{sheet}[_{index}].{ext}`; `index` is 1-based and only used for
/// chart types that can produce several figures.
pub fn output_file_name(kind: ChartKind, sheet: &str, index: usize, format: ImageFormat) -> String {
    let sheet = sanitize(sheet);
    if kind.is_multi_figure() {
        format!("{}_{sheet}_{index}.{}", kind.slug(), format.extension())
    } else {
        format!("{}_{sheet}.{}", kind.slug(), format.extension())
    }
}

/// Path separators and other characters that cannot appear in file names.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "sheet".to_string()
    } else {
        cleaned
    }
}

/// Render every figure into `out_dir`, returning the written paths in order.
pub fn write_figures(
    renderer: &dyn RenderAdapter,
    figures: &[Figure],
    sheet: &str,
    format: ImageFormat,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)?;
    let mut written = Vec::with_capacity(figures.len());
    for (i, fig) in figures.iter().enumerate() {
        let bytes = renderer.render(fig, format)?;
        let path = out_dir.join(output_file_name(fig.chart, sheet, i + 1, format));
        fs::write(&path, bytes)?;
        log::info!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heatmaps_are_numbered() {
        assert_eq!(
            output_file_name(ChartKind::Heatmap, "Sheet1", 2, ImageFormat::Png),
            "heatmap_Sheet1_2.png"
        );
        assert_eq!(
            output_file_name(ChartKind::Radar, "Sheet1", 1, ImageFormat::Svg),
            "radar_Sheet1.svg"
        );
    }

    #[test]
    fn sheet_names_are_made_safe() {
        assert_eq!(
            output_file_name(ChartKind::Kinetics, "a/b: c", 1, ImageFormat::Png),
            "kinetics_a_b_ c.png"
        );
        assert_eq!(
            output_file_name(ChartKind::Bubble, "  ", 1, ImageFormat::Png),
            "bubble_sheet.png"
        );
    }
}
