use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result as AnyResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, Result};

/// Accepted range for the base font size, in points.
pub const FONT_SIZE_RANGE: std::ops::RangeInclusive<u32> = 10..=24;

// ---------------------------------------------------------------------------
// Chart kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Heatmap,
    PolarBar,
    Radar,
    FungicideBar,
    Boxplot,
    Bubble,
    EnergyProfile,
    Kinetics,
}

impl ChartKind {
    /// Name used in output file names.
    pub fn slug(self) -> &'static str {
        match self {
            ChartKind::Heatmap => "heatmap",
            ChartKind::PolarBar => "polar_bar",
            ChartKind::Radar => "radar",
            ChartKind::FungicideBar => "fungicide_bar",
            ChartKind::Boxplot => "boxplot",
            ChartKind::Bubble => "bubble",
            ChartKind::EnergyProfile => "energy_profile",
            ChartKind::Kinetics => "kinetics",
        }
    }

    pub fn default_font_size(self) -> u32 {
        match self {
            ChartKind::Heatmap => 16,
            ChartKind::PolarBar | ChartKind::Bubble | ChartKind::EnergyProfile => 12,
            ChartKind::Radar
            | ChartKind::FungicideBar
            | ChartKind::Boxplot
            | ChartKind::Kinetics => 14,
        }
    }

    pub fn default_color_map(self) -> ColorMapName {
        match self {
            ChartKind::Bubble => ColorMapName::Viridis,
            _ => ColorMapName::AcademicRed,
        }
    }

    /// Chart types that may emit several figures for one table.
    pub fn is_multi_figure(self) -> bool {
        matches!(self, ChartKind::Heatmap)
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// Colour maps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum ColorMapName {
    #[default]
    #[serde(rename = "academic_red")]
    #[value(name = "academic_red")]
    AcademicRed,
    #[serde(rename = "coolwarm")]
    #[value(name = "coolwarm")]
    Coolwarm,
    #[serde(rename = "viridis")]
    #[value(name = "viridis")]
    Viridis,
    #[serde(rename = "YlOrRd")]
    #[value(name = "YlOrRd")]
    YlOrRd,
}

// ---------------------------------------------------------------------------
// Column roles
// ---------------------------------------------------------------------------

/// Semantic role a chart assigns to one input column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Label,
    X,
    Y,
    Size,
    Color,
    Step,
    Time,
    GrayMold,
    HeadBlight,
}

impl Role {
    pub const ALL: [Role; 9] = [
        Role::Label,
        Role::X,
        Role::Y,
        Role::Size,
        Role::Color,
        Role::Step,
        Role::Time,
        Role::GrayMold,
        Role::HeadBlight,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Role::Label => "label",
            Role::X => "x",
            Role::Y => "y",
            Role::Size => "size",
            Role::Color => "color",
            Role::Step => "step",
            Role::Time => "time",
            Role::GrayMold => "gray_mold",
            Role::HeadBlight => "head_blight",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Role {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self> {
        Role::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| ChartError::InvalidOption(format!("unknown column role '{s}'")))
    }
}

/// Explicit role → column-name bindings.
pub type ColumnRoles = BTreeMap<Role, String>;

// ---------------------------------------------------------------------------
// Output format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

// ---------------------------------------------------------------------------
// ChartOptions
// ---------------------------------------------------------------------------

/// Recognised options of one chart request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    /// Identifier closing the first heatmap segment; empty means no split.
    pub split_index: Option<String>,
    /// Base font size; `None` uses the chart type's default.
    pub font_size: Option<u32>,
    /// Colour map; `None` uses the chart type's default.
    pub color_map: Option<ColorMapName>,
    pub column_roles: ColumnRoles,
    pub format: ImageFormat,
}

impl ChartOptions {
    /// Read options from a JSON file.
    pub fn from_json_file(path: &Path) -> AnyResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading options file {}", path.display()))?;
        let options: ChartOptions = serde_json::from_str(&text)
            .with_context(|| format!("parsing options file {}", path.display()))?;
        Ok(options)
    }

    /// Check every option once, before any planning happens.
    pub fn validate(&self) -> Result<()> {
        if let Some(size) = self.font_size {
            if !FONT_SIZE_RANGE.contains(&size) {
                return Err(ChartError::InvalidOption(format!(
                    "font_size {size} outside {}..={}",
                    FONT_SIZE_RANGE.start(),
                    FONT_SIZE_RANGE.end()
                )));
            }
        }
        if let Some((role, _)) = self.column_roles.iter().find(|(_, col)| col.trim().is_empty()) {
            return Err(ChartError::InvalidOption(format!(
                "role '{role}' is bound to an empty column name"
            )));
        }
        Ok(())
    }

    /// The split point, with blank strings treated as absent.
    pub fn split_point(&self) -> Option<&str> {
        self.split_index
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn font_size_for(&self, kind: ChartKind) -> u32 {
        self.font_size.unwrap_or_else(|| kind.default_font_size())
    }

    pub fn color_map_for(&self, kind: ChartKind) -> ColorMapName {
        self.color_map.unwrap_or_else(|| kind.default_color_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json_options() {
        let json = r#"{
            "split_index": "Ⅲ2-16",
            "font_size": 18,
            "color_map": "YlOrRd",
            "column_roles": { "x": "Catalyst", "size": "Yield" },
            "format": "svg"
        }"#;
        let opts: ChartOptions = serde_json::from_str(json).unwrap();
        assert_eq!(opts.split_point(), Some("Ⅲ2-16"));
        assert_eq!(opts.color_map, Some(ColorMapName::YlOrRd));
        assert_eq!(opts.column_roles.get(&Role::X).map(String::as_str), Some("Catalyst"));
        assert_eq!(opts.format, ImageFormat::Svg);
        opts.validate().unwrap();
    }

    #[test]
    fn rejects_font_size_out_of_range() {
        let opts = ChartOptions {
            font_size: Some(30),
            ..Default::default()
        };
        assert!(matches!(opts.validate(), Err(ChartError::InvalidOption(_))));
    }

    #[test]
    fn blank_split_index_means_no_split() {
        let opts = ChartOptions {
            split_index: Some("  ".into()),
            ..Default::default()
        };
        assert_eq!(opts.split_point(), None);
    }

    #[test]
    fn defaults_follow_chart_kind() {
        let opts = ChartOptions::default();
        assert_eq!(opts.font_size_for(ChartKind::Heatmap), 16);
        assert_eq!(opts.font_size_for(ChartKind::Bubble), 12);
        assert_eq!(opts.color_map_for(ChartKind::Bubble), ColorMapName::Viridis);
        assert_eq!(opts.color_map_for(ChartKind::Heatmap), ColorMapName::AcademicRed);
    }

    #[test]
    fn role_names_round_trip_through_from_str() {
        for role in Role::ALL {
            assert_eq!(role.name().parse::<Role>().unwrap(), role);
        }
        assert!("colour".parse::<Role>().is_err());
    }
}
