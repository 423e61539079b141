//! Process-wide rendering style: the system font database and the font
//! family used for CJK-capable labels.

use std::sync::{Arc, OnceLock};

use resvg::usvg::fontdb::Database;

use crate::config::{ChartKind, ChartOptions, ColorMapName};

/// Families tried in order when no preference is given or it is missing.
pub const FONT_CANDIDATES: [&str; 8] = [
    "Microsoft YaHei",
    "SimHei",
    "SimSun",
    "PingFang SC",
    "Heiti TC",
    "Noto Sans CJK SC",
    "WenQuanYi Micro Hei",
    "Droid Sans Fallback",
];

pub const FALLBACK_FAMILY: &str = "sans-serif";

static STYLE: OnceLock<StyleHandle> = OnceLock::new();

/// Shared rendering state created once per session.
#[derive(Debug, Clone)]
pub struct StyleHandle {
    pub font_family: String,
    pub fontdb: Arc<Database>,
}

/// Initialise the rendering style once.
///
/// The first call loads system fonts and picks a family (`preferred` first,
/// then [`FONT_CANDIDATES`]). Later calls return the same handle and ignore
/// their argument.
pub fn init_style(preferred: Option<&str>) -> StyleHandle {
    STYLE
        .get_or_init(|| {
            let mut db = Database::new();
            db.load_system_fonts();
            let handle = StyleHandle::from_database(db, preferred);
            log::info!("rendering with font family '{}'", handle.font_family);
            handle
        })
        .clone()
}

impl StyleHandle {
    /// Build a handle over an already populated font database.
    pub fn from_database(mut db: Database, preferred: Option<&str>) -> Self {
        let font_family = match choose_family(&db, preferred) {
            Some(family) => {
                db.set_sans_serif_family(family.clone());
                family
            }
            None => {
                log::warn!("no CJK font found, labels may not render");
                FALLBACK_FAMILY.to_string()
            }
        };
        StyleHandle {
            font_family,
            fontdb: Arc::new(db),
        }
    }

    /// Per-chart style derived from the validated options.
    pub fn chart_style(&self, kind: ChartKind, options: &ChartOptions) -> ChartStyle {
        ChartStyle {
            font_family: self.font_family.clone(),
            font_size: options.font_size_for(kind) as f64,
            color_map: options.color_map_for(kind),
        }
    }
}

fn choose_family(db: &Database, preferred: Option<&str>) -> Option<String> {
    let installed = |name: &str| {
        db.faces()
            .any(|face| face.families.iter().any(|(family, _)| family == name))
    };
    preferred
        .into_iter()
        .chain(FONT_CANDIDATES)
        .find(|&name| installed(name))
        .map(str::to_string)
}

/// Style values a planner needs; passed explicitly to every planner.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub font_family: String,
    /// Base font size in points.
    pub font_size: f64,
    pub color_map: ColorMapName,
}

impl ChartStyle {
    pub fn new(font_size: f64, color_map: ColorMapName) -> Self {
        ChartStyle {
            font_family: FALLBACK_FAMILY.to_string(),
            font_size,
            color_map,
        }
    }

    /// Base size scaled and truncated to whole points.
    pub fn scaled(&self, factor: f64) -> f64 {
        (self.font_size * factor).trunc()
    }
}
