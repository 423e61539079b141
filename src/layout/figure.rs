use std::ops::Range;

use crate::color::{BLACK, ColorMap, Rgb};
use crate::config::ChartKind;

// ---------------------------------------------------------------------------
// Coordinate planes
// ---------------------------------------------------------------------------

/// How primitive coordinates are interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum Plane {
    /// `(x, y)` data coordinates inside explicit ranges.
    Cartesian {
        x: Range<f64>,
        y: Range<f64>,
        /// Row 0 at the top (matrix layout).
        y_inverted: bool,
    },
    /// `(theta, r)` with theta in radians.
    Polar {
        r_max: f64,
        zero_at_top: bool,
        clockwise: bool,
    },
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub color: Rgb,
    pub alpha: f64,
}

impl Fill {
    pub fn solid(color: Rgb) -> Self {
        Fill { color, alpha: 1.0 }
    }

    pub fn translucent(color: Rgb, alpha: f64) -> Self {
        Fill { color, alpha }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    /// Line width in points.
    pub width: f64,
    pub alpha: f64,
    pub dashed: bool,
}

impl Stroke {
    pub fn solid(color: Rgb, width: f64) -> Self {
        Stroke {
            color,
            width,
            alpha: 1.0,
            dashed: false,
        }
    }

    pub fn dashed(color: Rgb, width: f64) -> Self {
        Stroke {
            dashed: true,
            ..Stroke::solid(color, width)
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub at: (f64, f64),
    pub text: String,
    /// Font size in points.
    pub size: f64,
    pub color: Rgb,
    pub h_align: HAlign,
    pub v_align: VAlign,
    /// Counter-clockwise rotation in degrees.
    pub rotation: f64,
    pub bold: bool,
}

impl TextLabel {
    pub fn new(at: (f64, f64), text: impl Into<String>, size: f64) -> Self {
        TextLabel {
            at,
            text: text.into(),
            size,
            color: BLACK,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            rotation: 0.0,
            bold: false,
        }
    }

    pub fn align(mut self, h: HAlign, v: VAlign) -> Self {
        self.h_align = h;
        self.v_align = v;
        self
    }

    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn colored(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    Circle,
    Square,
    TriangleUp,
    Diamond,
    TriangleDown,
    TriangleLeft,
    TriangleRight,
    Pentagon,
    Star,
}

impl MarkerShape {
    /// Marker cycle of line charts.
    pub const CYCLE: [MarkerShape; 9] = [
        MarkerShape::Circle,
        MarkerShape::Square,
        MarkerShape::TriangleUp,
        MarkerShape::Diamond,
        MarkerShape::TriangleDown,
        MarkerShape::TriangleLeft,
        MarkerShape::TriangleRight,
        MarkerShape::Pentagon,
        MarkerShape::Star,
    ];
}

/// One drawable element, in the coordinates of the figure's [`Plane`].
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        fill: Fill,
        stroke: Option<Stroke>,
    },
    /// Annular sector of a polar plane.
    Wedge {
        theta0: f64,
        theta1: f64,
        r0: f64,
        r1: f64,
        fill: Fill,
        stroke: Option<Stroke>,
    },
    Line {
        points: Vec<(f64, f64)>,
        stroke: Stroke,
    },
    /// Closed filled polygon.
    Area {
        points: Vec<(f64, f64)>,
        fill: Fill,
    },
    Marker {
        at: (f64, f64),
        shape: MarkerShape,
        /// Diameter in points; zero draws nothing.
        size: f64,
        fill: Fill,
        stroke: Option<Stroke>,
    },
    Text(TextLabel),
}

// ---------------------------------------------------------------------------
// Decorations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Top,
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub at: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub side: AxisSide,
    pub label: Option<String>,
    pub label_size: f64,
    pub label_bold: bool,
    pub ticks: Vec<Tick>,
    pub tick_size: f64,
    pub tick_rotation: f64,
    pub tick_bold: bool,
    /// Draw the axis line and tick marks.
    pub spine: bool,
}

impl Axis {
    pub fn new(side: AxisSide, ticks: Vec<Tick>, tick_size: f64) -> Self {
        Axis {
            side,
            label: None,
            label_size: tick_size,
            label_bold: false,
            ticks,
            tick_size,
            tick_rotation: 0.0,
            tick_bold: false,
            spine: true,
        }
    }

    pub fn labeled(mut self, label: impl Into<String>, size: f64) -> Self {
        self.label = Some(label.into());
        self.label_size = size;
        self
    }

    pub fn bold_label(mut self) -> Self {
        self.label_bold = true;
        self
    }

    pub fn bold_ticks(mut self) -> Self {
        self.tick_bold = true;
        self
    }

    pub fn rotate_ticks(mut self, degrees: f64) -> Self {
        self.tick_rotation = degrees;
        self
    }

    pub fn without_spine(mut self) -> Self {
        self.spine = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorBar {
    pub map: ColorMap,
    pub range: Range<f64>,
    pub label: String,
    pub label_size: f64,
    pub tick_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Swatch {
    Patch(Rgb),
    Line(Rgb),
    LineMarker(Rgb, MarkerShape),
    /// Bubble of the given diameter in points.
    Bubble(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub swatch: Swatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendPlacement {
    Center,
    UpperLeft,
    UpperRight,
    OutsideRight,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: Option<String>,
    pub entries: Vec<LegendEntry>,
    pub placement: LegendPlacement,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub size: f64,
}

// ---------------------------------------------------------------------------
// Figure
// ---------------------------------------------------------------------------

/// Everything a render adapter needs to draw one image.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub chart: ChartKind,
    pub width_in: f64,
    pub height_in: f64,
    pub font_family: String,
    pub plane: Plane,
    pub title: Option<Title>,
    pub x_axis: Option<Axis>,
    pub y_axis: Option<Axis>,
    pub colorbar: Option<ColorBar>,
    pub legend: Option<Legend>,
    /// Drawn in order, later on top.
    pub primitives: Vec<Primitive>,
}

impl Figure {
    pub fn new(chart: ChartKind, size_in: (f64, f64), font_family: &str, plane: Plane) -> Self {
        Figure {
            chart,
            width_in: size_in.0,
            height_in: size_in.1,
            font_family: font_family.to_string(),
            plane,
            title: None,
            x_axis: None,
            y_axis: None,
            colorbar: None,
            legend: None,
            primitives: Vec::new(),
        }
    }

    pub fn with_title(mut self, text: impl Into<String>, size: f64) -> Self {
        self.title = Some(Title {
            text: text.into(),
            size,
        });
        self
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn text(&mut self, label: TextLabel) {
        self.primitives.push(Primitive::Text(label));
    }

    /// Iterate over the text primitives.
    pub fn texts(&self) -> impl Iterator<Item = &TextLabel> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text(t) => Some(t),
            _ => None,
        })
    }
}
