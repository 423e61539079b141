use std::f64::consts::PI;
use std::fmt::{self, Write};
use std::io::Cursor;
use std::sync::Arc;

use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

use crate::color::{BLACK, GRAY, WHITE, to_hex};
use crate::config::ImageFormat;
use crate::error::{ChartError, Result};
use crate::layout::{
    Axis, AxisSide, ColorBar, Figure, Fill, HAlign, Legend, LegendPlacement, MarkerShape, Plane,
    Primitive, Stroke, Swatch, TextLabel, VAlign, format_tick, nice_ticks,
};
use crate::style::StyleHandle;

use super::{POINTS_PER_INCH, PNG_DPI, RenderAdapter};

const PAD: f64 = 16.0;
const TICK_LEN: f64 = 5.0;
const COLORBAR_WIDTH: f64 = 16.0;
const COLORBAR_BANDS: usize = 64;
const WEDGE_SEGMENTS: usize = 24;

/// Writes figures as SVG and rasterises them with resvg.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    style: StyleHandle,
}

impl SvgRenderer {
    pub fn new(style: StyleHandle) -> Self {
        SvgRenderer { style }
    }

    /// SVG document for one figure, sized in points.
    pub fn to_svg(&self, fig: &Figure) -> Result<String> {
        let mut out = String::new();
        Canvas::new(fig)
            .write(&mut out)
            .map_err(|e| ChartError::Render(e.to_string()))?;
        Ok(out)
    }

    fn rasterize(&self, svg: &str) -> Result<Vec<u8>> {
        let mut options = usvg::Options::default();
        options.font_family = self.style.font_family.clone();
        options.fontdb = Arc::clone(&self.style.fontdb);

        let tree = usvg::Tree::from_str(svg, &options)
            .map_err(|e| ChartError::Render(format!("generated SVG does not parse: {e}")))?;

        let scale = (PNG_DPI / POINTS_PER_INCH) as f32;
        let width = (tree.size().width() * scale).ceil() as u32;
        let height = (tree.size().height() * scale).ceil() as u32;
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            ChartError::Render(format!("cannot allocate a {width}x{height} surface"))
        })?;
        resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let image = image::RgbaImage::from_raw(width, height, rgba)
            .ok_or_else(|| ChartError::Render("pixel buffer size mismatch".into()))?;

        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .map_err(|e| ChartError::Render(format!("PNG encoding failed: {e}")))?;
        log::debug!("rasterised {width}x{height} px");
        Ok(png.into_inner())
    }
}

impl RenderAdapter for SvgRenderer {
    fn render(&self, fig: &Figure, format: ImageFormat) -> Result<Vec<u8>> {
        let svg = self.to_svg(fig)?;
        match format {
            ImageFormat::Svg => Ok(svg.into_bytes()),
            ImageFormat::Png => self.rasterize(&svg),
        }
    }
}

// ---------------------------------------------------------------------------
// Text metrics
// ---------------------------------------------------------------------------

/// Rough advance width: CJK glyphs are one em, everything else 0.6 em.
pub fn text_width(text: &str, size: f64) -> f64 {
    text.chars()
        .map(|c| if (c as u32) >= 0x2e80 { 1.0 } else { 0.6 })
        .sum::<f64>()
        * size
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn max_width<'a>(texts: impl IntoIterator<Item = &'a str>, size: f64) -> f64 {
    texts
        .into_iter()
        .map(|t| text_width(t, size))
        .fold(0.0, f64::max)
}

// ---------------------------------------------------------------------------
// Frame: the plot rectangle inside the canvas
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Frame {
    fn right(&self) -> f64 {
        self.left + self.width
    }

    fn bottom(&self) -> f64 {
        self.top + self.height
    }

    fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }
}

fn axis_extent(axis: &Axis) -> f64 {
    let labels = axis.ticks.iter().map(|t| t.label.as_str());
    let ticks = match axis.side {
        AxisSide::Left => max_width(labels, axis.tick_size),
        AxisSide::Top | AxisSide::Bottom if axis.tick_rotation != 0.0 => {
            max_width(labels, axis.tick_size) * axis.tick_rotation.to_radians().sin().abs()
                + axis.tick_size
        }
        AxisSide::Top | AxisSide::Bottom => axis.tick_size * 1.4,
    };
    let title = axis.label.as_ref().map_or(0.0, |_| axis.label_size * 1.6);
    TICK_LEN + 4.0 + ticks + title
}

fn colorbar_extent(bar: &ColorBar) -> f64 {
    let widest = nice_ticks(&bar.range, 5)
        .into_iter()
        .map(|t| text_width(&format_tick(t), bar.tick_size))
        .fold(0.0, f64::max);
    PAD + COLORBAR_WIDTH + TICK_LEN + 4.0 + widest + bar.label_size * 1.8
}

fn legend_size(legend: &Legend) -> (f64, f64) {
    let swatch = swatch_width(legend);
    let text = max_width(legend.entries.iter().map(|e| e.label.as_str()), legend.font_size);
    let title = legend
        .title
        .as_deref()
        .map_or(0.0, |t| text_width(t, legend.font_size));
    let width = (swatch + 8.0 + text).max(title) + 12.0;
    let rows = legend.entries.len() as f64 * row_height(legend);
    let header = legend.title.as_ref().map_or(0.0, |_| legend.font_size * 1.8);
    (width, rows + header + 8.0)
}

fn swatch_width(legend: &Legend) -> f64 {
    legend
        .entries
        .iter()
        .map(|e| match e.swatch {
            Swatch::Bubble(d) => d,
            _ => 22.0,
        })
        .fold(22.0, f64::max)
}

fn row_height(legend: &Legend) -> f64 {
    legend
        .entries
        .iter()
        .map(|e| match e.swatch {
            Swatch::Bubble(d) => d + 10.0,
            _ => 0.0,
        })
        .fold(legend.font_size * 1.6, f64::max)
}

fn frame_for(fig: &Figure, width: f64, height: f64) -> Frame {
    let mut top = PAD;
    let mut bottom = PAD;
    let mut left = PAD;
    let mut right = PAD;

    if let Some(title) = &fig.title {
        top += title.size * 1.8;
    }
    for axis in [&fig.x_axis, &fig.y_axis].into_iter().flatten() {
        match axis.side {
            AxisSide::Top => top += axis_extent(axis),
            AxisSide::Bottom => bottom += axis_extent(axis),
            AxisSide::Left => left += axis_extent(axis),
        }
    }
    if let Some(bar) = &fig.colorbar {
        right += colorbar_extent(bar);
    }
    if let Some(legend) = fig
        .legend
        .as_ref()
        .filter(|l| l.placement == LegendPlacement::OutsideRight)
    {
        right += legend_size(legend).0 + PAD;
    }
    if matches!(fig.plane, Plane::Polar { .. }) {
        left += 40.0;
        right += 40.0;
        top += 30.0;
        bottom += 30.0;
    }

    Frame {
        left,
        top,
        width: (width - left - right).max(1.0),
        height: (height - top - bottom).max(1.0),
    }
}

// ---------------------------------------------------------------------------
// Canvas: coordinate mapping and drawing
// ---------------------------------------------------------------------------

struct Canvas<'a> {
    fig: &'a Figure,
    width: f64,
    height: f64,
    frame: Frame,
    /// Pixel radius of `r_max` on polar planes.
    radius: f64,
}

impl<'a> Canvas<'a> {
    fn new(fig: &'a Figure) -> Self {
        let width = fig.width_in * POINTS_PER_INCH;
        let height = fig.height_in * POINTS_PER_INCH;
        let frame = frame_for(fig, width, height);
        let radius = match fig.plane {
            Plane::Polar { r_max, .. } => {
                let extent = polar_extent(fig, r_max);
                (frame.width.min(frame.height) / 2.0) / extent
            }
            Plane::Cartesian { .. } => 0.0,
        };
        Canvas {
            fig,
            width,
            height,
            frame,
            radius,
        }
    }

    /// Canvas position of a plane coordinate.
    fn map(&self, (a, b): (f64, f64)) -> (f64, f64) {
        let f = self.frame;
        match &self.fig.plane {
            Plane::Cartesian { x, y, y_inverted } => {
                let px = f.left + (a - x.start) / span(x.start, x.end) * f.width;
                let t = (b - y.start) / span(y.start, y.end);
                let py = if *y_inverted {
                    f.top + t * f.height
                } else {
                    f.bottom() - t * f.height
                };
                (px, py)
            }
            Plane::Polar {
                r_max,
                zero_at_top,
                clockwise,
            } => {
                let offset = if *zero_at_top { PI / 2.0 } else { 0.0 };
                let dir = if *clockwise { -1.0 } else { 1.0 };
                let phi = offset + dir * a;
                let r = b / r_max * self.radius;
                let (cx, cy) = f.center();
                (cx + r * phi.cos(), cy - r * phi.sin())
            }
        }
    }

    fn write(&self, out: &mut String) -> fmt::Result {
        let fig = self.fig;
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}pt" height="{h:.2}pt" viewBox="0 0 {w:.2} {h:.2}" font-family="{family}">"#,
            w = self.width,
            h = self.height,
            family = escape_xml(&fig.font_family),
        )?;
        writeln!(
            out,
            r#"<rect x="0" y="0" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            self.width,
            self.height,
            to_hex(WHITE)
        )?;

        let clipped = matches!(fig.plane, Plane::Cartesian { .. });
        if clipped {
            let f = self.frame;
            writeln!(
                out,
                r#"<defs><clipPath id="plot"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath></defs>"#,
                f.left, f.top, f.width, f.height
            )?;
            writeln!(out, r#"<g clip-path="url(#plot)">"#)?;
        } else {
            writeln!(out, "<g>")?;
        }
        for primitive in fig.primitives.iter().filter(|p| !matches!(p, Primitive::Text(_))) {
            self.write_primitive(out, primitive)?;
        }
        writeln!(out, "</g>")?;

        if let Some(axis) = &fig.x_axis {
            self.write_axis(out, axis)?;
        }
        if let Some(axis) = &fig.y_axis {
            self.write_axis(out, axis)?;
        }
        for label in fig.texts() {
            let at = self.map(label.at);
            write_text(out, at, label)?;
        }
        if let Some(bar) = &fig.colorbar {
            self.write_colorbar(out, bar)?;
        }
        if let Some(legend) = &fig.legend {
            self.write_legend(out, legend)?;
        }
        if let Some(title) = &fig.title {
            let label = TextLabel::new((0.0, 0.0), title.text.as_str(), title.size)
                .align(HAlign::Center, VAlign::Top);
            write_text(out, (self.width / 2.0, PAD), &label)?;
        }
        writeln!(out, "</svg>")
    }

    fn write_primitive(&self, out: &mut String, primitive: &Primitive) -> fmt::Result {
        match primitive {
            Primitive::Rect {
                x0,
                y0,
                x1,
                y1,
                fill,
                stroke,
            } => {
                let (ax, ay) = self.map((*x0, *y0));
                let (bx, by) = self.map((*x1, *y1));
                writeln!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}{}/>"#,
                    ax.min(bx),
                    ay.min(by),
                    (bx - ax).abs(),
                    (by - ay).abs(),
                    fill_attrs(fill),
                    stroke.as_ref().map(stroke_attrs).unwrap_or_default()
                )
            }
            Primitive::Wedge {
                theta0,
                theta1,
                r0,
                r1,
                fill,
                stroke,
            } => {
                let outer = (0..=WEDGE_SEGMENTS).map(|k| {
                    let t = theta0 + (theta1 - theta0) * k as f64 / WEDGE_SEGMENTS as f64;
                    self.map((t, *r1))
                });
                let inner = (0..=WEDGE_SEGMENTS).rev().map(|k| {
                    let t = theta0 + (theta1 - theta0) * k as f64 / WEDGE_SEGMENTS as f64;
                    self.map((t, *r0))
                });
                let points: Vec<(f64, f64)> = outer.chain(inner).collect();
                writeln!(
                    out,
                    r#"<polygon points="{}" {}{}/>"#,
                    point_list(&points),
                    fill_attrs(fill),
                    stroke.as_ref().map(stroke_attrs).unwrap_or_default()
                )
            }
            Primitive::Line { points, stroke } => {
                if points.len() < 2 {
                    return Ok(());
                }
                let mapped: Vec<(f64, f64)> = points.iter().map(|&p| self.map(p)).collect();
                writeln!(
                    out,
                    r#"<polyline points="{}" fill="none" {}/>"#,
                    point_list(&mapped),
                    stroke_attrs(stroke)
                )
            }
            Primitive::Area { points, fill } => {
                let mapped: Vec<(f64, f64)> = points.iter().map(|&p| self.map(p)).collect();
                writeln!(
                    out,
                    r#"<polygon points="{}" {}/>"#,
                    point_list(&mapped),
                    fill_attrs(fill)
                )
            }
            Primitive::Marker {
                at,
                shape,
                size,
                fill,
                stroke,
            } => write_marker(out, self.map(*at), *shape, *size, fill, stroke.as_ref()),
            Primitive::Text(label) => write_text(out, self.map(label.at), label),
        }
    }

    fn write_axis(&self, out: &mut String, axis: &Axis) -> fmt::Result {
        let Plane::Cartesian { .. } = self.fig.plane else {
            return Ok(());
        };
        let f = self.frame;
        let spine = Stroke::solid(BLACK, 0.8);
        let tick_label = |text: &str| {
            let mut label = TextLabel::new((0.0, 0.0), text, axis.tick_size).rotated(axis.tick_rotation);
            label.bold = axis.tick_bold;
            label
        };
        match axis.side {
            AxisSide::Bottom | AxisSide::Top => {
                let bottom = axis.side == AxisSide::Bottom;
                let base = if bottom { f.bottom() } else { f.top };
                let dir = if bottom { 1.0 } else { -1.0 };
                if axis.spine {
                    write_segment(out, (f.left, base), (f.right(), base), &spine)?;
                }
                for tick in &axis.ticks {
                    let x = self.map((tick.at, 0.0)).0;
                    if axis.spine {
                        write_segment(out, (x, base), (x, base + dir * TICK_LEN), &spine)?;
                    }
                    let v = if bottom { VAlign::Top } else { VAlign::Bottom };
                    let h = if axis.tick_rotation == 0.0 { HAlign::Center } else { HAlign::Right };
                    let label = tick_label(&tick.label).align(h, v);
                    write_text(out, (x, base + dir * (TICK_LEN + 4.0)), &label)?;
                }
                if let Some(text) = &axis.label {
                    let y = if bottom { self.height - PAD } else { base - axis_extent(axis) };
                    let mut label = TextLabel::new((0.0, 0.0), text.as_str(), axis.label_size)
                        .align(HAlign::Center, if bottom { VAlign::Bottom } else { VAlign::Top });
                    label.bold = axis.label_bold;
                    write_text(out, (f.left + f.width / 2.0, y), &label)?;
                }
            }
            AxisSide::Left => {
                if axis.spine {
                    write_segment(out, (f.left, f.top), (f.left, f.bottom()), &spine)?;
                }
                for tick in &axis.ticks {
                    let y = self.map((0.0, tick.at)).1;
                    if axis.spine {
                        write_segment(out, (f.left - TICK_LEN, y), (f.left, y), &spine)?;
                    }
                    let label = tick_label(&tick.label).align(HAlign::Right, VAlign::Middle);
                    write_text(out, (f.left - TICK_LEN - 4.0, y), &label)?;
                }
                if let Some(text) = &axis.label {
                    let mut label = TextLabel::new((0.0, 0.0), text.as_str(), axis.label_size)
                        .align(HAlign::Center, VAlign::Top)
                        .rotated(90.0);
                    label.bold = axis.label_bold;
                    write_text(out, (PAD, f.top + f.height / 2.0), &label)?;
                }
            }
        }
        Ok(())
    }

    fn write_colorbar(&self, out: &mut String, bar: &ColorBar) -> fmt::Result {
        let f = self.frame;
        let x = f.right() + PAD;
        let top = f.top + f.height * 0.1;
        let height = f.height * 0.8;
        let band = height / COLORBAR_BANDS as f64;
        for k in 0..COLORBAR_BANDS {
            let t = (k as f64 + 0.5) / COLORBAR_BANDS as f64;
            writeln!(
                out,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                x,
                top + height - (k + 1) as f64 * band,
                COLORBAR_WIDTH,
                band + 0.3,
                to_hex(bar.map.at(t))
            )?;
        }
        writeln!(
            out,
            r#"<rect x="{x:.2}" y="{top:.2}" width="{COLORBAR_WIDTH:.2}" height="{height:.2}" fill="none" {}/>"#,
            stroke_attrs(&Stroke::solid(BLACK, 0.6))
        )?;

        let span = span(bar.range.start, bar.range.end);
        let right = x + COLORBAR_WIDTH;
        for value in nice_ticks(&bar.range, 5) {
            let y = top + height - (value - bar.range.start) / span * height;
            write_segment(out, (right, y), (right + TICK_LEN, y), &Stroke::solid(BLACK, 0.6))?;
            let label = TextLabel::new((0.0, 0.0), format_tick(value), bar.tick_size)
                .align(HAlign::Left, VAlign::Middle);
            write_text(out, (right + TICK_LEN + 4.0, y), &label)?;
        }
        let label = TextLabel::new((0.0, 0.0), bar.label.as_str(), bar.label_size)
            .align(HAlign::Center, VAlign::Bottom)
            .rotated(270.0);
        write_text(out, (x + colorbar_extent(bar) - PAD, top + height / 2.0), &label)
    }

    fn write_legend(&self, out: &mut String, legend: &Legend) -> fmt::Result {
        let f = self.frame;
        let (w, h) = legend_size(legend);
        let (x, mut y) = match legend.placement {
            LegendPlacement::Center => (f.center().0 - w / 2.0, f.center().1 - h / 2.0),
            LegendPlacement::UpperLeft => (f.left + 10.0, f.top + 10.0),
            LegendPlacement::UpperRight => (f.right() - w - 10.0, f.top + 10.0),
            LegendPlacement::OutsideRight => {
                let bar = self.fig.colorbar.as_ref().map_or(0.0, colorbar_extent);
                (f.right() + bar + PAD, f.top)
            }
        };
        if let Some(title) = &legend.title {
            let label = TextLabel::new((0.0, 0.0), title.as_str(), legend.font_size)
                .align(HAlign::Left, VAlign::Top);
            write_text(out, (x + 6.0, y + 4.0), &label)?;
            y += legend.font_size * 1.8;
        }

        let swatch = swatch_width(legend);
        let row = row_height(legend);
        for (i, entry) in legend.entries.iter().enumerate() {
            let cy = y + 4.0 + (i as f64 + 0.5) * row;
            let sx = x + 6.0;
            let mid = sx + swatch / 2.0;
            match entry.swatch {
                Swatch::Patch(color) => writeln!(
                    out,
                    r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" {}/>"#,
                    mid - 7.0,
                    cy - 5.0,
                    14.0,
                    10.0,
                    fill_attrs(&Fill::solid(color))
                )?,
                Swatch::Line(color) => {
                    write_segment(out, (sx, cy), (sx + swatch, cy), &Stroke::solid(color, 2.5))?
                }
                Swatch::LineMarker(color, shape) => {
                    write_segment(out, (sx, cy), (sx + swatch, cy), &Stroke::solid(color, 2.5))?;
                    write_marker(out, (mid, cy), shape, 7.0, &Fill::solid(color), None)?;
                }
                Swatch::Bubble(d) => write_marker(
                    out,
                    (mid, cy),
                    MarkerShape::Circle,
                    d,
                    &Fill::translucent(GRAY, 0.6),
                    Some(&Stroke::solid(BLACK, 1.0)),
                )?,
            }
            let label = TextLabel::new((0.0, 0.0), entry.label.as_str(), legend.font_size)
                .align(HAlign::Left, VAlign::Middle);
            write_text(out, (sx + swatch + 8.0, cy), &label)?;
        }
        Ok(())
    }
}

fn span(start: f64, end: f64) -> f64 {
    let s = end - start;
    if s.abs() < f64::EPSILON { 1.0 } else { s }
}

/// Largest radius reached by any primitive or label, relative to `r_max`.
fn polar_extent(fig: &Figure, r_max: f64) -> f64 {
    let radii = fig.primitives.iter().flat_map(|p| -> Vec<f64> {
        match p {
            Primitive::Wedge { r1, .. } => vec![*r1],
            Primitive::Line { points, .. } | Primitive::Area { points, .. } => {
                points.iter().map(|p| p.1).collect()
            }
            Primitive::Marker { at, .. } => vec![at.1],
            Primitive::Text(t) => vec![t.at.1],
            Primitive::Rect { .. } => Vec::new(),
        }
    });
    radii
        .map(|r| r.abs() / r_max)
        .filter(|r| r.is_finite())
        .fold(1.0, f64::max)
}

// ---------------------------------------------------------------------------
// SVG fragments
// ---------------------------------------------------------------------------

fn point_list(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x:.2},{y:.2}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn fill_attrs(fill: &Fill) -> String {
    let mut attrs = format!(r#"fill="{}""#, to_hex(fill.color));
    if fill.alpha < 1.0 {
        attrs.push_str(&format!(r#" fill-opacity="{:.3}""#, fill.alpha));
    }
    attrs
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{:.2}""#,
        to_hex(stroke.color),
        stroke.width
    );
    if stroke.alpha < 1.0 {
        attrs.push_str(&format!(r#" stroke-opacity="{:.3}""#, stroke.alpha));
    }
    if stroke.dashed {
        let dash = (stroke.width * 3.7).max(2.0);
        attrs.push_str(&format!(r#" stroke-dasharray="{:.2},{:.2}""#, dash, dash * 0.43));
    }
    attrs
}

fn write_segment(out: &mut String, a: (f64, f64), b: (f64, f64), stroke: &Stroke) -> fmt::Result {
    writeln!(
        out,
        r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}"{}/>"#,
        a.0,
        a.1,
        b.0,
        b.1,
        stroke_attrs(stroke)
    )
}

fn write_text(out: &mut String, (x, y): (f64, f64), label: &TextLabel) -> fmt::Result {
    let anchor = match label.h_align {
        HAlign::Left => "start",
        HAlign::Center => "middle",
        HAlign::Right => "end",
    };
    let baseline = match label.v_align {
        VAlign::Top => "hanging",
        VAlign::Middle => "central",
        VAlign::Bottom => "alphabetic",
    };
    write!(
        out,
        r#"<text x="{x:.2}" y="{y:.2}" font-size="{:.1}" text-anchor="{anchor}" dominant-baseline="{baseline}" fill="{}""#,
        label.size,
        to_hex(label.color)
    )?;
    if label.bold {
        write!(out, r#" font-weight="bold""#)?;
    }
    if label.rotation != 0.0 {
        write!(out, r#" transform="rotate({:.2} {x:.2} {y:.2})""#, -label.rotation)?;
    }
    writeln!(out, ">{}</text>", escape_xml(&label.text))
}

/// Vertices of a regular polygon or star centred on `c`.
fn marker_polygon(shape: MarkerShape, (cx, cy): (f64, f64), r: f64) -> Option<Vec<(f64, f64)>> {
    let regular = |n: usize, start_deg: f64, radius: f64| -> Vec<(f64, f64)> {
        (0..n)
            .map(|k| {
                let a = (start_deg + 360.0 * k as f64 / n as f64).to_radians();
                (cx + radius * a.cos(), cy - radius * a.sin())
            })
            .collect()
    };
    let points = match shape {
        MarkerShape::Circle => return None,
        MarkerShape::Square => regular(4, 45.0, r * 1.2),
        MarkerShape::Diamond => regular(4, 90.0, r * 1.1),
        MarkerShape::TriangleUp => regular(3, 90.0, r * 1.2),
        MarkerShape::TriangleDown => regular(3, 270.0, r * 1.2),
        MarkerShape::TriangleLeft => regular(3, 180.0, r * 1.2),
        MarkerShape::TriangleRight => regular(3, 0.0, r * 1.2),
        MarkerShape::Pentagon => regular(5, 90.0, r * 1.1),
        MarkerShape::Star => {
            let outer = regular(5, 90.0, r * 1.3);
            let inner = regular(5, 126.0, r * 0.55);
            outer.into_iter().zip(inner).flat_map(|(o, i)| [o, i]).collect()
        }
    };
    Some(points)
}

fn write_marker(
    out: &mut String,
    at: (f64, f64),
    shape: MarkerShape,
    diameter: f64,
    fill: &Fill,
    stroke: Option<&Stroke>,
) -> fmt::Result {
    if diameter.is_nan() || diameter <= 0.0 {
        return Ok(());
    }
    let stroke = stroke.map(stroke_attrs).unwrap_or_default();
    match marker_polygon(shape, at, diameter / 2.0) {
        None => writeln!(
            out,
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" {}{stroke}/>"#,
            at.0,
            at.1,
            diameter / 2.0,
            fill_attrs(fill)
        ),
        Some(points) => writeln!(
            out,
            r#"<polygon points="{}" {}{stroke}/>"#,
            point_list(&points),
            fill_attrs(fill)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorMap, LIGHT_GRAY};
    use crate::config::{ChartKind, ColorMapName};
    use crate::layout::{Legend, LegendEntry, Tick};
    use resvg::usvg::fontdb::Database;

    fn renderer() -> SvgRenderer {
        SvgRenderer::new(StyleHandle::from_database(Database::new(), None))
    }

    fn cartesian() -> Figure {
        let mut fig = Figure::new(
            ChartKind::FungicideBar,
            (4.0, 3.0),
            "sans-serif",
            Plane::Cartesian {
                x: 0.0..10.0,
                y: 0.0..10.0,
                y_inverted: false,
            },
        )
        .with_title("灰霉 & 赤霉", 14.0);
        fig.push(Primitive::Rect {
            x0: 0.0,
            y0: 0.0,
            x1: 5.0,
            y1: 5.0,
            fill: Fill::solid(LIGHT_GRAY),
            stroke: None,
        });
        fig.text(TextLabel::new((5.0, 5.0), "<50>", 10.0).rotated(30.0));
        fig.x_axis = Some(Axis::new(
            AxisSide::Bottom,
            vec![Tick { at: 5.0, label: "A".into() }],
            10.0,
        ));
        fig
    }

    #[test]
    fn width_counts_cjk_as_one_em() {
        assert_eq!(text_width("ab", 10.0), 12.0);
        assert_eq!(text_width("灰霉", 10.0), 20.0);
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_xml(r#"a<b & "c">"#), "a&lt;b &amp; &quot;c&quot;&gt;");
    }

    #[test]
    fn svg_is_sized_in_points() {
        let svg = renderer().to_svg(&cartesian()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="288.00pt""#));
        assert!(svg.contains(r#"height="216.00pt""#));
        assert!(svg.contains("灰霉 &amp; 赤霉"));
        assert!(svg.contains("&lt;50&gt;"));
        assert!(svg.contains(r#"transform="rotate(-30.00"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn cartesian_mapping_flips_y() {
        let fig = cartesian();
        let canvas = Canvas::new(&fig);
        let f = canvas.frame;
        assert_eq!(canvas.map((0.0, 0.0)), (f.left, f.bottom()));
        let (x, y) = canvas.map((10.0, 10.0));
        assert!((x - f.right()).abs() < 1e-9 && (y - f.top).abs() < 1e-9);
    }

    #[test]
    fn polar_zero_points_up_and_turns_clockwise() {
        let fig = Figure::new(
            ChartKind::PolarBar,
            (6.0, 6.0),
            "sans-serif",
            Plane::Polar {
                r_max: 100.0,
                zero_at_top: true,
                clockwise: true,
            },
        );
        let canvas = Canvas::new(&fig);
        let (cx, cy) = canvas.frame.center();
        let (x, y) = canvas.map((0.0, 100.0));
        assert!((x - cx).abs() < 1e-9 && y < cy);
        let (x, y) = canvas.map((PI / 2.0, 100.0));
        assert!(x > cx && (y - cy).abs() < 1e-9);
    }

    #[test]
    fn zero_size_markers_are_skipped() {
        let mut out = String::new();
        write_marker(&mut out, (1.0, 1.0), MarkerShape::Circle, 0.0, &Fill::solid(BLACK), None).unwrap();
        assert!(out.is_empty());
        write_marker(&mut out, (1.0, 1.0), MarkerShape::Star, 8.0, &Fill::solid(BLACK), None).unwrap();
        assert_eq!(out.matches(',').count(), 10);
    }

    #[test]
    fn colorbar_and_legend_are_drawn() {
        let mut fig = cartesian();
        fig.colorbar = Some(ColorBar {
            map: ColorMap::new(ColorMapName::Viridis),
            range: 0.0..100.0,
            label: "死亡率 (%)".into(),
            label_size: 12.0,
            tick_size: 10.0,
        });
        fig.legend = Some(Legend {
            title: Some("Yield (Size)".into()),
            entries: vec![LegendEntry {
                label: "20%".into(),
                swatch: Swatch::Bubble(15.0),
            }],
            placement: LegendPlacement::OutsideRight,
            font_size: 12.0,
        });
        let svg = renderer().to_svg(&fig).unwrap();
        assert!(svg.contains("死亡率 (%)"));
        assert!(svg.contains("Yield (Size)"));
        assert!(svg.contains(r#"r="7.50""#));
    }

    #[test]
    fn png_output_is_a_png() {
        let png = renderer().render(&cartesian(), ImageFormat::Png).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
