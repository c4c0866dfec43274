//! Render a recorded [`Scene`] to an SVG document
use std::{fmt::Display, num::ParseIntError, str::FromStr};

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::annotation::ColorClass;
use crate::surface::{Ink, Label, Scene, Stem, StrokeWeight};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Color {0:?} must be written as `#RRGGBB`")]
    WrongShape(String),
    #[error("Color {0:?} has an invalid channel: {1}")]
    InvalidChannel(String, ParseIntError),
}

/// An opaque color, written as `#RRGGBB` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_color(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ColorParseError::WrongShape(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ColorParseError::InvalidChannel(s.to_string(), e))
        };
        Ok(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Canvas size, palette and typography of a rendered plot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    pub b_ion: Rgb,
    pub y_ion: Rgb,
    pub unmatched: Rgb,
    /// The unannotated observed peaks and the baseline
    pub spectrum: Rgb,
    pub canvas: Rgb,
    pub label_font_size: f64,
    pub title_font_size: f64,
    /// Gap between a stem tip and its label, as a fraction of the intensity axis
    pub label_offset: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            b_ion: Rgb(0x19, 0x76, 0xD2),
            y_ion: Rgb(0xD3, 0x2F, 0x2F),
            unmatched: Rgb(0xBD, 0xBD, 0xBD),
            spectrum: Rgb(0x75, 0x75, 0x75),
            canvas: Rgb(0xFF, 0xFF, 0xFF),
            label_font_size: 12.0,
            title_font_size: 20.0,
            label_offset: 0.02,
        }
    }
}

impl PlotStyle {
    pub fn ink(&self, ink: Ink) -> Rgb {
        match ink {
            Ink::Background => self.spectrum,
            Ink::Annotation(ColorClass::BIon) => self.b_ion,
            Ink::Annotation(ColorClass::YIon) => self.y_ion,
            Ink::Annotation(ColorClass::Unmatched) => self.unmatched,
        }
    }

    fn stem_style(&self, stem: &Stem) -> ShapeStyle {
        let color = self.ink(stem.ink).to_color();
        match stem.weight {
            StrokeWeight::Light => ShapeStyle::from(&color.mix(0.6)).stroke_width(1),
            StrokeWeight::Regular => ShapeStyle::from(&color).stroke_width(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SvgError {
    #[error("Failed to draw the plot: {0}")]
    Drawing(String),
}

fn drawing_error<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> SvgError {
    SvgError::Drawing(err.to_string())
}

fn font_transform(rotation: f32) -> FontTransform {
    // plotters rotates clockwise
    match rotation.rem_euclid(360.0).round() as u32 {
        90 => FontTransform::Rotate270,
        180 => FontTransform::Rotate180,
        270 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

/// Rotated labels read upward from their anchor, so those below the baseline end at it
fn label_anchor(y: f64) -> Pos {
    if y < 0.0 {
        Pos::new(HPos::Right, VPos::Center)
    } else {
        Pos::new(HPos::Left, VPos::Center)
    }
}

/// The x range with a little padding either side, so the outermost stems stay off the frame
fn x_range(scene: &Scene) -> (f64, f64) {
    match scene.x_extent() {
        Some((lo, hi)) => {
            let pad = ((hi - lo) * 0.05).max(10.0);
            ((lo - pad).max(0.0), hi + pad)
        }
        None => (0.0, 1.0),
    }
}

/// The y range, symmetric about the baseline whenever anything points down
fn y_range(scene: &Scene) -> (f64, f64) {
    let (lo, hi) = scene.y_extent();
    let (lo, hi) = (lo as f64, hi as f64);
    let top = lo.abs().max(hi).max(1.0) * 1.15;
    if lo < 0.0 {
        (-top, top)
    } else {
        (0.0, top)
    }
}

fn draw_scene(
    root: &DrawingArea<SVGBackend, Shift>,
    scene: &Scene,
    style: &PlotStyle,
) -> Result<(), SvgError> {
    root.fill(&style.canvas.to_color()).map_err(drawing_error)?;

    let (x_lo, x_hi) = x_range(scene);
    let (y_lo, y_hi) = y_range(scene);
    let title = scene.titles().join(" | ");

    let mut builder = ChartBuilder::on(root);
    builder.margin(20).x_label_area_size(40).y_label_area_size(70);
    if !title.is_empty() {
        builder.caption(&title, ("sans-serif", style.title_font_size));
    }
    let mut chart = builder
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)
        .map_err(drawing_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc("m/z")
        .y_desc("Intensity")
        .draw()
        .map_err(drawing_error)?;

    if scene.has_baseline() {
        let baseline = style.spectrum.to_color();
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(x_lo, 0.0), (x_hi, 0.0)],
                &baseline,
            )))
            .map_err(drawing_error)?;
    }

    chart
        .draw_series(scene.stems().map(|stem| {
            PathElement::new(
                vec![(stem.x, 0.0), (stem.x, stem.height as f64)],
                style.stem_style(stem),
            )
        }))
        .map_err(drawing_error)?;

    let gap = (y_hi - y_lo.max(0.0)) * style.label_offset;
    chart
        .draw_series(scene.labels().map(|label: &Label| {
            let y = label.at.y as f64;
            let y = if y < 0.0 { y - gap } else { y + gap };
            let color = style.ink(label.ink).to_color();
            Text::new(
                label.text.clone(),
                (label.at.x, y),
                ("sans-serif", style.label_font_size)
                    .into_font()
                    .transform(font_transform(label.rotation))
                    .color(&color)
                    .pos(label_anchor(y)),
            )
        }))
        .map_err(drawing_error)?;

    root.present().map_err(drawing_error)?;
    Ok(())
}

/// Draw `scene` into a standalone SVG document
pub fn render_svg(scene: &Scene, style: &PlotStyle) -> Result<String, SvgError> {
    let mut buffer = String::new();
    {
        let root =
            SVGBackend::with_string(&mut buffer, (style.width, style.height)).into_drawing_area();
        draw_scene(&root, scene, style)?;
    }
    tracing::debug!(
        "Rendered {} marks into {} bytes of SVG",
        scene.len(),
        buffer.len()
    );
    Ok(buffer)
}
