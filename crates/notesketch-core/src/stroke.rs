//! Stroke model: a drawn path as sampled points plus its style.

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pressure recorded when the input device reports none.
pub const DEFAULT_PRESSURE: f64 = 1.0;

/// Smallest width a brush can be set to, in logical units.
pub const MIN_STROKE_WIDTH: f64 = 0.5;

/// Default brush width, in logical units.
pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;

/// Normalize a reported pressure into `(0, 1]`.
///
/// Missing, non-finite and non-positive values fall back to [`DEFAULT_PRESSURE`].
pub fn normalize_pressure(pressure: Option<f64>) -> f64 {
    match pressure {
        Some(p) if p.is_finite() && p > 0.0 => p.min(1.0),
        _ => DEFAULT_PRESSURE,
    }
}

/// One sampled input position, in device-independent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    pub x: f64,
    pub y: f64,
    /// Pen pressure in `(0, 1]`.
    pub pressure: f64,
}

impl SamplePoint {
    /// Record a sample, defaulting the pressure when the device reports none.
    pub fn new(position: Point, pressure: Option<f64>) -> Self {
        Self {
            x: position.x,
            y: position.y,
            pressure: normalize_pressure(pressure),
        }
    }

    /// Position as a kurbo point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Drawing tool applied by a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Paints with the stroke color.
    #[default]
    Pen,
    /// Cuts pixels back to transparent.
    Eraser,
}

/// Opaque RGB stroke color.
///
/// Serialized as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokeColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl StrokeColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// Color channels as RGBA with full opacity.
    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl Default for StrokeColor {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for StrokeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for StrokeColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<StrokeColor> for String {
    fn from(color: StrokeColor) -> Self {
        color.to_string()
    }
}

impl From<Color> for StrokeColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b)
    }
}

impl From<StrokeColor> for Color {
    fn from(color: StrokeColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, 255)
    }
}

/// Active tool, color and width applied to new strokes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brush {
    pub tool: ToolKind,
    pub color: StrokeColor,
    pub width: f64,
}

impl Brush {
    /// Create a brush; the width is clamped to [`MIN_STROKE_WIDTH`].
    pub fn new(tool: ToolKind, color: StrokeColor, width: f64) -> Self {
        Self {
            tool,
            color,
            width: clamp_width(width),
        }
    }

    pub fn pen(color: StrokeColor, width: f64) -> Self {
        Self::new(ToolKind::Pen, color, width)
    }

    pub fn eraser(width: f64) -> Self {
        Self::new(ToolKind::Eraser, StrokeColor::white(), width)
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(ToolKind::Pen, StrokeColor::black(), DEFAULT_STROKE_WIDTH)
    }
}

fn clamp_width(width: f64) -> f64 {
    if width.is_finite() {
        width.max(MIN_STROKE_WIDTH)
    } else {
        DEFAULT_STROKE_WIDTH
    }
}

/// One continuous pen or eraser gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub tool: ToolKind,
    pub color: StrokeColor,
    /// Line width in logical units.
    pub width: f64,
    points: Vec<SamplePoint>,
}

impl Stroke {
    /// Start a stroke from its first sample.
    pub fn begin(brush: Brush, first: SamplePoint) -> Self {
        Self {
            tool: brush.tool,
            color: brush.color,
            width: clamp_width(brush.width),
            points: vec![first],
        }
    }

    /// Build a stroke from already-recorded samples.
    pub fn from_points(brush: Brush, points: Vec<SamplePoint>) -> Self {
        Self {
            tool: brush.tool,
            color: brush.color,
            width: clamp_width(brush.width),
            points,
        }
    }

    /// Append a sample.
    pub fn push(&mut self, point: SamplePoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[SamplePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The brush this stroke was drawn with.
    pub fn brush(&self) -> Brush {
        Brush {
            tool: self.tool,
            color: self.color,
            width: self.width,
        }
    }

    /// Logical-space bounds including the stroke's half width.
    pub fn bounds(&self) -> Rect {
        let Some(first) = self.points.first() else {
            return Rect::ZERO;
        };

        let mut rect = Rect::from_points(first.position(), first.position());
        for point in &self.points[1..] {
            rect = rect.union_pt(point.position());
        }
        rect.inflate(self.width / 2.0, self.width / 2.0)
    }
}
