//! Drawable element kinds and their geometry.

mod image;
mod radial;
mod rectangle;
mod region;
mod stroke;
mod text;

pub use self::image::{Image, ImageFormat, ImageSource};
pub use radial::{Circle, Triangle};
pub use rectangle::Rectangle;
pub use region::FilledRegion;
pub use stroke::{CompositeMode, LineCap, LineJoin, Stroke};
pub use text::Text;

use crate::config::EditorConfig;
use kurbo::{Point, Rect, Vec2};
use peniko::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// RGBA8 color that serializes as a hex string (`#rrggbb` or `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Failure to parse a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(String);

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }

    /// Same color with alpha forced to 255.
    pub fn opaque(self) -> Self {
        Self { a: 255, ..self }
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Result<Self, ColorParseError> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Ok(Self::transparent());
        }
        let err = || ColorParseError(color.to_string());
        let hex = color.strip_prefix('#').ok_or_else(err)?;
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|_| err());
        if !hex.is_ascii() {
            return Err(err());
        }
        match hex.len() {
            3 => Ok(Self::rgb(
                byte(&hex[0..1])? * 17,
                byte(&hex[1..2])? * 17,
                byte(&hex[2..3])? * 17,
            )),
            6 => Ok(Self::rgb(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            8 => Ok(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => Err(err()),
        }
    }

    /// Hex representation; alpha is omitted when opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::black()
    }
}

impl TryFrom<String> for SerializableColor {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<SerializableColor> for String {
    fn from(color: SerializableColor) -> Self {
        color.to_hex()
    }
}

// Hosts paint with peniko brushes (vello, or any renderer on the same color
// model); these conversions are the crossing between stored and paint colors.
impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Fill and outline settings shared by the closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
        }
    }
}

/// Tolerances used by point hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitParams {
    /// Maximum distance from a polyline that still hits it.
    pub tolerance: f64,
    /// Padding around text bounds.
    pub text_padding: f64,
}

impl Default for HitParams {
    fn default() -> Self {
        Self {
            tolerance: 5.0,
            text_padding: 10.0,
        }
    }
}

impl From<&EditorConfig> for HitParams {
    fn from(config: &EditorConfig) -> Self {
        Self {
            tolerance: config.hit_tolerance,
            text_padding: config.text_padding,
        }
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    (point - proj).hypot()
}

/// Minimum distance from a point to a polyline.
///
/// A single-point polyline measures the distance to that point.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Inclusive point-in-rectangle test (kurbo's `contains` excludes the far edges).
pub fn rect_contains(rect: Rect, point: Point) -> bool {
    let rect = rect.abs();
    point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
}

/// Symmetric axis-aligned overlap test; touching edges count as overlap.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let (a, b) = (a.abs(), b.abs());
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}

/// Whether a circle overlaps a rectangle.
pub fn circle_overlaps_rect(center: Point, radius: f64, rect: Rect) -> bool {
    let rect = rect.abs();
    let closest = Point::new(
        center.x.clamp(rect.x0, rect.x1),
        center.y.clamp(rect.y0, rect.y1),
    );
    (center - closest).hypot() <= radius.abs()
}

/// Common geometry of every element kind.
pub trait ShapeTrait {
    /// Axis-aligned bounding box.
    fn bounds(&self) -> Rect;

    /// Check whether a point hits this shape.
    fn hit_test(&self, point: Point, params: &HitParams) -> bool;

    /// Check whether this shape intersects a marquee rectangle.
    fn intersects_rect(&self, rect: Rect) -> bool;

    /// Move every coordinate-bearing field by `delta`.
    fn translate(&mut self, delta: Vec2);

    /// Scale geometry by independent axis factors.
    fn rescale(&mut self, sx: f64, sy: f64);
}

/// Closed set of element geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    /// Freehand stroke.
    Line(Stroke),
    /// Straight line drawn with the line tool.
    LineShape(Stroke),
    Arrow(Stroke),
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
    Text(Text),
    Image(Image),
    FilledRegion(FilledRegion),
}

impl Shape {
    fn as_trait(&self) -> &dyn ShapeTrait {
        match self {
            Shape::Line(s) | Shape::LineShape(s) | Shape::Arrow(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::FilledRegion(s) => s,
        }
    }

    fn as_trait_mut(&mut self) -> &mut dyn ShapeTrait {
        match self {
            Shape::Line(s) | Shape::LineShape(s) | Shape::Arrow(s) => s,
            Shape::Rectangle(s) => s,
            Shape::Circle(s) => s,
            Shape::Triangle(s) => s,
            Shape::Text(s) => s,
            Shape::Image(s) => s,
            Shape::FilledRegion(s) => s,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.as_trait().bounds()
    }

    pub fn hit_test(&self, point: Point, params: &HitParams) -> bool {
        self.as_trait().hit_test(point, params)
    }

    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.as_trait().intersects_rect(rect)
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.as_trait_mut().translate(delta)
    }

    pub fn rescale(&mut self, sx: f64, sy: f64) {
        self.as_trait_mut().rescale(sx, sy)
    }

    /// Kind name as used in serialized documents.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Line(_) => "line",
            Shape::LineShape(_) => "line-shape",
            Shape::Arrow(_) => "arrow",
            Shape::Rectangle(_) => "rectangle",
            Shape::Circle(_) => "circle",
            Shape::Triangle(_) => "triangle",
            Shape::Text(_) => "text",
            Shape::Image(_) => "image",
            Shape::FilledRegion(_) => "filled-region",
        }
    }

    /// Stroke data for the polyline kinds.
    pub fn as_stroke(&self) -> Option<&Stroke> {
        match self {
            Shape::Line(s) | Shape::LineShape(s) | Shape::Arrow(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_stroke_mut(&mut self) -> Option<&mut Stroke> {
        match self {
            Shape::Line(s) | Shape::LineShape(s) | Shape::Arrow(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Shape::Text(t) => Some(t),
            _ => None,
        }
    }

    /// Fill of the shapes the bucket recolors without rasterizing.
    pub fn vector_fill(&self) -> Option<Option<SerializableColor>> {
        match self {
            Shape::Rectangle(r) => Some(r.style.fill),
            Shape::Circle(c) => Some(c.style.fill),
            Shape::Triangle(t) => Some(t.style.fill),
            _ => None,
        }
    }

    /// Replace the fill of a rectangle, circle or triangle.
    /// Returns false for kinds without a vector fill.
    pub fn set_vector_fill(&mut self, fill: SerializableColor) -> bool {
        match self {
            Shape::Rectangle(r) => r.style.fill = Some(fill),
            Shape::Circle(c) => c.style.fill = Some(fill),
            Shape::Triangle(t) => t.style.fill = Some(fill),
            _ => return false,
        }
        true
    }

    /// Whether the geometry has no visible extent.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Shape::Line(s) | Shape::LineShape(s) | Shape::Arrow(s) => s.is_degenerate(),
            Shape::Rectangle(r) => r.width == 0.0 || r.height == 0.0,
            Shape::Circle(c) => c.radius == 0.0,
            Shape::Triangle(t) => t.radius == 0.0,
            Shape::Text(t) => t.text.is_empty(),
            Shape::Image(i) => i.width == 0.0 || i.height == 0.0,
            Shape::FilledRegion(r) => r.width == 0.0 || r.height == 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_forms() {
        assert_eq!(SerializableColor::from_hex("#fff").unwrap(), SerializableColor::white());
        assert_eq!(
            SerializableColor::from_hex("#ff000080").unwrap(),
            SerializableColor::new(255, 0, 0, 128)
        );
        assert_eq!(
            SerializableColor::from_hex("transparent").unwrap(),
            SerializableColor::transparent()
        );
        assert!(SerializableColor::from_hex("red").is_err());
        assert!(SerializableColor::from_hex("#12345").is_err());
        assert_eq!(SerializableColor::rgb(255, 0, 16).to_hex(), "#ff0010");
    }

    #[test]
    fn test_color_serializes_as_string() {
        let json = serde_json::to_string(&SerializableColor::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: SerializableColor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SerializableColor::rgb(1, 2, 3));
    }

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_rect_overlap() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(circle_overlaps_rect(Point::new(15.0, 5.0), 5.0, rect));
        assert!(!circle_overlaps_rect(Point::new(20.0, 20.0), 5.0, rect));
    }

    #[test]
    fn test_shape_tagging() {
        let shape = Shape::LineShape(Stroke::new(vec![0.0, 0.0, 1.0, 1.0]));
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "line-shape");
        assert_eq!(shape.kind_name(), "line-shape");
    }
}
