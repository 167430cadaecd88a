//! Tool system for the drawing surface.

use crate::shapes::{
    Circle, LineCap, Rectangle, SerializableColor, Shape, ShapeStyle, Stroke, Text, Triangle,
};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    #[default]
    Select,
    Eraser,
    Text,
    Bucket,
    Rectangle,
    Circle,
    Triangle,
    Line,
    Arrow,
    Pencil,
    Brush,
    Pen,
    Marker,
    /// Places the staged bitmap at the pointer.
    Image,
}

impl ToolKind {
    pub const ALL: [ToolKind; 14] = [
        ToolKind::Select,
        ToolKind::Eraser,
        ToolKind::Text,
        ToolKind::Bucket,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Triangle,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Pencil,
        ToolKind::Brush,
        ToolKind::Pen,
        ToolKind::Marker,
        ToolKind::Image,
    ];

    /// Tools that drag out a shape from an anchor.
    pub fn is_shape(&self) -> bool {
        matches!(
            self,
            ToolKind::Rectangle
                | ToolKind::Circle
                | ToolKind::Triangle
                | ToolKind::Line
                | ToolKind::Arrow
        )
    }

    /// Tools that draw a freehand stroke.
    pub fn is_freehand(&self) -> bool {
        self.freehand_preset().is_some()
    }

    pub fn freehand_preset(&self) -> Option<FreehandPreset> {
        match self {
            ToolKind::Pen => Some(FreehandPreset::PEN),
            ToolKind::Pencil => Some(FreehandPreset::PENCIL),
            ToolKind::Marker => Some(FreehandPreset::MARKER),
            ToolKind::Brush => Some(FreehandPreset::BRUSH),
            _ => None,
        }
    }
}

/// How a freehand tool shapes its stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreehandPreset {
    /// Element opacity.
    pub opacity: f64,
    /// Multiplier on the current stroke width.
    pub width_scale: f64,
    pub tension: f64,
    /// Dash pattern in multiples of the stroke width.
    pub dash: Option<[f64; 2]>,
    /// Shadow blur in multiples of the stroke width.
    pub shadow_scale: f64,
    pub line_cap: LineCap,
}

impl FreehandPreset {
    /// Opaque and solid.
    pub const PEN: Self = Self {
        opacity: 1.0,
        width_scale: 1.0,
        tension: 0.5,
        dash: None,
        shadow_scale: 0.0,
        line_cap: LineCap::Round,
    };

    /// Textured: short dashes at high opacity.
    pub const PENCIL: Self = Self {
        opacity: 0.9,
        width_scale: 1.0,
        tension: 0.3,
        dash: Some([1.0, 0.5]),
        shadow_scale: 0.0,
        line_cap: LineCap::Round,
    };

    /// Translucent and wide.
    pub const MARKER: Self = Self {
        opacity: 0.5,
        width_scale: 3.0,
        tension: 0.5,
        dash: None,
        shadow_scale: 0.0,
        line_cap: LineCap::Square,
    };

    /// Soft shadow with long dashes.
    pub const BRUSH: Self = Self {
        opacity: 0.8,
        width_scale: 1.5,
        tension: 0.5,
        dash: Some([4.0, 1.0]),
        shadow_scale: 1.0,
        line_cap: LineCap::Round,
    };

    /// Start a stroke at `point` in the given color and base width.
    pub fn start_stroke(&self, point: Point, color: SerializableColor, base_width: f64) -> Stroke {
        let width = base_width * self.width_scale;
        Stroke {
            tension: Some(self.tension),
            dash: self.dash.map(|[on, off]| vec![on * width, off * width]),
            shadow_blur: self.shadow_scale * width,
            line_cap: self.line_cap,
            ..Stroke::freehand(point, color, width)
        }
    }
}

/// Manages the current tool and the style applied to new elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Outline and stroke color.
    pub stroke_color: SerializableColor,
    /// Fill for new closed shapes (None = no fill).
    pub fill_color: Option<SerializableColor>,
    pub stroke_width: f64,
    pub font_size: f64,
    pub font_family: String,
    /// Color the bucket fills with.
    pub bucket_color: SerializableColor,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            stroke_color: SerializableColor::black(),
            fill_color: None,
            stroke_width: 2.0,
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            bucket_color: SerializableColor::rgb(255, 0, 0),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
    }

    /// Style applied to new rectangles, circles and triangles.
    pub fn shape_style(&self) -> ShapeStyle {
        ShapeStyle {
            fill: self.fill_color,
            stroke: self.stroke_color,
            stroke_width: self.stroke_width,
        }
    }

    /// The zero-size shape a drawing tool creates at gesture start, with its
    /// element opacity. Tools that do not drag out a shape return None.
    pub fn begin_shape(&self, point: Point) -> Option<(Shape, f64)> {
        let style = self.shape_style();
        let segment = || Stroke {
            stroke: self.stroke_color,
            stroke_width: self.stroke_width,
            ..Stroke::segment_at(point)
        };
        let shape = match self.current_tool {
            ToolKind::Rectangle => Shape::Rectangle(Rectangle {
                style,
                ..Rectangle::from_corners(point, point)
            }),
            ToolKind::Circle => Shape::Circle(Circle {
                style,
                ..Circle::new(point, 0.0)
            }),
            ToolKind::Triangle => Shape::Triangle(Triangle {
                style,
                ..Triangle::new(point, 0.0)
            }),
            ToolKind::Line => Shape::LineShape(segment()),
            ToolKind::Arrow => Shape::Arrow(segment()),
            tool => {
                let preset = tool.freehand_preset()?;
                let stroke = preset.start_stroke(point, self.stroke_color, self.stroke_width);
                return Some((Shape::Line(stroke), preset.opacity));
            }
        };
        Some((shape, 1.0))
    }

    /// Text element content created by the text tool.
    pub fn begin_text(&self, point: Point) -> Shape {
        Shape::Text(Text {
            font_size: self.font_size,
            font_family: self.font_family.clone(),
            fill: self.stroke_color,
            ..Text::new(point, Text::PLACEHOLDER)
        })
    }
}

/// Update a shape being drawn from `anchor` toward `point`.
///
/// Boxes span the two corners, circles and triangles grow their radius to
/// the anchor distance, straight strokes reset their segment and freehand
/// strokes append the point.
pub fn drag_shape(shape: &mut Shape, anchor: Point, point: Point) {
    match shape {
        Shape::Rectangle(rect) => rect.set_corners(anchor, point),
        Shape::Circle(circle) => circle.radius = (point - anchor).hypot(),
        Shape::Triangle(triangle) => triangle.radius = (point - anchor).hypot(),
        Shape::LineShape(stroke) | Shape::Arrow(stroke) => stroke.set_segment(anchor, point),
        Shape::Line(stroke) => stroke.push_point(point),
        Shape::Text(_) | Shape::Image(_) | Shape::FilledRegion(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_selection() {
        let mut tm = ToolManager::new();
        assert_eq!(tm.current_tool, ToolKind::Select);

        tm.set_tool(ToolKind::Rectangle);
        assert_eq!(tm.current_tool, ToolKind::Rectangle);
    }

    #[test]
    fn test_non_drawing_tools_create_nothing() {
        let mut tm = ToolManager::new();
        for tool in [
            ToolKind::Select,
            ToolKind::Eraser,
            ToolKind::Bucket,
            ToolKind::Text,
            ToolKind::Image,
        ] {
            tm.set_tool(tool);
            assert!(tm.begin_shape(Point::ZERO).is_none(), "{tool:?}");
        }
    }

    #[test]
    fn test_shape_tools_start_degenerate() {
        let mut tm = ToolManager::new();
        for tool in ToolKind::ALL.into_iter().filter(ToolKind::is_shape) {
            tm.set_tool(tool);
            let (shape, opacity) = tm.begin_shape(Point::new(10.0, 10.0)).unwrap();
            assert!(shape.is_degenerate(), "{tool:?}");
            assert!((opacity - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_rectangle_drag_normalizes() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Rectangle);
        let anchor = Point::new(50.0, 40.0);
        let (mut shape, _) = tm.begin_shape(anchor).unwrap();
        drag_shape(&mut shape, anchor, Point::new(10.0, 10.0));
        let Shape::Rectangle(rect) = shape else {
            panic!("expected a rectangle");
        };
        assert!((rect.x - 10.0).abs() < f64::EPSILON);
        assert!((rect.y - 10.0).abs() < f64::EPSILON);
        assert!((rect.width - 40.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_radius_follows_pointer() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Circle);
        let anchor = Point::new(0.0, 0.0);
        let (mut shape, _) = tm.begin_shape(anchor).unwrap();
        drag_shape(&mut shape, anchor, Point::new(3.0, 4.0));
        assert!((shape.bounds().width() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_freehand_presets() {
        let mut tm = ToolManager::new();
        tm.stroke_width = 4.0;

        tm.set_tool(ToolKind::Marker);
        let (shape, opacity) = tm.begin_shape(Point::ZERO).unwrap();
        let stroke = shape.as_stroke().unwrap();
        assert!((opacity - 0.5).abs() < f64::EPSILON);
        assert!((stroke.stroke_width - 12.0).abs() < f64::EPSILON);
        assert_eq!(stroke.len(), 1);

        tm.set_tool(ToolKind::Pencil);
        let (shape, opacity) = tm.begin_shape(Point::ZERO).unwrap();
        assert!(opacity > 0.8 && opacity < 1.0);
        assert!(shape.as_stroke().unwrap().dash.is_some());

        tm.set_tool(ToolKind::Brush);
        let (shape, _) = tm.begin_shape(Point::ZERO).unwrap();
        let stroke = shape.as_stroke().unwrap();
        assert!(stroke.shadow_blur > 0.0);
        assert!(stroke.dash.is_some());

        tm.set_tool(ToolKind::Pen);
        let (shape, opacity) = tm.begin_shape(Point::ZERO).unwrap();
        assert!((opacity - 1.0).abs() < f64::EPSILON);
        assert!(shape.as_stroke().unwrap().dash.is_none());
    }

    #[test]
    fn test_freehand_drag_appends() {
        let mut tm = ToolManager::new();
        tm.set_tool(ToolKind::Pen);
        let (mut shape, _) = tm.begin_shape(Point::ZERO).unwrap();
        drag_shape(&mut shape, Point::ZERO, Point::new(5.0, 5.0));
        drag_shape(&mut shape, Point::ZERO, Point::new(9.0, 2.0));
        assert_eq!(shape.as_stroke().unwrap().len(), 3);
    }

    #[test]
    fn test_text_uses_placeholder() {
        let tm = ToolManager::new();
        let shape = tm.begin_text(Point::new(5.0, 5.0));
        assert_eq!(shape.as_text().unwrap().text, Text::PLACEHOLDER);
    }
}
