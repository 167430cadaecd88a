//! Polyline strokes: freehand lines, straight lines and arrows.

use super::{HitParams, ShapeTrait, SerializableColor, point_to_polyline_dist, rect_contains};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    #[default]
    Round,
    Square,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Miter,
    #[default]
    Round,
    Bevel,
}

/// How a stroke combines with the pixels already on its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompositeMode {
    #[default]
    SourceOver,
    /// Clears the pixels it covers.
    DestinationOut,
}

/// An ordered sequence of points drawn with a stroke.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// Flattened `x, y` pairs.
    pub points: Vec<f64>,
    pub stroke: SerializableColor,
    pub stroke_width: f64,
    /// Curve smoothing; `None` draws straight segments.
    #[serde(default)]
    pub tension: Option<f64>,
    #[serde(default)]
    pub line_cap: LineCap,
    #[serde(default)]
    pub line_join: LineJoin,
    #[serde(default)]
    pub composite: CompositeMode,
    /// Dash pattern (on, off, ...).
    #[serde(default)]
    pub dash: Option<Vec<f64>>,
    #[serde(default)]
    pub shadow_blur: f64,
}

impl Stroke {
    /// Create a stroke from flattened points.
    pub fn new(points: Vec<f64>) -> Self {
        Self {
            points,
            stroke: SerializableColor::black(),
            stroke_width: 2.0,
            tension: None,
            line_cap: LineCap::default(),
            line_join: LineJoin::default(),
            composite: CompositeMode::default(),
            dash: None,
            shadow_blur: 0.0,
        }
    }

    /// Single-point stroke, the start of a freehand gesture.
    pub fn starting_at(point: Point) -> Self {
        Self::new(vec![point.x, point.y])
    }

    /// Smoothed single-point stroke in the given color and width.
    pub fn freehand(point: Point, stroke: SerializableColor, stroke_width: f64) -> Self {
        Self {
            stroke,
            stroke_width,
            tension: Some(0.5),
            ..Self::starting_at(point)
        }
    }

    /// Degenerate two-point stroke, the start of a line or arrow gesture.
    pub fn segment_at(point: Point) -> Self {
        Self::new(vec![point.x, point.y, point.x, point.y])
    }

    /// Append a point to the end of the stroke.
    pub fn push_point(&mut self, point: Point) {
        self.points.push(point.x);
        self.points.push(point.y);
    }

    /// Replace the stroke with a single segment `start → end`.
    pub fn set_segment(&mut self, start: Point, end: Point) {
        self.points.clear();
        self.points.extend_from_slice(&[start.x, start.y, end.x, end.y]);
    }

    /// Points as pairs. A trailing unpaired coordinate is ignored.
    pub fn point_list(&self) -> Vec<Point> {
        self.points
            .chunks_exact(2)
            .map(|pair| Point::new(pair[0], pair[1]))
            .collect()
    }

    /// Number of complete points.
    pub fn len(&self) -> usize {
        self.points.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-length strokes have no visible extent.
    pub fn is_degenerate(&self) -> bool {
        let points = self.point_list();
        match points.first() {
            None => true,
            Some(first) => points.iter().all(|p| p == first),
        }
    }
}

impl ShapeTrait for Stroke {
    fn bounds(&self) -> Rect {
        let mut points = self.point_list().into_iter();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| {
            rect.union_pt(p)
        })
    }

    fn hit_test(&self, point: Point, params: &HitParams) -> bool {
        point_to_polyline_dist(point, &self.point_list()) <= params.tolerance
    }

    /// Only the stroke's points are tested, not the segments between them.
    fn intersects_rect(&self, rect: Rect) -> bool {
        self.point_list().into_iter().any(|p| rect_contains(rect, p))
    }

    fn translate(&mut self, delta: Vec2) {
        for pair in self.points.chunks_exact_mut(2) {
            pair[0] += delta.x;
            pair[1] += delta.y;
        }
    }

    fn rescale(&mut self, sx: f64, sy: f64) {
        for pair in self.points.chunks_exact_mut(2) {
            pair[0] *= sx;
            pair[1] *= sy;
        }
    }
}
