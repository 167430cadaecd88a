//! Center-and-radius shapes: circles and triangles.

use super::{HitParams, ShapeStyle, ShapeTrait, circle_overlaps_rect};
use kurbo::{Point, Rect, Vec2};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

fn radial_bounds(center: Point, radius: f64) -> Rect {
    let r = radius.abs();
    Rect::new(center.x - r, center.y - r, center.x + r, center.y + r)
}

/// A circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            radius,
            style: ShapeStyle::default(),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl ShapeTrait for Circle {
    fn bounds(&self) -> Rect {
        radial_bounds(self.center(), self.radius)
    }

    fn hit_test(&self, point: Point, _params: &HitParams) -> bool {
        (point - self.center()).hypot() <= self.radius.abs()
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        circle_overlaps_rect(self.center(), self.radius, rect)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn rescale(&mut self, sx: f64, sy: f64) {
        self.x *= sx;
        self.y *= sy;
        self.radius *= sx.min(sy);
    }
}

const TRIANGLE_SIDES: u32 = 3;

fn default_sides() -> u32 {
    TRIANGLE_SIDES
}

/// Stored documents may carry any side count; triangles always have three.
fn fixed_sides<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(TRIANGLE_SIDES)
}

/// A regular triangle inscribed in a circle, apex pointing up.
///
/// Hit-testing uses the circumscribed circle rather than the polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Triangle {
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    pub radius: f64,
    #[serde(default = "default_sides", deserialize_with = "fixed_sides")]
    pub sides: u32,
    #[serde(flatten)]
    pub style: ShapeStyle,
}

impl Triangle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self {
            x: center.x,
            y: center.y,
            radius,
            sides: default_sides(),
            style: ShapeStyle::default(),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Polygon vertices, starting at the apex.
    pub fn vertices(&self) -> [Point; 3] {
        std::array::from_fn(|i| {
            let angle = -FRAC_PI_2 + TAU * i as f64 / f64::from(TRIANGLE_SIDES);
            Point::new(
                self.x + self.radius * angle.cos(),
                self.y + self.radius * angle.sin(),
            )
        })
    }
}

impl ShapeTrait for Triangle {
    fn bounds(&self) -> Rect {
        radial_bounds(self.center(), self.radius)
    }

    fn hit_test(&self, point: Point, _params: &HitParams) -> bool {
        (point - self.center()).hypot() <= self.radius.abs()
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        circle_overlaps_rect(self.center(), self.radius, rect)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn rescale(&mut self, sx: f64, sy: f64) {
        self.x *= sx;
        self.y *= sy;
        self.radius *= sx.min(sy);
    }
}
