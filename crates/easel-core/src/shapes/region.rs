//! Filled regions produced by the bucket tool.

use super::{HitParams, ImageSource, SerializableColor, ShapeStyle, ShapeTrait, rect_contains, rects_overlap};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A rectangular region, either a plain vector box or a rasterized patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilledRegion {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub style: ShapeStyle,
    /// Rasterized pixels drawn stretched over the region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<ImageSource>,
}

impl FilledRegion {
    /// Region covering `rect` with a solid vector fill.
    pub fn solid(rect: Rect, fill: SerializableColor) -> Self {
        Self {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            style: ShapeStyle {
                fill: Some(fill),
                stroke: SerializableColor::transparent(),
                stroke_width: 0.0,
            },
            patch: None,
        }
    }

    /// Region backed by a raster patch, with a transparent vector fill.
    pub fn from_patch(rect: Rect, patch: ImageSource) -> Self {
        Self {
            patch: Some(patch),
            ..Self::solid(rect, SerializableColor::transparent())
        }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }
}

impl ShapeTrait for FilledRegion {
    fn bounds(&self) -> Rect {
        self.as_rect()
    }

    fn hit_test(&self, point: Point, _params: &HitParams) -> bool {
        rect_contains(self.as_rect(), point)
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        rects_overlap(self.as_rect(), rect)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn rescale(&mut self, sx: f64, sy: f64) {
        self.x *= sx;
        self.y *= sy;
        self.width *= sx;
        self.height *= sy;
    }
}
