//! Text shape.

use super::{HitParams, SerializableColor, ShapeTrait, rect_contains, rects_overlap};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

fn default_font_family() -> String {
    Text::DEFAULT_FONT_FAMILY.to_string()
}

fn default_font_size() -> f64 {
    Text::DEFAULT_FONT_SIZE
}

/// A block of text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub fill: SerializableColor,
    /// Measured width; estimated from the content when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Measured height; the font size is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Rotation in degrees around the origin.
    #[serde(default)]
    pub rotation: f64,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_FONT_FAMILY: &'static str = "Arial";
    /// Content given to text created by the text tool.
    pub const PLACEHOLDER: &'static str = "Type here";

    pub fn new(origin: Point, text: impl Into<String>) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            text: text.into(),
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: default_font_family(),
            fill: SerializableColor::black(),
            width: None,
            height: None,
            rotation: 0.0,
        }
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    /// Replace the content. Explicit measurements become stale and are dropped.
    pub fn set_content(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.width = None;
        self.height = None;
    }

    /// Width and height, measured when known, otherwise `chars * size / 2` by `size`.
    pub fn size(&self) -> (f64, f64) {
        let width = self
            .width
            .unwrap_or_else(|| self.text.chars().count() as f64 * self.font_size / 2.0);
        let height = self.height.unwrap_or(self.font_size);
        (width, height)
    }

    fn box_rect(&self) -> Rect {
        let (width, height) = self.size();
        Rect::new(self.x, self.y, self.x + width, self.y + height).abs()
    }
}

impl ShapeTrait for Text {
    fn bounds(&self) -> Rect {
        self.box_rect()
    }

    fn hit_test(&self, point: Point, params: &HitParams) -> bool {
        let padding = params.text_padding;
        rect_contains(self.box_rect().inflate(padding, padding), point)
    }

    fn intersects_rect(&self, rect: Rect) -> bool {
        rects_overlap(self.box_rect(), rect)
    }

    fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    fn rescale(&mut self, sx: f64, sy: f64) {
        self.x *= sx;
        self.y *= sy;
        if let Some(width) = self.width.as_mut() {
            *width *= sx;
        }
        if let Some(height) = self.height.as_mut() {
            *height *= sy;
        }
    }
}
