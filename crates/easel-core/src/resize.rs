//! Canvas resizing: scale factors, drag handles and preset resolutions.

use crate::error::{EditorError, EditorResult};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Independent axis factors mapping an old canvas size onto a new one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    /// Factors taking `from` to `to`. Both sizes must be valid.
    pub fn between(from: Size, to: Size) -> EditorResult<Self> {
        validate_size(from)?;
        validate_size(to)?;
        Ok(Self {
            sx: to.width / from.width,
            sy: to.height / from.height,
        })
    }

    pub fn is_identity(&self) -> bool {
        self.sx == 1.0 && self.sy == 1.0
    }
}

/// Reject sizes that are not finite or smaller than one pixel.
pub fn validate_size(size: Size) -> EditorResult<()> {
    let ok = |v: f64| v.is_finite() && v >= 1.0;
    if ok(size.width) && ok(size.height) {
        Ok(())
    } else {
        Err(EditorError::InvariantViolation(format!(
            "Invalid canvas size {}x{}",
            size.width, size.height
        )))
    }
}

/// Grab zones just outside the canvas's right and bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResizeHandle {
    Right,
    Bottom,
    BottomRight,
}

impl ResizeHandle {
    /// The handle under `point` for a canvas of `size`, if any.
    pub fn at(point: Point, size: Size, tolerance: f64) -> Option<Self> {
        let beyond_right = point.x > size.width && point.x <= size.width + tolerance;
        let beyond_bottom = point.y > size.height && point.y <= size.height + tolerance;
        let within_x = point.x >= 0.0 && point.x <= size.width;
        let within_y = point.y >= 0.0 && point.y <= size.height;
        if beyond_right && beyond_bottom {
            Some(ResizeHandle::BottomRight)
        } else if beyond_right && within_y {
            Some(ResizeHandle::Right)
        } else if beyond_bottom && within_x {
            Some(ResizeHandle::Bottom)
        } else {
            None
        }
    }

    /// Live size after dragging this handle by `delta`, clamped to `min_size` per edge.
    pub fn drag(&self, start: Size, delta: Vec2, min_size: f64) -> Size {
        let width = match self {
            ResizeHandle::Right | ResizeHandle::BottomRight => start.width + delta.x,
            ResizeHandle::Bottom => start.width,
        };
        let height = match self {
            ResizeHandle::Bottom | ResizeHandle::BottomRight => start.height + delta.y,
            ResizeHandle::Right => start.height,
        };
        Size::new(width.max(min_size), height.max(min_size))
    }
}

/// Named canvas resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CanvasPreset {
    /// 1280×720
    Hd,
    /// 1920×1080
    FullHd,
    /// 1080×1080
    Square,
    /// A4 portrait at 96 dpi.
    A4,
    /// 1080×1920 portrait story.
    Story,
    /// US Letter portrait at 96 dpi.
    Letter,
    Custom { width: f64, height: f64 },
}

impl CanvasPreset {
    pub const NAMED: [CanvasPreset; 6] = [
        CanvasPreset::Hd,
        CanvasPreset::FullHd,
        CanvasPreset::Square,
        CanvasPreset::A4,
        CanvasPreset::Story,
        CanvasPreset::Letter,
    ];

    pub fn size(&self) -> Size {
        match *self {
            CanvasPreset::Hd => Size::new(1280.0, 720.0),
            CanvasPreset::FullHd => Size::new(1920.0, 1080.0),
            CanvasPreset::Square => Size::new(1080.0, 1080.0),
            CanvasPreset::A4 => Size::new(794.0, 1123.0),
            CanvasPreset::Story => Size::new(1080.0, 1920.0),
            CanvasPreset::Letter => Size::new(816.0, 1056.0),
            CanvasPreset::Custom { width, height } => Size::new(width, height),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CanvasPreset::Hd => "HD",
            CanvasPreset::FullHd => "Full HD",
            CanvasPreset::Square => "Square",
            CanvasPreset::A4 => "A4",
            CanvasPreset::Story => "Story",
            CanvasPreset::Letter => "Letter",
            CanvasPreset::Custom { .. } => "Custom",
        }
    }
}
