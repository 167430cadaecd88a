//! Bitmap images and their encoded sources.

use super::{HitParams, ShapeTrait, rect_contains, rects_overlap};
use crate::error::{EditorError, EditorResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use image::RgbaImage;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use std::sync::Arc;

/// Encoding of a stored bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }

    fn codec(self) -> image::ImageFormat {
        match self {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

/// Encoded bitmap payload, base64 in memory and on the wire.
///
/// The payload is reference counted so history snapshots share it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub format: ImageFormat,
    pub data: Arc<str>,
}

impl ImageSource {
    /// Wrap raw encoded bytes, detecting the format from their header.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(bytes)?;
        Some(Self {
            format,
            data: STANDARD.encode(bytes).into(),
        })
    }

    /// Encode an RGBA buffer as PNG.
    pub fn encode_png(pixels: &RgbaImage) -> EditorResult<Self> {
        let mut bytes = Vec::new();
        pixels.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(Self {
            format: ImageFormat::Png,
            data: STANDARD.encode(&bytes).into(),
        })
    }

    /// Raw encoded bytes.
    pub fn bytes(&self) -> EditorResult<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| EditorError::Raster(format!("Invalid base64 image data: {e}")))
    }

    /// Decode into an RGBA buffer.
    pub fn decode(&self) -> EditorResult<RgbaImage> {
        let bytes = self.bytes()?;
        let decoded = image::load_from_memory_with_format(&bytes, self.format.codec())?;
        Ok(decoded.to_rgba8())
    }

    /// Approximate size of the encoded payload in bytes.
    pub fn data_size(&self) -> usize {
        self.data.len() * 3 / 4
    }
}

/// A placed bitmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub source: ImageSource,
    /// Bitmap width in pixels.
    pub natural_width: u32,
    /// Bitmap height in pixels.
    pub natural_height: u32,
    /// Rotation in degrees around the origin.
    #[serde(default)]
    pub rotation: f64,
}

impl Image {
    /// Place a bitmap at its natural size.
    pub fn new(origin: Point, source: ImageSource, natural_width: u32, natural_height: u32) -> Self {
        Self {
            x: origin.x,
            y: origin.y,
            width: f64::from(natural_width),
            height: f64::from(natural_height),
            source,
            natural_width,
            natural_height,
            rotation: 0.0,
        }
    }

    /// Scale down to fit within the given box, preserving aspect ratio.
    /// Images that already fit keep their size.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        if self.width <= max_width && self.height <= max_height {
            return self;
        }
        if self.natural_width == 0 || self.natural_height == 0 {
            return self;
        }
        let aspect = f64::from(self.natural_width) / f64::from(self.natural_height);
        if aspect > max_width / max_height {
            self.width = max_width;
            self.height = max_width / aspect;
        } else {
            self.height = max_height;
            self.width = max_height * aspect;
        }
        self
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }
}

impl ShapeTrait for Image {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> ImageSource {
        let pixels = RgbaImage::from_pixel(4, 2, image::Rgba([255, 0, 0, 255]));
        ImageSource::encode_png(&pixels).unwrap()
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("PNG"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("jpeg"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
        assert_eq!(
            ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0, 1]), None);
    }

    #[test]
    fn test_png_encode_decode() {
        let source = tiny_png();
        let bytes = source.bytes().unwrap();
        assert_eq!(ImageSource::from_bytes(&bytes).map(|s| s.format), Some(ImageFormat::Png));
        let decoded = source.decode().unwrap();
        assert_eq!(decoded.dimensions(), (4, 2));
        assert_eq!(decoded.get_pixel(3, 1).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_fit_within() {
        let img = Image::new(Point::ZERO, tiny_png(), 1000, 500);
        let fitted = img.fit_within(400.0, 400.0);
        assert!((fitted.width - 400.0).abs() < 0.01);
        assert!((fitted.height - 200.0).abs() < 0.01);

        let small = Image::new(Point::ZERO, tiny_png(), 4, 2).fit_within(400.0, 400.0);
        assert!((small.width - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_bounds() {
        let img = Image::new(Point::new(10.0, 20.0), tiny_png(), 100, 50);
        let bounds = img.bounds();
        assert!((bounds.x1 - 110.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 70.0).abs() < f64::EPSILON);
    }
}
