//! Software compositing of a scene into an RGBA buffer.
//!
//! Used by the bucket tool and for thumbnails. Each visible layer is drawn
//! into its own transparent buffer, so erasing strokes only clear pixels of
//! their own layer, and is then blended onto the canvas with the layer's
//! opacity. Pixels are sampled at their centers without anti-aliasing.
//! Text is left to the host's glyph renderer.

use crate::element::{Element, ElementId};
use crate::error::EditorResult;
use crate::resize::validate_size;
use crate::scene::Scene;
use crate::shapes::{
    Circle, CompositeMode, FilledRegion, Image, ImageSource, Rectangle, SerializableColor, Shape,
    ShapeStyle, Stroke, Triangle, point_to_polyline_dist, point_to_segment_dist,
};
use image::{Rgba, RgbaImage};
use kurbo::{Affine, BezPath, Point, Rect, Shape as _, Size};
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Produces the composited pixels of a scene.
pub trait Rasterizer {
    /// Render `scene` at `size` (in pixels) over its background color.
    fn rasterize(&mut self, scene: &Scene, size: Size) -> EditorResult<RgbaImage>;
}

/// Pixel dimensions for a canvas size, rounding partial pixels up.
pub fn pixel_size(size: Size) -> EditorResult<(u32, u32)> {
    validate_size(size)?;
    Ok((size.width.ceil() as u32, size.height.ceil() as u32))
}

struct CachedBitmap {
    data: Arc<str>,
    pixels: Arc<RgbaImage>,
}

/// CPU rasterizer built on kurbo geometry and the `image` crate.
#[derive(Default)]
pub struct SoftwareRasterizer {
    /// Decoded bitmaps keyed by element, valid while the payload is unchanged.
    bitmap_cache: HashMap<ElementId, CachedBitmap>,
}

impl std::fmt::Debug for SoftwareRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareRasterizer")
            .field("cached_bitmaps", &self.bitmap_cache.len())
            .finish()
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&mut self, scene: &Scene, size: Size) -> EditorResult<RgbaImage> {
        let (width, height) = pixel_size(size)?;
        let background = Rgba(scene.background_color().to_rgba());
        let mut canvas = RgbaImage::from_pixel(width, height, background);

        for layer in scene.layers().iter().filter(|l| l.visible) {
            let mut buffer = RgbaImage::new(width, height);
            for element in scene.elements(layer.id) {
                self.draw_element(&mut buffer, element);
            }
            composite_layer(&mut canvas, &buffer, layer.opacity);
        }

        let live = scene.element_ids();
        self.bitmap_cache.retain(|id, _| live.contains(id));
        Ok(canvas)
    }
}

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn bitmap(&mut self, id: ElementId, source: &ImageSource) -> Option<Arc<RgbaImage>> {
        if let Some(cached) = self.bitmap_cache.get(&id) {
            if Arc::ptr_eq(&cached.data, &source.data) {
                return Some(cached.pixels.clone());
            }
        }
        match source.decode() {
            Ok(pixels) => {
                let pixels = Arc::new(pixels);
                self.bitmap_cache.insert(
                    id,
                    CachedBitmap {
                        data: source.data.clone(),
                        pixels: pixels.clone(),
                    },
                );
                Some(pixels)
            }
            Err(err) => {
                log::warn!("Skipping undecodable bitmap on element {id}: {err}");
                None
            }
        }
    }

    fn draw_element(&mut self, buffer: &mut RgbaImage, element: &Element) {
        let opacity = element.opacity.clamp(0.0, 1.0);
        match &element.shape {
            Shape::Line(stroke) | Shape::LineShape(stroke) | Shape::Arrow(stroke) => {
                draw_stroke(buffer, stroke, opacity)
            }
            Shape::Rectangle(rect) => draw_rectangle(buffer, rect, opacity),
            Shape::Circle(circle) => draw_circle(buffer, circle, opacity),
            Shape::Triangle(triangle) => draw_triangle(buffer, triangle, opacity),
            Shape::Text(_) => {}
            Shape::Image(image) => {
                if let Some(pixels) = self.bitmap(element.id, &image.source) {
                    draw_image(buffer, image, &pixels, opacity);
                }
            }
            Shape::FilledRegion(region) => self.draw_region(buffer, element.id, region, opacity),
        }
    }

    fn draw_region(
        &mut self,
        buffer: &mut RgbaImage,
        id: ElementId,
        region: &FilledRegion,
        opacity: f64,
    ) {
        let rect = region.as_rect();
        if let Some(patch) = region.patch.as_ref() {
            if let Some(pixels) = self.bitmap(id, patch) {
                paint(buffer, rect, opacity, CompositeMode::SourceOver, |p| {
                    sample_stretched(&pixels, rect, p)
                });
            }
            return;
        }
        draw_box(buffer, rect, &region.style, opacity);
    }
}

/// Columns and rows of the pixels whose centers can fall in `area`, clipped to the buffer.
fn pixel_span(area: Rect, width: u32, height: u32) -> (Range<u32>, Range<u32>) {
    let area = area.abs();
    let x0 = area.x0.floor().max(0.0) as u32;
    let y0 = area.y0.floor().max(0.0) as u32;
    let x1 = (area.x1.ceil().max(0.0) as u32).min(width);
    let y1 = (area.y1.ceil().max(0.0) as u32).min(height);
    (x0..x1.max(x0), y0..y1.max(y0))
}

fn pixel_center(x: u32, y: u32) -> Point {
    Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5)
}

/// Visit every pixel whose center falls in `area`, blending the color `shade` returns.
fn paint(
    buffer: &mut RgbaImage,
    area: Rect,
    opacity: f64,
    mode: CompositeMode,
    shade: impl Fn(Point) -> Option<SerializableColor>,
) {
    let (width, height) = buffer.dimensions();
    let (xs, ys) = pixel_span(area, width, height);
    for y in ys {
        for x in xs.clone() {
            if let Some(color) = shade(pixel_center(x, y)) {
                blend(buffer.get_pixel_mut(x, y), color, opacity, mode);
            }
        }
    }
}

fn blend(dst: &mut Rgba<u8>, src: SerializableColor, opacity: f64, mode: CompositeMode) {
    let sa = f64::from(src.a) / 255.0 * opacity;
    if sa <= 0.0 {
        return;
    }
    let da = f64::from(dst.0[3]) / 255.0;
    match mode {
        CompositeMode::DestinationOut => {
            dst.0[3] = to_byte(da * (1.0 - sa));
        }
        CompositeMode::SourceOver => {
            let out_a = sa + da * (1.0 - sa);
            let channel = |s: u8, d: u8| {
                (f64::from(s) * sa + f64::from(d) * da * (1.0 - sa)) / out_a / 255.0
            };
            dst.0 = [
                to_byte(channel(src.r, dst.0[0])),
                to_byte(channel(src.g, dst.0[1])),
                to_byte(channel(src.b, dst.0[2])),
                to_byte(out_a),
            ];
        }
    }
}

fn to_byte(unit: f64) -> u8 {
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn composite_layer(canvas: &mut RgbaImage, layer: &RgbaImage, opacity: f64) {
    for (dst, src) in canvas.pixels_mut().zip(layer.pixels()) {
        if src.0[3] > 0 {
            blend(dst, SerializableColor::from_rgba(src.0), opacity, CompositeMode::SourceOver);
        }
    }
}

fn outline_color(style: &ShapeStyle, distance_to_edge: f64) -> Option<SerializableColor> {
    (style.stroke_width > 0.0 && distance_to_edge <= style.stroke_width / 2.0).then_some(style.stroke)
}

fn draw_box(buffer: &mut RgbaImage, rect: Rect, style: &ShapeStyle, opacity: f64) {
    let rect = rect.abs();
    let outline = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ];
    let pad = style.stroke_width / 2.0;
    paint(buffer, rect.inflate(pad, pad), opacity, CompositeMode::SourceOver, |p| {
        outline_color(style, point_to_polyline_dist(p, &outline)).or_else(|| {
            let inside = p.x >= rect.x0 && p.x < rect.x1 && p.y >= rect.y0 && p.y < rect.y1;
            inside.then_some(style.fill).flatten()
        })
    });
}

fn draw_rectangle(buffer: &mut RgbaImage, rect: &Rectangle, opacity: f64) {
    draw_box(buffer, rect.as_rect(), &rect.style, opacity);
}

fn draw_circle(buffer: &mut RgbaImage, circle: &Circle, opacity: f64) {
    let center = circle.center();
    let radius = circle.radius.abs();
    let shape = kurbo::Circle::new(center, radius);
    let pad = circle.style.stroke_width / 2.0;
    paint(
        buffer,
        shape.bounding_box().inflate(pad, pad),
        opacity,
        CompositeMode::SourceOver,
        |p| {
            let d = (p - center).hypot();
            outline_color(&circle.style, (d - radius).abs())
                .or_else(|| shape.contains(p).then_some(circle.style.fill).flatten())
        },
    );
}

fn draw_triangle(buffer: &mut RgbaImage, triangle: &Triangle, opacity: f64) {
    let [apex, right, left] = triangle.vertices();
    let mut path = BezPath::new();
    path.move_to(apex);
    path.line_to(right);
    path.line_to(left);
    path.close_path();
    let outline = [apex, right, left, apex];
    let pad = triangle.style.stroke_width / 2.0;
    paint(
        buffer,
        path.bounding_box().inflate(pad, pad),
        opacity,
        CompositeMode::SourceOver,
        |p| {
            outline_color(&triangle.style, point_to_polyline_dist(p, &outline))
                .or_else(|| path.contains(p).then_some(triangle.style.fill).flatten())
        },
    );
}

/// Strokes are painted segment by segment over each segment's own bounds.
/// A coverage mask over the stroke's bounds keeps overlapping segments from
/// blending a pixel twice.
fn draw_stroke(buffer: &mut RgbaImage, stroke: &Stroke, opacity: f64) {
    let points = stroke.point_list();
    if points.is_empty() || stroke.stroke_width <= 0.0 {
        return;
    }
    let half = stroke.stroke_width / 2.0;
    let (width, height) = buffer.dimensions();
    let bounds = points
        .iter()
        .skip(1)
        .fold(Rect::from_points(points[0], points[0]), |r, p| r.union_pt(*p))
        .inflate(half, half);
    let (span_x, span_y) = pixel_span(bounds, width, height);
    let mask_width = span_x.len();
    let mut covered = vec![false; mask_width * span_y.len()];

    let dot = (points.len() == 1).then(|| (points[0], points[0]));
    let segments = points.windows(2).map(|w| (w[0], w[1])).chain(dot);
    for (a, b) in segments {
        let (xs, ys) = pixel_span(Rect::from_points(a, b).inflate(half, half), width, height);
        for y in ys {
            for x in xs.clone() {
                let index = (y - span_y.start) as usize * mask_width + (x - span_x.start) as usize;
                if covered[index] || point_to_segment_dist(pixel_center(x, y), a, b) > half {
                    continue;
                }
                covered[index] = true;
                blend(buffer.get_pixel_mut(x, y), stroke.stroke, opacity, stroke.composite);
            }
        }
    }
}

fn draw_image(buffer: &mut RgbaImage, image: &Image, pixels: &RgbaImage, opacity: f64) {
    let local = Rect::new(0.0, 0.0, image.width, image.height).abs();
    let placement =
        Affine::translate((image.x, image.y)) * Affine::rotate(image.rotation.to_radians());
    let inverse = placement.inverse();
    paint(
        buffer,
        placement.transform_rect_bbox(local),
        opacity,
        CompositeMode::SourceOver,
        |p| sample_stretched(pixels, local, inverse * p),
    );
}

/// Nearest-neighbour sample of `pixels` stretched over `rect`.
fn sample_stretched(pixels: &RgbaImage, rect: Rect, p: Point) -> Option<SerializableColor> {
    let (w, h) = pixels.dimensions();
    if w == 0 || h == 0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    if p.x < rect.x0 || p.x >= rect.x1 || p.y < rect.y0 || p.y >= rect.y1 {
        return None;
    }
    let u = ((p.x - rect.x0) / rect.width() * f64::from(w)) as u32;
    let v = ((p.y - rect.y0) / rect.height() * f64::from(h)) as u32;
    let pixel = pixels.get_pixel(u.min(w - 1), v.min(h - 1));
    Some(SerializableColor::from_rgba(pixel.0))
}
