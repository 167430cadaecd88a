//! Bucket fill over a rasterized canvas.

use crate::error::{EditorError, EditorResult};
use crate::shapes::SerializableColor;
use image::{Rgba, RgbaImage};
use std::collections::VecDeque;

/// An in-progress 4-connected flood fill.
///
/// The job owns its pixel buffer and can be advanced in bounded steps so a
/// host can interleave it with other work. Nothing outside the buffer is
/// touched until the caller takes the finished pixels.
#[derive(Debug, Clone)]
pub struct FloodFill {
    pixels: RgbaImage,
    target: [u8; 4],
    fill: [u8; 4],
    tolerance: u8,
    visited: Vec<bool>,
    queue: VecDeque<(u32, u32)>,
    filled: usize,
}

impl FloodFill {
    /// Prepare a fill of the region around `(x, y)`.
    ///
    /// The fill color is written fully opaque. Fails with
    /// [`EditorError::FloodFillNoChange`] when the start pixel already has it.
    pub fn new(
        pixels: RgbaImage,
        x: u32,
        y: u32,
        fill: SerializableColor,
        tolerance: u8,
    ) -> EditorResult<Self> {
        let (width, height) = pixels.dimensions();
        if x >= width || y >= height {
            return Err(EditorError::Raster(format!(
                "Fill origin ({x}, {y}) is outside the {width}x{height} canvas"
            )));
        }
        let target = pixels.get_pixel(x, y).0;
        let fill = fill.opaque().to_rgba();
        if target == fill {
            return Err(EditorError::FloodFillNoChange);
        }
        let mut visited = vec![false; width as usize * height as usize];
        visited[index(width, x, y)] = true;
        let mut queue = VecDeque::new();
        queue.push_back((x, y));
        Ok(Self {
            pixels,
            target,
            fill,
            tolerance,
            visited,
            queue,
            filled: 0,
        })
    }

    fn matches(&self, color: [u8; 4]) -> bool {
        color
            .iter()
            .zip(self.target.iter())
            .all(|(a, b)| a.abs_diff(*b) <= self.tolerance)
    }

    /// Process at most `budget` queued pixels. Returns true once the fill is complete.
    pub fn step(&mut self, budget: usize) -> bool {
        let (width, height) = self.pixels.dimensions();
        for _ in 0..budget {
            let Some((x, y)) = self.queue.pop_front() else {
                break;
            };
            if !self.matches(self.pixels.get_pixel(x, y).0) {
                continue;
            }
            self.pixels.put_pixel(x, y, Rgba(self.fill));
            self.filled += 1;

            let neighbors = [
                (x.checked_sub(1), Some(y)),
                ((x + 1 < width).then_some(x + 1), Some(y)),
                (Some(x), y.checked_sub(1)),
                (Some(x), (y + 1 < height).then_some(y + 1)),
            ];
            for (nx, ny) in neighbors {
                let (Some(nx), Some(ny)) = (nx, ny) else {
                    continue;
                };
                let i = index(width, nx, ny);
                if !self.visited[i] {
                    self.visited[i] = true;
                    self.queue.push_back((nx, ny));
                }
            }
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of pixels recolored so far.
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Run to completion and return the filled buffer.
    pub fn run(mut self, chunk: usize) -> RgbaImage {
        let chunk = chunk.max(1);
        while !self.step(chunk) {}
        self.pixels
    }

    /// The buffer in its current state.
    pub fn into_pixels(self) -> RgbaImage {
        self.pixels
    }
}

fn index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: SerializableColor = SerializableColor::rgb(255, 0, 0);
    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn test_fills_whole_uniform_canvas() {
        let pixels = RgbaImage::from_pixel(40, 30, Rgba(WHITE));
        let fill = FloodFill::new(pixels, 7, 11, RED, 20).unwrap();
        let out = fill.run(64);
        assert!(out.pixels().all(|p| p.0 == [255, 0, 0, 255]));
    }

    #[test]
    fn test_stops_at_boundary() {
        let mut pixels = RgbaImage::from_pixel(10, 10, Rgba(WHITE));
        for y in 0..10 {
            pixels.put_pixel(5, y, Rgba([0, 0, 0, 255]));
        }
        let mut fill = FloodFill::new(pixels, 1, 1, RED, 20).unwrap();
        while !fill.step(3) {}
        assert_eq!(fill.filled(), 50);
        let out = fill.into_pixels();
        assert_eq!(out.get_pixel(4, 9).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(5, 5).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(6, 0).0, WHITE);
    }

    #[test]
    fn test_tolerance() {
        let mut pixels = RgbaImage::from_pixel(3, 1, Rgba(WHITE));
        pixels.put_pixel(1, 0, Rgba([240, 240, 240, 255]));
        pixels.put_pixel(2, 0, Rgba([200, 200, 200, 255]));
        let out = FloodFill::new(pixels, 0, 0, RED, 20).unwrap().run(10);
        assert_eq!(out.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(out.get_pixel(2, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_same_color_is_no_change() {
        let pixels = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        assert_eq!(
            FloodFill::new(pixels, 0, 0, RED, 20).unwrap_err(),
            EditorError::FloodFillNoChange
        );
    }

    #[test]
    fn test_translucent_fill_is_written_opaque() {
        let pixels = RgbaImage::from_pixel(2, 2, Rgba(WHITE));
        let out = FloodFill::new(pixels, 0, 0, SerializableColor::new(0, 0, 255, 10), 0)
            .unwrap()
            .run(1);
        assert_eq!(out.get_pixel(1, 1).0, [0, 0, 255, 255]);
    }

    #[test]
    fn test_origin_out_of_bounds() {
        let pixels = RgbaImage::from_pixel(2, 2, Rgba(WHITE));
        assert!(matches!(
            FloodFill::new(pixels, 2, 0, RED, 20),
            Err(EditorError::Raster(_))
        ));
    }
}
