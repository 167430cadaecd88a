//! Canvas-wide actions: resizing, bucket fill, images and documents.

use super::Editor;
use crate::canvas::CanvasDocument;
use crate::config::EditorConfig;
use crate::element::{Element, ElementId};
use crate::error::{EditorError, EditorResult};
use crate::flood_fill::FloodFill;
use crate::hit_test::{elements_at, inside_any_bounds};
use crate::raster::Rasterizer;
use crate::resize::{CanvasPreset, ScaleFactors};
use crate::shapes::{FilledRegion, Image, ImageSource, SerializableColor, Shape, rect_contains};
use crate::tools::ToolKind;
use kurbo::{Point, Size};

/// How a bucket fill was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The click missed every element and the background was recolored.
    Background,
    /// A rectangle, circle or triangle had its fill replaced.
    VectorFill(ElementId),
    /// A raster fill was added as a new region element.
    Region(ElementId),
}

impl Editor {
    /// Resize the canvas, scaling every element by the per-axis factors.
    pub fn resize_canvas(&mut self, size: Size) -> EditorResult<()> {
        let factors = ScaleFactors::between(self.size, size).map_err(|err| self.report(err))?;
        if factors.is_identity() {
            return Ok(());
        }
        log::info!(
            "Resizing canvas {}x{} -> {}x{}",
            self.size.width,
            self.size.height,
            size.width,
            size.height
        );
        self.scene.rescale_all(factors.sx, factors.sy);
        self.size = size;
        self.commit();
        Ok(())
    }

    pub fn apply_preset(&mut self, preset: CanvasPreset) -> EditorResult<()> {
        self.resize_canvas(preset.size())
    }

    /// Remove every element on unlocked layers. Returns how many were removed.
    pub fn clear_canvas(&mut self) -> usize {
        let removed = self.scene.clear_unlocked();
        if removed > 0 {
            log::info!("Cleared {} element(s)", removed);
            self.commit();
        }
        removed
    }

    pub fn set_background_color(&mut self, color: SerializableColor) {
        self.scene.set_background_color(color);
        self.commit();
    }

    /// Bucket fill at `point`.
    ///
    /// Tries, in order: recoloring the topmost rectangle, circle or triangle
    /// under the point; recoloring the background when the point misses every
    /// element (if enabled in the config); and finally a raster flood fill
    /// over the composited canvas, added to the active layer as one region.
    pub fn flood_fill(&mut self, point: Point, color: SerializableColor) -> EditorResult<FillOutcome> {
        if !rect_contains(self.canvas_rect(), point) {
            return Err(EditorError::FloodFillNoChange);
        }

        let topmost = elements_at(&self.scene, point, &self.hit_params())
            .into_iter()
            .next()
            .and_then(|id| self.scene.element(id));
        if let Some(element) = topmost {
            if let Some(fill) = element.shape.vector_fill() {
                if fill != Some(color) {
                    let id = element.id;
                    if !self.scene.is_element_editable(id) {
                        return Err(EditorError::LockedOrHiddenLayer(element.layer_id));
                    }
                    self.scene.update_element(id, |e| e.shape.set_vector_fill(color))?;
                    log::info!("Filled {} with {}", id, color.to_hex());
                    self.commit();
                    return Ok(FillOutcome::VectorFill(id));
                }
            }
        }

        if self.config.bucket_background_shortcut && !inside_any_bounds(&self.scene, point) {
            if self.scene.background_color() == color {
                return Err(EditorError::FloodFillNoChange);
            }
            self.scene.set_background_color(color);
            log::info!("Background set to {}", color.to_hex());
            self.commit();
            return Ok(FillOutcome::Background);
        }

        self.raster_fill(point, color)
    }

    fn raster_fill(&mut self, point: Point, color: SerializableColor) -> EditorResult<FillOutcome> {
        let layer = self.active_layer;
        match self.scene.layer(layer) {
            Some(l) if l.is_editable() => {}
            Some(_) => return Err(EditorError::LockedOrHiddenLayer(layer)),
            None => return Err(EditorError::LayerNotFound(layer)),
        }

        let pixels = self.rasterizer.rasterize(&self.scene, self.size)?;
        let (width, height) = pixels.dimensions();
        let x = (point.x.floor().max(0.0) as u32).min(width.saturating_sub(1));
        let y = (point.y.floor().max(0.0) as u32).min(height.saturating_sub(1));
        let job = FloodFill::new(pixels, x, y, color, self.config.fill_tolerance)?;
        let filled = job.run(self.config.fill_chunk_pixels);
        let patch = ImageSource::encode_png(&filled)?;

        let region = FilledRegion::from_patch(self.canvas_rect(), patch);
        let id = self
            .scene
            .add_element(Element::new(layer, Shape::FilledRegion(region)))?;
        log::info!("Flood filled at ({}, {}) into region {}", x, y, id);
        self.commit();
        Ok(FillOutcome::Region(id))
    }

    fn image_from_bytes(&self, bytes: &[u8]) -> EditorResult<Image> {
        let source = ImageSource::from_bytes(bytes)
            .ok_or_else(|| EditorError::Raster("Unsupported image format".into()))?;
        let (width, height) = source.decode()?.dimensions();
        Ok(Image::new(Point::ZERO, source, width, height).fit_within(self.size.width, self.size.height))
    }

    /// Place an encoded PNG, JPEG or WebP bitmap centered on the canvas,
    /// scaled down to fit, on the active layer. The new image is selected.
    pub fn insert_image(&mut self, bytes: &[u8]) -> EditorResult<ElementId> {
        let mut image = self.image_from_bytes(bytes).map_err(|err| self.report(err))?;
        image.x = (self.size.width - image.width) / 2.0;
        image.y = (self.size.height - image.height) / 2.0;
        let element = Element::new(self.active_layer, Shape::Image(image));
        let id = self
            .scene
            .add_element(element)
            .map_err(|err| self.report(err))?;
        log::info!("Inserted image {}", id);
        self.selection.select(id);
        self.commit();
        Ok(id)
    }

    /// Hold a bitmap for the image tool, which places it at the next click.
    pub fn stage_image(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let image = self.image_from_bytes(bytes).map_err(|err| self.report(err))?;
        self.staged_image = Some(image);
        self.tools.set_tool(ToolKind::Image);
        Ok(())
    }

    /// Render a PNG preview whose longer edge is at most `max_edge` pixels.
    pub fn thumbnail(&mut self, max_edge: u32) -> EditorResult<ImageSource> {
        let pixels = self.rasterizer.rasterize(&self.scene, self.size)?;
        let (width, height) = pixels.dimensions();
        let scale = (f64::from(max_edge) / f64::from(width.max(height))).min(1.0);
        let thumb_width = ((f64::from(width) * scale).round() as u32).max(1);
        let thumb_height = ((f64::from(height) * scale).round() as u32).max(1);
        let thumb = image::imageops::thumbnail(&pixels, thumb_width, thumb_height);
        ImageSource::encode_png(&thumb)
    }

    /// Capture the committed state as a document.
    pub fn to_document(&self) -> CanvasDocument {
        let current = self.history.current();
        let mut document =
            CanvasDocument::from_scene(self.name.clone(), current.canvas_size, &current.scene);
        document.id = self.document_id.clone();
        document.created_at = self.created_at;
        document
    }

    /// Capture the document with a preview image attached.
    pub fn to_document_with_thumbnail(&mut self, max_edge: u32) -> EditorResult<CanvasDocument> {
        let thumbnail = self.thumbnail(max_edge)?;
        let mut document = self.to_document();
        document.thumbnail = Some(thumbnail.data.to_string());
        Ok(document)
    }

    /// Hydrate an editor from a document. History starts fresh at the loaded state.
    pub fn from_document(document: CanvasDocument, config: EditorConfig) -> EditorResult<Self> {
        let scene = document.to_scene()?;
        let size = document.size();
        log::info!(
            "Loaded document '{}' ({} elements)",
            document.name,
            scene.element_count()
        );
        Ok(Self::with_scene(config, scene, size, document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rectangle, Stroke};
    use image::{Rgba, RgbaImage};

    const RED: SerializableColor = SerializableColor::rgb(255, 0, 0);

    fn small_editor() -> Editor {
        Editor::new(EditorConfig {
            default_width: 40.0,
            default_height: 30.0,
            bucket_background_shortcut: false,
            ..EditorConfig::default()
        })
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let pixels = RgbaImage::from_pixel(width, height, Rgba([0, 200, 0, 255]));
        ImageSource::encode_png(&pixels).unwrap().bytes().unwrap()
    }

    #[test]
    fn test_resize_rescales_and_undoes() {
        let mut editor = Editor::default();
        let layer = editor.active_layer();
        let rect = Rectangle::new(Point::new(100.0, 60.0), 200.0, 120.0);
        let id = editor
            .scene
            .add_element(Element::new(layer, Shape::Rectangle(rect)))
            .unwrap();
        editor.commit();

        editor.apply_preset(CanvasPreset::Custom {
            width: 400.0,
            height: 1200.0,
        })
        .unwrap();
        let bounds = editor.scene().element(id).unwrap().bounds();
        assert!((bounds.x0 - 50.0).abs() < 1e-9);
        assert!((bounds.y0 - 120.0).abs() < 1e-9);
        assert!((bounds.width() - 100.0).abs() < 1e-9);
        assert!((bounds.height() - 240.0).abs() < 1e-9);

        editor.undo();
        assert_eq!(editor.canvas_size(), Size::new(800.0, 600.0));
        let bounds = editor.scene().element(id).unwrap().bounds();
        assert!((bounds.width() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_resize_rejected() {
        let mut editor = Editor::default();
        let err = editor.resize_canvas(Size::new(0.0, 600.0)).unwrap_err();
        assert!(matches!(err, EditorError::InvariantViolation(_)));
        assert!(editor.status().is_some());
        assert_eq!(editor.canvas_size(), Size::new(800.0, 600.0));

        editor.resize_canvas(Size::new(800.0, 600.0)).unwrap();
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_background_shortcut() {
        let mut editor = Editor::default();
        let outcome = editor.flood_fill(Point::new(5.0, 5.0), RED).unwrap();
        assert_eq!(outcome, FillOutcome::Background);
        assert_eq!(editor.scene().background_color(), RED);
        assert!(editor.scene().is_empty());
        assert_eq!(
            editor.flood_fill(Point::new(5.0, 5.0), RED),
            Err(EditorError::FloodFillNoChange)
        );
    }

    #[test]
    fn test_raster_fill_covers_white_canvas() {
        let mut editor = small_editor();
        let outcome = editor.flood_fill(Point::new(12.0, 7.0), RED).unwrap();
        let FillOutcome::Region(id) = outcome else {
            panic!("expected a raster fill, got {outcome:?}");
        };
        assert_eq!(editor.scene().element_count(), 1);
        let element = editor.scene().element(id).unwrap();
        assert_eq!(element.bounds(), editor.canvas_rect());

        let Shape::FilledRegion(region) = &element.shape else {
            panic!("expected a filled region");
        };
        let patch = region.patch.as_ref().unwrap().decode().unwrap();
        assert_eq!(patch.dimensions(), (40, 30));
        assert!(patch.pixels().all(|p| p.0 == [255, 0, 0, 255]));
        assert_eq!(editor.history().len(), 2);

        // Filling the same spot again changes nothing.
        assert_eq!(
            editor.flood_fill(Point::new(12.0, 7.0), RED),
            Err(EditorError::FloodFillNoChange)
        );
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_raster_fill_respects_strokes() {
        let mut editor = small_editor();
        let layer = editor.active_layer();
        let wall = Stroke {
            stroke_width: 4.0,
            ..Stroke::new(vec![20.0, -5.0, 20.0, 35.0])
        };
        editor
            .scene
            .add_element(Element::new(layer, Shape::LineShape(wall)))
            .unwrap();

        let FillOutcome::Region(id) = editor.flood_fill(Point::new(5.0, 5.0), RED).unwrap() else {
            panic!("expected a raster fill");
        };
        let Shape::FilledRegion(region) = &editor.scene().element(id).unwrap().shape else {
            panic!("expected a filled region");
        };
        let patch = region.patch.as_ref().unwrap().decode().unwrap();
        assert_eq!(patch.get_pixel(2, 2).0, [255, 0, 0, 255]);
        assert_eq!(patch.get_pixel(35, 2).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_fill_outside_canvas_is_no_change() {
        let mut editor = small_editor();
        assert_eq!(
            editor.flood_fill(Point::new(100.0, 5.0), RED),
            Err(EditorError::FloodFillNoChange)
        );
    }

    #[test]
    fn test_fill_on_locked_layer() {
        let mut editor = small_editor();
        let layer = editor.active_layer();
        editor.toggle_layer_lock(layer).unwrap();
        assert_eq!(
            editor.flood_fill(Point::new(5.0, 5.0), RED),
            Err(EditorError::LockedOrHiddenLayer(layer))
        );
    }

    #[test]
    fn test_clear_and_background() {
        let mut editor = Editor::default();
        let layer = editor.active_layer();
        editor
            .scene
            .add_element(Element::new(
                layer,
                Shape::Rectangle(Rectangle::new(Point::ZERO, 5.0, 5.0)),
            ))
            .unwrap();
        editor.commit();
        assert_eq!(editor.clear_canvas(), 1);
        assert_eq!(editor.clear_canvas(), 0);
        editor.set_background_color(SerializableColor::black());
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn test_insert_image_fits_and_centers() {
        let mut editor = small_editor();
        let id = editor.insert_image(&png(80, 20)).unwrap();
        let bounds = editor.scene().element(id).unwrap().bounds();
        assert!((bounds.width() - 40.0).abs() < 1e-9);
        assert!((bounds.height() - 10.0).abs() < 1e-9);
        assert!((bounds.y0 - 10.0).abs() < 1e-9);
        assert_eq!(editor.selection().ids(), &[id]);

        let err = editor.insert_image(b"not an image").unwrap_err();
        assert!(matches!(err, EditorError::Raster(_)));
    }

    #[test]
    fn test_thumbnail_respects_max_edge() {
        let mut editor = Editor::default();
        let thumb = editor.thumbnail(200).unwrap().decode().unwrap();
        assert_eq!(thumb.dimensions(), (200, 150));
    }

    #[test]
    fn test_document_round_trip() {
        let mut editor = Editor::default();
        editor.set_name("Poster");
        editor.insert_image(&png(10, 10)).unwrap();
        let document = editor.to_document_with_thumbnail(64).unwrap();
        assert!(document.thumbnail.is_some());
        assert_eq!(document.id, editor.document_id());

        let json = document.to_json().unwrap();
        let loaded =
            Editor::from_document(CanvasDocument::from_json(&json).unwrap(), EditorConfig::default())
                .unwrap();
        assert_eq!(loaded.scene(), editor.scene());
        assert_eq!(loaded.name(), "Poster");
        assert_eq!(loaded.document_id(), editor.document_id());
        assert!(!loaded.can_undo());
    }
}
