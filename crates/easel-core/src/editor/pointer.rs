//! Pointer gestures.

use super::{Editor, InteractionState};
use crate::element::{Element, ElementId};
use crate::hit_test::{element_at, elements_in_rect};
use crate::input::{PointerEvent, PointerSample};
use crate::resize::ResizeHandle;
use crate::shapes::Shape;
use crate::tools::{ToolKind, drag_shape};
use kurbo::{Point, Rect};

impl Editor {
    /// Feed one pointer event into the state machine.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down(sample) => self.pointer_down(sample),
            PointerEvent::Move(sample) => self.pointer_move(sample),
            PointerEvent::Up(sample) => self.pointer_up(sample),
            PointerEvent::Cancel => self.pointer_cancel(),
        }
    }

    pub fn pointer_down(&mut self, sample: PointerSample) {
        let point = sample.position;
        let target = element_at(&self.scene, point, &self.hit_params(), sample.target);

        if let Some(editing) = self.editing_text() {
            if target == Some(editing) {
                return;
            }
            self.commit_text_editing();
        }

        if !matches!(self.state, InteractionState::Idle) {
            // A press while another gesture is live (lost release): finish it first.
            self.pointer_cancel();
        }

        let tolerance = self.config.resize_handle_tolerance;
        if let Some(handle) = ResizeHandle::at(point, self.size, tolerance) {
            self.clicks.reset();
            self.set_state(InteractionState::CanvasResizing {
                handle,
                start: point,
                original: self.size,
                live: self.size,
            });
            return;
        }

        let double_click = self.clicks.register(&sample, target);
        if double_click {
            if let Some(id) = target.filter(|&id| self.is_text(id)) {
                self.begin_text_editing(id);
                return;
            }
        }

        match self.tools.current_tool {
            ToolKind::Select => self.select_down(target, &sample),
            ToolKind::Eraser => self.erase_at(target),
            ToolKind::Text => match target.filter(|&id| self.is_text(id)) {
                Some(id) => self.begin_text_editing(id),
                None => self.create_text(point),
            },
            ToolKind::Bucket => {
                let color = self.tools.bucket_color;
                if let Err(err) = self.flood_fill(point, color) {
                    self.report(err);
                }
            }
            ToolKind::Image => self.place_staged_image(point),
            _ => self.begin_drawing(point),
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) {
        let point = sample.position;
        match self.state.clone() {
            InteractionState::Drawing {
                element: Some(id),
                anchor,
            } => {
                if let Err(err) = self
                    .scene
                    .update_element(id, |e| drag_shape(&mut e.shape, anchor, point))
                {
                    log::debug!("Drawing target vanished mid-drag: {err}");
                }
            }
            InteractionState::RectSelecting {
                anchor, additive, ..
            } => {
                self.state = InteractionState::RectSelecting {
                    anchor,
                    rect: Rect::from_points(anchor, point),
                    additive,
                };
            }
            InteractionState::Moving { last } => {
                let ids = self.selection.ids().to_vec();
                self.scene.translate_elements(&ids, point - last);
                self.state = InteractionState::Moving { last: point };
            }
            InteractionState::CanvasResizing {
                handle,
                start,
                original,
                ..
            } => {
                self.state = InteractionState::CanvasResizing {
                    handle,
                    start,
                    original,
                    live: handle.drag(original, point - start, self.config.min_canvas_size),
                };
            }
            InteractionState::Idle
            | InteractionState::Drawing { element: None, .. }
            | InteractionState::TextEditing { .. } => {}
        }
    }

    pub fn pointer_up(&mut self, sample: PointerSample) {
        let point = sample.position;
        match self.state.clone() {
            InteractionState::Drawing { element, anchor } => {
                if let Some(id) = element {
                    if let Err(err) = self
                        .scene
                        .update_element(id, |e| finish_drag(&mut e.shape, anchor, point))
                    {
                        log::debug!("Drawing target vanished before release: {err}");
                    }
                }
                self.set_state(InteractionState::Idle);
                self.commit();
            }
            InteractionState::RectSelecting {
                anchor, additive, ..
            } => {
                let ids = elements_in_rect(&self.scene, Rect::from_points(anchor, point));
                if additive {
                    self.selection.extend(ids);
                } else {
                    self.selection.set(ids);
                }
                self.set_state(InteractionState::Idle);
            }
            InteractionState::Moving { last } => {
                let ids = self.selection.ids().to_vec();
                self.scene.translate_elements(&ids, point - last);
                self.set_state(InteractionState::Idle);
                self.commit();
            }
            InteractionState::CanvasResizing {
                handle,
                start,
                original,
                ..
            } => {
                let live = handle.drag(original, point - start, self.config.min_canvas_size);
                self.set_state(InteractionState::Idle);
                if let Err(err) = self.resize_canvas(live) {
                    self.report(err);
                }
            }
            InteractionState::Idle | InteractionState::TextEditing { .. } => {}
        }
    }

    /// The pointer went away mid-gesture. Drawn and moved content is kept;
    /// marquees and edge drags are dropped.
    pub fn pointer_cancel(&mut self) {
        match self.state {
            InteractionState::Drawing { .. } | InteractionState::Moving { .. } => {
                self.set_state(InteractionState::Idle);
                self.commit();
            }
            InteractionState::RectSelecting { .. } | InteractionState::CanvasResizing { .. } => {
                self.set_state(InteractionState::Idle);
            }
            InteractionState::Idle | InteractionState::TextEditing { .. } => {}
        }
    }

    fn is_text(&self, id: ElementId) -> bool {
        self.scene
            .element(id)
            .is_some_and(|e| matches!(e.shape, Shape::Text(_)))
    }

    fn select_down(&mut self, target: Option<ElementId>, sample: &PointerSample) {
        let additive = sample.modifiers.additive();
        match target {
            Some(id) => {
                if additive {
                    self.selection.toggle(id);
                } else if !self.selection.contains(id) {
                    self.selection.select(id);
                }
                self.set_state(InteractionState::Moving {
                    last: sample.position,
                });
            }
            None => {
                if !additive {
                    self.selection.clear();
                }
                self.set_state(InteractionState::RectSelecting {
                    anchor: sample.position,
                    rect: Rect::from_points(sample.position, sample.position),
                    additive,
                });
            }
        }
    }

    fn erase_at(&mut self, target: Option<ElementId>) {
        let Some(id) = target else {
            return;
        };
        if !self.scene.is_element_editable(id) {
            log::debug!("Eraser ignored element {} on a locked or hidden layer", id);
            return;
        }
        if self.scene.remove_element(id).is_some() {
            log::debug!("Erased element {}", id);
            self.commit();
        }
    }

    fn create_text(&mut self, point: Point) {
        let element = Element::new(self.active_layer, self.tools.begin_text(point));
        match self.scene.add_element(element) {
            Ok(id) => {
                self.selection.select(id);
                self.set_state(InteractionState::TextEditing {
                    element: id,
                    original: None,
                    pristine: true,
                });
            }
            Err(err) => {
                self.report(err);
            }
        }
    }

    fn begin_drawing(&mut self, point: Point) {
        let Some((shape, opacity)) = self.tools.begin_shape(point) else {
            return;
        };
        let element = Element::new(self.active_layer, shape).with_opacity(opacity);
        let element = match self.scene.add_element(element) {
            Ok(id) => Some(id),
            Err(err) => {
                self.report(err);
                None
            }
        };
        self.set_state(InteractionState::Drawing {
            element,
            anchor: point,
        });
    }

    fn place_staged_image(&mut self, point: Point) {
        let Some(mut image) = self.staged_image.take() else {
            return;
        };
        image.x = point.x;
        image.y = point.y;
        let element = Element::new(self.active_layer, Shape::Image(image.clone()));
        match self.scene.add_element(element) {
            Ok(id) => {
                self.selection.select(id);
                self.tools.set_tool(ToolKind::Select);
                self.commit();
            }
            Err(err) => {
                // Keep it staged so the user can pick another layer.
                self.staged_image = Some(image);
                self.report(err);
            }
        }
    }
}

/// Apply the release position. Freehand strokes skip a repeated final point.
fn finish_drag(shape: &mut Shape, anchor: Point, point: Point) {
    if let Shape::Line(stroke) = shape {
        if stroke.point_list().last() == Some(&point) {
            return;
        }
    }
    drag_shape(shape, anchor, point);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::shapes::{Rectangle, SerializableColor};

    fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
        editor.pointer_down(PointerSample::at(from.0, from.1));
        editor.pointer_move(PointerSample::at(
            (from.0 + to.0) / 2.0,
            (from.1 + to.1) / 2.0,
        ));
        editor.pointer_up(PointerSample::at(to.0, to.1));
    }

    fn only_element(editor: &Editor) -> &Element {
        let elements = editor.scene().elements(editor.active_layer());
        assert_eq!(elements.len(), 1);
        &elements[0]
    }

    #[test]
    fn test_draw_rectangle_records_once() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (50.0, 40.0));

        assert_eq!(*editor.state(), InteractionState::Idle);
        assert_eq!(editor.history().len(), 2);
        let Shape::Rectangle(rect) = &only_element(&editor).shape else {
            panic!("expected a rectangle");
        };
        assert!((rect.width - 40.0).abs() < f64::EPSILON);
        assert!((rect.height - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drawing_survives_removed_target() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        editor.pointer_down(PointerSample::at(10.0, 10.0));
        let InteractionState::Drawing { element: Some(id), .. } = *editor.state() else {
            panic!("expected a drawing gesture");
        };
        editor.scene.remove_element(id);

        editor.pointer_move(PointerSample::at(30.0, 30.0));
        editor.pointer_up(PointerSample::at(50.0, 40.0));
        assert_eq!(*editor.state(), InteractionState::Idle);
        assert!(editor.scene().is_empty());
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_freehand_collects_points() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Marker);
        editor.pointer_down(PointerSample::at(0.0, 0.0));
        editor.pointer_move(PointerSample::at(5.0, 0.0));
        editor.pointer_move(PointerSample::at(10.0, 5.0));
        editor.pointer_up(PointerSample::at(10.0, 5.0));

        let element = only_element(&editor);
        assert!((element.opacity - 0.5).abs() < f64::EPSILON);
        let stroke = element.shape.as_stroke().unwrap();
        assert_eq!(stroke.len(), 3);
    }

    #[test]
    fn test_drawing_on_locked_layer_is_silent() {
        let mut editor = Editor::default();
        let layer = editor.active_layer();
        editor.toggle_layer_lock(layer).unwrap();
        let steps = editor.history().len();

        editor.tools.set_tool(ToolKind::Circle);
        drag(&mut editor, (100.0, 100.0), (120.0, 100.0));
        assert!(editor.scene().is_empty());
        assert_eq!(editor.history().len(), steps);
        assert!(editor.status().is_none());
        assert_eq!(*editor.state(), InteractionState::Idle);
    }

    #[test]
    fn test_select_and_move() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (50.0, 40.0));
        editor.tools.set_tool(ToolKind::Select);

        drag(&mut editor, (20.0, 20.0), (30.0, 25.0));
        let element = only_element(&editor);
        assert!(editor.selection().contains(element.id));
        let bounds = element.bounds();
        assert!((bounds.x0 - 20.0).abs() < f64::EPSILON);
        assert!((bounds.y0 - 15.0).abs() < f64::EPSILON);
        assert_eq!(editor.history().len(), 3);

        // A click without movement selects but records nothing.
        editor.pointer_down(PointerSample::at(25.0, 20.0).at_time(10_000));
        editor.pointer_up(PointerSample::at(25.0, 20.0).at_time(10_050));
        assert_eq!(editor.history().len(), 3);
    }

    #[test]
    fn test_marquee_selection() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (30.0, 30.0));
        drag(&mut editor, (40.0, 10.0), (60.0, 30.0));
        drag(&mut editor, (300.0, 300.0), (320.0, 320.0));
        let ids: Vec<_> = editor
            .scene()
            .elements(editor.active_layer())
            .iter()
            .map(|e| e.id)
            .collect();
        let steps = editor.history().len();

        editor.tools.set_tool(ToolKind::Select);
        editor.pointer_down(PointerSample::at(0.0, 0.0));
        editor.pointer_move(PointerSample::at(70.0, 50.0));
        assert!(editor.selection_rect().is_some());
        editor.pointer_up(PointerSample::at(70.0, 50.0));

        assert_eq!(editor.selection().ids(), &ids[..2]);
        assert_eq!(editor.history().len(), steps);

        // Additive marquee keeps the previous selection.
        editor.pointer_down(PointerSample::at(290.0, 290.0).with_modifiers(Modifiers::SHIFT));
        editor.pointer_up(PointerSample::at(330.0, 330.0));
        assert_eq!(editor.selection().len(), 3);
    }

    #[test]
    fn test_modifier_click_toggles() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (30.0, 30.0));
        drag(&mut editor, (40.0, 10.0), (60.0, 30.0));
        editor.tools.set_tool(ToolKind::Select);

        editor.pointer_down(PointerSample::at(20.0, 20.0));
        editor.pointer_up(PointerSample::at(20.0, 20.0));
        let shift = PointerSample::at(50.0, 20.0)
            .with_modifiers(Modifiers::SHIFT)
            .at_time(5_000);
        editor.pointer_down(shift);
        editor.pointer_up(shift);
        assert_eq!(editor.selection().len(), 2);

        let shift_again = PointerSample::at(50.0, 20.0)
            .with_modifiers(Modifiers::SHIFT)
            .at_time(10_000);
        editor.pointer_down(shift_again);
        editor.pointer_up(shift_again);
        assert_eq!(editor.selection().len(), 1);
    }

    #[test]
    fn test_eraser_removes_topmost() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (10.0, 10.0), (50.0, 50.0));
        drag(&mut editor, (20.0, 20.0), (60.0, 60.0));
        let top = editor.scene().elements(editor.active_layer())[1].id;

        editor.tools.set_tool(ToolKind::Eraser);
        editor.pointer_down(PointerSample::at(30.0, 30.0));
        editor.pointer_up(PointerSample::at(30.0, 30.0));
        assert!(!editor.scene().contains_element(top));
        assert_eq!(editor.scene().element_count(), 1);
        assert_eq!(editor.history().len(), 4);

        // Nothing under the pointer: no entry.
        editor.pointer_down(PointerSample::at(500.0, 500.0));
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn test_canvas_edge_drag_resizes_on_release() {
        let mut editor = Editor::default();
        editor.tools.set_tool(ToolKind::Rectangle);
        drag(&mut editor, (100.0, 100.0), (200.0, 200.0));

        editor.pointer_down(PointerSample::at(802.0, 300.0));
        assert!(matches!(
            editor.state(),
            InteractionState::CanvasResizing { .. }
        ));
        editor.pointer_move(PointerSample::at(-2000.0, 300.0));
        assert_eq!(editor.live_canvas_size().width, 100.0);
        assert_eq!(editor.canvas_size().width, 800.0);

        editor.pointer_up(PointerSample::at(402.0, 300.0));
        assert_eq!(editor.canvas_size(), kurbo::Size::new(400.0, 600.0));
        let bounds = only_element(&editor).bounds();
        assert!((bounds.x0 - 50.0).abs() < 1e-9);
        assert!((bounds.width() - 50.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_cancel_drops_marquee_and_resize() {
        let mut editor = Editor::default();
        editor.pointer_down(PointerSample::at(805.0, 605.0));
        editor.pointer_move(PointerSample::at(905.0, 705.0));
        editor.handle_pointer(PointerEvent::Cancel);
        assert_eq!(editor.canvas_size(), kurbo::Size::new(800.0, 600.0));
        assert_eq!(*editor.state(), InteractionState::Idle);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_image_tool_places_staged_image() {
        let mut editor = Editor::default();
        let pixels = image::RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 255, 255]));
        let source = crate::shapes::ImageSource::encode_png(&pixels).unwrap();
        let bytes = source.bytes().unwrap();
        editor.stage_image(&bytes).unwrap();
        assert_eq!(editor.tools.current_tool, ToolKind::Image);

        editor.pointer_down(PointerSample::at(30.0, 40.0));
        editor.pointer_up(PointerSample::at(30.0, 40.0));
        let element = only_element(&editor);
        assert_eq!(element.bounds(), Rect::new(30.0, 40.0, 34.0, 42.0));
        assert!(editor.staged_image().is_none());
        assert_eq!(editor.tools.current_tool, ToolKind::Select);
    }

    #[test]
    fn test_bucket_on_shape_recolors_fill() {
        let mut editor = Editor::default();
        let layer = editor.active_layer();
        let id = editor
            .scene
            .add_element(Element::new(
                layer,
                Shape::Rectangle(Rectangle::new(Point::new(10.0, 10.0), 50.0, 50.0)),
            ))
            .unwrap();
        editor.tools.set_tool(ToolKind::Bucket);
        editor.tools.bucket_color = SerializableColor::rgb(0, 128, 0);
        editor.pointer_down(PointerSample::at(30.0, 30.0));
        editor.pointer_up(PointerSample::at(30.0, 30.0));

        let fill = editor.scene().element(id).unwrap().shape.vector_fill();
        assert_eq!(fill, Some(Some(SerializableColor::rgb(0, 128, 0))));
    }
}
