//! The interaction state machine and the discrete editing actions.
//!
//! [`Editor`] owns the scene, its history, the selection and the transient
//! gesture state. Hosts feed it pointer and key events and call actions
//! directly; every completed gesture or action lands as at most one history
//! entry.

mod canvas_ops;
mod keyboard;
mod layers;
mod pointer;

pub use canvas_ops::FillOutcome;

use crate::canvas::CanvasDocument;
use crate::config::EditorConfig;
use crate::element::{Element, ElementId};
use crate::error::{EditorError, EditorResult};
use crate::history::{History, Snapshot};
use crate::input::ClickTracker;
use crate::layer::LayerId;
use crate::raster::SoftwareRasterizer;
use crate::resize::ResizeHandle;
use crate::scene::Scene;
use crate::selection::Selection;
use crate::shapes::{HitParams, Image};
use crate::tools::ToolManager;
use kurbo::{Point, Rect, Size, Vec2};
use time::OffsetDateTime;

/// Offset applied to duplicated elements.
const DUPLICATE_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Current gesture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// A shape or freehand stroke is being dragged out from `anchor`.
    /// `element` is None when the active layer refused the new element.
    Drawing {
        element: Option<ElementId>,
        anchor: Point,
    },
    /// Marquee selection.
    RectSelecting {
        anchor: Point,
        rect: Rect,
        additive: bool,
    },
    /// Dragging the selection; `last` is the previous pointer position.
    Moving { last: Point },
    /// Dragging a canvas edge. Nothing is rescaled until release.
    CanvasResizing {
        handle: ResizeHandle,
        start: Point,
        original: Size,
        live: Size,
    },
    /// Keyboard input goes to a text element.
    TextEditing {
        element: ElementId,
        /// The element before editing began; None for text created by this edit.
        original: Option<Box<Element>>,
        /// Still showing the placeholder; the first keystroke replaces it.
        pristine: bool,
    },
}

impl InteractionState {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing { .. } => "drawing",
            InteractionState::RectSelecting { .. } => "rect-selecting",
            InteractionState::Moving { .. } => "moving",
            InteractionState::CanvasResizing { .. } => "canvas-resizing",
            InteractionState::TextEditing { .. } => "text-editing",
        }
    }
}

/// Drawing surface editor.
#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    scene: Scene,
    history: History,
    selection: Selection,
    active_layer: LayerId,
    /// Current tool and the style given to new elements.
    pub tools: ToolManager,
    state: InteractionState,
    clicks: ClickTracker,
    size: Size,
    /// Bitmap waiting to be placed by the image tool.
    staged_image: Option<Image>,
    status: Option<String>,
    rasterizer: SoftwareRasterizer,
    document_id: String,
    name: String,
    created_at: OffsetDateTime,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// An empty canvas of the configured default size with one layer.
    pub fn new(config: EditorConfig) -> Self {
        let size = Size::new(config.default_width, config.default_height);
        let document = CanvasDocument::from_scene("Untitled", size, &Scene::new());
        Self::with_scene(config, Scene::new(), size, document)
    }

    fn with_scene(config: EditorConfig, scene: Scene, size: Size, document: CanvasDocument) -> Self {
        let active_layer = scene.top_layer().map(|l| l.id).unwrap_or_default();
        let history = History::new(Snapshot::new(scene.clone(), size), config.history_limit);
        let clicks = ClickTracker::from_config(&config);
        Self {
            config,
            scene,
            history,
            selection: Selection::new(),
            active_layer,
            tools: ToolManager::new(),
            state: InteractionState::Idle,
            clicks,
            size,
            staged_image: None,
            status: None,
            rasterizer: SoftwareRasterizer::new(),
            document_id: document.id,
            name: document.name,
            created_at: document.created_at,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn active_layer(&self) -> LayerId {
        self.active_layer
    }

    /// Committed canvas size.
    pub fn canvas_size(&self) -> Size {
        self.size
    }

    /// Canvas size to display, including an edge drag in progress.
    pub fn live_canvas_size(&self) -> Size {
        match self.state {
            InteractionState::CanvasResizing { live, .. } => live,
            _ => self.size,
        }
    }

    pub fn canvas_rect(&self) -> Rect {
        self.size.to_rect()
    }

    /// Marquee rectangle while rect-selecting.
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.state {
            InteractionState::RectSelecting { rect, .. } => Some(rect),
            _ => None,
        }
    }

    /// Element receiving keyboard input, if any.
    pub fn editing_text(&self) -> Option<ElementId> {
        match self.state {
            InteractionState::TextEditing { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn staged_image(&self) -> Option<&Image> {
        self.staged_image.as_ref()
    }

    /// Last user-visible status message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn hit_params(&self) -> HitParams {
        HitParams::from(&self.config)
    }

    // --- History ---

    /// Record the current state if it differs from the history cursor.
    /// Returns whether an entry was recorded.
    fn commit(&mut self) -> bool {
        self.selection.prune(&self.scene);
        let current = self.history.current();
        if current.scene == self.scene && current.canvas_size == self.size {
            return false;
        }
        self.history
            .record(Snapshot::new(self.scene.clone(), self.size));
        true
    }

    /// Put the scene back to the history cursor, dropping uncommitted edits.
    fn revert(&mut self) {
        let current = self.history.current();
        self.scene = current.scene.clone();
        self.size = current.canvas_size;
        self.selection.prune(&self.scene);
    }

    /// Surface an error to the user or swallow it, then hand it back.
    fn report(&mut self, err: EditorError) -> EditorError {
        if err.is_user_visible() {
            log::warn!("Action rejected: {}", err);
            self.status = Some(err.to_string());
        } else {
            log::debug!("Ignored: {}", err);
        }
        err
    }

    fn set_state(&mut self, state: InteractionState) {
        if std::mem::discriminant(&self.state) != std::mem::discriminant(&state) {
            log::debug!("Interaction {} -> {}", self.state.name(), state.name());
        }
        self.state = state;
    }

    /// Keep the active layer pointing at an existing layer.
    fn ensure_active_layer(&mut self, prefer_top: bool) {
        if self.scene.layer(self.active_layer).is_some() {
            return;
        }
        let layers = self.scene.layers();
        let fallback = if prefer_top { layers.last() } else { layers.first() };
        if let Some(layer) = fallback {
            self.active_layer = layer.id;
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.scene = snapshot.scene;
        self.size = snapshot.canvas_size;
        self.ensure_active_layer(false);
        self.selection.prune(&self.scene);
    }

    /// Step back one history entry. Any gesture or text edit in progress is dropped.
    pub fn undo(&mut self) -> bool {
        self.set_state(InteractionState::Idle);
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("Undo to step {}", self.history.step());
        true
    }

    /// Step forward one history entry. Any gesture or text edit in progress is dropped.
    pub fn redo(&mut self) -> bool {
        self.set_state(InteractionState::Idle);
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(snapshot);
        log::debug!("Redo to step {}", self.history.step());
        true
    }

    // --- Selection ---

    /// Select every element on visible, unlocked layers.
    pub fn select_all(&mut self) {
        let ids: Vec<ElementId> = self
            .scene
            .render_order()
            .filter(|(layer, _)| layer.is_editable())
            .map(|(_, element)| element.id)
            .collect();
        self.selection.set(ids);
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select a single element.
    pub fn select(&mut self, id: ElementId) -> EditorResult<()> {
        if !self.scene.contains_element(id) {
            return Err(EditorError::ElementNotFound(id));
        }
        self.selection.select(id);
        Ok(())
    }

    /// Selected ids whose layer accepts edits.
    fn editable_selection(&self) -> Vec<ElementId> {
        self.selection
            .ids()
            .iter()
            .copied()
            .filter(|&id| self.scene.is_element_editable(id))
            .collect()
    }

    // --- Element actions ---

    /// Delete the selected elements on editable layers. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.editable_selection();
        let removed = self.scene.remove_elements(&ids).len();
        if removed > 0 {
            log::info!("Deleted {} element(s)", removed);
            self.commit();
        }
        removed
    }

    /// Copy the selected elements with fresh ids, offset slightly, and select the copies.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let copies: Vec<Element> = self
            .editable_selection()
            .into_iter()
            .filter_map(|id| self.scene.element(id))
            .map(|element| {
                let mut copy = element.duplicate();
                copy.translate(DUPLICATE_OFFSET);
                copy
            })
            .collect();
        let mut added = Vec::with_capacity(copies.len());
        for copy in copies {
            match self.scene.add_element(copy) {
                Ok(id) => added.push(id),
                Err(err) => {
                    self.report(err);
                }
            }
        }
        if !added.is_empty() {
            self.selection.set(added.iter().copied());
            self.commit();
        }
        added
    }

    fn reorder_selected(&mut self, op: fn(&mut Scene, ElementId) -> bool) -> bool {
        let mut changed = false;
        for id in self.editable_selection() {
            changed |= op(&mut self.scene, id);
        }
        if changed {
            self.commit();
        }
        changed
    }

    /// Move the selection to the top of its layers.
    pub fn bring_to_front(&mut self) -> bool {
        self.reorder_selected(Scene::bring_to_front)
    }

    /// Move the selection to the bottom of its layers.
    pub fn send_to_back(&mut self) -> bool {
        self.reorder_selected(Scene::send_to_back)
    }

    /// Move the selection one step up within its layers.
    pub fn bring_forward(&mut self) -> bool {
        self.reorder_selected(Scene::bring_forward)
    }

    /// Move the selection one step down within its layers.
    pub fn send_backward(&mut self) -> bool {
        self.reorder_selected(Scene::send_backward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Layer;
    use crate::shapes::{Rectangle, Shape};

    fn rect_element(editor: &Editor, x: f64) -> Element {
        Element::new(
            editor.active_layer(),
            Shape::Rectangle(Rectangle::new(Point::new(x, 10.0), 20.0, 20.0)),
        )
    }

    fn add_rect(editor: &mut Editor, x: f64) -> ElementId {
        let element = rect_element(editor, x);
        let id = editor.scene.add_element(element).unwrap();
        editor.commit();
        id
    }

    #[test]
    fn test_new_editor() {
        let editor = Editor::default();
        assert_eq!(editor.scene().layers().len(), 1);
        assert_eq!(editor.active_layer(), editor.scene().layers()[0].id);
        assert_eq!(editor.canvas_size(), Size::new(800.0, 600.0));
        assert_eq!(*editor.state(), InteractionState::Idle);
        assert!(!editor.can_undo());
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_commit_skips_unchanged_state() {
        let mut editor = Editor::default();
        assert!(!editor.commit());
        add_rect(&mut editor, 0.0);
        assert_eq!(editor.history().len(), 2);
        assert!(!editor.commit());
        assert_eq!(editor.history().len(), 2);
    }

    #[test]
    fn test_undo_prunes_selection() {
        let mut editor = Editor::default();
        let id = add_rect(&mut editor, 0.0);
        editor.select(id).unwrap();
        assert!(editor.undo());
        assert!(editor.selection().is_empty());
        assert!(editor.redo());
        assert!(editor.scene().contains_element(id));
        assert!(!editor.redo());
    }

    #[test]
    fn test_undo_falls_back_to_first_layer() {
        let mut editor = Editor::default();
        let first = editor.active_layer();
        editor.add_layer().unwrap();
        assert_ne!(editor.active_layer(), first);
        editor.undo();
        assert_eq!(editor.active_layer(), first);
    }

    #[test]
    fn test_select_all_skips_locked_layers() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0);
        let locked = editor.scene.add_layer(Layer::new("Locked"));
        let mut on_locked = rect_element(&editor, 50.0);
        on_locked.layer_id = locked;
        editor.scene.add_element(on_locked).unwrap();
        editor.scene.set_layer_locked(locked, true).unwrap();

        editor.select_all();
        assert_eq!(editor.selection().ids(), &[a]);
        editor.clear_selection();
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_delete_and_duplicate_selected() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0);
        editor.select(a).unwrap();

        let copies = editor.duplicate_selected();
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], a);
        let copy = editor.scene().element(copies[0]).unwrap();
        assert!((copy.bounds().x0 - 10.0).abs() < f64::EPSILON);
        assert_eq!(editor.selection().ids(), copies.as_slice());

        assert_eq!(editor.delete_selected(), 1);
        assert_eq!(editor.scene().element_count(), 1);
        assert!(editor.selection().is_empty());
        assert_eq!(editor.history().len(), 4);
    }

    #[test]
    fn test_z_order_actions() {
        let mut editor = Editor::default();
        let a = add_rect(&mut editor, 0.0);
        let b = add_rect(&mut editor, 5.0);
        let layer = editor.active_layer();

        editor.select(a).unwrap();
        assert!(editor.bring_to_front());
        let order: Vec<_> = editor.scene().elements(layer).iter().map(|e| e.id).collect();
        assert_eq!(order, vec![b, a]);
        assert!(!editor.bring_forward());
        assert!(editor.send_backward());
        assert!(!editor.send_to_back());
    }

    #[test]
    fn test_report_sets_status_only_for_visible_errors() {
        let mut editor = Editor::default();
        editor.report(EditorError::FloodFillNoChange);
        assert!(editor.status().is_none());
        editor.report(EditorError::InvariantViolation("nope".into()));
        assert_eq!(editor.status(), Some("nope"));
        editor.clear_status();
        assert!(editor.status().is_none());
    }
}
