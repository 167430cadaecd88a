//! Keyboard shortcuts and in-place text editing.

use super::{Editor, InteractionState};
use crate::element::ElementId;
use crate::error::EditorError;
use crate::input::{Key, KeyEvent};
use crate::shapes::Text;

impl Editor {
    /// Handle a key press. Returns whether the key was consumed.
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        let KeyEvent { key, modifiers } = event;

        if self.editing_text().is_some() && !modifiers.command() {
            match key {
                Key::Character(c) => {
                    self.insert_text(&c.to_string());
                }
                Key::Backspace => {
                    self.delete_text_backward();
                }
                Key::Enter if modifiers.shift => {
                    self.insert_text("\n");
                }
                Key::Enter => {
                    self.commit_text_editing();
                }
                Key::Escape => {
                    self.cancel_text_editing();
                }
                Key::Delete | Key::Other(_) => return false,
            }
            return true;
        }

        match key {
            Key::Delete | Key::Backspace => {
                self.delete_selected();
                true
            }
            Key::Escape => {
                self.escape();
                true
            }
            Key::Character(c) if modifiers.command() => match c.to_ascii_lowercase() {
                'z' if modifiers.shift => {
                    self.redo();
                    true
                }
                'z' => {
                    self.undo();
                    true
                }
                'y' => {
                    self.redo();
                    true
                }
                'a' => {
                    self.select_all();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Abort the gesture in progress, or clear the selection when idle.
    fn escape(&mut self) {
        match self.state {
            InteractionState::Drawing { .. } | InteractionState::Moving { .. } => {
                self.set_state(InteractionState::Idle);
                self.revert();
            }
            InteractionState::RectSelecting { .. } | InteractionState::CanvasResizing { .. } => {
                self.set_state(InteractionState::Idle);
            }
            InteractionState::TextEditing { .. } => self.cancel_text_editing(),
            InteractionState::Idle => self.selection.clear(),
        }
    }

    /// Start editing an existing text element.
    ///
    /// Elements on locked or hidden layers are left alone.
    pub fn begin_text_editing(&mut self, id: ElementId) {
        if self.editing_text() == Some(id) {
            return;
        }
        if self.editing_text().is_some() {
            self.commit_text_editing();
        }
        let Some(element) = self.scene.element(id) else {
            return;
        };
        if element.shape.as_text().is_none() {
            return;
        }
        if !self.scene.is_element_editable(id) {
            self.report(EditorError::LockedOrHiddenLayer(element.layer_id));
            return;
        }
        let original = Box::new(element.clone());
        self.selection.select(id);
        self.set_state(InteractionState::TextEditing {
            element: id,
            original: Some(original),
            pristine: false,
        });
    }

    fn edit_text(&mut self, f: impl FnOnce(&mut Text, bool)) -> bool {
        let InteractionState::TextEditing {
            element, pristine, ..
        } = &mut self.state
        else {
            return false;
        };
        let id = *element;
        let was_pristine = std::mem::replace(pristine, false);
        self.scene
            .update_element(id, |e| {
                if let Some(text) = e.shape.as_text_mut() {
                    f(text, was_pristine);
                }
            })
            .is_ok()
    }

    /// Type into the text being edited. The placeholder is replaced by the
    /// first input.
    pub fn insert_text(&mut self, input: &str) -> bool {
        self.edit_text(|text, pristine| {
            let content = if pristine {
                input.to_string()
            } else {
                format!("{}{}", text.text, input)
            };
            text.set_content(content);
        })
    }

    /// Remove the last character of the text being edited.
    pub fn delete_text_backward(&mut self) -> bool {
        self.edit_text(|text, pristine| {
            let mut content = if pristine {
                String::new()
            } else {
                text.text.clone()
            };
            content.pop();
            text.set_content(content);
        })
    }

    /// Finish editing. Empty text is removed. Returns whether history was recorded.
    pub fn commit_text_editing(&mut self) -> bool {
        let Some(id) = self.editing_text() else {
            return false;
        };
        self.set_state(InteractionState::Idle);
        let empty = self
            .scene
            .element(id)
            .and_then(|e| e.shape.as_text())
            .is_some_and(|t| t.text.is_empty());
        if empty {
            log::debug!("Removing empty text {}", id);
            self.scene.remove_element(id);
        }
        self.commit()
    }

    /// Abandon editing, restoring the content from before the edit.
    /// Text created by this edit is removed.
    pub fn cancel_text_editing(&mut self) {
        let state = std::mem::take(&mut self.state);
        let InteractionState::TextEditing {
            element, original, ..
        } = state
        else {
            self.state = state;
            return;
        };
        log::debug!("Interaction text-editing -> idle (cancelled)");
        match original {
            Some(original) => {
                if let Err(err) = self.scene.replace_element(element, *original) {
                    log::debug!("Could not restore text {element}: {err}");
                }
            }
            None => {
                self.scene.remove_element(element);
            }
        }
        self.commit();
    }

    /// The host lost keyboard or pointer focus.
    pub fn focus_lost(&mut self) {
        if self.editing_text().is_some() {
            self.commit_text_editing();
        } else {
            self.pointer_cancel();
        }
    }
}
