//! Layer management actions. Each successful change is one history entry.

use super::Editor;
use crate::error::{EditorError, EditorResult};
use crate::layer::{Layer, LayerId};
use crate::scene::Scene;

impl Editor {
    fn layer_action<T>(&mut self, f: impl FnOnce(&mut Scene) -> EditorResult<T>) -> EditorResult<T> {
        match f(&mut self.scene) {
            Ok(value) => {
                self.commit();
                Ok(value)
            }
            Err(err) => Err(self.report(err)),
        }
    }

    /// First "Layer N" name not already in use.
    fn next_layer_name(&self) -> String {
        let layers = self.scene.layers();
        (layers.len() + 1..)
            .map(|n| format!("Layer {n}"))
            .find(|name| layers.iter().all(|l| &l.name != name))
            .unwrap_or_default()
    }

    fn layer_flag(&mut self, id: LayerId, flag: fn(&Layer) -> bool) -> EditorResult<bool> {
        match self.scene.layer(id).map(flag) {
            Some(value) => Ok(value),
            None => Err(self.report(EditorError::LayerNotFound(id))),
        }
    }

    /// Add a layer on top and make it active.
    pub fn add_layer(&mut self) -> EditorResult<LayerId> {
        let layer = Layer::new(self.next_layer_name());
        log::info!("Adding layer '{}'", layer.name);
        let id = self.layer_action(|scene| Ok(scene.add_layer(layer)))?;
        self.active_layer = id;
        Ok(id)
    }

    /// Insert a named layer at `index` (0 = bottom) and make it active.
    pub fn insert_layer(&mut self, index: usize, name: impl Into<String>) -> EditorResult<LayerId> {
        let layer = Layer::new(name);
        let id = self.layer_action(|scene| scene.insert_layer(index, layer))?;
        self.active_layer = id;
        Ok(id)
    }

    /// Delete a layer and its elements. Deleting the active layer activates the top one.
    pub fn delete_layer(&mut self, id: LayerId) -> EditorResult<()> {
        let layer = self.layer_action(|scene| scene.delete_layer(id))?;
        log::info!("Deleted layer '{}'", layer.name);
        self.ensure_active_layer(true);
        Ok(())
    }

    /// Move a layer to `to_index` (0 = bottom).
    pub fn move_layer(&mut self, id: LayerId, to_index: usize) -> EditorResult<()> {
        self.layer_action(|scene| scene.move_layer(id, to_index))
    }

    /// Move a layer one step toward the top. Returns false when it already is on top.
    pub fn move_layer_up(&mut self, id: LayerId) -> EditorResult<bool> {
        let index = self
            .scene
            .layer_index(id)
            .ok_or(EditorError::LayerNotFound(id))
            .map_err(|err| self.report(err))?;
        if index + 1 >= self.scene.layers().len() {
            return Ok(false);
        }
        self.move_layer(id, index + 1)?;
        Ok(true)
    }

    /// Move a layer one step toward the bottom. Returns false when it already is at the bottom.
    pub fn move_layer_down(&mut self, id: LayerId) -> EditorResult<bool> {
        let index = self
            .scene
            .layer_index(id)
            .ok_or(EditorError::LayerNotFound(id))
            .map_err(|err| self.report(err))?;
        if index == 0 {
            return Ok(false);
        }
        self.move_layer(id, index - 1)?;
        Ok(true)
    }

    /// Merge a layer into the one beneath it. Returns the surviving layer.
    pub fn merge_layer_down(&mut self, id: LayerId) -> EditorResult<LayerId> {
        let target = self.layer_action(|scene| scene.merge_down(id))?;
        log::info!("Merged layer {} into {}", id, target);
        if self.active_layer == id {
            self.active_layer = target;
        }
        Ok(target)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> EditorResult<()> {
        let name = name.into();
        self.layer_action(|scene| scene.rename_layer(id, name))
    }

    /// Flip visibility. Returns the new state.
    pub fn toggle_layer_visibility(&mut self, id: LayerId) -> EditorResult<bool> {
        let visible = !self.layer_flag(id, |l| l.visible)?;
        self.layer_action(|scene| scene.set_layer_visible(id, visible))?;
        Ok(visible)
    }

    /// Flip the lock. Returns the new state.
    pub fn toggle_layer_lock(&mut self, id: LayerId) -> EditorResult<bool> {
        let locked = !self.layer_flag(id, |l| l.locked)?;
        self.layer_action(|scene| scene.set_layer_locked(id, locked))?;
        Ok(locked)
    }

    /// Set a layer's opacity, clamped to `0.0..=1.0`.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f64) -> EditorResult<()> {
        self.layer_action(|scene| scene.set_layer_opacity(id, opacity))
    }

    /// Choose the layer new elements go to.
    pub fn set_active_layer(&mut self, id: LayerId) -> EditorResult<()> {
        if self.scene.layer(id).is_none() {
            return Err(self.report(EditorError::LayerNotFound(id)));
        }
        self.active_layer = id;
        Ok(())
    }
}
