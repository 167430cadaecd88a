//! The editable model: ordered layers, their elements and the background.

use crate::element::{Element, ElementId};
use crate::error::{EditorError, EditorResult};
use crate::layer::{Layer, LayerId};
use crate::shapes::SerializableColor;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Layers, elements grouped by layer, and the background color.
///
/// Layer index 0 renders first (bottom). Within a layer, later elements
/// render on top of earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    layers: Vec<Layer>,
    #[serde(default)]
    elements_by_layer: BTreeMap<LayerId, Vec<Element>>,
    #[serde(default = "SerializableColor::white")]
    background_color: SerializableColor,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// A scene with a single empty layer on a white background.
    pub fn new() -> Self {
        let layer = Layer::new("Layer 1");
        let mut elements_by_layer = BTreeMap::new();
        elements_by_layer.insert(layer.id, Vec::new());
        Self {
            layers: vec![layer],
            elements_by_layer,
            background_color: SerializableColor::white(),
        }
    }

    /// Assemble a scene from parts, checking every model invariant.
    pub fn from_parts(
        layers: Vec<Layer>,
        elements_by_layer: BTreeMap<LayerId, Vec<Element>>,
        background_color: SerializableColor,
    ) -> EditorResult<Self> {
        let mut scene = Self {
            layers,
            elements_by_layer,
            background_color,
        };
        scene.validate()?;
        for layer in &scene.layers {
            scene.elements_by_layer.entry(layer.id).or_default();
        }
        Ok(scene)
    }

    /// Check the model invariants.
    pub fn validate(&self) -> EditorResult<()> {
        if self.layers.is_empty() {
            return Err(EditorError::InvariantViolation(
                "A canvas needs at least one layer".into(),
            ));
        }
        let layer_ids: HashSet<LayerId> = self.layers.iter().map(|l| l.id).collect();
        if layer_ids.len() != self.layers.len() {
            return Err(EditorError::InvariantViolation("Duplicate layer id".into()));
        }
        let mut element_ids = HashSet::new();
        for (layer_id, elements) in &self.elements_by_layer {
            if !layer_ids.contains(layer_id) {
                return Err(EditorError::LayerNotFound(*layer_id));
            }
            for element in elements {
                if element.layer_id != *layer_id {
                    return Err(EditorError::InvariantViolation(format!(
                        "Element {} is filed under layer {} but owned by {}",
                        element.id, layer_id, element.layer_id
                    )));
                }
                if !element_ids.insert(element.id) {
                    return Err(EditorError::InvariantViolation(format!(
                        "Duplicate element id {}",
                        element.id
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// The layer rendered last.
    pub fn top_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }

    pub fn background_color(&self) -> SerializableColor {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: SerializableColor) {
        self.background_color = color;
    }

    /// Elements of a layer in z-order. Unknown layers have none.
    pub fn elements(&self, layer: LayerId) -> &[Element] {
        self.elements_by_layer
            .get(&layer)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn elements_by_layer(&self) -> &BTreeMap<LayerId, Vec<Element>> {
        &self.elements_by_layer
    }

    /// Every element with its layer, bottom layer first.
    pub fn render_order(&self) -> impl DoubleEndedIterator<Item = (&Layer, &Element)> {
        self.layers
            .iter()
            .flat_map(move |layer| self.elements(layer.id).iter().map(move |e| (layer, e)))
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements_by_layer
            .values()
            .flat_map(|elements| elements.iter())
            .find(|e| e.id == id)
    }

    pub fn contains_element(&self, id: ElementId) -> bool {
        self.element(id).is_some()
    }

    pub fn element_ids(&self) -> HashSet<ElementId> {
        self.elements_by_layer
            .values()
            .flat_map(|elements| elements.iter().map(|e| e.id))
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.elements_by_layer.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    fn locate(&self, id: ElementId) -> Option<(LayerId, usize)> {
        self.elements_by_layer.iter().find_map(|(layer_id, elements)| {
            elements
                .iter()
                .position(|e| e.id == id)
                .map(|index| (*layer_id, index))
        })
    }

    /// Whether the element's layer accepts edits.
    pub fn is_element_editable(&self, id: ElementId) -> bool {
        self.element(id)
            .and_then(|e| self.layer(e.layer_id))
            .is_some_and(Layer::is_editable)
    }

    fn ensure_editable(&self, layer_id: LayerId) -> EditorResult<()> {
        let layer = self
            .layer(layer_id)
            .ok_or(EditorError::LayerNotFound(layer_id))?;
        if layer.is_editable() {
            Ok(())
        } else {
            Err(EditorError::LockedOrHiddenLayer(layer_id))
        }
    }

    /// Append an element on top of its layer.
    ///
    /// The owning layer must exist and be visible and unlocked.
    pub fn add_element(&mut self, element: Element) -> EditorResult<ElementId> {
        self.ensure_editable(element.layer_id)?;
        if self.contains_element(element.id) {
            return Err(EditorError::InvariantViolation(format!(
                "Duplicate element id {}",
                element.id
            )));
        }
        let id = element.id;
        self.elements_by_layer
            .entry(element.layer_id)
            .or_default()
            .push(element);
        Ok(id)
    }

    /// Replace an element's content, keeping its id, layer and z-position.
    pub fn replace_element(&mut self, id: ElementId, mut element: Element) -> EditorResult<()> {
        let (layer_id, index) = self.locate(id).ok_or(EditorError::ElementNotFound(id))?;
        element.id = id;
        element.layer_id = layer_id;
        if let Some(slot) = self
            .elements_by_layer
            .get_mut(&layer_id)
            .and_then(|elements| elements.get_mut(index))
        {
            *slot = element;
        }
        Ok(())
    }

    /// Mutate an element in place. Its id and layer cannot be changed this way.
    pub fn update_element<R>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element) -> R,
    ) -> EditorResult<R> {
        let (layer_id, index) = self.locate(id).ok_or(EditorError::ElementNotFound(id))?;
        let element = self
            .elements_by_layer
            .get_mut(&layer_id)
            .and_then(|elements| elements.get_mut(index))
            .ok_or(EditorError::ElementNotFound(id))?;
        let result = f(element);
        element.id = id;
        element.layer_id = layer_id;
        Ok(result)
    }

    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let (layer_id, index) = self.locate(id)?;
        self.elements_by_layer
            .get_mut(&layer_id)
            .map(|elements| elements.remove(index))
    }

    /// Remove every listed element that exists. Returns the removed elements.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let wanted: HashSet<ElementId> = ids.iter().copied().collect();
        let mut removed = Vec::new();
        for elements in self.elements_by_layer.values_mut() {
            let (gone, kept): (Vec<_>, Vec<_>) =
                elements.drain(..).partition(|e| wanted.contains(&e.id));
            *elements = kept;
            removed.extend(gone);
        }
        removed
    }

    /// Remove all elements on unlocked layers. Returns how many were removed.
    pub fn clear_unlocked(&mut self) -> usize {
        let mut removed = 0;
        for layer in self.layers.iter().filter(|l| !l.locked) {
            if let Some(elements) = self.elements_by_layer.get_mut(&layer.id) {
                removed += elements.len();
                elements.clear();
            }
        }
        removed
    }

    /// Translate elements by `delta`, skipping those on locked or hidden layers.
    /// Returns how many moved.
    pub fn translate_elements(&mut self, ids: &[ElementId], delta: Vec2) -> usize {
        let editable: HashSet<LayerId> = self
            .layers
            .iter()
            .filter(|l| l.is_editable())
            .map(|l| l.id)
            .collect();
        let mut moved = 0;
        for (layer_id, elements) in self.elements_by_layer.iter_mut() {
            if !editable.contains(layer_id) {
                continue;
            }
            for element in elements.iter_mut().filter(|e| ids.contains(&e.id)) {
                element.translate(delta);
                moved += 1;
            }
        }
        moved
    }

    /// Scale every element's geometry, regardless of layer state.
    pub fn rescale_all(&mut self, sx: f64, sy: f64) {
        for element in self.elements_by_layer.values_mut().flatten() {
            element.rescale(sx, sy);
        }
    }

    // --- Layers ---

    fn layer_mut(&mut self, id: LayerId) -> EditorResult<&mut Layer> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(EditorError::LayerNotFound(id))
    }

    /// Add a layer on top.
    pub fn add_layer(&mut self, layer: Layer) -> LayerId {
        let index = self.layers.len();
        self.insert_layer_unchecked(index, layer)
    }

    /// Insert a layer at `index` (0 = bottom).
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> EditorResult<LayerId> {
        if index > self.layers.len() {
            return Err(EditorError::InvariantViolation(format!(
                "Layer index {index} is out of range"
            )));
        }
        if self.layer(layer.id).is_some() {
            return Err(EditorError::InvariantViolation(format!(
                "Duplicate layer id {}",
                layer.id
            )));
        }
        Ok(self.insert_layer_unchecked(index, layer))
    }

    fn insert_layer_unchecked(&mut self, index: usize, layer: Layer) -> LayerId {
        let id = layer.id;
        self.elements_by_layer.entry(id).or_default();
        self.layers.insert(index, layer);
        id
    }

    /// Delete a layer and all its elements. The last layer cannot be deleted.
    pub fn delete_layer(&mut self, id: LayerId) -> EditorResult<Layer> {
        let index = self.layer_index(id).ok_or(EditorError::LayerNotFound(id))?;
        if self.layers.len() <= 1 {
            return Err(EditorError::InvariantViolation(
                "Cannot delete the last layer".into(),
            ));
        }
        self.elements_by_layer.remove(&id);
        Ok(self.layers.remove(index))
    }

    /// Move a layer to `to_index` in the final ordering.
    pub fn move_layer(&mut self, id: LayerId, to_index: usize) -> EditorResult<()> {
        let from = self.layer_index(id).ok_or(EditorError::LayerNotFound(id))?;
        if to_index >= self.layers.len() {
            return Err(EditorError::InvariantViolation(format!(
                "Layer index {to_index} is out of range"
            )));
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to_index, layer);
        Ok(())
    }

    /// Merge a layer into the one beneath it.
    ///
    /// The merged layer's elements are appended after the target's and
    /// re-owned by it. Returns the id of the surviving layer.
    pub fn merge_down(&mut self, id: LayerId) -> EditorResult<LayerId> {
        let index = self.layer_index(id).ok_or(EditorError::LayerNotFound(id))?;
        if index == 0 {
            return Err(EditorError::InvariantViolation(
                "There is no layer below to merge into".into(),
            ));
        }
        let target = self.layers[index - 1].id;
        let mut moved = self.elements_by_layer.remove(&id).unwrap_or_default();
        for element in &mut moved {
            element.layer_id = target;
        }
        self.elements_by_layer.entry(target).or_default().extend(moved);
        self.layers.remove(index);
        Ok(target)
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> EditorResult<()> {
        self.layer_mut(id)?.name = name.into();
        Ok(())
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> EditorResult<()> {
        self.layer_mut(id)?.visible = visible;
        Ok(())
    }

    pub fn set_layer_locked(&mut self, id: LayerId, locked: bool) -> EditorResult<()> {
        self.layer_mut(id)?.locked = locked;
        Ok(())
    }

    /// Set a layer's opacity, clamped to `0.0..=1.0`.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f64) -> EditorResult<()> {
        self.layer_mut(id)?.set_opacity(opacity);
        Ok(())
    }

    // --- Z-order within a layer ---

    fn with_layer_order(&mut self, id: ElementId, f: impl FnOnce(&mut Vec<Element>, usize) -> bool) -> bool {
        let Some((layer_id, index)) = self.locate(id) else {
            return false;
        };
        self.elements_by_layer
            .get_mut(&layer_id)
            .is_some_and(|elements| f(elements, index))
    }

    /// Move an element to the top of its layer.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        self.with_layer_order(id, |elements, index| {
            if index + 1 == elements.len() {
                return false;
            }
            let element = elements.remove(index);
            elements.push(element);
            true
        })
    }

    /// Move an element to the bottom of its layer.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        self.with_layer_order(id, |elements, index| {
            if index == 0 {
                return false;
            }
            let element = elements.remove(index);
            elements.insert(0, element);
            true
        })
    }

    /// Swap an element with the one above it.
    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        self.with_layer_order(id, |elements, index| {
            if index + 1 >= elements.len() {
                return false;
            }
            elements.swap(index, index + 1);
            true
        })
    }

    /// Swap an element with the one below it.
    pub fn send_backward(&mut self, id: ElementId) -> bool {
        self.with_layer_order(id, |elements, index| {
            if index == 0 {
                return false;
            }
            elements.swap(index, index - 1);
            true
        })
    }
}
