//! Serializable canvas document exchanged with persistence and export hosts.

use crate::element::Element;
use crate::error::EditorResult;
use crate::layer::{Layer, LayerId};
use crate::resize::validate_size;
use crate::scene::Scene;
use crate::shapes::SerializableColor;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}

/// A saved canvas: size, background, layers and their elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasDocument {
    /// Unique document identifier.
    #[serde(default = "new_document_id")]
    pub id: String,
    /// Document name.
    pub name: String,
    pub width: f64,
    pub height: f64,
    #[serde(default = "SerializableColor::white")]
    pub background_color: SerializableColor,
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub elements_by_layer: BTreeMap<LayerId, Vec<Element>>,
    /// Base64 PNG preview.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default = "now", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default = "now", with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

fn new_document_id() -> String {
    Uuid::new_v4().to_string()
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new 800×600 document with a single empty layer.
    pub fn new() -> Self {
        Self::from_scene("Untitled", Size::new(800.0, 600.0), &Scene::new())
    }

    /// Capture a scene as a document.
    pub fn from_scene(name: impl Into<String>, size: Size, scene: &Scene) -> Self {
        let timestamp = now();
        Self {
            id: new_document_id(),
            name: name.into(),
            width: size.width,
            height: size.height,
            background_color: scene.background_color(),
            layers: scene.layers().to_vec(),
            elements_by_layer: scene.elements_by_layer().clone(),
            thumbnail: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Rebuild the scene, checking size and model invariants.
    pub fn to_scene(&self) -> EditorResult<Scene> {
        validate_size(self.size())?;
        Scene::from_parts(
            self.layers.clone(),
            self.elements_by_layer.clone(),
            self.background_color,
        )
    }

    /// Mark the document as modified now.
    pub fn touch(&mut self) {
        self.updated_at = now();
    }

    /// Total number of elements across layers.
    pub fn element_count(&self) -> usize {
        self.elements_by_layer.values().map(Vec::len).sum()
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
