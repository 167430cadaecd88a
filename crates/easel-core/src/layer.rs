//! Layers: ordered, independently visible and lockable groups of elements.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for layers.
pub type LayerId = Uuid;

fn default_true() -> bool {
    true
}

fn default_opacity() -> f64 {
    1.0
}

/// A layer record. Its elements live in the scene, keyed by the layer id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Opacity multiplier in `0.0..=1.0`.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            visible: true,
            locked: false,
            opacity: 1.0,
        }
    }

    /// Whether elements on this layer may be created, changed or removed.
    pub fn is_editable(&self) -> bool {
        self.visible && !self.locked
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }
}
