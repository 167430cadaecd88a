//! Error taxonomy for editor operations.
//!
//! Every failure here is local and recoverable: an operation that returns an
//! error has left the model untouched.

use crate::element::ElementId;
use crate::layer::LayerId;
use thiserror::Error;

/// Errors produced by editor and model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// The action would break a model invariant (e.g. deleting the last layer).
    #[error("{0}")]
    InvariantViolation(String),
    /// The target layer is locked or hidden.
    #[error("Layer {0} is locked or hidden")]
    LockedOrHiddenLayer(LayerId),
    #[error("Layer not found: {0}")]
    LayerNotFound(LayerId),
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    /// The flood fill target already has the fill color.
    #[error("Fill target already has the requested color")]
    FloodFillNoChange,
    #[error("Raster error: {0}")]
    Raster(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl EditorError {
    /// Whether this error should be surfaced to the user as a status message.
    ///
    /// Locked/hidden layers and no-op fills are swallowed silently.
    pub fn is_user_visible(&self) -> bool {
        !matches!(
            self,
            EditorError::LockedOrHiddenLayer(_) | EditorError::FloodFillNoChange
        )
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        EditorError::Serialization(err.to_string())
    }
}

impl From<image::ImageError> for EditorError {
    fn from(err: image::ImageError) -> Self {
        EditorError::Raster(err.to_string())
    }
}

/// Result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
