//! Easel Core Library
//!
//! Platform-agnostic editing core for the Easel drawing surface: the
//! element and layer model, undo history, hit-testing, the pointer
//! interaction state machine, bucket fill and canvas resizing.
//!
//! Rendering, glyph layout and file dialogs belong to the host. The core
//! only hands out plain data ([`CanvasDocument`]) and, for the bucket tool
//! and thumbnails, rasterizes with its own software compositor.

pub mod canvas;
pub mod config;
pub mod editor;
pub mod element;
pub mod error;
pub mod flood_fill;
pub mod history;
pub mod input;
pub mod layer;
pub mod raster;
pub mod resize;
pub mod scene;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod tools;

pub use canvas::CanvasDocument;
pub use config::EditorConfig;
pub use editor::{Editor, FillOutcome, InteractionState};
pub use element::{Element, ElementId};
pub use error::{EditorError, EditorResult};
pub use history::{History, Snapshot};
pub use hit_test::Hit;
pub use input::{Key, KeyEvent, Modifiers, PointerEvent, PointerSample};
pub use layer::{Layer, LayerId};
pub use raster::{Rasterizer, SoftwareRasterizer};
pub use resize::{CanvasPreset, ResizeHandle, ScaleFactors};
pub use scene::Scene;
pub use selection::Selection;
pub use shapes::{SerializableColor, Shape};
pub use storage::{Storage, StorageError, StorageResult};
pub use tools::{ToolKind, ToolManager};

/// Paint color types hosts convert [`SerializableColor`] into.
pub use peniko;
