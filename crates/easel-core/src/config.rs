//! Editor configuration.

use serde::{Deserialize, Serialize};

/// Tunable constants for the editor core.
///
/// Missing fields fall back to their defaults when loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Maximum number of history snapshots kept (oldest are evicted).
    pub history_limit: usize,
    /// Distance in pixels within which a polyline counts as hit.
    pub hit_tolerance: f64,
    /// Padding added around text bounds for hit-testing.
    pub text_padding: f64,
    /// Maximum delay between two clicks to count as a double-click.
    pub double_click_ms: u64,
    /// Maximum distance between two clicks with no shared target.
    pub double_click_distance: f64,
    /// Per-channel tolerance of the bucket flood fill.
    pub fill_tolerance: u8,
    /// Smallest canvas edge allowed while drag-resizing.
    pub min_canvas_size: f64,
    /// Width of the grab zone just outside the canvas edges.
    pub resize_handle_tolerance: f64,
    /// Canvas width for new documents.
    pub default_width: f64,
    /// Canvas height for new documents.
    pub default_height: f64,
    /// Recolor the background directly when the bucket misses every element.
    pub bucket_background_shortcut: bool,
    /// Pixels processed per flood-fill step.
    pub fill_chunk_pixels: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: 100,
            hit_tolerance: 5.0,
            text_padding: 10.0,
            double_click_ms: 500,
            double_click_distance: 5.0,
            fill_tolerance: 20,
            min_canvas_size: 100.0,
            resize_handle_tolerance: 8.0,
            default_width: 800.0,
            default_height: 600.0,
            bucket_background_shortcut: true,
            fill_chunk_pixels: 65_536,
        }
    }
}

impl EditorConfig {
    /// Load a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
