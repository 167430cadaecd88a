//! Pointer and keyboard events, and double-click detection.

use crate::config::EditorConfig;
use crate::element::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether a click should extend the selection instead of replacing it.
    pub fn additive(&self) -> bool {
        self.shift || self.ctrl || self.meta
    }
}

/// One pointer sample in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub position: Point,
    pub modifiers: Modifiers,
    /// Host clock in milliseconds; only differences matter.
    pub timestamp_ms: u64,
    /// Element the host's renderer reports under the pointer, if any.
    pub target: Option<ElementId>,
}

impl PointerSample {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            modifiers: Modifiers::NONE,
            timestamp_ms: 0,
            target: None,
        }
    }

    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Point::new(x, y))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn at_time(mut self, timestamp_ms: u64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn with_target(mut self, target: ElementId) -> Self {
        self.target = Some(target);
        self
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
    /// The gesture was interrupted (pointer capture lost, touch cancelled).
    Cancel,
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Character(char),
    Backspace,
    Delete,
    Enter,
    Escape,
    Other(String),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// A printable character without modifiers.
    pub fn char(c: char) -> Self {
        Self::new(Key::Character(c))
    }
}

#[derive(Debug, Clone, Copy)]
struct Click {
    timestamp_ms: u64,
    position: Point,
    target: Option<ElementId>,
}

/// Detects double-clicks from consecutive pointer-downs.
///
/// Two clicks pair up when they land within the time threshold and either
/// share a target or are close together. A detected pair resets the tracker
/// so a third click starts over.
#[derive(Debug, Clone)]
pub struct ClickTracker {
    threshold_ms: u64,
    max_distance: f64,
    last: Option<Click>,
}

impl ClickTracker {
    pub fn new(threshold_ms: u64, max_distance: f64) -> Self {
        Self {
            threshold_ms,
            max_distance,
            last: None,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.double_click_ms, config.double_click_distance)
    }

    /// Register a click on `target` and report whether it completes a double-click.
    pub fn register(&mut self, sample: &PointerSample, target: Option<ElementId>) -> bool {
        let click = Click {
            timestamp_ms: sample.timestamp_ms,
            position: sample.position,
            target,
        };
        let is_double = self.last.is_some_and(|last| {
            let elapsed = click.timestamp_ms.saturating_sub(last.timestamp_ms);
            let same_target = last.target.is_some() && last.target == click.target;
            let near = (click.position - last.position).hypot() < self.max_distance;
            elapsed < self.threshold_ms && (same_target || near)
        });
        self.last = if is_double { None } else { Some(click) };
        is_double
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for ClickTracker {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
