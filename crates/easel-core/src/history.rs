//! Linear undo/redo history over scene snapshots.

use crate::scene::Scene;
use kurbo::Size;

/// One history entry: the scene and the canvas size it was laid out for.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub scene: Scene,
    pub canvas_size: Size,
}

impl Snapshot {
    pub fn new(scene: Scene, canvas_size: Size) -> Self {
        Self { scene, canvas_size }
    }
}

/// Snapshot stack with a cursor.
///
/// `entries[step]` is always the current state. Recording truncates any
/// redo entries past the cursor. When the stack grows past `limit`, the
/// oldest snapshots are dropped.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<Snapshot>,
    step: usize,
    limit: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    pub fn new(initial: Snapshot, limit: usize) -> Self {
        Self {
            entries: vec![initial],
            step: 0,
            limit: limit.max(1),
        }
    }

    /// Push a new snapshot after the cursor and move onto it.
    pub fn record(&mut self, snapshot: Snapshot) {
        self.entries.truncate(self.step + 1);
        self.entries.push(snapshot);
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.step = self.entries.len() - 1;
        log::debug!("History recorded (step {} of {})", self.step, self.entries.len());
    }

    /// Step back. Returns the restored snapshot, or None at the oldest entry.
    pub fn undo(&mut self) -> Option<&Snapshot> {
        if self.step == 0 {
            return None;
        }
        self.step -= 1;
        self.entries.get(self.step)
    }

    /// Step forward. Returns the restored snapshot, or None at the newest entry.
    pub fn redo(&mut self) -> Option<&Snapshot> {
        if self.step + 1 >= self.entries.len() {
            return None;
        }
        self.step += 1;
        self.entries.get(self.step)
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step + 1 < self.entries.len()
    }

    /// The snapshot at the cursor.
    pub fn current(&self) -> &Snapshot {
        &self.entries[self.step]
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all entries and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: Snapshot) {
        self.entries = vec![snapshot];
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;

    fn snapshot_with_bg(r: u8) -> Snapshot {
        let mut scene = Scene::new();
        scene.set_background_color(SerializableColor::rgb(r, 0, 0));
        Snapshot::new(scene, Size::new(800.0, 600.0))
    }

    fn red(snapshot: &Snapshot) -> u8 {
        snapshot.scene.background_color().r
    }

    #[test]
    fn test_undo_redo_walks_the_stack() {
        let mut history = History::new(snapshot_with_bg(0), 100);
        history.record(snapshot_with_bg(1));
        history.record(snapshot_with_bg(2));
        assert_eq!(history.step(), 2);

        assert_eq!(history.undo().map(red), Some(1));
        assert_eq!(history.undo().map(red), Some(0));
        assert!(history.undo().is_none());
        assert_eq!(history.step(), 0);

        assert_eq!(history.redo().map(red), Some(1));
        assert_eq!(history.redo().map(red), Some(2));
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_after_undo_discards_redo() {
        let mut history = History::new(snapshot_with_bg(0), 100);
        history.record(snapshot_with_bg(1));
        history.record(snapshot_with_bg(2));
        history.undo();
        history.undo();
        history.record(snapshot_with_bg(9));
        assert!(!history.can_redo());
        assert_eq!(history.len(), 2);
        assert_eq!(red(history.current()), 9);
    }

    #[test]
    fn test_limit_evicts_oldest() {
        let mut history = History::new(snapshot_with_bg(0), 3);
        for r in 1..=5 {
            history.record(snapshot_with_bg(r));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.step(), 2);
        assert_eq!(red(history.current()), 5);
        history.undo();
        history.undo();
        assert_eq!(red(history.current()), 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(snapshot_with_bg(0), 10);
        history.record(snapshot_with_bg(1));
        history.reset(snapshot_with_bg(7));
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(red(history.current()), 7);
    }
}
