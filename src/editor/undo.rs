//! Snapshot-based undo history
//!
//! Structural edits are bracketed by content snapshots. The stack keeps a
//! bounded list of serialized states with an index into the current one;
//! undo and redo move the index and hand back the state to restore.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One recorded content state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub html: String,
}

/// Bounded undo/redo history over content snapshots.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UndoStack {
    /// Recorded states, oldest first.
    snapshots: VecDeque<Snapshot>,
    /// Index of the state the content currently matches.
    current_index: usize,
    /// Maximum number of snapshots to keep in history.
    max_size: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(100)
    }
}

impl UndoStack {
    /// Create a new undo stack with the given maximum history size.
    pub fn new(max_size: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            current_index: 0,
            max_size: max_size.max(2),
        }
    }

    /// Record a new state. Drops any redo history, skips consecutive
    /// duplicates, and enforces the size bound.
    pub fn add_snapshot(&mut self, html: String) {
        if let Some(current) = self.snapshots.get(self.current_index) {
            if current.html == html {
                return;
            }
        }
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.current_index + 1);
        }
        self.snapshots.push_back(Snapshot { html });
        if self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
        }
        self.current_index = self.snapshots.len() - 1;
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.snapshots.len()
    }

    /// Step back and return the state to restore.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.current_index -= 1;
        self.snapshots.get(self.current_index).cloned()
    }

    /// Step forward and return the state to restore.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.current_index += 1;
        self.snapshots.get(self.current_index).cloned()
    }

    pub fn undo_count(&self) -> usize {
        self.current_index
    }

    pub fn redo_count(&self) -> usize {
        self.snapshots.len().saturating_sub(self.current_index + 1)
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_walks_states() {
        let mut stack = UndoStack::new(10);
        stack.add_snapshot("a".to_string());
        stack.add_snapshot("b".to_string());
        stack.add_snapshot("c".to_string());

        assert!(stack.can_undo());
        assert!(!stack.can_redo());

        assert_eq!(stack.undo().unwrap().html, "b");
        assert_eq!(stack.undo().unwrap().html, "a");
        assert!(!stack.can_undo());

        assert_eq!(stack.redo().unwrap().html, "b");
        assert_eq!(stack.redo().unwrap().html, "c");
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_new_snapshot_truncates_redo_history() {
        let mut stack = UndoStack::new(10);
        stack.add_snapshot("a".to_string());
        stack.add_snapshot("b".to_string());
        stack.undo();
        stack.add_snapshot("c".to_string());

        assert!(!stack.can_redo());
        assert_eq!(stack.undo().unwrap().html, "a");
    }

    #[test]
    fn test_consecutive_duplicates_are_skipped() {
        let mut stack = UndoStack::new(10);
        stack.add_snapshot("a".to_string());
        stack.add_snapshot("a".to_string());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_max_size_enforcement() {
        let mut stack = UndoStack::new(3);
        for state in ["a", "b", "c", "d", "e"] {
            stack.add_snapshot(state.to_string());
        }
        assert_eq!(stack.undo_count(), 2);
        assert_eq!(stack.undo().unwrap().html, "d");
        assert_eq!(stack.undo().unwrap().html, "c");
        assert!(!stack.can_undo());
    }
}
