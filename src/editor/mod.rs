//! Editor state and host interface
//!
//! `Editor` owns the canonical content tree, the model cache, the undo
//! history, and the deferred-continuation queue. It provides the host
//! interface the editing features are written against: focus queries,
//! selection movement, undo scoping, and model access.

pub mod cache;
pub mod core;
pub mod event;
pub mod undo;

// Re-export commonly used types
pub use cache::*;
pub use core::*;
pub use event::*;
pub use undo::*;

use std::collections::VecDeque;

use crate::converters::{content_model_to_dom, DomToModelOptions};
use crate::dom::{children_to_html, NodeRef, Position, PositionType};
use crate::models::{Coordinate, SelectionDescriptor};
use crate::parse::{parse_fragment_into, ParseError};

type DeferredFn = Box<dyn FnOnce(&mut Editor)>;

pub struct Editor {
    pub core: EditorCore,
    undo: UndoStack,
    deferred: VecDeque<DeferredFn>,
}

impl Editor {
    /// Create an editor over initial HTML content.
    pub fn new(html: &str) -> Result<Editor, ParseError> {
        let root = NodeRef::element("div");
        parse_fragment_into(&root, html)?;
        Ok(Editor::from_root(root))
    }

    pub fn from_root(root: NodeRef) -> Editor {
        Editor {
            core: EditorCore::new(root),
            undo: UndoStack::default(),
            deferred: VecDeque::new(),
        }
    }

    pub fn content_root(&self) -> NodeRef {
        self.core.content_root.clone()
    }

    /// Serialized editor content.
    pub fn get_content(&self) -> String {
        children_to_html(&self.core.content_root)
    }

    /// Replace the content wholesale. Resets selection and cache; the undo
    /// history keeps the previous state.
    pub fn set_content(&mut self, html: &str) -> Result<(), ParseError> {
        self.core.content_root.clear_children();
        parse_fragment_into(&self.core.content_root, html)?;
        self.core.selection = EditorSelection::None;
        self.core.cache.invalidate();
        Ok(())
    }

    // -- Content Model access ------------------------------------------------

    /// Get or build the Content Model; see `core::create_content_model`.
    pub fn create_content_model(&self, option: Option<&DomToModelOptions>) -> SharedModel {
        core::create_content_model(&self.core, option)
    }

    /// Build (or reuse) the model and refresh the cache with the result.
    pub fn get_content_model(&mut self) -> SharedModel {
        let model = core::create_content_model(&self.core, None);
        if self.core.reuse_model {
            let under_shadow = self.core.is_in_shadow_edit();
            self.core.cache.set(Some(model.clone()), under_shadow);
        }
        model
    }

    /// Write a model back into the content tree and restore the caret it
    /// carries, if any.
    pub fn set_content_model(&mut self, model: &SharedModel) {
        let caret = content_model_to_dom(&model.borrow(), &self.core.content_root);
        self.core.cache.invalidate();
        if self.core.reuse_model {
            let under_shadow = self.core.is_in_shadow_edit();
            self.core.cache.set(Some(model.clone()), under_shadow);
        }
        if let Some(position) = caret {
            self.core.selection = EditorSelection::Caret(position);
        }
    }

    /// Explicitly cache a model (or clear the slot with `None`).
    pub fn cache_content_model(&mut self, model: Option<SharedModel>) {
        let under_shadow = self.core.is_in_shadow_edit();
        self.core.cache.set(model, under_shadow);
    }

    pub fn invalidate_model_cache(&mut self) {
        self.core.cache.invalidate();
    }

    // -- Shadow edit ---------------------------------------------------------

    /// Enter shadow edit: the committed content is kept aside so that
    /// leaving the overlay restores it. Models built while the overlay is
    /// active never reach callers without a deep clone.
    pub fn start_shadow_edit(&mut self) {
        if self.core.shadow_edit_fragment.is_none() {
            self.core.shadow_edit_fragment = Some(self.core.content_root.deep_clone());
            log::debug!("entered shadow edit");
        }
    }

    /// Leave shadow edit and restore the committed content.
    pub fn stop_shadow_edit(&mut self) {
        if let Some(fragment) = self.core.shadow_edit_fragment.take() {
            self.core.content_root.clear_children();
            for child in fragment.children() {
                self.core.content_root.append_child(&child);
            }
            self.core.selection = EditorSelection::None;
            log::debug!("left shadow edit");
        }
    }

    // -- Selection and focus -------------------------------------------------

    pub fn read_selection(&self) -> SelectionDescriptor {
        (self.core.api.read_selection)(&self.core)
    }

    pub fn get_focused_position(&self) -> Option<Position> {
        core::focused_position(&self.core)
    }

    pub fn get_element_at_cursor(&self, tags: &[&str], from: Option<&NodeRef>) -> Option<NodeRef> {
        core::element_at_cursor(&self.core, tags, from)
    }

    /// Collapse the selection to an anchor point of `node`. Begin/End
    /// normalize into the node's content; Before/After stay at the parent
    /// boundary.
    pub fn select(&mut self, node: &NodeRef, position_type: PositionType) {
        let position = Position::new(node, position_type);
        let position = match position_type {
            PositionType::Begin | PositionType::End => position.normalize(),
            PositionType::Before | PositionType::After => position,
        };
        self.core.selection = EditorSelection::Caret(position);
    }

    pub fn select_position(&mut self, position: Position) {
        self.core.selection = EditorSelection::Caret(position);
    }

    pub fn select_table_rect(&mut self, table: &NodeRef, first: Coordinate, last: Coordinate) {
        self.core.selection = EditorSelection::TableRect {
            table: table.clone(),
            first_cell: Some(first),
            last_cell: Some(last),
        };
    }

    /// The current table selection, if the selection is table-shaped and
    /// not degenerate.
    pub fn table_selection(&self) -> Option<(NodeRef, Coordinate, Coordinate)> {
        match &self.core.selection {
            EditorSelection::TableRect {
                table,
                first_cell: Some(first),
                last_cell: Some(last),
            } => Some((table.clone(), *first, *last)),
            _ => None,
        }
    }

    // -- Deferred continuations ---------------------------------------------

    /// Queue a continuation to run after the current synchronous edit has
    /// settled. Continuations observe the post-write-back state but must
    /// re-check it defensively: unrelated events may run before them.
    pub fn run_deferred(&mut self, callback: impl FnOnce(&mut Editor) + 'static) {
        self.deferred.push_back(Box::new(callback));
    }

    /// Drain queued continuations. The host calls this once the triggering
    /// event's synchronous work is complete.
    pub fn flush_deferred(&mut self) {
        while let Some(callback) = self.deferred.pop_front() {
            callback(self);
        }
    }

    // -- Undo ----------------------------------------------------------------

    /// Run a structural mutation as one undoable transaction: the states
    /// before and after `mutation` become adjacent undo snapshots.
    pub fn with_undo_scope(&mut self, mutation: impl FnOnce(&mut Editor)) {
        self.undo.add_snapshot(self.get_content());
        mutation(self);
        self.core.cache.invalidate();
        self.undo.add_snapshot(self.get_content());
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        // Content may have drifted since the last snapshot; keep the
        // current state reachable through redo.
        self.undo.add_snapshot(self.get_content());
        match self.undo.undo() {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.undo.redo() {
            Some(snapshot) => self.restore_snapshot(&snapshot),
            None => false,
        }
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) -> bool {
        self.core.content_root.clear_children();
        if parse_fragment_into(&self.core.content_root, &snapshot.html).is_err() {
            return false;
        }
        self.core.selection = EditorSelection::None;
        self.core.cache.invalidate();
        true
    }

    // -- Structure helpers ---------------------------------------------------

    /// Insert a block-level node after the block containing the focus, or
    /// at the end of the content when nothing has focus.
    pub fn insert_block(&mut self, node: &NodeRef) {
        let root = self.core.content_root.clone();
        let anchor = self.get_focused_position().and_then(|position| {
            let mut current = position.node;
            while let Some(parent) = current.parent() {
                if parent.same(&root) {
                    return Some(current);
                }
                current = parent;
            }
            None
        });
        match anchor.and_then(|a| a.index_in_parent()) {
            Some(index) => root.insert_child(index + 1, node),
            None => root.append_child(node),
        }
    }
}
