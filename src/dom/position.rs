//! Positions inside the editor document tree
//!
//! A position is a (node, offset) pair: for elements the offset indexes the
//! child list, for text nodes it indexes characters. `PositionType` gives
//! the four anchor points used by selection and focus movement.

use serde_repr::{Deserialize_repr, Serialize_repr};

use super::node::NodeRef;

/// Anchor point relative to a node. Numeric codes cross the JS boundary.
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PositionType {
    Before = 0,
    Begin = 1,
    End = 2,
    After = 3,
}

/// A point in the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub node: NodeRef,
    pub offset: usize,
}

impl Position {
    /// Resolve an anchor point to a concrete (node, offset) pair.
    /// `Before`/`After` anchor in the parent; a detached node degrades to
    /// its own begin.
    pub fn new(node: &NodeRef, position_type: PositionType) -> Position {
        match position_type {
            PositionType::Begin => Position {
                node: node.clone(),
                offset: 0,
            },
            PositionType::End => Position {
                node: node.clone(),
                offset: node_length(node),
            },
            PositionType::Before | PositionType::After => {
                match (node.parent(), node.index_in_parent()) {
                    (Some(parent), Some(index)) => Position {
                        node: parent,
                        offset: if position_type == PositionType::After {
                            index + 1
                        } else {
                            index
                        },
                    },
                    _ => Position {
                        node: node.clone(),
                        offset: 0,
                    },
                }
            }
        }
    }

    pub fn is_at_begin(&self) -> bool {
        self.offset == 0
    }

    /// Descend to the deepest equivalent position, so that e.g. the begin
    /// of a table resolves to the begin of its first cell's content.
    pub fn normalize(&self) -> Position {
        let mut node = self.node.clone();
        let mut offset = self.offset;
        loop {
            if !node.is_element() {
                return Position { node, offset };
            }
            let count = node.child_count();
            if count == 0 {
                return Position { node, offset: 0 };
            }
            if offset >= count {
                let last = match node.child(count - 1) {
                    Some(last) => last,
                    None => return Position { node, offset },
                };
                offset = node_length(&last);
                node = last;
            } else {
                node = match node.child(offset) {
                    Some(child) => child,
                    None => return Position { node, offset },
                };
                offset = 0;
            }
        }
    }
}

fn node_length(node: &NodeRef) -> usize {
    if let Some(text) = node.text_value() {
        text.chars().count()
    } else {
        node.child_count()
    }
}
