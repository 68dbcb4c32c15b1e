//! Selection descriptor
//!
//! A snapshot of what is selected in the editing surface at the moment a
//! model build is requested. The descriptor is captured once per build and
//! never live-updated. Degenerate shapes (an empty range list, a table
//! rectangle with a missing corner) are not errors: they are passed through
//! to the model builder unchanged, which treats them as "no selection".

use crate::dom::{NodeRef, Position};

/// One contiguous range in the document tree.
#[derive(Clone, Debug, PartialEq)]
pub struct DomRange {
    pub start: Position,
    pub end: Position,
}

impl DomRange {
    pub fn collapsed(position: Position) -> DomRange {
        DomRange {
            start: position.clone(),
            end: position,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }
}

/// Grid coordinate of a table cell: `x` is the column, `y` the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub fn new(x: usize, y: usize) -> Coordinate {
        Coordinate { x, y }
    }
}

/// A rectangle of selected cells inside one table.
#[derive(Clone, Debug, PartialEq)]
pub struct TableRectSelection {
    pub table: NodeRef,
    pub first_cell: Option<Coordinate>,
    pub last_cell: Option<Coordinate>,
}

impl TableRectSelection {
    /// A rectangle missing either corner selects nothing.
    pub fn is_degenerate(&self) -> bool {
        self.first_cell.is_none() || self.last_cell.is_none()
    }

    /// Normalized (top, left, bottom, right) rows/columns, if both corners
    /// are present.
    pub fn normalized(&self) -> Option<(usize, usize, usize, usize)> {
        let first = self.first_cell?;
        let last = self.last_cell?;
        Some((
            first.y.min(last.y),
            first.x.min(last.x),
            first.y.max(last.y),
            first.x.max(last.x),
        ))
    }
}

/// What is currently selected in the host surface.
///
/// Every consumer matches exhaustively on this; there is deliberately no
/// catch-all accessor that collapses the shapes into one another.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum SelectionDescriptor {
    #[default]
    None,
    /// One or more contiguous ranges. An empty list is degenerate.
    Ranges(Vec<DomRange>),
    /// A rectangle of table cells.
    TableRect(TableRectSelection),
    /// A single selected embedded element, e.g. an image.
    Object(NodeRef),
}

impl SelectionDescriptor {
    /// True when the descriptor selects nothing, either structurally
    /// (`None`) or because its shape is degenerate.
    pub fn is_effectively_empty(&self) -> bool {
        match self {
            SelectionDescriptor::None => true,
            SelectionDescriptor::Ranges(ranges) => ranges.is_empty(),
            SelectionDescriptor::TableRect(rect) => rect.is_degenerate(),
            SelectionDescriptor::Object(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_ranges_are_degenerate() {
        assert!(SelectionDescriptor::Ranges(vec![]).is_effectively_empty());
        assert!(SelectionDescriptor::None.is_effectively_empty());
    }

    #[test]
    fn test_partial_rect_is_degenerate() {
        let rect = TableRectSelection {
            table: NodeRef::element("table"),
            first_cell: Some(Coordinate::new(0, 0)),
            last_cell: None,
        };
        assert!(rect.is_degenerate());
        assert_eq!(rect.normalized(), None);
        assert!(SelectionDescriptor::TableRect(rect).is_effectively_empty());
    }

    #[test]
    fn test_rect_normalization_swaps_corners() {
        let rect = TableRectSelection {
            table: NodeRef::element("table"),
            first_cell: Some(Coordinate::new(2, 3)),
            last_cell: Some(Coordinate::new(0, 1)),
        };
        assert_eq!(rect.normalized(), Some((1, 0, 3, 2)));
    }
}
