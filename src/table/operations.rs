//! Structural table editing operations
//!
//! Every operation follows the same shape: build a virtual table over the
//! target element, apply one grid transformation, write back, then report
//! the new focus. The whole sequence runs inside a single undo scope so
//! there is never a partially applied state to snapshot.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::dom::{NodeRef, PositionType};
use crate::editor::Editor;
use crate::models::Coordinate;
use crate::table::format::{cell_width_for_columns, TableFormat};
use crate::table::vtable::VirtualTable;

/// Structural operations on the table containing the cursor. Numeric codes
/// cross the JS boundary.
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TableOperation {
    InsertAbove = 0,
    InsertBelow = 1,
    InsertLeft = 2,
    InsertRight = 3,
    DeleteRow = 4,
    DeleteColumn = 5,
    DeleteTable = 6,
    MergeCells = 7,
    SplitHorizontally = 8,
    SplitVertically = 9,
}

impl TableOperation {
    pub fn from_code(code: u8) -> Option<TableOperation> {
        match code {
            0 => Some(TableOperation::InsertAbove),
            1 => Some(TableOperation::InsertBelow),
            2 => Some(TableOperation::InsertLeft),
            3 => Some(TableOperation::InsertRight),
            4 => Some(TableOperation::DeleteRow),
            5 => Some(TableOperation::DeleteColumn),
            6 => Some(TableOperation::DeleteTable),
            7 => Some(TableOperation::MergeCells),
            8 => Some(TableOperation::SplitHorizontally),
            9 => Some(TableOperation::SplitVertically),
            _ => None,
        }
    }
}

/// Apply a structural operation to the table at the cursor. Returns false
/// when the cursor is not inside a table cell.
pub fn edit_table(editor: &mut Editor, operation: TableOperation) -> bool {
    let Some(td) = editor.get_element_at_cursor(&["TD", "TH"], None) else {
        return false;
    };
    let Some(mut vtable) = VirtualTable::from_cell(&td) else {
        return false;
    };
    log::debug!("edit_table {:?} at ({}, {})", operation, vtable.row, vtable.col);
    editor.with_undo_scope(|editor| {
        apply_operation(editor, &mut vtable, operation);
    });
    true
}

fn apply_operation(editor: &mut Editor, vtable: &mut VirtualTable, operation: TableOperation) {
    match operation {
        TableOperation::InsertAbove | TableOperation::InsertBelow => {
            let new_row = vtable.insert_row(operation == TableOperation::InsertAbove);
            vtable.write_back();
            select_cell(editor, vtable, new_row, 0);
        }
        TableOperation::InsertLeft | TableOperation::InsertRight => {
            let new_col = vtable.insert_column(operation == TableOperation::InsertLeft);
            vtable.write_back();
            select_cell(editor, vtable, vtable.row, new_col);
        }
        TableOperation::DeleteRow => {
            vtable.delete_row();
            vtable.write_back();
            if vtable.row_count() == 0 {
                remove_table(editor, vtable);
            } else {
                select_cell(editor, vtable, vtable.row, vtable.col);
            }
        }
        TableOperation::DeleteColumn => {
            vtable.delete_column();
            vtable.write_back();
            if vtable.column_count() == 0 {
                remove_table(editor, vtable);
            } else {
                select_cell(editor, vtable, vtable.row, vtable.col);
            }
        }
        TableOperation::DeleteTable => {
            remove_table(editor, vtable);
        }
        TableOperation::MergeCells => {
            if let Some((table, first, last)) = editor.table_selection() {
                if table.same(&vtable.table) {
                    vtable.start_range = Some(first);
                    vtable.end_range = Some(last);
                }
            }
            if vtable.start_range.is_none() {
                return;
            }
            vtable.merge_selection();
            vtable.write_back();
            select_cell(editor, vtable, vtable.row, vtable.col);
        }
        TableOperation::SplitHorizontally => {
            vtable.split_horizontally();
            vtable.write_back();
            select_cell(editor, vtable, vtable.row, vtable.col);
        }
        TableOperation::SplitVertically => {
            vtable.split_vertically();
            vtable.write_back();
            select_cell(editor, vtable, vtable.row, vtable.col);
        }
    }
}

fn select_cell(editor: &mut Editor, vtable: &VirtualTable, row: usize, col: usize) {
    // Walk the row for the first real cell if the preferred slot is a hole.
    let target = (col..vtable.column_count())
        .chain(0..col)
        .find_map(|c| vtable.get_cell(row as isize, c as isize).td);
    match target {
        Some(td) => editor.select(&td, PositionType::Begin),
        None => editor.select(&vtable.table, PositionType::Before),
    }
}

fn remove_table(editor: &mut Editor, vtable: &VirtualTable) {
    let table = vtable.table.clone();
    editor.select(&table, PositionType::Before);
    table.detach();
    log::debug!("deleted table");
}

/// Insert a fresh table at the focus position. Cell widths follow the
/// column-count bands; the default format is a white background with
/// `#ABABAB` borders.
pub fn insert_table(
    editor: &mut Editor,
    columns: usize,
    rows: usize,
    format: Option<TableFormat>,
) {
    if columns == 0 || rows == 0 {
        return;
    }
    let table = NodeRef::element("table");
    let width = cell_width_for_columns(columns);
    for _ in 0..rows {
        let tr = NodeRef::element("tr");
        for _ in 0..columns {
            let td = NodeRef::element("td");
            td.append_child(&NodeRef::element("br"));
            td.set_style("width", width);
            tr.append_child(&td);
        }
        table.append_child(&tr);
    }
    log::debug!("inserting {}x{} table", rows, columns);
    editor.with_undo_scope(|editor| {
        let mut vtable = VirtualTable::from_table(&table);
        vtable.apply_format(&format.unwrap_or_default());
        vtable.write_back();
        editor.insert_block(&table);
        let table_for_focus = table.clone();
        editor.run_deferred(move |editor| {
            // The table may be gone by the time this runs.
            if table_for_focus.parent().is_some() {
                editor.select(&table_for_focus, PositionType::Begin);
            }
        });
    });
}

/// Select a rectangle of cells by grid coordinates, the entry point the
/// host's mouse handling uses.
pub fn select_table_cells(
    editor: &mut Editor,
    table: &NodeRef,
    first: Coordinate,
    last: Coordinate,
) {
    editor.select_table_rect(table, first, last);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor_with_table() -> Editor {
        let mut editor = Editor::new(
            "<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>",
        )
        .unwrap();
        let td = editor
            .content_root()
            .child(0)
            .unwrap()
            .child(0)
            .unwrap()
            .child(0)
            .unwrap();
        editor.select(&td, PositionType::Begin);
        editor
    }

    #[test]
    fn test_insert_below_adds_row_and_moves_focus() {
        let mut editor = editor_with_table();
        assert!(edit_table(&mut editor, TableOperation::InsertBelow));

        let table = editor.content_root().child(0).unwrap();
        assert_eq!(table.child_count(), 3);
        // Focus landed in the new (middle) row's first cell.
        let new_first = table.child(1).unwrap().child(0).unwrap();
        let focus = editor.get_focused_position().unwrap();
        assert!(new_first.contains(&focus.node, true));
    }

    #[test]
    fn test_delete_row_is_undoable() {
        let mut editor = editor_with_table();
        let before = editor.get_content();
        assert!(edit_table(&mut editor, TableOperation::DeleteRow));

        let table = editor.content_root().child(0).unwrap();
        assert_eq!(table.child_count(), 1);
        assert!(editor.undo());
        assert_eq!(editor.get_content(), before);
    }

    #[test]
    fn test_delete_last_row_removes_table() {
        let mut editor = editor_with_table();
        assert!(edit_table(&mut editor, TableOperation::DeleteRow));
        assert!(edit_table(&mut editor, TableOperation::DeleteRow));
        assert_eq!(editor.content_root().child_count(), 0);
    }

    #[test]
    fn test_delete_table() {
        let mut editor = editor_with_table();
        assert!(edit_table(&mut editor, TableOperation::DeleteTable));
        assert_eq!(editor.get_content(), "");
    }

    #[test]
    fn test_merge_cells_uses_selection() {
        let mut editor = editor_with_table();
        let table = editor.content_root().child(0).unwrap();
        editor.select_table_rect(&table, Coordinate::new(0, 0), Coordinate::new(1, 0));
        assert!(edit_table(&mut editor, TableOperation::MergeCells));

        assert!(editor.get_content().contains("colspan=\"2\""));
    }

    #[test]
    fn test_edit_table_outside_table_is_noop() {
        let mut editor = Editor::new("<div>text</div>").unwrap();
        let div = editor.content_root().child(0).unwrap();
        editor.select(&div, PositionType::Begin);
        assert!(!edit_table(&mut editor, TableOperation::InsertBelow));
    }

    #[test]
    fn test_insert_table_builds_formatted_table() {
        let mut editor = Editor::new("").unwrap();
        insert_table(&mut editor, 3, 2, None);
        editor.flush_deferred();

        let table = editor.content_root().child(0).unwrap();
        assert!(table.is_tag("table"));
        assert_eq!(table.child_count(), 2);
        assert_eq!(table.child(0).unwrap().child_count(), 3);
        let td = table.child(0).unwrap().child(0).unwrap();
        assert_eq!(td.style("width").as_deref(), Some("120px"));
        assert_eq!(td.style("border").as_deref(), Some("1px solid #ABABAB"));
        assert_eq!(table.style("background-color").as_deref(), Some("#FFF"));

        // Deferred focus restoration reached the first cell.
        let focus = editor.get_focused_position().unwrap();
        assert!(td.contains(&focus.node, true));
    }

    #[test]
    fn test_insert_table_is_undoable() {
        let mut editor = Editor::new("<div>x</div>").unwrap();
        insert_table(&mut editor, 2, 2, None);
        editor.flush_deferred();
        assert!(editor.get_content().contains("<table"));

        assert!(editor.undo());
        assert_eq!(editor.get_content(), "<div>x</div>");
    }
}
