//! Keyboard editing features for tables
//!
//! Four features cover in-table keyboard behavior: Tab walks cells with
//! wrap-around, Up/Down jump across rows skipping merged spans, Delete
//! clears the contents of a cell-rectangle selection, and Backspace removes
//! the selected cells structurally. Each feature is a predicate plus a
//! handler over the editor and the dispatched event; the cell under the
//! cursor is resolved once per event through the event data cache.

use crate::dom::{NodeRef, PositionType};
use crate::editor::{cache_get_event_data, Editor, Key, PluginEvent};
use crate::table::operations::{edit_table, TableOperation};
use crate::table::vtable::VirtualTable;

const TABLE_CELL_CACHE_KEY: &str = "TABLE_CELL_FOR_TABLE_FEATURES";

/// One keyboard editing feature.
pub struct EditFeature {
    pub keys: &'static [Key],
    pub should_handle: fn(&mut Editor, &PluginEvent) -> bool,
    pub handle: fn(&mut Editor, &PluginEvent),
}

/// The feature table, in dispatch order.
pub const TABLE_EDIT_FEATURES: [EditFeature; 4] = [
    EditFeature {
        keys: &[Key::Tab],
        should_handle: cursor_in_table_cell,
        handle: handle_tab,
    },
    EditFeature {
        keys: &[Key::Up, Key::Down],
        should_handle: cursor_in_table_cell_without_shift,
        handle: handle_up_down,
    },
    EditFeature {
        keys: &[Key::Delete],
        should_handle: has_table_selection,
        handle: handle_delete_contents,
    },
    EditFeature {
        keys: &[Key::Backspace],
        should_handle: has_table_selection,
        handle: handle_delete_structure,
    },
];

fn cursor_in_table_cell(editor: &mut Editor, event: &PluginEvent) -> bool {
    cache_get_table_cell(editor, event).is_some()
}

fn cursor_in_table_cell_without_shift(editor: &mut Editor, event: &PluginEvent) -> bool {
    cache_get_table_cell(editor, event).is_some() && !event.shift()
}

fn has_table_selection(editor: &mut Editor, _event: &PluginEvent) -> bool {
    editor.table_selection().is_some()
}

/// Dispatch an event through the feature table. Returns true when a
/// feature handled it; the caller drains deferred continuations afterward.
pub fn dispatch_table_event(editor: &mut Editor, event: &PluginEvent) -> bool {
    let crate::editor::PluginEventKind::KeyDown { key, .. } = event.kind;
    for feature in &TABLE_EDIT_FEATURES {
        if feature.keys.contains(&key) && (feature.should_handle)(editor, event) {
            (feature.handle)(editor, event);
            return true;
        }
    }
    false
}

/// The table cell containing the focus, resolved once per event. A cursor
/// inside a list item is deliberately not a table cell even when the list
/// nests inside one.
fn cache_get_table_cell(editor: &mut Editor, event: &PluginEvent) -> Option<NodeRef> {
    let editor_ptr: &Editor = editor;
    cache_get_event_data(event, TABLE_CELL_CACHE_KEY, || {
        let position = editor_ptr.get_focused_position()?;
        let hit = editor_ptr.get_element_at_cursor(&["TD", "TH", "LI"], Some(&position.node))?;
        if hit.is_tag("li") {
            None
        } else {
            Some(hit)
        }
    })
}

/// Tab / Shift+Tab: step to the next or previous cell. Walking past the
/// last row inserts a new row and lands in its first cell; walking before
/// the first row puts the cursor immediately before the table.
fn handle_tab(editor: &mut Editor, event: &PluginEvent) {
    let Some(td) = cache_get_table_cell(editor, event) else {
        return;
    };
    let Some(vtable) = VirtualTable::from_cell(&td) else {
        return;
    };
    let shift = event.shift();
    let step: isize = if shift { -1 } else { 1 };
    let mut row = vtable.row as isize;
    let mut col = vtable.col as isize + step;
    loop {
        if col < 0 || col >= vtable.column_count() as isize {
            row += step;
            if row < 0 {
                editor.select(&vtable.table, PositionType::Before);
                break;
            }
            if row >= vtable.row_count() as isize {
                edit_table(editor, TableOperation::InsertBelow);
                break;
            }
            col = if shift { vtable.column_count() as isize - 1 } else { 0 };
        }
        // Only origin slots count as stops, so merged cells are visited
        // once and spans hanging from other rows are skipped.
        if vtable.is_origin(row as usize, col as usize) {
            if let Some(target) = vtable.get_cell(row, col).td {
                editor.select(&target, PositionType::Begin);
                break;
            }
        }
        col += step;
    }
}

/// Up / Down: keep the column, scan for the first row whose slot belongs
/// to a different cell than the current one. The focus move runs deferred
/// and re-checks that the cursor is still inside the table, since the host
/// may have moved it before the continuation runs.
fn handle_up_down(editor: &mut Editor, event: &PluginEvent) {
    let Some(td) = cache_get_table_cell(editor, event) else {
        return;
    };
    let Some(vtable) = VirtualTable::from_cell(&td) else {
        return;
    };
    let crate::editor::PluginEventKind::KeyDown { key, .. } = event.kind;
    let is_up = key == Key::Up;
    let step: isize = if is_up { -1 } else { 1 };
    let current = vtable.slot(vtable.row, vtable.col);

    let mut target: Option<NodeRef> = None;
    let mut row = vtable.row as isize;
    while row >= 0 && row < vtable.row_count() as isize {
        let slot = vtable.slot(row as usize, vtable.col);
        if slot.is_some() && slot != current {
            target = vtable.get_cell(row, vtable.col as isize).td;
            break;
        }
        row += step;
    }

    let table = vtable.table.clone();
    let original_td = td.clone();
    editor.run_deferred(move |editor| {
        let still_inside = editor
            .get_focused_position()
            .map(|position| table.contains(&position.node, true))
            .unwrap_or(false);
        if !still_inside {
            return;
        }
        match &target {
            Some(target_td) if !original_td.contains(target_td, true) => {
                editor.select(target_td, PositionType::Begin);
            }
            Some(_) => {}
            None => {
                editor.select(
                    &table,
                    if is_up { PositionType::Before } else { PositionType::After },
                );
            }
        }
    });
}

/// Delete with a cell-rectangle selection: clear each distinct selected
/// cell's contents, leaving an empty line behind.
fn handle_delete_contents(editor: &mut Editor, _event: &PluginEvent) {
    let Some((table, first, last)) = editor.table_selection() else {
        return;
    };
    editor.with_undo_scope(|_editor| {
        let mut vtable = VirtualTable::from_table(&table);
        vtable.start_range = Some(first);
        vtable.end_range = Some(last);
        vtable.for_each_selected_cell(|cell| {
            if let Some(td) = &cell.td {
                td.clear_children();
                td.append_child(&NodeRef::element("br"));
            }
        });
    });
}

/// Backspace with a cell-rectangle selection: remove the selected cells
/// from the table structure.
fn handle_delete_structure(editor: &mut Editor, _event: &PluginEvent) {
    let Some((table, first, last)) = editor.table_selection() else {
        return;
    };
    editor.with_undo_scope(|editor| {
        let mut vtable = VirtualTable::from_table(&table);
        vtable.start_range = Some(first);
        vtable.end_range = Some(last);
        vtable.remove_cells_by_selection(false);
        vtable.write_back();
        if vtable.row_count() == 0 || vtable.column_count() == 0 {
            editor.select(&table, PositionType::Before);
            table.detach();
        } else {
            match vtable.get_cell(0, 0).td {
                Some(td) => editor.select(&td, PositionType::Begin),
                None => editor.select(&table, PositionType::Before),
            }
        }
    });
}
