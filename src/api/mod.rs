//! WASM API for the rich text editor
//!
//! JavaScript-facing entry points. The editor instance is owned on the Rust
//! side in a thread-local slot (the module is single-threaded by contract);
//! JavaScript initializes it with HTML content, dispatches keyboard events
//! into it, and renders the HTML handed back after each operation.

use wasm_bindgen::prelude::*;

use crate::dom::PositionType;
use crate::editor::{Editor, Key, PluginEvent};
use crate::models::Coordinate;
use crate::table::{
    dispatch_table_event, edit_table, insert_table, select_table_cells, TableFormat,
    TableOperation,
};

use std::cell::RefCell;

thread_local! {
    /// The editor instance owned by this module. Holds Rc-based tree state,
    /// so it lives in a thread-local rather than a sync global.
    static EDITOR: RefCell<Option<Editor>> = RefCell::new(None);
}

fn with_editor<R>(f: impl FnOnce(&mut Editor) -> R) -> Result<R, JsValue> {
    EDITOR.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_mut() {
            Some(editor) => Ok(f(editor)),
            None => Err(JsValue::from_str("editor not initialized")),
        }
    })
}

/// Create the editor over initial HTML content.
#[wasm_bindgen(js_name = initEditor)]
pub fn init_editor(html: &str) -> Result<(), JsValue> {
    let editor = Editor::new(html).map_err(|e| JsValue::from_str(&e.to_string()))?;
    EDITOR.with(|slot| {
        *slot.borrow_mut() = Some(editor);
    });
    log::info!("editor initialized");
    Ok(())
}

/// Serialized editor content.
#[wasm_bindgen(js_name = getContent)]
pub fn get_content() -> Result<String, JsValue> {
    with_editor(|editor| editor.get_content())
}

/// Replace the editor content.
#[wasm_bindgen(js_name = setContent)]
pub fn set_content(html: &str) -> Result<(), JsValue> {
    with_editor(|editor| {
        editor
            .set_content(html)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    })?
}

/// Build (or reuse) the Content Model and hand it to JavaScript.
#[wasm_bindgen(js_name = getContentModel)]
pub fn get_content_model() -> Result<JsValue, JsValue> {
    with_editor(|editor| {
        let model = editor.get_content_model();
        let model = model.borrow();
        serde_wasm_bindgen::to_value(&*model).map_err(|e| JsValue::from_str(&e.to_string()))
    })?
}

/// Enable or disable cached-model reuse.
#[wasm_bindgen(js_name = setReuseModel)]
pub fn set_reuse_model(enabled: bool) -> Result<(), JsValue> {
    with_editor(|editor| {
        editor.core.reuse_model = enabled;
    })
}

/// Insert a `columns` x `rows` table at the cursor with default format.
#[wasm_bindgen(js_name = insertTable)]
pub fn insert_table_api(columns: usize, rows: usize) -> Result<(), JsValue> {
    with_editor(|editor| {
        insert_table(editor, columns, rows, Some(TableFormat::default()));
        editor.flush_deferred();
    })
}

/// Apply a structural table operation; see `TableOperation` for the codes.
#[wasm_bindgen(js_name = editTable)]
pub fn edit_table_api(operation_code: u8) -> Result<bool, JsValue> {
    let operation = TableOperation::from_code(operation_code)
        .ok_or_else(|| JsValue::from_str("unknown table operation"))?;
    with_editor(|editor| {
        let handled = edit_table(editor, operation);
        editor.flush_deferred();
        handled
    })
}

/// Dispatch a keydown into the feature table. Returns true when handled
/// (the host should then prevent the browser default).
#[wasm_bindgen(js_name = keyDown)]
pub fn key_down(key_code: u32, shift: bool) -> Result<bool, JsValue> {
    let Some(key) = Key::from_code(key_code) else {
        return Ok(false);
    };
    with_editor(|editor| {
        let event = PluginEvent::key_down(key, shift);
        let handled = dispatch_table_event(editor, &event);
        editor.flush_deferred();
        handled
    })
}

/// Select a rectangle of table cells in the table at the cursor.
#[wasm_bindgen(js_name = selectTableCells)]
pub fn select_table_cells_api(
    first_x: usize,
    first_y: usize,
    last_x: usize,
    last_y: usize,
) -> Result<bool, JsValue> {
    with_editor(|editor| {
        let Some(table) = editor.get_element_at_cursor(&["TABLE"], None) else {
            return false;
        };
        select_table_cells(
            editor,
            &table,
            Coordinate::new(first_x, first_y),
            Coordinate::new(last_x, last_y),
        );
        true
    })
}

/// Move the caret to the start of a cell by grid coordinates.
#[wasm_bindgen(js_name = focusCell)]
pub fn focus_cell(row: usize, col: usize) -> Result<bool, JsValue> {
    with_editor(|editor| {
        let Some(table) = first_table(editor) else {
            return false;
        };
        let vtable = crate::table::VirtualTable::from_table(&table);
        match vtable.get_cell(row as isize, col as isize).td {
            Some(td) => {
                editor.select(&td, PositionType::Begin);
                true
            }
            None => false,
        }
    })
}

/// Row-by-row cell tags of the first table, for render debugging.
#[wasm_bindgen(js_name = getTableMap)]
pub fn get_table_map() -> Result<js_sys::Array, JsValue> {
    with_editor(|editor| {
        let rows = js_sys::Array::new();
        if let Some(table) = first_table(editor) {
            let vtable = crate::table::VirtualTable::from_table(&table);
            for r in 0..vtable.row_count() {
                let row = js_sys::Array::new();
                for c in 0..vtable.column_count() {
                    let label = match vtable.get_cell(r as isize, c as isize).td {
                        Some(td) => {
                            if vtable.is_origin(r, c) {
                                td.tag().unwrap_or_default()
                            } else {
                                "SPAN".to_string()
                            }
                        }
                        None => "NULL".to_string(),
                    };
                    row.push(&JsValue::from_str(&label));
                }
                rows.push(&row);
            }
        }
        rows
    })
}

#[wasm_bindgen(js_name = undoEdit)]
pub fn undo_edit() -> Result<bool, JsValue> {
    with_editor(|editor| editor.undo())
}

#[wasm_bindgen(js_name = redoEdit)]
pub fn redo_edit() -> Result<bool, JsValue> {
    with_editor(|editor| editor.redo())
}

fn first_table(editor: &Editor) -> Option<crate::dom::NodeRef> {
    editor
        .content_root()
        .children()
        .into_iter()
        .find(|node| node.is_tag("table"))
}
