// End-to-end table editing scenarios: keyboard navigation, structural
// edits, and undo behavior over the virtual table engine.

use richedit_wasm::dom::{NodeRef, PositionType};
use richedit_wasm::editor::{Editor, Key, PluginEvent};
use richedit_wasm::models::Coordinate;
use richedit_wasm::table::{
    dispatch_table_event, edit_table, insert_table, TableOperation, VirtualTable,
};

fn press(editor: &mut Editor, key: Key, shift: bool) -> bool {
    let event = PluginEvent::key_down(key, shift);
    let handled = dispatch_table_event(editor, &event);
    editor.flush_deferred();
    handled
}

fn table_of(editor: &Editor) -> NodeRef {
    editor
        .content_root()
        .children()
        .into_iter()
        .find(|node| node.is_tag("table"))
        .expect("table should exist")
}

fn focus_first_cell(editor: &mut Editor) {
    let td = table_of(editor).child(0).unwrap().child(0).unwrap();
    editor.select(&td, PositionType::Begin);
}

#[test]
fn test_tab_walks_every_cell_then_grows_the_table() {
    let mut editor =
        Editor::new("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>")
            .unwrap();
    focus_first_cell(&mut editor);

    // Three tabs walk b, c, d.
    for expected in ["b", "c", "d"] {
        assert!(press(&mut editor, Key::Tab, false));
        let focus = editor.get_focused_position().unwrap();
        let cell = focus.node.closest(&["TD"]).unwrap();
        assert_eq!(cell.inner_text(), expected);
    }

    // A fourth tab runs off the table and inserts a row.
    assert!(press(&mut editor, Key::Tab, false));
    let table = table_of(&editor);
    assert_eq!(table.child_count(), 3);
    let focus = editor.get_focused_position().unwrap();
    let cell = focus.node.closest(&["TD"]).unwrap();
    assert!(table.child(2).unwrap().contains(&cell, false));
}

#[test]
fn test_tab_through_merged_cell_visits_it_once() {
    let mut editor = Editor::new(
        "<table><tr><td colspan=\"2\">merged</td><td>b</td></tr></table>",
    )
    .unwrap();
    focus_first_cell(&mut editor);

    assert!(press(&mut editor, Key::Tab, false));
    let focus = editor.get_focused_position().unwrap();
    assert_eq!(focus.node.closest(&["TD"]).unwrap().inner_text(), "b");
}

#[test]
fn test_shift_tab_exits_before_table() {
    let mut editor = Editor::new("<p>before</p><table><tr><td>a</td></tr></table>").unwrap();
    let table = table_of(&editor);
    let td = table.child(0).unwrap().child(0).unwrap();
    editor.select(&td, PositionType::Begin);

    assert!(press(&mut editor, Key::Tab, true));
    let focus = editor.get_focused_position().unwrap();
    assert!(focus.node.same(&editor.content_root()));
    assert_eq!(focus.offset, table.index_in_parent().unwrap());
}

#[test]
fn test_down_at_bottom_exits_after_table() {
    let mut editor = Editor::new("<table><tr><td>a</td></tr></table><p>after</p>").unwrap();
    focus_first_cell(&mut editor);

    assert!(press(&mut editor, Key::Down, false));
    let focus = editor.get_focused_position().unwrap();
    assert!(focus.node.same(&editor.content_root()));
    assert_eq!(focus.offset, 1);
}

#[test]
fn test_structure_delete_then_undo_restores_spans() {
    let html = "<table><tr><td rowspan=\"2\" colspan=\"2\">a</td><td>b</td></tr>\
                <tr><td>c</td></tr><tr><td>d</td><td>e</td><td>f</td></tr></table>";
    let mut editor = Editor::new(html).unwrap();
    let before = editor.get_content();
    let table = table_of(&editor);

    editor.select_table_rect(&table, Coordinate::new(2, 0), Coordinate::new(2, 2));
    assert!(press(&mut editor, Key::Backspace, false));

    // Last column removed, merged cell survives.
    let vtable = VirtualTable::from_table(&table);
    assert_eq!(vtable.column_count(), 2);
    assert!(editor.get_content().contains("rowspan=\"2\""));

    assert!(editor.undo());
    assert_eq!(editor.get_content(), before);
}

#[test]
fn test_delete_contents_preserves_structure_once_per_merged_cell() {
    let html = "<table><tr><td rowspan=\"2\">m</td><td>b</td></tr><tr><td>c</td></tr></table>";
    let mut editor = Editor::new(html).unwrap();
    let table = table_of(&editor);
    editor.select_table_rect(&table, Coordinate::new(0, 0), Coordinate::new(1, 1));

    assert!(press(&mut editor, Key::Delete, false));

    let vtable = VirtualTable::from_table(&table);
    assert_eq!(vtable.row_count(), 2);
    for (r, c) in [(0, 0), (0, 1), (1, 1)] {
        let td = vtable.get_cell(r, c).td.unwrap();
        assert_eq!(td.inner_text(), "", "cell ({},{}) should be cleared", r, c);
    }
}

#[test]
fn test_insert_then_merge_then_split_roundtrip() {
    let mut editor = Editor::new("").unwrap();
    insert_table(&mut editor, 2, 2, None);
    editor.flush_deferred();
    let table = table_of(&editor);

    // Merge the top row.
    editor.select_table_rect(&table, Coordinate::new(0, 0), Coordinate::new(1, 0));
    assert!(edit_table(&mut editor, TableOperation::MergeCells));
    assert!(editor.get_content().contains("colspan=\"2\""));

    // Split it again.
    assert!(edit_table(&mut editor, TableOperation::SplitHorizontally));
    let vtable = VirtualTable::from_table(&table);
    assert_eq!(vtable.column_count(), 2);
    let a = vtable.get_cell(0, 0).td.unwrap();
    let b = vtable.get_cell(0, 1).td.unwrap();
    assert!(!a.same(&b));
}

#[test]
fn test_insert_column_right_of_merged_cell() {
    let html = "<table><tr><td colspan=\"2\">m</td></tr><tr><td>a</td><td>b</td></tr></table>";
    let mut editor = Editor::new(html).unwrap();
    let table = table_of(&editor);
    let merged = table.child(0).unwrap().child(0).unwrap();
    editor.select(&merged, PositionType::Begin);

    assert!(edit_table(&mut editor, TableOperation::InsertRight));

    let vtable = VirtualTable::from_table(&table);
    assert_eq!(vtable.column_count(), 3);
    // The merged cell still spans its original two columns.
    let m0 = vtable.get_cell(0, 0).td.unwrap();
    let m1 = vtable.get_cell(0, 1).td.unwrap();
    assert!(m0.same(&m1));
    assert!(!vtable.get_cell(0, 2).td.unwrap().same(&m0));
}

#[test]
fn test_every_operation_is_one_undo_step() {
    let mut editor =
        Editor::new("<table><tr><td>a</td><td>b</td></tr><tr><td>c</td><td>d</td></tr></table>")
            .unwrap();
    focus_first_cell(&mut editor);
    let initial = editor.get_content();

    assert!(edit_table(&mut editor, TableOperation::InsertBelow));
    let after_insert = editor.get_content();
    assert!(edit_table(&mut editor, TableOperation::DeleteColumn));

    assert!(editor.undo());
    assert_eq!(editor.get_content(), after_insert);
    assert!(editor.undo());
    assert_eq!(editor.get_content(), initial);
    assert!(editor.redo());
    assert_eq!(editor.get_content(), after_insert);
}
