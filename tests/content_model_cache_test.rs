// Cache and shadow-edit protocol for Content Model access

use std::cell::Cell;
use std::rc::Rc;

use richedit_wasm::converters::{DomToModelOptions, EditorContext};
use richedit_wasm::dom::NodeRef;
use richedit_wasm::editor::{create_content_model, CoreApi, Editor};
use richedit_wasm::models::SelectionDescriptor;

/// Helper wiring counting collaborators into an editor.
fn instrument(editor: &mut Editor) -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
    let context_calls = Rc::new(Cell::new(0));
    let selection_calls = Rc::new(Cell::new(0));
    let context_counter = context_calls.clone();
    let selection_counter = selection_calls.clone();
    editor.core.api = CoreApi {
        create_editor_context: Box::new(move |_| {
            context_counter.set(context_counter.get() + 1);
            EditorContext::default()
        }),
        read_selection: Box::new(move |core| {
            selection_counter.set(selection_counter.get() + 1);
            core.selection.to_descriptor()
        }),
    };
    (context_calls, selection_calls)
}

#[test]
fn test_repeated_builds_without_reuse_rebuild_each_time() {
    let mut editor = Editor::new("<div>hello</div>").unwrap();
    let (context_calls, selection_calls) = instrument(&mut editor);

    let first = editor.get_content_model();
    let second = editor.get_content_model();

    assert_eq!(context_calls.get(), 2);
    assert_eq!(selection_calls.get(), 2);
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(*first.borrow(), *second.borrow());
}

#[test]
fn test_reuse_returns_identical_model_without_collaborator_calls() {
    let mut editor = Editor::new("<div>hello</div>").unwrap();
    editor.core.reuse_model = true;
    let first = editor.get_content_model();

    let (context_calls, selection_calls) = instrument(&mut editor);
    let second = editor.get_content_model();

    assert_eq!(context_calls.get(), 0);
    assert_eq!(selection_calls.get(), 0);
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn test_shadow_edit_hands_out_clones() {
    let mut editor = Editor::new("<div>hello</div>").unwrap();
    editor.core.reuse_model = true;
    editor.core.default_dom_to_model_options = Some(DomToModelOptions {
        disable_cache_element: Some(true),
        ..DomToModelOptions::default()
    });
    let committed = editor.get_content_model();

    editor.start_shadow_edit();
    let (context_calls, selection_calls) = instrument(&mut editor);
    let overlay_view = editor.create_content_model(None);

    // No rebuild, but a distinct deep-equal model.
    assert_eq!(context_calls.get(), 0);
    assert_eq!(selection_calls.get(), 0);
    assert!(!Rc::ptr_eq(&committed, &overlay_view));
    assert_eq!(*committed.borrow(), *overlay_view.borrow());

    // Mutating the clone leaves the committed model untouched.
    overlay_view.borrow_mut().blocks.clear();
    assert!(!committed.borrow().blocks.is_empty());
}

#[test]
fn test_shadow_edit_restores_committed_content() {
    let mut editor = Editor::new("<div>committed</div>").unwrap();
    editor.start_shadow_edit();
    editor.set_content("<div>overlay</div>").unwrap();
    assert!(editor.get_content().contains("overlay"));

    editor.stop_shadow_edit();
    assert_eq!(editor.get_content(), "<div>committed</div>");
}

#[test]
fn test_structural_mutation_invalidates_cache() {
    let mut editor = Editor::new("<div>hello</div>").unwrap();
    editor.core.reuse_model = true;
    let first = editor.get_content_model();

    editor.with_undo_scope(|ed| {
        ed.content_root().append_child(&NodeRef::element("hr"));
    });
    let second = editor.get_content_model();

    assert!(!Rc::ptr_eq(&first, &second));
    // The rebuilt model sees the new divider.
    assert_eq!(
        second.borrow().blocks.len(),
        first.borrow().blocks.len() + 1
    );
}

#[test]
fn test_explicit_cache_management() {
    let mut editor = Editor::new("x").unwrap();
    editor.core.reuse_model = true;

    let model = editor.create_content_model(None);
    editor.cache_content_model(Some(model.clone()));
    assert!(Rc::ptr_eq(&editor.create_content_model(None), &model));

    editor.invalidate_model_cache();
    let rebuilt = editor.create_content_model(None);
    assert!(!Rc::ptr_eq(&rebuilt, &model));
}

#[test]
fn test_degenerate_selection_reaches_builder_unchanged() {
    let mut editor = Editor::new("hello").unwrap();
    let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let seen_in_api = seen.clone();
    editor.core.api.read_selection = Box::new(move |_| {
        let descriptor = SelectionDescriptor::Ranges(vec![]);
        seen_in_api.borrow_mut().push(descriptor.clone());
        descriptor
    });

    let with_empty = editor.create_content_model(None);

    assert_eq!(seen.borrow().len(), 1);
    assert_eq!(seen.borrow()[0], SelectionDescriptor::Ranges(vec![]));

    // The built model matches a plain no-selection build.
    let mut plain = Editor::new("hello").unwrap();
    let baseline = plain.get_content_model();
    assert_eq!(*with_empty.borrow(), *baseline.borrow());
}

#[test]
fn test_create_content_model_does_not_cache_by_itself() {
    let editor = Editor::new("x").unwrap();
    // reuse disabled, and create_content_model never writes the cache
    let _ = create_content_model(&editor.core, None);
    assert!(!editor.core.cache.has_model());
}
