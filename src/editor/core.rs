//! Editor core state and the model build orchestration
//!
//! `EditorCore` owns the content root, the model cache, and the collaborator
//! functions the build step calls. The collaborators live behind an api map
//! of boxed functions so tests can swap them for instrumented versions,
//! which is exactly how the cache protocol is verified.

use std::cell::RefCell;
use std::rc::Rc;

use crate::converters::{
    dom_to_content_model, merge_dom_to_model_options, DomToModelOptions, EditorContext,
};
use crate::dom::{NodeRef, Position, PositionType};
use crate::editor::cache::{ModelCache, SharedModel};
use crate::models::{
    clone_model, Coordinate, DomRange, SelectionDescriptor, TableRectSelection,
};

/// Live selection state of the editing surface. `read_selection` snapshots
/// this into a descriptor; the state itself keeps updating afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EditorSelection {
    #[default]
    None,
    Caret(Position),
    Range(DomRange),
    TableRect {
        table: NodeRef,
        first_cell: Option<Coordinate>,
        last_cell: Option<Coordinate>,
    },
    Object(NodeRef),
}

impl EditorSelection {
    /// Snapshot into the descriptor shape the model builder consumes.
    pub fn to_descriptor(&self) -> SelectionDescriptor {
        match self {
            EditorSelection::None => SelectionDescriptor::None,
            EditorSelection::Caret(position) => {
                SelectionDescriptor::Ranges(vec![DomRange::collapsed(position.clone())])
            }
            EditorSelection::Range(range) => SelectionDescriptor::Ranges(vec![range.clone()]),
            EditorSelection::TableRect {
                table,
                first_cell,
                last_cell,
            } => SelectionDescriptor::TableRect(TableRectSelection {
                table: table.clone(),
                first_cell: *first_cell,
                last_cell: *last_cell,
            }),
            EditorSelection::Object(node) => SelectionDescriptor::Object(node.clone()),
        }
    }
}

pub type CreateEditorContextFn = Box<dyn Fn(&EditorCore) -> EditorContext>;
pub type ReadSelectionFn = Box<dyn Fn(&EditorCore) -> SelectionDescriptor>;

/// Replaceable collaborator functions consulted on a fresh model build.
pub struct CoreApi {
    pub create_editor_context: CreateEditorContextFn,
    pub read_selection: ReadSelectionFn,
}

impl Default for CoreApi {
    fn default() -> Self {
        CoreApi {
            create_editor_context: Box::new(|core| core.context_defaults.clone()),
            read_selection: Box::new(|core| core.selection.to_descriptor()),
        }
    }
}

pub struct EditorCore {
    /// Root of the editable content. Everything the builder sees lives
    /// under this node.
    pub content_root: NodeRef,
    pub api: CoreApi,
    pub cache: ModelCache,
    /// Host-level switch allowing cached models to be returned without a
    /// rebuild.
    pub reuse_model: bool,
    /// Present while a shadow edit overlay is active; holds the committed
    /// content so leaving the overlay can restore it.
    pub shadow_edit_fragment: Option<NodeRef>,
    pub default_dom_to_model_options: Option<DomToModelOptions>,
    pub context_defaults: EditorContext,
    pub selection: EditorSelection,
}

impl EditorCore {
    pub fn new(content_root: NodeRef) -> EditorCore {
        EditorCore {
            content_root,
            api: CoreApi::default(),
            cache: ModelCache::default(),
            reuse_model: false,
            shadow_edit_fragment: None,
            default_dom_to_model_options: None,
            context_defaults: EditorContext::default(),
            selection: EditorSelection::None,
        }
    }

    pub fn is_in_shadow_edit(&self) -> bool {
        self.shadow_edit_fragment.is_some()
    }
}

/// Get or build the Content Model.
///
/// With reuse enabled and a cached model present, no collaborator runs: the
/// cached handle is returned as-is, or deep-cloned when a shadow edit
/// overlay is involved on either side of the hand-off. Otherwise context
/// and selection are read, options are merged (base table processor, then
/// host defaults, then caller options) and the builder runs.
///
/// Writing the result back into the cache is the caller's decision, not
/// this function's.
pub fn create_content_model(
    core: &EditorCore,
    option: Option<&DomToModelOptions>,
) -> SharedModel {
    if core.reuse_model {
        if let Some(cached) = core.cache.model() {
            if core.is_in_shadow_edit() || core.cache.is_under_shadow_edit() {
                log::debug!("model cache hit, cloning across shadow edit boundary");
                let cloned = clone_model(&cached.borrow());
                return Rc::new(RefCell::new(cloned));
            }
            log::debug!("model cache hit");
            return cached;
        }
    }
    let context = (core.api.create_editor_context)(core);
    let selection = (core.api.read_selection)(core);
    let options = merge_dom_to_model_options(
        core.default_dom_to_model_options.as_ref(),
        option,
    );
    let model = dom_to_content_model(&core.content_root, &options, &context, &selection);
    Rc::new(RefCell::new(model))
}

/// Locate the nearest ancestor matching one of `tags`, starting from
/// `from` (or the focused position), without escaping the content root.
pub fn element_at_cursor(
    core: &EditorCore,
    tags: &[&str],
    from: Option<&NodeRef>,
) -> Option<NodeRef> {
    let start = match from {
        Some(node) => node.clone(),
        None => focused_position(core)?.node,
    };
    let found = start.closest(tags)?;
    if core.content_root.contains(&found, false) {
        Some(found)
    } else {
        None
    }
}

/// The position that currently has focus, derived from the live selection.
pub fn focused_position(core: &EditorCore) -> Option<Position> {
    match &core.selection {
        EditorSelection::None => None,
        EditorSelection::Caret(position) => Some(position.clone()),
        EditorSelection::Range(range) => Some(range.start.clone()),
        EditorSelection::TableRect { table, .. } => {
            Some(Position::new(table, PositionType::Begin).normalize())
        }
        EditorSelection::Object(node) => Some(Position::new(node, PositionType::Before)),
    }
}
