//! Content Model: the structured document representation
//!
//! The Content Model is a serializable tree describing editable content
//! independently of the live document tree. Blocks hold segments; table
//! blocks hold a grid of cells whose merge state is carried as span flags.
//! Nodes may keep a `cached_element` handle back into the tree they were
//! built from so that write-back can reuse existing elements; those handles
//! are transient and never serialize.

use serde::{Deserialize, Serialize};

use crate::dom::NodeRef;

/// Character-level formatting carried by text segments.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SegmentFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl SegmentFormat {
    pub fn is_plain(&self) -> bool {
        *self == SegmentFormat::default()
    }
}

/// Inline content inside a paragraph.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "segment_type")]
pub enum ContentModelSegment {
    Text {
        text: String,
        format: SegmentFormat,
        is_selected: bool,
    },
    Br,
    Image {
        src: String,
        is_selected: bool,
    },
    /// A collapsed caret inside the content.
    SelectionMarker,
}

impl ContentModelSegment {
    pub fn text(text: &str, format: SegmentFormat, is_selected: bool) -> ContentModelSegment {
        ContentModelSegment::Text {
            text: text.to_string(),
            format,
            is_selected,
        }
    }
}

/// A run of inline content. Implicit paragraphs have no element of their
/// own in the source tree (loose inline content under the root).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContentModelParagraph {
    pub segments: Vec<ContentModelSegment>,
    pub is_implicit: bool,
    #[serde(skip)]
    pub cached_element: Option<NodeRef>,
}

/// One grid slot of a table. A merged cell appears once with content and
/// again as spanned slots flagged `span_left`/`span_above`.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContentModelTableCell {
    pub span_left: bool,
    pub span_above: bool,
    pub is_header: bool,
    pub is_selected: bool,
    pub blocks: Vec<ContentModelBlock>,
    #[serde(skip)]
    pub cached_element: Option<NodeRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContentModelTable {
    pub rows: Vec<Vec<ContentModelTableCell>>,
    #[serde(skip)]
    pub cached_element: Option<NodeRef>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentModelDivider {
    pub tag: String,
    #[serde(skip)]
    pub cached_element: Option<NodeRef>,
}

/// Block-level content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "block_type")]
pub enum ContentModelBlock {
    Paragraph(ContentModelParagraph),
    Table(ContentModelTable),
    Divider(ContentModelDivider),
}

/// Root of the Content Model.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ContentModelDocument {
    pub blocks: Vec<ContentModelBlock>,
}

/// Deep structural clone of a model.
///
/// The clone shares nothing with the source: every `cached_element` handle
/// is dropped, so a model built under a shadow edit overlay can be handed
/// out without the overlay's live nodes leaking through it.
pub fn clone_model(model: &ContentModelDocument) -> ContentModelDocument {
    ContentModelDocument {
        blocks: model.blocks.iter().map(clone_block).collect(),
    }
}

fn clone_block(block: &ContentModelBlock) -> ContentModelBlock {
    match block {
        ContentModelBlock::Paragraph(para) => ContentModelBlock::Paragraph(ContentModelParagraph {
            segments: para.segments.clone(),
            is_implicit: para.is_implicit,
            cached_element: None,
        }),
        ContentModelBlock::Table(table) => ContentModelBlock::Table(ContentModelTable {
            rows: table
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| ContentModelTableCell {
                            span_left: cell.span_left,
                            span_above: cell.span_above,
                            is_header: cell.is_header,
                            is_selected: cell.is_selected,
                            blocks: cell.blocks.iter().map(clone_block).collect(),
                            cached_element: None,
                        })
                        .collect()
                })
                .collect(),
            cached_element: None,
        }),
        ContentModelBlock::Divider(divider) => ContentModelBlock::Divider(ContentModelDivider {
            tag: divider.tag.clone(),
            cached_element: None,
        }),
    }
}
