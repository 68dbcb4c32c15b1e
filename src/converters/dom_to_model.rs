//! DOM to Content Model conversion
//!
//! Walks a document subtree and produces a Content Model, marking selection
//! state along the way. Conversion of specific tags can be replaced through
//! processor overrides; tables route through the specialized table
//! processor, which projects the element onto a virtual table grid so
//! merged cells come out as span-flagged grid slots.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::converters::context::EditorContext;
use crate::converters::options::{DomToModelOptions, ElementProcessor};
use crate::dom::{NodeRef, Position};
use crate::models::{
    ContentModelBlock, ContentModelDivider, ContentModelDocument, ContentModelParagraph,
    ContentModelSegment, ContentModelTable, ContentModelTableCell, DomRange, SegmentFormat,
    SelectionDescriptor,
};
use crate::table::VirtualTable;

lazy_static! {
    /// Builder-level default processors; option layers override per tag.
    static ref DEFAULT_PROCESSORS: HashMap<String, ElementProcessor> = {
        let mut map: HashMap<String, ElementProcessor> = HashMap::new();
        map.insert("table".to_string(), table_processor);
        map
    };
}

/// Mutable state threaded through one conversion.
pub struct DomToModelContext {
    pub editor_context: EditorContext,
    /// The selection snapshot, exactly as handed in. Degenerate shapes are
    /// kept, they simply mark nothing.
    pub selection: SelectionDescriptor,
    pub disable_cache_element: bool,
    processors: HashMap<String, ElementProcessor>,
    range: Option<DomRange>,
    in_selection: bool,
    marker_emitted: bool,
}

impl DomToModelContext {
    pub fn new(
        options: &DomToModelOptions,
        editor_context: EditorContext,
        selection: SelectionDescriptor,
    ) -> DomToModelContext {
        let mut processors = DEFAULT_PROCESSORS.clone();
        if let Some(overrides) = &options.processor_override {
            for (tag, processor) in overrides {
                processors.insert(tag.clone(), *processor);
            }
        }
        let range = match &selection {
            SelectionDescriptor::Ranges(ranges) => ranges.first().cloned(),
            _ => None,
        };
        DomToModelContext {
            editor_context,
            selection,
            disable_cache_element: options.disable_cache_element.unwrap_or(false),
            processors,
            range,
            in_selection: false,
            marker_emitted: false,
        }
    }

    fn processor_for(&self, tag: &str) -> Option<ElementProcessor> {
        self.processors.get(&tag.to_ascii_lowercase()).copied()
    }

    fn cache_element(&self, element: &NodeRef) -> Option<NodeRef> {
        if self.disable_cache_element {
            None
        } else {
            Some(element.clone())
        }
    }
}

/// Convert a subtree to a Content Model.
pub fn dom_to_content_model(
    root: &NodeRef,
    options: &DomToModelOptions,
    editor_context: &EditorContext,
    selection: &SelectionDescriptor,
) -> ContentModelDocument {
    let mut context = DomToModelContext::new(options, editor_context.clone(), selection.clone());
    let blocks = if options.include_root.unwrap_or(false) {
        let mut collector = BlockCollector::default();
        process_node(root, &mut collector, &mut context, SegmentFormat::default());
        collector.finish()
    } else {
        build_block_group(root, &mut context)
    };
    log::debug!("built content model with {} top-level blocks", blocks.len());
    ContentModelDocument { blocks }
}

/// Convert an element's children into a block list.
pub fn build_block_group(element: &NodeRef, context: &mut DomToModelContext) -> Vec<ContentModelBlock> {
    let mut collector = BlockCollector::default();
    process_children(element, &mut collector, context, SegmentFormat::default());
    collector.finish()
}

/// The specialized table processor: projects the table onto a virtual
/// table grid, emitting one model cell per grid slot. Merged cells carry
/// content at their origin slot and span flags everywhere else; unclaimed
/// slots of irregular tables become empty non-spanning cells.
pub fn table_processor(
    blocks: &mut Vec<ContentModelBlock>,
    element: &NodeRef,
    context: &mut DomToModelContext,
) {
    let vtable = VirtualTable::from_table(element);
    let rect = match &context.selection {
        SelectionDescriptor::TableRect(sel) if sel.table.same(element) => sel.normalized(),
        _ => None,
    };
    let mut rows = Vec::with_capacity(vtable.row_count());
    for r in 0..vtable.row_count() {
        let mut row = Vec::with_capacity(vtable.column_count());
        for c in 0..vtable.column_count() {
            let is_selected = rect
                .map(|(r0, c0, r1, c1)| r >= r0 && r <= r1 && c >= c0 && c <= c1)
                .unwrap_or(false);
            let cell = match vtable.slot(r, c) {
                None => ContentModelTableCell {
                    is_selected,
                    ..ContentModelTableCell::default()
                },
                Some(_) if vtable.is_origin(r, c) => {
                    let td = vtable
                        .get_cell(r as isize, c as isize)
                        .td
                        .unwrap_or_else(|| NodeRef::element("td"));
                    ContentModelTableCell {
                        is_header: td.is_tag("th"),
                        is_selected,
                        blocks: build_block_group(&td, context),
                        cached_element: context.cache_element(&td),
                        ..ContentModelTableCell::default()
                    }
                }
                Some(_) => ContentModelTableCell {
                    span_left: vtable.is_spanned_left(r, c),
                    span_above: vtable.is_spanned_above(r, c),
                    is_selected,
                    ..ContentModelTableCell::default()
                },
            };
            row.push(cell);
        }
        rows.push(row);
    }
    blocks.push(ContentModelBlock::Table(ContentModelTable {
        rows,
        cached_element: context.cache_element(element),
    }));
}

#[derive(Default)]
struct BlockCollector {
    blocks: Vec<ContentModelBlock>,
    paragraph: Option<ContentModelParagraph>,
}

impl BlockCollector {
    fn segment_sink(&mut self) -> &mut ContentModelParagraph {
        self.paragraph.get_or_insert_with(|| ContentModelParagraph {
            is_implicit: true,
            ..ContentModelParagraph::default()
        })
    }

    fn flush(&mut self) {
        if let Some(paragraph) = self.paragraph.take() {
            if !paragraph.segments.is_empty() || !paragraph.is_implicit {
                self.blocks.push(ContentModelBlock::Paragraph(paragraph));
            }
        }
    }

    fn finish(mut self) -> Vec<ContentModelBlock> {
        self.flush();
        self.blocks
    }
}

fn process_children(
    parent: &NodeRef,
    collector: &mut BlockCollector,
    context: &mut DomToModelContext,
    format: SegmentFormat,
) {
    let children = parent.children();
    for (index, child) in children.iter().enumerate() {
        check_range_boundary(parent, index, collector, context);
        process_node(child, collector, context, format);
    }
    check_range_boundary(parent, children.len(), collector, context);
}

fn process_node(
    node: &NodeRef,
    collector: &mut BlockCollector,
    context: &mut DomToModelContext,
    format: SegmentFormat,
) {
    if node.is_text() {
        process_text(node, collector, context, format);
        return;
    }
    let tag = match node.tag() {
        Some(tag) => tag,
        None => return,
    };
    if let Some(processor) = context.processor_for(&tag) {
        collector.flush();
        processor(&mut collector.blocks, node, context);
        return;
    }
    match tag.as_str() {
        "BR" => {
            collector.segment_sink().segments.push(ContentModelSegment::Br);
        }
        "IMG" => {
            let is_selected = match &context.selection {
                SelectionDescriptor::Object(selected) => selected.same(node),
                _ => context.in_selection,
            };
            collector.segment_sink().segments.push(ContentModelSegment::Image {
                src: node.attr("src").unwrap_or_default(),
                is_selected,
            });
        }
        "B" | "STRONG" => {
            process_children(node, collector, context, SegmentFormat { bold: true, ..format });
        }
        "I" | "EM" => {
            process_children(node, collector, context, SegmentFormat { italic: true, ..format });
        }
        "U" => {
            process_children(
                node,
                collector,
                context,
                SegmentFormat {
                    underline: true,
                    ..format
                },
            );
        }
        "SPAN" | "FONT" | "A" => {
            process_children(node, collector, context, format_from_styles(node, format));
        }
        "HR" => {
            collector.flush();
            collector.blocks.push(ContentModelBlock::Divider(ContentModelDivider {
                tag: "hr".to_string(),
                cached_element: context.cache_element(node),
            }));
        }
        "DIV" | "P" | "LI" | "BLOCKQUOTE" | "H1" | "H2" | "H3" | "H4" | "H5" | "H6" | "PRE"
        | "TD" | "TH" | "TR" | "UL" | "OL" => {
            process_block_element(node, collector, context, format);
        }
        _ => {
            // Unknown inline-ish element: convert transparently.
            process_children(node, collector, context, format);
        }
    }
}

fn process_block_element(
    node: &NodeRef,
    collector: &mut BlockCollector,
    context: &mut DomToModelContext,
    format: SegmentFormat,
) {
    collector.flush();
    collector.paragraph = Some(ContentModelParagraph {
        segments: Vec::new(),
        is_implicit: false,
        cached_element: context.cache_element(node),
    });
    process_children(node, collector, context, format);
    collector.flush();
}

/// Toggle selection state when the walk reaches a range endpoint anchored
/// at an element child boundary.
fn check_range_boundary(
    parent: &NodeRef,
    index: usize,
    collector: &mut BlockCollector,
    context: &mut DomToModelContext,
) {
    let Some(range) = context.range.clone() else {
        return;
    };
    let at = |position: &Position| position.node.same(parent) && position.offset == index;
    if range.is_collapsed() {
        if at(&range.start) && !context.marker_emitted {
            collector
                .segment_sink()
                .segments
                .push(ContentModelSegment::SelectionMarker);
            context.marker_emitted = true;
        }
        return;
    }
    if at(&range.start) {
        context.in_selection = true;
    }
    if at(&range.end) {
        context.in_selection = false;
    }
}

fn process_text(
    node: &NodeRef,
    collector: &mut BlockCollector,
    context: &mut DomToModelContext,
    format: SegmentFormat,
) {
    let text = node.text_value().unwrap_or_default();
    if text.is_empty() {
        return;
    }
    // Whitespace between blocks is layout noise, not content.
    if collector.paragraph.is_none() && text.chars().all(char::is_whitespace) {
        return;
    }

    let range = context.range.clone();
    let starts_here = range
        .as_ref()
        .map(|r| r.start.node.same(node))
        .unwrap_or(false);
    let ends_here = range.as_ref().map(|r| r.end.node.same(node)).unwrap_or(false);

    if !starts_here && !ends_here {
        let is_selected = context.in_selection;
        push_text(collector, &text, format, is_selected);
        return;
    }

    let range = range.unwrap_or_else(|| DomRange::collapsed(Position {
        node: node.clone(),
        offset: 0,
    }));
    let chars: Vec<char> = text.chars().collect();
    let clamp = |offset: usize| offset.min(chars.len());

    if range.is_collapsed() && starts_here {
        let split = clamp(range.start.offset);
        push_text(collector, &collect(&chars[..split]), format, false);
        if !context.marker_emitted {
            collector
                .segment_sink()
                .segments
                .push(ContentModelSegment::SelectionMarker);
            context.marker_emitted = true;
        }
        push_text(collector, &collect(&chars[split..]), format, false);
        return;
    }

    let start = if starts_here { clamp(range.start.offset) } else { 0 };
    let end = if ends_here { clamp(range.end.offset) } else { chars.len() };
    let (start, end) = (start.min(end), end.max(start));

    if starts_here {
        push_text(collector, &collect(&chars[..start]), format, false);
        context.in_selection = true;
    } else {
        push_text(collector, &collect(&chars[..start]), format, context.in_selection);
    }
    push_text(collector, &collect(&chars[start..end]), format, true);
    if ends_here {
        context.in_selection = false;
        push_text(collector, &collect(&chars[end..]), format, false);
    } else {
        push_text(collector, &collect(&chars[end..]), format, context.in_selection);
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

fn push_text(collector: &mut BlockCollector, text: &str, format: SegmentFormat, is_selected: bool) {
    if text.is_empty() {
        return;
    }
    collector
        .segment_sink()
        .segments
        .push(ContentModelSegment::text(text, format, is_selected));
}

fn format_from_styles(node: &NodeRef, base: SegmentFormat) -> SegmentFormat {
    let mut format = base;
    if let Some(weight) = node.style("font-weight") {
        if weight == "bold" || weight.parse::<u32>().map(|w| w >= 600).unwrap_or(false) {
            format.bold = true;
        }
    }
    if node.style("font-style").as_deref() == Some("italic") {
        format.italic = true;
    }
    if let Some(decoration) = node.style("text-decoration") {
        if decoration.contains("underline") {
            format.underline = true;
        }
    }
    format
}
