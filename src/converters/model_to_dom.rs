//! Content Model to DOM write-back
//!
//! Materializes a model into a target element, replacing its previous
//! content. Blocks reuse their `cached_element` handles when present so
//! unchanged subtrees keep their node identity; otherwise fresh elements
//! are created. Returns the caret position encoded by a selection marker,
//! if the model carries one, so the host can restore focus.

use crate::dom::{NodeRef, Position};
use crate::models::{
    ContentModelBlock, ContentModelDocument, ContentModelParagraph, ContentModelSegment,
    ContentModelTable, SegmentFormat,
};

/// Write a model into `target`, replacing its children.
pub fn content_model_to_dom(model: &ContentModelDocument, target: &NodeRef) -> Option<Position> {
    target.clear_children();
    let mut caret = None;
    for block in &model.blocks {
        write_block(block, target, &mut caret);
    }
    caret
}

fn write_block(block: &ContentModelBlock, parent: &NodeRef, caret: &mut Option<Position>) {
    match block {
        ContentModelBlock::Paragraph(paragraph) => write_paragraph(paragraph, parent, caret),
        ContentModelBlock::Table(table) => write_table(table, parent, caret),
        ContentModelBlock::Divider(divider) => {
            let element = divider
                .cached_element
                .clone()
                .unwrap_or_else(|| NodeRef::element(&divider.tag));
            parent.append_child(&element);
        }
    }
}

fn write_paragraph(
    paragraph: &ContentModelParagraph,
    parent: &NodeRef,
    caret: &mut Option<Position>,
) {
    let container = if paragraph.is_implicit {
        parent.clone()
    } else {
        let element = match &paragraph.cached_element {
            Some(element) => {
                element.clear_children();
                element.clone()
            }
            None => NodeRef::element("div"),
        };
        parent.append_child(&element);
        element
    };
    for segment in &paragraph.segments {
        write_segment(segment, &container, caret);
    }
}

fn write_segment(segment: &ContentModelSegment, container: &NodeRef, caret: &mut Option<Position>) {
    match segment {
        ContentModelSegment::Text { text, format, .. } => {
            let node = NodeRef::text(text);
            container.append_child(&wrap_with_format(node, format));
        }
        ContentModelSegment::Br => {
            container.append_child(&NodeRef::element("br"));
        }
        ContentModelSegment::Image { src, .. } => {
            let img = NodeRef::element("img");
            img.set_attr("src", src);
            container.append_child(&img);
        }
        ContentModelSegment::SelectionMarker => {
            // The caret lands where the marker would have been.
            if caret.is_none() {
                *caret = Some(Position {
                    node: container.clone(),
                    offset: container.child_count(),
                });
            }
        }
    }
}

fn wrap_with_format(node: NodeRef, format: &SegmentFormat) -> NodeRef {
    let mut wrapped = node;
    if format.underline {
        wrapped = wrap(wrapped, "u");
    }
    if format.italic {
        wrapped = wrap(wrapped, "i");
    }
    if format.bold {
        wrapped = wrap(wrapped, "b");
    }
    wrapped
}

fn wrap(node: NodeRef, tag: &str) -> NodeRef {
    let wrapper = NodeRef::element(tag);
    wrapper.append_child(&node);
    wrapper
}

fn write_table(table: &ContentModelTable, parent: &NodeRef, caret: &mut Option<Position>) {
    let element = match &table.cached_element {
        Some(element) => {
            element.clear_children();
            element.clone()
        }
        None => NodeRef::element("table"),
    };
    parent.append_child(&element);
    for (r, row) in table.rows.iter().enumerate() {
        let tr = NodeRef::element("tr");
        for (c, cell) in row.iter().enumerate() {
            if cell.span_left || cell.span_above {
                continue;
            }
            let td = match &cell.cached_element {
                Some(td) => {
                    td.clear_children();
                    td.clone()
                }
                None => NodeRef::element(if cell.is_header { "th" } else { "td" }),
            };
            // Spans are re-derived from the span flags of following slots.
            let mut col_span = 1;
            while c + col_span < row.len() && row[c + col_span].span_left {
                col_span += 1;
            }
            let mut row_span = 1;
            while r + row_span < table.rows.len()
                && table.rows[r + row_span]
                    .get(c)
                    .map(|below| below.span_above)
                    .unwrap_or(false)
            {
                row_span += 1;
            }
            if col_span > 1 {
                td.set_attr("colspan", &col_span.to_string());
            } else {
                td.remove_attr("colspan");
            }
            if row_span > 1 {
                td.set_attr("rowspan", &row_span.to_string());
            } else {
                td.remove_attr("rowspan");
            }
            for block in &cell.blocks {
                write_block(block, &td, caret);
            }
            if td.child_count() == 0 {
                td.append_child(&NodeRef::element("br"));
            }
            tr.append_child(&td);
        }
        element.append_child(&tr);
    }
}
