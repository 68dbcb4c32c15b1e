//! HTML serialization of the editor document tree
//!
//! Used for undo snapshots, the JS hand-off, and test assertions.
//! Attributes and styles serialize in sorted order so equivalent trees
//! produce identical markup.

use lazy_static::lazy_static;
use std::collections::HashSet;

use super::node::NodeRef;

lazy_static! {
    /// Elements serialized without a closing tag.
    pub static ref VOID_TAGS: HashSet<&'static str> = {
        ["BR", "HR", "IMG", "INPUT", "COL", "AREA", "BASE", "EMBED",
         "LINK", "META", "SOURCE", "TRACK", "WBR"]
            .into_iter()
            .collect()
    };
}

/// Serialize a node and its subtree to HTML.
pub fn to_html(node: &NodeRef) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

/// Serialize only the children of a node, the form used for editor content
/// snapshots (the content root itself is host chrome, not content).
pub fn children_to_html(node: &NodeRef) -> String {
    let mut out = String::new();
    for child in node.children() {
        write_node(&child, &mut out);
    }
    out
}

fn write_node(node: &NodeRef, out: &mut String) {
    if let Some(text) = node.text_value() {
        out.push_str(&escape_text(&text));
        return;
    }
    let tag = match node.tag() {
        Some(tag) => tag.to_ascii_lowercase(),
        None => return,
    };
    out.push('<');
    out.push_str(&tag);
    for (name, value) in node.attributes() {
        out.push(' ');
        out.push_str(&name);
        out.push_str("=\"");
        out.push_str(&escape_attr(&value));
        out.push('"');
    }
    let styles = node.styles();
    if !styles.is_empty() {
        out.push_str(" style=\"");
        let mut first = true;
        for (name, value) in styles {
            if !first {
                out.push(' ');
            }
            first = false;
            out.push_str(&name);
            out.push_str(": ");
            out.push_str(&escape_attr(&value));
            out.push(';');
        }
        out.push('"');
    }
    out.push('>');
    if VOID_TAGS.contains(node.tag().unwrap_or_default().as_str()) {
        return;
    }
    for child in node.children() {
        write_node(&child, out);
    }
    out.push_str("</");
    out.push_str(&tag);
    out.push('>');
}

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_attributes_and_styles() {
        let td = NodeRef::element("td");
        td.set_attr("rowspan", "2");
        td.set_style("width", "120px");
        td.append_child(&NodeRef::text("a & b"));

        assert_eq!(
            to_html(&td),
            "<td rowspan=\"2\" style=\"width: 120px;\">a &amp; b</td>"
        );
    }

    #[test]
    fn test_void_tags_have_no_close() {
        let td = NodeRef::element("td");
        td.append_child(&NodeRef::element("br"));
        assert_eq!(to_html(&td), "<td><br></td>");
    }

    #[test]
    fn test_children_to_html_skips_root() {
        let root = NodeRef::element("div");
        root.append_child(&NodeRef::text("x"));
        assert_eq!(children_to_html(&root), "x");
    }
}
