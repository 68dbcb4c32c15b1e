//! Node tree for the editor's canonical DOM
//!
//! The editor owns its document tree on the Rust side; the browser DOM is a
//! projection rendered by JavaScript from what this module hands back.
//! Nodes are reference-counted so that derived views (positions, virtual
//! tables, cached model elements) can alias the same underlying node, with
//! pointer identity standing in for JS object identity.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

/// Shared handle to a node in the editor document tree.
#[derive(Clone)]
pub struct NodeRef(Rc<Node>);

pub struct Node {
    data: NodeData,
    parent: RefCell<Weak<Node>>,
}

enum NodeData {
    Element(RefCell<ElementData>),
    Text(RefCell<String>),
}

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    children: Vec<NodeRef>,
}

impl NodeRef {
    /// Create a new element node. Tags are normalized to uppercase.
    pub fn element(tag: &str) -> NodeRef {
        NodeRef(Rc::new(Node {
            data: NodeData::Element(RefCell::new(ElementData {
                tag: tag.to_ascii_uppercase(),
                attributes: BTreeMap::new(),
                styles: BTreeMap::new(),
                children: Vec::new(),
            })),
            parent: RefCell::new(Weak::new()),
        }))
    }

    /// Create a new text node.
    pub fn text(content: &str) -> NodeRef {
        NodeRef(Rc::new(Node {
            data: NodeData::Text(RefCell::new(content.to_string())),
            parent: RefCell::new(Weak::new()),
        }))
    }

    /// Pointer identity, the Rust rendering of JS object identity.
    pub fn same(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_element(&self) -> bool {
        matches!(self.0.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.0.data, NodeData::Text(_))
    }

    /// Uppercase tag name, or `None` for text nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Element(data) => Some(data.borrow().tag.clone()),
            NodeData::Text(_) => None,
        }
    }

    /// True if this is an element with the given (case-insensitive) tag.
    pub fn is_tag(&self, tag: &str) -> bool {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().tag.eq_ignore_ascii_case(tag),
            NodeData::Text(_) => false,
        }
    }

    /// Text content of a text node, or `None` for elements.
    pub fn text_value(&self) -> Option<String> {
        match &self.0.data {
            NodeData::Text(content) => Some(content.borrow().clone()),
            NodeData::Element(_) => None,
        }
    }

    pub fn set_text_value(&self, content: &str) {
        if let NodeData::Text(cell) = &self.0.data {
            *cell.borrow_mut() = content.to_string();
        }
    }

    /// Concatenated text of the whole subtree.
    pub fn inner_text(&self) -> String {
        match &self.0.data {
            NodeData::Text(content) => content.borrow().clone(),
            NodeData::Element(_) => {
                let mut out = String::new();
                for child in self.children() {
                    out.push_str(&child.inner_text());
                }
                out
            }
        }
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.0.parent.borrow().upgrade().map(NodeRef)
    }

    /// Snapshot of the child list. Handles are cheap to clone.
    pub fn children(&self) -> Vec<NodeRef> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().children.clone(),
            NodeData::Text(_) => Vec::new(),
        }
    }

    pub fn child_count(&self) -> usize {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().children.len(),
            NodeData::Text(_) => 0,
        }
    }

    pub fn child(&self, index: usize) -> Option<NodeRef> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().children.get(index).cloned(),
            NodeData::Text(_) => None,
        }
    }

    pub fn first_child(&self) -> Option<NodeRef> {
        self.child(0)
    }

    /// Append a child, detaching it from any previous parent first.
    pub fn append_child(&self, child: &NodeRef) {
        child.detach();
        if let NodeData::Element(data) = &self.0.data {
            data.borrow_mut().children.push(child.clone());
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
    }

    /// Insert a child at `index` (clamped to the child count).
    pub fn insert_child(&self, index: usize, child: &NodeRef) {
        child.detach();
        if let NodeData::Element(data) = &self.0.data {
            let mut data = data.borrow_mut();
            let index = index.min(data.children.len());
            data.children.insert(index, child.clone());
            *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        }
    }

    /// Remove a direct child. Returns false if `child` is not ours.
    pub fn remove_child(&self, child: &NodeRef) -> bool {
        if let NodeData::Element(data) = &self.0.data {
            let mut data = data.borrow_mut();
            if let Some(pos) = data.children.iter().position(|c| c.same(child)) {
                data.children.remove(pos);
                *child.0.parent.borrow_mut() = Weak::new();
                return true;
            }
        }
        false
    }

    /// Detach this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    pub fn clear_children(&self) {
        if let NodeData::Element(data) = &self.0.data {
            let children = std::mem::take(&mut data.borrow_mut().children);
            for child in &children {
                *child.0.parent.borrow_mut() = Weak::new();
            }
        }
    }

    /// Index of this node in its parent's child list.
    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        parent.children().iter().position(|c| c.same(self))
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().attributes.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_attr(&self, name: &str, value: &str) {
        if let NodeData::Element(data) = &self.0.data {
            data.borrow_mut()
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&self, name: &str) {
        if let NodeData::Element(data) = &self.0.data {
            data.borrow_mut().attributes.remove(name);
        }
    }

    /// Parse an attribute as usize, falling back to `default` on anything
    /// missing or malformed. Span attributes of irregular tables go through
    /// here, so garbage must degrade rather than fail.
    pub fn attr_usize(&self, name: &str, default: usize) -> usize {
        self.attr(name)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(default)
    }

    pub fn attributes(&self) -> BTreeMap<String, String> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().attributes.clone(),
            NodeData::Text(_) => BTreeMap::new(),
        }
    }

    pub fn style(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().styles.get(name).cloned(),
            NodeData::Text(_) => None,
        }
    }

    pub fn set_style(&self, name: &str, value: &str) {
        if let NodeData::Element(data) = &self.0.data {
            data.borrow_mut()
                .styles
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn styles(&self) -> BTreeMap<String, String> {
        match &self.0.data {
            NodeData::Element(data) => data.borrow().styles.clone(),
            NodeData::Text(_) => BTreeMap::new(),
        }
    }

    /// Nearest self-or-ancestor element matching one of `tags`.
    pub fn closest(&self, tags: &[&str]) -> Option<NodeRef> {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if let Some(tag) = node.tag() {
                if tags.iter().any(|t| tag.eq_ignore_ascii_case(t)) {
                    return Some(node);
                }
            }
            current = node.parent();
        }
        None
    }

    /// True if `other` is inside this subtree. With `treat_same_as_contain`
    /// a node also contains itself.
    pub fn contains(&self, other: &NodeRef, treat_same_as_contain: bool) -> bool {
        if self.same(other) {
            return treat_same_as_contain;
        }
        let mut current = other.parent();
        while let Some(node) = current {
            if node.same(self) {
                return true;
            }
            current = node.parent();
        }
        false
    }

    /// Structural copy of the element itself: tag, attributes, styles, no
    /// children.
    pub fn shallow_clone_element(&self) -> NodeRef {
        match &self.0.data {
            NodeData::Element(data) => {
                let data = data.borrow();
                let clone = NodeRef::element(&data.tag);
                if let NodeData::Element(clone_data) = &clone.0.data {
                    let mut clone_data = clone_data.borrow_mut();
                    clone_data.attributes = data.attributes.clone();
                    clone_data.styles = data.styles.clone();
                }
                clone
            }
            NodeData::Text(content) => NodeRef::text(&content.borrow()),
        }
    }

    /// Structural copy of the whole subtree.
    pub fn deep_clone(&self) -> NodeRef {
        let clone = self.shallow_clone_element();
        for child in self.children() {
            clone.append_child(&child.deep_clone());
        }
        clone
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            NodeData::Element(data) => write!(f, "<{}>", data.borrow().tag),
            NodeData::Text(content) => write!(f, "#text({:?})", content.borrow()),
        }
    }
}
