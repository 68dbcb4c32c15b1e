//! Recursive descent parser for editor HTML content
//!
//! This parses the subset of HTML the editor itself produces: elements with
//! attributes, text with basic entities, comments, void elements. Input is
//! round-tripped editor content, so the parser is strict about shape but
//! recovers defensively: unclosed elements close at end of input, and a
//! mismatched close tag pops to the nearest matching open element or is
//! dropped.

use thiserror::Error;

use crate::dom::{NodeRef, VOID_TAGS};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("unexpected end of input while parsing {0}")]
    UnexpectedEof(&'static str),
    #[error("malformed tag at byte offset {0}")]
    MalformedTag(usize),
}

/// Parse an HTML fragment into a list of top-level nodes.
pub fn parse_html(input: &str) -> Result<Vec<NodeRef>, ParseError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let root = NodeRef::element("div");
    parser.parse_children(&root)?;
    Ok(root.children())
}

/// Parse a fragment and append the resulting nodes to `target`.
pub fn parse_fragment_into(target: &NodeRef, input: &str) -> Result<(), ParseError> {
    for node in parse_html(input)? {
        target.append_child(&node);
    }
    Ok(())
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn eat(&mut self, ch: char) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Parse child content into `parent` until a close tag or end of input.
    /// Returns the tag name of the close tag that ended this run, if any.
    fn parse_children(&mut self, parent: &NodeRef) -> Result<Option<String>, ParseError> {
        loop {
            match self.peek() {
                None => return Ok(None),
                Some('<') => {
                    if self.peek_at(1) == Some('/') {
                        let tag = self.parse_close_tag()?;
                        return Ok(Some(tag));
                    } else if self.peek_at(1) == Some('!') {
                        self.skip_comment_or_doctype()?;
                    } else {
                        self.parse_element(parent)?;
                    }
                }
                Some(_) => {
                    let text = self.parse_text();
                    if !text.is_empty() {
                        parent.append_child(&NodeRef::text(&text));
                    }
                }
            }
        }
    }

    fn parse_text(&mut self) -> String {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '<' => break,
                '&' => {
                    self.pos += 1;
                    out.push_str(&self.parse_entity());
                }
                _ => {
                    out.push(ch);
                    self.pos += 1;
                }
            }
        }
        out
    }

    /// Entity after '&'. Unknown entities stay literal.
    fn parse_entity(&mut self) -> String {
        let start = self.pos;
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch == ';' {
                self.pos += 1;
                return match name.as_str() {
                    "amp" => "&".to_string(),
                    "lt" => "<".to_string(),
                    "gt" => ">".to_string(),
                    "quot" => "\"".to_string(),
                    "apos" => "'".to_string(),
                    "nbsp" => "\u{a0}".to_string(),
                    _ => {
                        if let Some(code) = name.strip_prefix('#') {
                            if let Some(ch) = parse_char_code(code) {
                                return ch.to_string();
                            }
                        }
                        format!("&{};", name)
                    }
                };
            }
            if ch.is_ascii_alphanumeric() || ch == '#' {
                name.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        // Not an entity after all
        self.pos = start;
        "&".to_string()
    }

    fn parse_element(&mut self, parent: &NodeRef) -> Result<(), ParseError> {
        let tag_start = self.pos;
        self.bump(); // '<'
        let tag = self.parse_name();
        if tag.is_empty() {
            return Err(ParseError::MalformedTag(tag_start));
        }
        let element = NodeRef::element(&tag);
        self.parse_attributes(&element)?;
        let self_closing = self.eat('/');
        if !self.eat('>') {
            return Err(ParseError::UnexpectedEof("tag"));
        }
        parent.append_child(&element);
        if self_closing || VOID_TAGS.contains(tag.to_ascii_uppercase().as_str()) {
            return Ok(());
        }
        match self.parse_children(&element)? {
            None => Ok(()), // unclosed, closes at end of input
            Some(close) if close.eq_ignore_ascii_case(&tag) => Ok(()),
            Some(close) => {
                // Mismatched close: if an ancestor matches, reparse it there
                // by pretending we saw it again; otherwise drop it.
                if ancestor_has_tag(parent, &close) {
                    self.pos -= close.len() + 3; // rewind over "</tag>"
                }
                Ok(())
            }
        }
    }

    fn parse_close_tag(&mut self) -> Result<String, ParseError> {
        self.bump(); // '<'
        self.bump(); // '/'
        let tag = self.parse_name();
        self.skip_whitespace();
        if !self.eat('>') {
            return Err(ParseError::UnexpectedEof("close tag"));
        }
        Ok(tag)
    }

    fn parse_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                name.push(ch);
                self.pos += 1;
            } else {
                break;
            }
        }
        name
    }

    fn parse_attributes(&mut self, element: &NodeRef) -> Result<(), ParseError> {
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(ParseError::UnexpectedEof("attributes")),
                Some('>') | Some('/') => return Ok(()),
                Some(_) => {
                    let name = self.parse_name();
                    if name.is_empty() {
                        return Err(ParseError::MalformedTag(self.pos));
                    }
                    self.skip_whitespace();
                    let value = if self.eat('=') {
                        self.skip_whitespace();
                        self.parse_attr_value()?
                    } else {
                        String::new()
                    };
                    if name.eq_ignore_ascii_case("style") {
                        apply_style_attr(element, &value);
                    } else {
                        element.set_attr(&name.to_ascii_lowercase(), &value);
                    }
                }
            }
        }
    }

    fn parse_attr_value(&mut self) -> Result<String, ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                Some(q)
            }
            _ => None,
        };
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            match quote {
                Some(q) if ch == q => {
                    self.pos += 1;
                    return Ok(value);
                }
                None if ch.is_whitespace() || ch == '>' || ch == '/' => {
                    return Ok(value);
                }
                _ => {
                    if ch == '&' {
                        self.pos += 1;
                        value.push_str(&self.parse_entity());
                    } else {
                        value.push(ch);
                        self.pos += 1;
                    }
                }
            }
        }
        if quote.is_some() {
            Err(ParseError::UnexpectedEof("attribute value"))
        } else {
            Ok(value)
        }
    }

    fn skip_comment_or_doctype(&mut self) -> Result<(), ParseError> {
        // "<!--" ... "-->" or "<!DOCTYPE ...>"
        if self.peek_at(2) == Some('-') && self.peek_at(3) == Some('-') {
            self.pos += 4;
            while self.pos < self.chars.len() {
                if self.peek() == Some('-')
                    && self.peek_at(1) == Some('-')
                    && self.peek_at(2) == Some('>')
                {
                    self.pos += 3;
                    return Ok(());
                }
                self.pos += 1;
            }
            Err(ParseError::UnexpectedEof("comment"))
        } else {
            while let Some(ch) = self.bump() {
                if ch == '>' {
                    return Ok(());
                }
            }
            Err(ParseError::UnexpectedEof("declaration"))
        }
    }
}

fn parse_char_code(code: &str) -> Option<char> {
    let value = if let Some(hex) = code.strip_prefix(['x', 'X']) {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        code.parse::<u32>().ok()?
    };
    char::from_u32(value)
}

fn ancestor_has_tag(node: &NodeRef, tag: &str) -> bool {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if n.is_tag(tag) {
            return true;
        }
        current = n.parent();
    }
    false
}

/// Split a style attribute into the element's style map.
fn apply_style_attr(element: &NodeRef, value: &str) {
    for declaration in value.split(';') {
        if let Some((name, val)) = declaration.split_once(':') {
            let name = name.trim();
            let val = val.trim();
            if !name.is_empty() && !val.is_empty() {
                element.set_style(&name.to_ascii_lowercase(), val);
            }
        }
    }
}
