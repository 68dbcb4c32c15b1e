//! Parsing module for the rich text editor
//!
//! Converts serialized HTML content back into the editor's canonical
//! document tree.

pub mod html;

// Re-export commonly used types
pub use html::*;
