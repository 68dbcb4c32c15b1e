//! Canonical DOM substrate for the editor
//!
//! The editor keeps its document tree in Rust and treats the browser DOM as
//! a render target. This module provides the node tree, positions, and
//! HTML serialization the rest of the crate builds on.

pub mod node;
pub mod position;
pub mod serializer;

// Re-export commonly used types
pub use node::*;
pub use position::*;
pub use serializer::*;
