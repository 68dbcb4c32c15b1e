//! Data models for the rich text editor
//!
//! This module defines the Content Model tree and the selection descriptor
//! consumed by the DOM-to-model builder.

pub mod content;
pub mod selection;

// Re-export commonly used types
pub use content::*;
pub use selection::*;
