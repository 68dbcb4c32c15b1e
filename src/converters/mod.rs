//! Conversion between the document tree and the Content Model
//!
//! `dom_to_model` builds a Content Model from a subtree, `model_to_dom`
//! writes one back. Options control caching behavior and per-tag processor
//! overrides.

pub mod context;
pub mod dom_to_model;
pub mod model_to_dom;
pub mod options;

// Re-export commonly used types
pub use context::*;
pub use dom_to_model::*;
pub use model_to_dom::*;
pub use options::*;
