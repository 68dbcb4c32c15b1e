//! Rich Text Editor WASM Module
//!
//! This is the main WASM module for the rich text (WYSIWYG) editor core.
//! It owns the canonical document tree, converts between it and the
//! Content Model, and provides the virtual-table engine for structural
//! table editing.

pub mod api;
pub mod converters;
pub mod dom;
pub mod editor;
pub mod models;
pub mod parse;
pub mod table;

// Re-export commonly used types
pub use models::content::*;
pub use models::selection::*;

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Debug).expect("failed to initialize logger");

    log::info!("Rich text editor WASM module initialized");
}
