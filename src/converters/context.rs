//! Conversion context
//!
//! Host-level defaults captured once per conversion. The builder treats
//! this as opaque input; it exists so that formatting decisions made during
//! conversion see the same environment the host renders with.

use serde::{Deserialize, Serialize};

/// Environment snapshot for a single DOM-to-model conversion.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EditorContext {
    pub default_font_family: String,
    pub default_font_size_px: f32,
    pub zoom_scale: f32,
    pub is_dark_mode: bool,
}

impl Default for EditorContext {
    fn default() -> Self {
        EditorContext {
            default_font_family: "Arial".to_string(),
            default_font_size_px: 16.0,
            zoom_scale: 1.0,
            is_dark_mode: false,
        }
    }
}
