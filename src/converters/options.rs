//! DOM-to-model conversion options and their merge rules
//!
//! Options are layered: a base layer installs the specialized table
//! processor, host defaults spread over it, and caller options spread over
//! that. Later layers win per field, so a caller-supplied processor
//! override replaces the default table processor entirely while an
//! unspecified one keeps it.

use std::collections::HashMap;

use crate::converters::dom_to_model::{table_processor, DomToModelContext};
use crate::dom::NodeRef;
use crate::models::ContentModelBlock;

/// Pluggable per-tag conversion strategy. Plain function pointers so
/// overrides stay comparable.
pub type ElementProcessor =
    fn(blocks: &mut Vec<ContentModelBlock>, element: &NodeRef, context: &mut DomToModelContext);

/// Options accepted by the DOM-to-model builder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DomToModelOptions {
    /// When true the builder retains no element handles usable for partial
    /// re-render, and produced models carry no `cached_element`.
    pub disable_cache_element: Option<bool>,
    /// Include the root element itself as a block rather than only its
    /// children.
    pub include_root: Option<bool>,
    /// Per-tag processor replacements, keyed by lowercase tag name.
    pub processor_override: Option<HashMap<String, ElementProcessor>>,
}

impl DomToModelOptions {
    /// The base layer beneath every merge: the specialized table processor.
    pub fn base() -> DomToModelOptions {
        let mut processors: HashMap<String, ElementProcessor> = HashMap::new();
        processors.insert("table".to_string(), table_processor);
        DomToModelOptions {
            disable_cache_element: None,
            include_root: None,
            processor_override: Some(processors),
        }
    }
}

/// Merge option layers: base, then `defaults`, then `caller`; later layers
/// win field-by-field. The order is part of the contract and must not
/// change.
pub fn merge_dom_to_model_options(
    defaults: Option<&DomToModelOptions>,
    caller: Option<&DomToModelOptions>,
) -> DomToModelOptions {
    let mut merged = DomToModelOptions::base();
    for layer in [defaults, caller].into_iter().flatten() {
        if layer.disable_cache_element.is_some() {
            merged.disable_cache_element = layer.disable_cache_element;
        }
        if layer.include_root.is_some() {
            merged.include_root = layer.include_root;
        }
        if layer.processor_override.is_some() {
            merged.processor_override = layer.processor_override.clone();
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom_processor(
        _blocks: &mut Vec<ContentModelBlock>,
        _element: &NodeRef,
        _context: &mut DomToModelContext,
    ) {
    }

    #[test]
    fn test_merge_keeps_default_table_processor() {
        let defaults = DomToModelOptions {
            disable_cache_element: Some(true),
            include_root: Some(false),
            processor_override: None,
        };
        let caller = DomToModelOptions {
            include_root: Some(true),
            ..DomToModelOptions::default()
        };

        let merged = merge_dom_to_model_options(Some(&defaults), Some(&caller));

        // Caller wins where set, defaults fill the rest, the base table
        // processor survives untouched.
        assert_eq!(merged.disable_cache_element, Some(true));
        assert_eq!(merged.include_root, Some(true));
        let processors = merged.processor_override.unwrap();
        assert_eq!(
            processors.get("table").copied(),
            Some(table_processor as ElementProcessor)
        );
    }

    #[test]
    fn test_caller_processor_override_replaces_entirely() {
        let mut override_map: HashMap<String, ElementProcessor> = HashMap::new();
        override_map.insert("img".to_string(), custom_processor);
        let caller = DomToModelOptions {
            processor_override: Some(override_map),
            ..DomToModelOptions::default()
        };

        let merged = merge_dom_to_model_options(None, Some(&caller));

        let processors = merged.processor_override.unwrap();
        assert_eq!(
            processors.get("img").copied(),
            Some(custom_processor as ElementProcessor)
        );
        // The default table entry is gone: the caller's map replaced the
        // whole field, not merged into it.
        assert!(processors.get("table").is_none());
    }

    #[test]
    fn test_merge_with_no_layers_is_base() {
        let merged = merge_dom_to_model_options(None, None);
        assert_eq!(merged, DomToModelOptions::base());
    }
}
