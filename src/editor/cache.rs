//! Single-slot Content Model cache
//!
//! Holds at most one previously built model together with whether it was
//! built while a shadow edit overlay was active. The cache has an explicit
//! owner (the editor core) and is only ever consulted when the caller asks
//! for reuse; any structural mutation the host considers invalidating
//! clears it.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::ContentModelDocument;

/// Shared handle to a built model. Handing the same handle out twice is
/// what "returning the cached model unchanged" means here.
pub type SharedModel = Rc<RefCell<ContentModelDocument>>;

#[derive(Default)]
pub struct ModelCache {
    model: Option<SharedModel>,
    is_under_shadow_edit: bool,
}

impl ModelCache {
    /// The cached model handle, if any. Callers decide whether it may be
    /// returned as-is or must be cloned first.
    pub fn model(&self) -> Option<SharedModel> {
        self.model.clone()
    }

    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// True when the cached entry was built under a shadow edit overlay.
    pub fn is_under_shadow_edit(&self) -> bool {
        self.is_under_shadow_edit
    }

    pub fn set(&mut self, model: Option<SharedModel>, under_shadow_edit: bool) {
        self.is_under_shadow_edit = model.is_some() && under_shadow_edit;
        self.model = model;
    }

    pub fn invalidate(&mut self) {
        if self.model.is_some() {
            log::debug!("model cache invalidated");
        }
        self.model = None;
        self.is_under_shadow_edit = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_invalidate() {
        let mut cache = ModelCache::default();
        assert!(!cache.has_model());

        let model = SharedModel::default();
        cache.set(Some(model.clone()), true);
        assert!(cache.has_model());
        assert!(cache.is_under_shadow_edit());
        assert!(Rc::ptr_eq(&cache.model().unwrap(), &model));

        cache.invalidate();
        assert!(!cache.has_model());
        assert!(!cache.is_under_shadow_edit());
    }

    #[test]
    fn test_clearing_resets_shadow_flag() {
        let mut cache = ModelCache::default();
        cache.set(Some(SharedModel::default()), true);
        cache.set(None, true);
        assert!(!cache.is_under_shadow_edit());
    }
}
