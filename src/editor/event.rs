//! Plugin events with per-event scoped data caching
//!
//! Several features may inspect the same event and derive the same value
//! (say, the table cell under the cursor). Rather than recomputing, the
//! event carries a small cache keyed by a stable string tag, populated
//! lazily and discarded with the event itself.

use serde_repr::{Deserialize_repr, Serialize_repr};
use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Keys the feature table reacts to. Numeric values match the JS key codes
/// the host sends across the boundary.
#[derive(Serialize_repr, Deserialize_repr, Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Key {
    Backspace = 8,
    Tab = 9,
    Up = 38,
    Down = 40,
    Delete = 46,
}

impl Key {
    pub fn from_code(code: u32) -> Option<Key> {
        match code {
            8 => Some(Key::Backspace),
            9 => Some(Key::Tab),
            38 => Some(Key::Up),
            40 => Some(Key::Down),
            46 => Some(Key::Delete),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginEventKind {
    KeyDown { key: Key, shift: bool },
}

/// One dispatched event plus its scoped data cache.
pub struct PluginEvent {
    pub kind: PluginEventKind,
    cache: RefCell<HashMap<String, Rc<dyn Any>>>,
}

impl PluginEvent {
    pub fn key_down(key: Key, shift: bool) -> PluginEvent {
        PluginEvent {
            kind: PluginEventKind::KeyDown { key, shift },
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn shift(&self) -> bool {
        match self.kind {
            PluginEventKind::KeyDown { shift, .. } => shift,
        }
    }
}

/// Fetch the value cached on `event` under `key`, computing and storing it
/// on first request. The getter runs at most once per event dispatch.
pub fn cache_get_event_data<T, F>(event: &PluginEvent, key: &str, getter: F) -> T
where
    T: Clone + 'static,
    F: FnOnce() -> T,
{
    if let Some(cached) = event.cache.borrow().get(key) {
        if let Some(value) = cached.downcast_ref::<T>() {
            return value.clone();
        }
    }
    let value = getter();
    event
        .cache
        .borrow_mut()
        .insert(key.to_string(), Rc::new(value.clone()));
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getter_runs_once_per_event() {
        let event = PluginEvent::key_down(Key::Tab, false);
        let mut calls = 0;

        let first: u32 = cache_get_event_data(&event, "value", || {
            calls += 1;
            42
        });
        let second: u32 = cache_get_event_data(&event, "value", || {
            calls += 1;
            99
        });

        assert_eq!(first, 42);
        assert_eq!(second, 42);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_distinct_keys_are_independent() {
        let event = PluginEvent::key_down(Key::Tab, false);
        let a: u32 = cache_get_event_data(&event, "a", || 1);
        let b: u32 = cache_get_event_data(&event, "b", || 2);
        assert_eq!((a, b), (1, 2));
    }

    #[test]
    fn test_fresh_event_recomputes() {
        let first = PluginEvent::key_down(Key::Tab, false);
        let _: u32 = cache_get_event_data(&first, "value", || 1);

        let second = PluginEvent::key_down(Key::Tab, false);
        let recomputed: u32 = cache_get_event_data(&second, "value", || 2);
        assert_eq!(recomputed, 2);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code(9), Some(Key::Tab));
        assert_eq!(Key::from_code(8), Some(Key::Backspace));
        assert_eq!(Key::from_code(999), None);
    }
}
