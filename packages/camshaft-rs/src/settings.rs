//! Per-service-type configuration values.
//!
//! A small process-wide key/value store for the knobs `call`
//! implementations read: declared defaults at startup, an optional
//! override installed by the host application before first use, plain
//! reads during Execute.
//!
//! This is read-mostly state with no lifecycle beyond "set at startup,
//! read during Execute". Beyond the concurrent map itself there is no
//! locking or versioning — callers must not mutate settings concurrently
//! with active invocations if that matters to them.
//!
//! # Example
//!
//! ```ignore
//! // at startup, next to the service definition
//! settings::declare_default::<SendInvite>("from_address", "noreply@example.org");
//!
//! // host application override, before the first invocation
//! settings::set::<SendInvite>("from_address", "hello@example.org");
//!
//! // inside call()
//! let from = settings::get::<SendInvite>("from_address");
//! ```

use std::any::TypeId;
use std::sync::LazyLock;

use dashmap::DashMap;
use serde_json::Value;

static STORE: LazyLock<DashMap<(TypeId, &'static str), Value>> = LazyLock::new(DashMap::new);

/// Declare a default for `key`, scoped to service type `S`. Keeps any
/// value already present, so an override installed earlier wins.
pub fn declare_default<S: 'static>(key: &'static str, value: impl Into<Value>) {
    STORE
        .entry((TypeId::of::<S>(), key))
        .or_insert_with(|| value.into());
}

/// Install or replace the value for `key`, scoped to service type `S`.
pub fn set<S: 'static>(key: &'static str, value: impl Into<Value>) {
    STORE.insert((TypeId::of::<S>(), key), value.into());
}

/// Read the value for `key`, scoped to service type `S`.
pub fn get<S: 'static>(key: &'static str) -> Option<Value> {
    STORE
        .get(&(TypeId::of::<S>(), key))
        .map(|entry| entry.value().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_default_then_read() {
        declare_default::<A>("limit", 25);
        assert_eq!(get::<A>("limit"), Some(Value::from(25)));
    }

    #[test]
    fn test_override_wins_over_later_default() {
        set::<A>("greeting", "hi");
        declare_default::<A>("greeting", "hello");
        assert_eq!(get::<A>("greeting"), Some(Value::from("hi")));
    }

    #[test]
    fn test_set_replaces() {
        declare_default::<A>("mode", "draft");
        set::<A>("mode", "live");
        assert_eq!(get::<A>("mode"), Some(Value::from("live")));
    }

    #[test]
    fn test_types_scoped_independently() {
        set::<A>("shared_key", 1);
        set::<B>("shared_key", 2);
        assert_eq!(get::<A>("shared_key"), Some(Value::from(1)));
        assert_eq!(get::<B>("shared_key"), Some(Value::from(2)));
    }

    #[test]
    fn test_missing_key_is_none() {
        assert_eq!(get::<B>("never_declared"), None);
    }
}
