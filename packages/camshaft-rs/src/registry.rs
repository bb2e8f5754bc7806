//! Process-wide cache of resolved blueprints.
//!
//! `Service::blueprint()` is consulted exactly once per service type; the
//! flattened, order-preserving result is cached here keyed by `TypeId` and
//! shared by every subsequent invocation of that type.

use std::any::{Any, TypeId};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;

use crate::blueprint::Blueprint;
use crate::service::Service;

static RESOLVED: LazyLock<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> =
    LazyLock::new(DashMap::new);

/// The resolved blueprint for `S`, built on first use.
///
/// A race between two first invocations may build the blueprint twice;
/// one result wins the insert and both callers observe a complete list.
/// The build runs outside the map entry lock so a blueprint function that
/// itself resolves another service type cannot deadlock a shard.
pub(crate) fn resolved<S: Service>() -> Arc<Blueprint<S>> {
    let key = TypeId::of::<S>();
    if let Some(cached) = RESOLVED.get(&key) {
        return downcast::<S>(cached.value().clone());
    }

    let built: Arc<dyn Any + Send + Sync> = Arc::new(S::blueprint());
    let entry = RESOLVED.entry(key).or_insert(built).value().clone();
    downcast::<S>(entry)
}

fn downcast<S: Service>(entry: Arc<dyn Any + Send + Sync>) -> Arc<Blueprint<S>> {
    entry
        .downcast::<Blueprint<S>>()
        .expect("registry entry matches the TypeId it was stored under")
}
