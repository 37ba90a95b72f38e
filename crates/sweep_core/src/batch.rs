//! Pending-resource state and the per-round deletable batch computation.
//!
//! The batch is recomputed from scratch each round against the shrinking
//! pending map. It is not a topological sort computed once: resources whose
//! blockers have been deleted are picked up in a later round.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::resource::{Resource, ResourceId};

/// Compute the resources that are safe to delete this round.
///
/// A pending resource qualifies when no pending resource depends on it and
/// none of the resources it contains is depended on by a pending resource.
/// The result is sorted by id so rounds are reproducible.
pub fn deletable_batch(pending: &HashMap<ResourceId, Resource>) -> Vec<Resource> {
    let blocked: HashSet<&ResourceId> = pending
        .values()
        .flat_map(|r| r.depends_on.iter())
        .collect();

    let mut batch: Vec<Resource> = pending
        .values()
        .filter(|r| !blocked.contains(&r.id))
        .filter(|r| r.contains.iter().all(|c| !blocked.contains(c)))
        .cloned()
        .collect();

    batch.sort_by(|a, b| a.id.cmp(&b.id));
    batch
}

/// Resources that have not been confirmed deleted yet.
///
/// Cloning a `PendingSet` shares the underlying map, so deletion workers
/// can remove entries as they complete. The set only ever shrinks.
#[derive(Clone, Default)]
pub struct PendingSet {
    inner: Arc<RwLock<HashMap<ResourceId, Resource>>>,
}

impl PendingSet {
    /// Create a pending set from a snapshot of resources.
    ///
    /// Later duplicates of an id replace earlier ones.
    pub fn new(resources: impl IntoIterator<Item = Resource>) -> Self {
        let mut map = HashMap::new();
        for resource in resources {
            if let Some(previous) = map.insert(resource.id.clone(), resource) {
                warn!(resource_id = %previous.id, "Duplicate resource id in snapshot");
            }
        }
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Remove a confirmed deletion.
    ///
    /// Returns `false` if the id was not pending; removing twice is a no-op.
    pub fn remove(&self, id: &ResourceId) -> bool {
        self.inner.write().remove(id).is_some()
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.inner.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Deletable batch for the current state.
    ///
    /// Must only be called when no deletion of the previous round is still
    /// in flight.
    pub fn next_batch(&self) -> Vec<Resource> {
        deletable_batch(&self.inner.read())
    }

    /// Ids still pending, sorted.
    pub fn ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.inner.read().keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl std::fmt::Debug for PendingSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSet")
            .field("pending", &self.len())
            .finish()
    }
}
