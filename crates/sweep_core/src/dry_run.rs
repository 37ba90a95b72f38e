//! Deleter that records the deletion order without deleting anything.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::definition::ResourceDeleter;
use crate::resource::{Resource, ResourceId};

/// One entry of a dry-run deletion plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedDeletion {
    /// 1-based position in the overall deletion order
    pub ordinal: usize,
    pub resource_id: ResourceId,
    pub resource_type: String,
    pub name: String,
}

/// A deleter that never contacts an external system.
///
/// Every call succeeds immediately after recording its ordinal position, so
/// a dry run still drains the pending set round by round and yields the
/// complete deletion plan. One instance is shared across all types.
#[derive(Debug, Default)]
pub struct DryRunDeleter {
    counter: AtomicUsize,
    plan: Mutex<Vec<PlannedDeletion>>,
}

impl DryRunDeleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded deletions in call order.
    pub fn plan(&self) -> Vec<PlannedDeletion> {
        self.plan.lock().clone()
    }

    /// Number of deletions recorded so far.
    pub fn count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResourceDeleter for DryRunDeleter {
    async fn delete(&self, resource: &Resource) -> anyhow::Result<()> {
        let mut plan = self.plan.lock();
        let ordinal = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            ordinal,
            resource_type = %resource.resource_type,
            resource_id = %resource.id,
            "[DRY RUN] Would delete"
        );
        plan.push(PlannedDeletion {
            ordinal,
            resource_id: resource.id.clone(),
            resource_type: resource.resource_type.clone(),
            name: resource.name.clone(),
        });
        Ok(())
    }
}
