//! Deleter that logs deletions into a shared ledger.
//!
//! Inventories have no provider behind them, so "deleting" an inventory
//! resource means recording that the engine got to it.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use sweep_core::{Resource, ResourceDeleter, ResourceId};
use tracing::info;

/// One recorded deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub resource_id: ResourceId,
    pub resource_type: String,
}

/// Deletions in completion order. Clones share the same ledger.
#[derive(Debug, Clone, Default)]
pub struct DeletionLedger {
    entries: Arc<Mutex<Vec<LedgerEntry>>>,
}

impl DeletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, resource: &Resource) {
        self.entries.lock().push(LedgerEntry {
            resource_id: resource.id.clone(),
            resource_type: resource.resource_type.clone(),
        });
    }

    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Whether `id` has been recorded.
    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.lock().iter().any(|e| &e.resource_id == id)
    }
}

/// Records every deletion in a [`DeletionLedger`] and always succeeds.
#[derive(Debug, Clone)]
pub struct LoggingDeleter {
    ledger: DeletionLedger,
}

impl LoggingDeleter {
    pub fn new(ledger: DeletionLedger) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl ResourceDeleter for LoggingDeleter {
    async fn delete(&self, resource: &Resource) -> anyhow::Result<()> {
        info!(
            resource_type = %resource.resource_type,
            resource_id = %resource.id,
            name = %resource.name,
            "Deleting inventory resource"
        );
        self.ledger.record(resource);
        Ok(())
    }
}
