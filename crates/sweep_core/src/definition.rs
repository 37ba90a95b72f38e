//! Scanner and deleter contracts, and the definition binding them to a type.
//!
//! Scanners and deleters are implemented outside the core, usually one pair
//! per provider resource kind and connection scope (account/region). The
//! core only needs to list resources of a type and delete one resource at a
//! time.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::resource::Resource;

/// Produces the resources of one type.
///
/// The returned sequence must be finite. It may be empty and its order is
/// not significant.
#[async_trait]
pub trait ResourceScanner: Send + Sync {
    async fn scan(&self) -> anyhow::Result<Vec<Resource>>;
}

/// Deletes one resource.
///
/// The cleaner re-invokes `delete` for a resource whose previous attempt
/// failed, so implementations must tolerate being called again after a
/// partial failure.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    async fn delete(&self, resource: &Resource) -> anyhow::Result<()>;
}

/// Releases provider-side connections held by a definition.
pub type CloseFn = Box<dyn FnOnce() -> anyhow::Result<()> + Send + Sync>;

/// Binds a resource type to its scanner, deleter and teardown callback.
pub struct ResourceDefinition {
    resource_type: String,
    scanner: Arc<dyn ResourceScanner>,
    deleter: Arc<dyn ResourceDeleter>,
    close: Option<CloseFn>,
}

impl ResourceDefinition {
    /// Create a definition with no teardown work.
    pub fn new(
        resource_type: impl Into<String>,
        scanner: Arc<dyn ResourceScanner>,
        deleter: Arc<dyn ResourceDeleter>,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            scanner,
            deleter,
            close: None,
        }
    }

    /// Set the callback run when the definition is closed.
    pub fn on_close<F>(mut self, close: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.close = Some(Box::new(close));
        self
    }

    /// Nominal resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    pub fn scanner(&self) -> Arc<dyn ResourceScanner> {
        self.scanner.clone()
    }

    pub fn deleter(&self) -> Arc<dyn ResourceDeleter> {
        self.deleter.clone()
    }

    /// Whether the teardown callback has already run (or there was none).
    pub fn is_closed(&self) -> bool {
        self.close.is_none()
    }

    /// Run the teardown callback.
    ///
    /// The callback runs at most once; later calls are no-ops.
    pub fn close(&mut self) -> anyhow::Result<()> {
        match self.close.take() {
            Some(close) => {
                debug!(resource_type = %self.resource_type, "Closing resource definition");
                close()
            }
            None => Ok(()),
        }
    }
}

impl fmt::Debug for ResourceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDefinition")
            .field("resource_type", &self.resource_type)
            .field("closed", &self.is_closed())
            .finish()
    }
}
