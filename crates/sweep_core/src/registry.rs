//! Resource registry holding the definitions for one cleanup run.

use tracing::{debug, warn};

use crate::definition::ResourceDefinition;

/// An append-only, ordered collection of resource definitions.
///
/// A registry is created per run, populated by a loader, consumed by the
/// [`Cleaner`](crate::cleaner::Cleaner) and then closed. The same type may
/// be registered several times (one definition per region, for example).
///
/// Dropping an unclosed registry closes it, so definitions are torn down on
/// every exit path, including a fatal error during the run.
#[derive(Default)]
pub struct ResourceRegistry {
    definitions: Vec<ResourceDefinition>,
}

impl ResourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            definitions: Vec::new(),
        }
    }

    /// Append a definition.
    pub fn register(&mut self, definition: ResourceDefinition) {
        debug!("Registering resource definition: {}", definition.resource_type());
        self.definitions.push(definition);
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[ResourceDefinition] {
        &self.definitions
    }

    /// Nominal types in registration order (duplicates kept).
    pub fn resource_types(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.resource_type()).collect()
    }

    /// Get the number of registered definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Close every definition.
    ///
    /// Each definition is closed independently: a failure is logged and the
    /// remaining definitions are still closed. Returns the number of
    /// definitions whose teardown failed.
    pub fn close(&mut self) -> usize {
        let mut failures = 0;
        for definition in &mut self.definitions {
            if let Err(e) = definition.close() {
                warn!(
                    resource_type = %definition.resource_type(),
                    error = ?e,
                    "Failed to close resource definition"
                );
                failures += 1;
            }
        }
        failures
    }
}

impl Drop for ResourceRegistry {
    fn drop(&mut self) {
        if self.definitions.iter().any(|d| !d.is_closed()) {
            debug!("Closing resource registry on drop");
            self.close();
        }
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("definitions", &self.resource_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockDeleter, StaticScanner};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn definition(resource_type: &str, closed: Arc<Mutex<Vec<String>>>, fail: bool) -> ResourceDefinition {
        let name = resource_type.to_string();
        ResourceDefinition::new(
            resource_type,
            Arc::new(StaticScanner::empty()),
            Arc::new(MockDeleter::new()),
        )
        .on_close(move || {
            closed.lock().push(name);
            if fail {
                anyhow::bail!("connection already gone");
            }
            Ok(())
        })
    }

    #[test]
    fn test_registry_register_keeps_order_and_duplicates() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        assert!(registry.is_empty());

        registry.register(definition("cloudformation-stack", closed.clone(), false));
        registry.register(definition("s3-bucket", closed.clone(), false));
        registry.register(definition("cloudformation-stack", closed, false));

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.resource_types(),
            vec!["cloudformation-stack", "s3-bucket", "cloudformation-stack"]
        );
    }

    #[test]
    fn test_registry_close_continues_after_failure() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ResourceRegistry::new();
        registry.register(definition("a", closed.clone(), false));
        registry.register(definition("b", closed.clone(), true));
        registry.register(definition("c", closed.clone(), false));

        assert_eq!(registry.close(), 1);
        assert_eq!(*closed.lock(), vec!["a", "b", "c"]);

        // Second close is a no-op
        assert_eq!(registry.close(), 0);
        assert_eq!(closed.lock().len(), 3);
    }

    #[test]
    fn test_registry_closes_on_drop() {
        let closed = Arc::new(Mutex::new(Vec::new()));
        {
            let mut registry = ResourceRegistry::new();
            registry.register(definition("kms-key", closed.clone(), false));
        }
        assert_eq!(*closed.lock(), vec!["kms-key"]);
    }
}
