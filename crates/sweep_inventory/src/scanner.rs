//! Scanner serving resources from a loaded inventory.

use async_trait::async_trait;
use sweep_core::{Resource, ResourceScanner};
use tracing::debug;

/// Returns the inventory's resources of one type.
#[derive(Debug, Clone)]
pub struct InventoryScanner {
    resource_type: String,
    resources: Vec<Resource>,
}

impl InventoryScanner {
    pub fn new(resource_type: impl Into<String>, resources: Vec<Resource>) -> Self {
        Self {
            resource_type: resource_type.into(),
            resources,
        }
    }

    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }
}

#[async_trait]
impl ResourceScanner for InventoryScanner {
    async fn scan(&self) -> anyhow::Result<Vec<Resource>> {
        debug!(
            resource_type = %self.resource_type,
            count = self.resources.len(),
            "Scanning inventory"
        );
        Ok(self.resources.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scan_returns_snapshot() {
        let scanner = InventoryScanner::new(
            "s3-bucket",
            vec![Resource::new("logs", "s3-bucket"), Resource::new("assets", "s3-bucket")],
        );

        let first = scanner.scan().await.unwrap();
        let second = scanner.scan().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
        assert_eq!(scanner.resource_type(), "s3-bucket");
    }
}
