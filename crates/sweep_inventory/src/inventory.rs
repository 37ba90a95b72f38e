//! Inventory snapshots: resources recorded in a YAML file.
//!
//! An inventory is a YAML list of records:
//!
//! ```yaml
//! - id: app-stack
//!   type: cloudformation-stack
//!   properties:
//!     env: dev
//!   depends_on: [network-stack]
//!   contains: [app-role]
//! - id: app-key
//!   region: eu-west-1
//!   type: kms-key
//! ```
//!
//! Relation entries are either a bare id or a `{name, region}` map.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sweep_core::{Resource, ResourceDefinition, ResourceId, ResourceRegistry};
use tracing::debug;

use crate::deleter::{DeletionLedger, LoggingDeleter};
use crate::error::{InventoryError, InventoryResult};
use crate::scanner::InventoryScanner;

/// One resource as written in an inventory file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<ResourceId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contains: Vec<ResourceId>,
}

impl ResourceRecord {
    /// Identifier this record produces.
    pub fn resource_id(&self) -> ResourceId {
        match &self.region {
            Some(region) => ResourceId::regional(&self.id, region),
            None => ResourceId::named(&self.id),
        }
    }

    /// Convert into the engine's resource type.
    pub fn to_resource(&self) -> Resource {
        let mut resource = Resource::new(self.resource_id(), &self.resource_type);
        if let Some(name) = &self.name {
            resource.name = name.clone();
        }
        resource.properties = self.properties.clone();
        resource.depends_on = self.depends_on.iter().cloned().collect();
        resource.contains = self.contains.iter().cloned().collect();
        resource
    }
}

/// A validated set of inventory records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    records: Vec<ResourceRecord>,
}

impl Inventory {
    /// Build an inventory from records, rejecting blank fields and duplicate ids.
    pub fn new(records: Vec<ResourceRecord>) -> InventoryResult<Self> {
        let mut seen = HashSet::new();
        for (index, record) in records.iter().enumerate() {
            if record.id.trim().is_empty() {
                return Err(InventoryError::InvalidRecord {
                    index,
                    message: "id must not be empty".to_string(),
                });
            }
            if record.resource_type.trim().is_empty() {
                return Err(InventoryError::InvalidRecord {
                    index,
                    message: format!("resource {} has an empty type", record.id),
                });
            }
            let id = record.resource_id();
            if !seen.insert(id.clone()) {
                return Err(InventoryError::DuplicateId(id.raw_id()));
            }
        }
        Ok(Self { records })
    }

    /// Parse an inventory from YAML text.
    pub fn from_yaml_str(content: &str) -> InventoryResult<Self> {
        // An empty document is an empty inventory
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let records: Vec<ResourceRecord> = serde_yaml::from_str(content)?;
        Self::new(records)
    }

    /// Read an inventory file.
    pub fn load(path: impl AsRef<Path>) -> InventoryResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InventoryError::NotFound(path.to_path_buf()));
        }
        debug!("Reading inventory from {:?}", path);

        let content = fs::read_to_string(path)?;
        let inventory = Self::from_yaml_str(&content)?;
        debug!(resources = inventory.len(), "Inventory loaded");
        Ok(inventory)
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct resource types in order of first appearance.
    pub fn resource_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = Vec::new();
        for record in &self.records {
            if !types.contains(&record.resource_type.as_str()) {
                types.push(&record.resource_type);
            }
        }
        types
    }

    /// Every record converted to a resource, in file order.
    pub fn resources(&self) -> Vec<Resource> {
        self.records.iter().map(ResourceRecord::to_resource).collect()
    }

    /// Build a registry with one definition per resource type.
    ///
    /// Definitions are registered in order of first appearance. Every
    /// deleter writes into `ledger`.
    pub fn to_registry(&self, ledger: &DeletionLedger) -> ResourceRegistry {
        let mut by_type: BTreeMap<&str, Vec<Resource>> = BTreeMap::new();
        for record in &self.records {
            by_type
                .entry(record.resource_type.as_str())
                .or_default()
                .push(record.to_resource());
        }

        let mut registry = ResourceRegistry::new();
        for resource_type in self.resource_types() {
            let resources = by_type.remove(resource_type).unwrap_or_default();
            let scanner = InventoryScanner::new(resource_type, resources);
            let deleter = LoggingDeleter::new(ledger.clone());

            let closing_type = resource_type.to_string();
            registry.register(
                ResourceDefinition::new(resource_type, Arc::new(scanner), Arc::new(deleter))
                    .on_close(move || {
                        debug!(resource_type = %closing_type, "Released inventory definition");
                        Ok(())
                    }),
            );
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
- id: app-stack
  type: cloudformation-stack
  properties:
    env: dev
  depends_on: [network-stack]
  contains: [app-role]
- id: app-role
  name: Application role
  type: iam-role
- id: network-stack
  type: cloudformation-stack
- id: app-key
  region: eu-west-1
  type: kms-key
  depends_on: [app-role]
"#;

    #[test]
    fn test_parse_inventory() {
        let inventory = Inventory::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(inventory.len(), 4);
        assert_eq!(
            inventory.resource_types(),
            vec!["cloudformation-stack", "iam-role", "kms-key"]
        );

        let resources = inventory.resources();
        let stack = &resources[0];
        assert_eq!(stack.name, "app-stack");
        assert_eq!(stack.property("env"), Some("dev"));
        assert!(stack.depends_on.contains(&ResourceId::named("network-stack")));
        assert!(stack.contains.contains(&ResourceId::named("app-role")));

        assert_eq!(resources[1].name, "Application role");
        assert_eq!(resources[3].id, ResourceId::regional("app-key", "eu-west-1"));
    }

    #[test]
    fn test_empty_document() {
        assert!(Inventory::from_yaml_str("  \n").unwrap().is_empty());
        assert!(Inventory::from_yaml_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let yaml = "- {id: a, type: t}\n- {id: a, type: u}\n";
        assert!(matches!(
            Inventory::from_yaml_str(yaml),
            Err(InventoryError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn test_same_name_in_two_regions_allowed() {
        let yaml = "- {id: a, region: r1, type: t}\n- {id: a, region: r2, type: t}\n";
        assert_eq!(Inventory::from_yaml_str(yaml).unwrap().len(), 2);
    }

    #[test]
    fn test_blank_type_rejected() {
        let yaml = "- {id: a, type: ' '}\n";
        assert!(matches!(
            Inventory::from_yaml_str(yaml),
            Err(InventoryError::InvalidRecord { index: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let yaml = "- {id: a, type: t, owner: me}\n";
        assert!(matches!(
            Inventory::from_yaml_str(yaml),
            Err(InventoryError::Yaml(_))
        ));
    }

    #[test]
    fn test_registry_one_definition_per_type() {
        let inventory = Inventory::from_yaml_str(SAMPLE).unwrap();
        let mut registry = inventory.to_registry(&DeletionLedger::new());

        assert_eq!(
            registry.resource_types(),
            vec!["cloudformation-stack", "iam-role", "kms-key"]
        );
        assert_eq!(registry.close(), 0);
        assert!(registry.definitions().iter().all(|d| d.is_closed()));
    }
}
