//! Integration tests running the cleaner over on-disk inventories.

use std::fs;
use tempfile::tempdir;

use sweep_core::{Cleaner, ResourceId};
use sweep_inventory::{DeletionLedger, Inventory, InventoryError, RunConfig};

const INVENTORY: &str = r#"
- id: app-stack
  type: cloudformation-stack
  depends_on: [network-stack, app-role]
- id: network-stack
  type: cloudformation-stack
- id: app-role
  type: iam-role
  properties:
    env: dev
- id: deploy-role
  type: iam-role
  properties:
    env: prod
- id: logs
  region: us-east-1
  type: s3-bucket
"#;

const CONFIG: &str = r#"
concurrency: 2
exclude:
  - type: type_scoped
    resource_type: iam-role
    filters:
      - type: exact
        property: env
        value: prod
"#;

fn id(name: &str) -> ResourceId {
    ResourceId::named(name)
}

/// Test a full purge from files on disk, dependants first.
#[tokio::test]
async fn test_purge_from_files() {
    let temp = tempdir().unwrap();
    let inventory_path = temp.path().join("inventory.yaml");
    let config_path = temp.path().join("sweep.yaml");
    fs::write(&inventory_path, INVENTORY).unwrap();
    fs::write(&config_path, CONFIG).unwrap();

    let inventory = Inventory::load(&inventory_path).unwrap();
    let config = RunConfig::load(&config_path).unwrap();
    let ledger = DeletionLedger::new();
    let mut registry = inventory.to_registry(&ledger);

    let report = Cleaner::new(config.to_cleaner_config(false))
        .clean(&registry)
        .await
        .unwrap();
    assert_eq!(registry.close(), 0);

    // deploy-role is excluded by the type-scoped filter
    assert_eq!(report.total_found(), 5);
    assert_eq!(report.total_filtered(), 1);
    assert_eq!(ledger.len(), 4);
    assert!(!ledger.contains(&id("deploy-role")));

    assert_eq!(report.rounds.len(), 2);
    assert_eq!(
        report.rounds[0].batch,
        vec![id("app-stack"), ResourceId::regional("logs", "us-east-1")]
    );
    assert_eq!(report.rounds[1].batch, vec![id("app-role"), id("network-stack")]);

    let entries = ledger.entries();
    let position = |target: &ResourceId| entries.iter().position(|e| &e.resource_id == target);
    assert!(position(&id("app-stack")) < position(&id("network-stack")));
    assert!(position(&id("app-stack")) < position(&id("app-role")));
}

/// Test that planning records the order but never reaches the ledger.
#[tokio::test]
async fn test_plan_leaves_ledger_empty() {
    let inventory = Inventory::from_yaml_str(INVENTORY).unwrap();
    let config = RunConfig::from_yaml_str(CONFIG).unwrap();
    let ledger = DeletionLedger::new();
    let registry = inventory.to_registry(&ledger);

    let report = Cleaner::new(config.to_cleaner_config(true))
        .clean(&registry)
        .await
        .unwrap();

    assert!(ledger.is_empty());
    assert!(report.dry_run);
    assert_eq!(report.plan.len(), 4);
    assert_eq!(report.plan.last().map(|p| p.ordinal), Some(4));
    assert_eq!(report.rounds.len(), 2);
}

/// Test that a dependency cycle in the inventory is reported, not looped on.
#[tokio::test]
async fn test_cycle_is_unresolvable() {
    let yaml = "- {id: a, type: t, depends_on: [b]}\n- {id: b, type: t, depends_on: [a]}\n";
    let inventory = Inventory::from_yaml_str(yaml).unwrap();
    let registry = inventory.to_registry(&DeletionLedger::new());

    let err = Cleaner::default().clean(&registry).await.unwrap_err();
    assert!(err.is_structural());
}

/// Test that missing files are reported with their path.
#[test]
fn test_missing_files() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("absent.yaml");

    assert!(matches!(
        Inventory::load(&missing),
        Err(InventoryError::NotFound(path)) if path == missing
    ));
    assert!(matches!(
        RunConfig::load(&missing),
        Err(InventoryError::NotFound(_))
    ));
}
