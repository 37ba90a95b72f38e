//! # sweep_inventory
//!
//! YAML inventory snapshots and run configuration for sweep.
//!
//! An inventory records the resources of an account as they were last seen.
//! Loading one yields a [`ResourceRegistry`](sweep_core::ResourceRegistry)
//! with a definition per resource type, so the deletion engine can plan (or
//! log) a teardown without talking to a cloud provider.

pub mod config;
pub mod deleter;
pub mod error;
pub mod inventory;
pub mod scanner;

pub use config::RunConfig;
pub use deleter::{DeletionLedger, LedgerEntry, LoggingDeleter};
pub use error::{InventoryError, InventoryResult};
pub use inventory::{Inventory, ResourceRecord};
pub use scanner::InventoryScanner;
