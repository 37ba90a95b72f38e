//! # sweep_core
//!
//! Dependency-ordered, concurrent deletion engine for sweep.
//!
//! This crate takes the resources discovered for one account/region, works
//! out which of them are safe to delete right now, and deletes them through
//! a bounded pool of workers, round after round, until nothing is left.
//!
//! # Architecture
//!
//! - **Resources**: immutable records with `depends_on` and `contains` relations
//! - **Definitions**: bind a resource type to its scanner, deleter and teardown
//! - **Registry**: ordered definitions for one run, closed on every exit path
//! - **Filters**: exclude predicates applied before deletion
//! - **Cleaner**: scans, filters, and drives the deletion rounds
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sweep_core::{Cleaner, CleanerConfig, Filter, ResourceDefinition, ResourceRegistry};
//!
//! let mut registry = ResourceRegistry::new();
//! registry.register(ResourceDefinition::new(
//!     "cloudformation-stack",
//!     Arc::new(StackScanner::new(client.clone())),
//!     Arc::new(StackDeleter::new(client)),
//! ));
//!
//! let config = CleanerConfig::new()
//!     .dry_run(true)
//!     .exclude(Filter::regex("^prod-")?);
//!
//! let report = Cleaner::new(config).clean(&registry).await;
//! registry.close();
//! let report = report?;
//! ```

pub mod batch;
pub mod cleaner;
pub mod definition;
pub mod dry_run;
pub mod error;
pub mod filter;
pub mod mock;
pub mod registry;
pub mod resource;

// Re-export main types for convenience
pub use batch::{deletable_batch, PendingSet};
pub use cleaner::{CleanReport, Cleaner, CleanerConfig, RoundReport, TypeSummary, DEFAULT_CONCURRENCY};
pub use definition::{CloseFn, ResourceDefinition, ResourceDeleter, ResourceScanner};
pub use dry_run::{DryRunDeleter, PlannedDeletion};
pub use error::{SweepError, SweepResult};
pub use filter::{is_excluded, Filter, FilterPattern};
pub use mock::{MockDeleter, StaticScanner};
pub use registry::ResourceRegistry;
pub use resource::{Resource, ResourceId};
