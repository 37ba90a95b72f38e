//! Mock scanners and deleters for testing.
//!
//! Provides configurable implementations of the scanner and deleter
//! contracts so the cleaner can be exercised without a cloud provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::definition::{ResourceDeleter, ResourceScanner};
use crate::resource::{Resource, ResourceId};

/// Scanner returning a fixed list of resources.
#[derive(Debug, Clone, Default)]
pub struct StaticScanner {
    resources: Vec<Resource>,
    failure: Option<String>,
}

impl StaticScanner {
    pub fn new(resources: Vec<Resource>) -> Self {
        Self {
            resources,
            failure: None,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// A scanner whose `scan` always fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            resources: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

#[async_trait]
impl ResourceScanner for StaticScanner {
    async fn scan(&self) -> anyhow::Result<Vec<Resource>> {
        if let Some(msg) = &self.failure {
            anyhow::bail!("{}", msg);
        }
        Ok(self.resources.clone())
    }
}

/// How a mock deletion of a given resource behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FailureMode {
    /// Fail this many more times, then succeed
    Times(usize),
    Always,
}

/// Mock deleter for testing.
///
/// Captures every call and can simulate failures per resource id. Clones
/// share state, so a test can keep a handle while the cleaner owns another.
#[derive(Clone, Default)]
pub struct MockDeleter {
    /// Ids in call order, successful or not.
    calls: Arc<RwLock<Vec<ResourceId>>>,
    /// Ids whose deletion succeeded, in completion order.
    deleted: Arc<RwLock<Vec<ResourceId>>>,
    failures: Arc<RwLock<HashMap<ResourceId, FailureMode>>>,
    delay: Option<Duration>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockDeleter {
    /// Create a mock deleter where every deletion succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `times` deletions of `id`, then succeed.
    pub fn fail_times(self, id: impl Into<ResourceId>, times: usize) -> Self {
        self.failures.write().insert(id.into(), FailureMode::Times(times));
        self
    }

    /// Fail every deletion of `id`.
    pub fn fail_always(self, id: impl Into<ResourceId>) -> Self {
        self.failures.write().insert(id.into(), FailureMode::Always);
        self
    }

    /// Sleep this long inside every deletion.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all attempted ids in call order.
    pub fn calls(&self) -> Vec<ResourceId> {
        self.calls.read().clone()
    }

    /// Get the number of attempts made.
    pub fn call_count(&self) -> usize {
        self.calls.read().len()
    }

    /// Number of attempts made for one id.
    pub fn attempts_for(&self, id: &ResourceId) -> usize {
        self.calls.read().iter().filter(|c| *c == id).count()
    }

    /// Get successfully deleted ids in completion order.
    pub fn deleted(&self) -> Vec<ResourceId> {
        self.deleted.read().clone()
    }

    /// Highest number of deletions observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Decide whether this attempt fails, consuming one scheduled failure.
    fn take_failure(&self, id: &ResourceId) -> bool {
        let mut failures = self.failures.write();
        match failures.get_mut(id) {
            Some(FailureMode::Always) => true,
            Some(FailureMode::Times(0)) | None => false,
            Some(FailureMode::Times(n)) => {
                *n -= 1;
                true
            }
        }
    }
}

#[async_trait]
impl ResourceDeleter for MockDeleter {
    async fn delete(&self, resource: &Resource) -> anyhow::Result<()> {
        self.calls.write().push(resource.id.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let fail = self.take_failure(&resource.id);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fail {
            anyhow::bail!("simulated failure deleting {}", resource.id);
        }
        self.deleted.write().push(resource.id.clone());
        Ok(())
    }
}

impl std::fmt::Debug for MockDeleter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockDeleter")
            .field("calls", &self.call_count())
            .finish()
    }
}
