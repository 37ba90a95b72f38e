//! The cleaner: scan, filter, and delete in dependency order.
//!
//! # Run Lifecycle
//!
//! 1. **Scan**: every definition's scanner is drained, in registry order,
//!    before anything is deleted. A scan failure aborts the run.
//! 2. **Filter**: resources matching any exclude filter are dropped.
//! 3. **Delete**: rounds of [`deletable_batch`](crate::batch::deletable_batch)
//!    are drained through a fixed pool of workers until nothing is pending.
//!
//! A resource whose deletion fails stays pending and is offered again in
//! every later round it qualifies for. Without `max_attempts` there is no
//! limit, so a resource that can never be deleted keeps the run going
//! forever; callers that need a bound must set one or wrap `clean()` in a
//! timeout.
//!
//! The loop never spins without progress: if resources are pending but none
//! of them is deletable, the run fails with
//! [`SweepError::Unresolvable`](crate::error::SweepError::Unresolvable). A
//! dependency cycle does this, and so does a resource that both contains and
//! depends on the same id.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::batch::PendingSet;
use crate::definition::ResourceDeleter;
use crate::dry_run::{DryRunDeleter, PlannedDeletion};
use crate::error::{SweepError, SweepResult};
use crate::filter::{is_excluded, Filter};
use crate::registry::ResourceRegistry;
use crate::resource::{Resource, ResourceId};

/// Default number of concurrent deletion workers.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Cleaner configuration.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Record the deletion order instead of deleting
    pub dry_run: bool,
    /// Number of deletion workers per round
    pub concurrency: usize,
    /// Abort once a resource has failed this many attempts (unbounded if None)
    pub max_attempts: Option<u32>,
    /// Pause before a round that follows a round with failures
    pub retry_backoff: Option<Duration>,
    /// Resources matching any of these are never deleted
    pub excludes: Vec<Filter>,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            concurrency: DEFAULT_CONCURRENCY,
            max_attempts: None,
            retry_backoff: None,
            excludes: Vec::new(),
        }
    }
}

impl CleanerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = Some(backoff);
        self
    }

    pub fn exclude(mut self, filter: Filter) -> Self {
        self.excludes.push(filter);
        self
    }

    pub fn excludes(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.excludes.extend(filters);
        self
    }

    /// Reject settings the deletion loop cannot run with.
    pub fn validate(&self) -> SweepResult<()> {
        if self.concurrency == 0 {
            return Err(SweepError::InvalidConfiguration(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(SweepError::InvalidConfiguration(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Scan counts for one reported resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSummary {
    pub resource_type: String,
    pub found: usize,
    pub filtered: usize,
    pub to_delete: usize,
}

/// Outcome of one deletion round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number
    pub round: usize,
    /// Resources offered this round, sorted by id
    pub batch: Vec<ResourceId>,
    pub deleted: usize,
    pub failed: usize,
}

/// Summary of a cleanup run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanReport {
    pub run_id: Uuid,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub types: Vec<TypeSummary>,
    pub rounds: Vec<RoundReport>,
    /// Confirmed deletions in completion order
    pub deleted: Vec<ResourceId>,
    /// Failed attempts across all rounds
    pub failed_attempts: usize,
    /// Deletion plan recorded in dry-run mode
    pub plan: Vec<PlannedDeletion>,
}

impl CleanReport {
    fn new(dry_run: bool) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            dry_run,
            started_at: Utc::now(),
            completed_at: None,
            types: Vec::new(),
            rounds: Vec::new(),
            deleted: Vec::new(),
            failed_attempts: 0,
            plan: Vec::new(),
        }
    }

    /// Total resources found across all types.
    pub fn total_found(&self) -> usize {
        self.types.iter().map(|t| t.found).sum()
    }

    /// Total resources excluded by filters.
    pub fn total_filtered(&self) -> usize {
        self.types.iter().map(|t| t.filtered).sum()
    }

    /// Total deletion candidates after filtering.
    pub fn total_to_delete(&self) -> usize {
        self.types.iter().map(|t| t.to_delete).sum()
    }
}

/// Deleters keyed by reported resource type.
type DeleterMap = HashMap<String, Arc<dyn ResourceDeleter>>;

/// Resources left after filtering, plus the deleters to use for them.
struct ScanOutcome {
    candidates: Vec<Resource>,
    deleters: DeleterMap,
}

/// One unit of work handed to a deletion worker.
struct DeletionJob {
    resource: Resource,
    deleter: Arc<dyn ResourceDeleter>,
}

/// What a worker did during one round.
#[derive(Default)]
struct WorkerOutcome {
    deleted: Vec<ResourceId>,
    failed: Vec<(ResourceId, String)>,
}

/// Scans a registry and deletes what it finds in dependency order.
#[derive(Debug, Clone, Default)]
pub struct Cleaner {
    config: CleanerConfig,
}

impl Cleaner {
    /// Create a cleaner with the given configuration.
    pub fn new(config: CleanerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CleanerConfig {
        &self.config
    }

    /// Run a full cleanup against the registry.
    ///
    /// Returns once every candidate is deleted, or with an error on a scan
    /// failure, a resource type without a deleter, or an exhausted
    /// `max_attempts`. The registry is not closed here; that belongs to the
    /// caller (or to the registry's drop).
    pub async fn clean(&self, registry: &ResourceRegistry) -> SweepResult<CleanReport> {
        self.config.validate()?;

        let mut report = CleanReport::new(self.config.dry_run);
        info!(
            run_id = %report.run_id,
            dry_run = self.config.dry_run,
            definitions = registry.len(),
            "Starting cleanup"
        );

        let ScanOutcome {
            candidates,
            mut deleters,
        } = self.scan(registry, &mut report).await?;

        let dry_run = self.config.dry_run.then(|| Arc::new(DryRunDeleter::new()));
        if let Some(dry_run) = &dry_run {
            let shared: Arc<dyn ResourceDeleter> = dry_run.clone();
            for deleter in deleters.values_mut() {
                *deleter = shared.clone();
            }
        }

        self.delete_all(candidates, &deleters, &mut report).await?;

        if let Some(dry_run) = dry_run {
            report.plan = dry_run.plan();
        }
        report.completed_at = Some(Utc::now());

        info!(
            run_id = %report.run_id,
            deleted = report.deleted.len(),
            rounds = report.rounds.len(),
            failed_attempts = report.failed_attempts,
            "Cleanup completed"
        );
        Ok(report)
    }

    /// Drain every scanner, remember deleters, and apply the exclude filter.
    async fn scan(
        &self,
        registry: &ResourceRegistry,
        report: &mut CleanReport,
    ) -> SweepResult<ScanOutcome> {
        let mut deleters: DeleterMap = HashMap::new();
        let mut scanned: Vec<Resource> = Vec::new();

        for definition in registry.definitions() {
            debug!(resource_type = %definition.resource_type(), "Scanning");
            let resources = definition.scanner().scan().await.map_err(|e| {
                error!(
                    resource_type = %definition.resource_type(),
                    error = ?e,
                    "Scan failed"
                );
                SweepError::ScanFailed {
                    resource_type: definition.resource_type().to_string(),
                    message: format!("{:#}", e),
                }
            })?;

            // Keyed by what the scanner reports, which may differ from the
            // nominal type. A later definition of the same type replaces an
            // earlier one.
            if let Some(first) = resources.first() {
                deleters.insert(first.resource_type.clone(), definition.deleter());
            }
            scanned.extend(resources);
        }

        let mut seen: HashSet<ResourceId> = HashSet::with_capacity(scanned.len());
        let mut candidates = Vec::with_capacity(scanned.len());
        for resource in scanned {
            // First scan of an id wins, so counts match what gets deleted
            if !seen.insert(resource.id.clone()) {
                warn!(
                    resource_type = %resource.resource_type,
                    resource_id = %resource.id,
                    "Duplicate resource id, ignoring later scan result"
                );
                continue;
            }
            let excluded = is_excluded(&self.config.excludes, &resource);
            let index = match report
                .types
                .iter()
                .position(|t| t.resource_type == resource.resource_type)
            {
                Some(index) => index,
                None => {
                    report.types.push(TypeSummary {
                        resource_type: resource.resource_type.clone(),
                        found: 0,
                        filtered: 0,
                        to_delete: 0,
                    });
                    report.types.len() - 1
                }
            };

            let summary = &mut report.types[index];
            summary.found += 1;
            if excluded {
                debug!(resource_id = %resource.id, "Excluded by filter");
                summary.filtered += 1;
            } else {
                summary.to_delete += 1;
                candidates.push(resource);
            }
        }

        for summary in &report.types {
            info!(
                resource_type = %summary.resource_type,
                found = summary.found,
                filtered = summary.filtered,
                to_delete = summary.to_delete,
                "Scanned resources"
            );
        }

        Ok(ScanOutcome {
            candidates,
            deleters,
        })
    }

    /// Run deletion rounds until nothing is pending.
    async fn delete_all(
        &self,
        candidates: Vec<Resource>,
        deleters: &DeleterMap,
        report: &mut CleanReport,
    ) -> SweepResult<()> {
        let pending = PendingSet::new(candidates);
        let mut attempts: HashMap<ResourceId, u32> = HashMap::new();
        let mut previous_failed = false;

        while !pending.is_empty() {
            let batch = pending.next_batch();
            if batch.is_empty() {
                let remaining = pending.ids();
                error!(remaining = remaining.len(), "No resource can be deleted");
                return Err(SweepError::Unresolvable(
                    remaining.iter().map(|id| id.raw_id()).collect(),
                ));
            }

            if previous_failed {
                if let Some(backoff) = self.config.retry_backoff {
                    debug!(backoff = ?backoff, "Backing off before retry");
                    tokio::time::sleep(backoff).await;
                }
            }

            let round = report.rounds.len() + 1;
            info!(
                round,
                batch_size = batch.len(),
                pending = pending.len(),
                "Deleting batch"
            );

            let jobs = batch
                .into_iter()
                .map(|resource| -> SweepResult<DeletionJob> {
                    let deleter = deleters
                        .get(&resource.resource_type)
                        .cloned()
                        .ok_or_else(|| {
                            error!(
                                resource_type = %resource.resource_type,
                                resource_id = %resource.id,
                                "No deleter registered"
                            );
                            SweepError::MissingDeleter(resource.resource_type.clone())
                        })?;
                    Ok(DeletionJob { resource, deleter })
                })
                .collect::<SweepResult<Vec<_>>>()?;

            let batch_ids: Vec<ResourceId> = jobs.iter().map(|j| j.resource.id.clone()).collect();
            let outcome = self.run_round(jobs, &pending).await?;

            for (id, message) in &outcome.failed {
                let count = attempts.entry(id.clone()).or_insert(0);
                *count += 1;
                if let Some(max) = self.config.max_attempts {
                    if *count >= max {
                        error!(resource_id = %id, attempts = *count, "Giving up on resource");
                        return Err(SweepError::RetriesExhausted {
                            resource_id: id.raw_id(),
                            attempts: *count,
                            message: message.clone(),
                        });
                    }
                }
            }

            previous_failed = !outcome.failed.is_empty();
            report.failed_attempts += outcome.failed.len();
            report.rounds.push(RoundReport {
                round,
                batch: batch_ids,
                deleted: outcome.deleted.len(),
                failed: outcome.failed.len(),
            });
            report.deleted.extend(outcome.deleted);
        }

        Ok(())
    }

    /// Drain one batch through the worker pool and wait for every worker.
    async fn run_round(
        &self,
        jobs: Vec<DeletionJob>,
        pending: &PendingSet,
    ) -> SweepResult<WorkerOutcome> {
        let (tx, rx) = mpsc::channel::<DeletionJob>(self.config.concurrency);
        let rx = Arc::new(Mutex::new(rx));

        let mut workers = JoinSet::new();
        for worker in 0..self.config.concurrency {
            workers.spawn(run_worker(worker, rx.clone(), pending.clone()));
        }

        for job in jobs {
            if tx.send(job).await.is_err() {
                // Every worker is gone; the join below reports why
                break;
            }
        }
        drop(tx);

        let mut outcome = WorkerOutcome::default();
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(worker_outcome) => {
                    outcome.deleted.extend(worker_outcome.deleted);
                    outcome.failed.extend(worker_outcome.failed);
                }
                Err(join_err) => {
                    error!(?join_err, "Deletion worker panicked");
                    return Err(SweepError::WorkerPanicked(join_err.to_string()));
                }
            }
        }

        Ok(outcome)
    }
}

/// Pull jobs until the round's channel is closed and drained.
async fn run_worker(
    worker: usize,
    jobs: Arc<Mutex<mpsc::Receiver<DeletionJob>>>,
    pending: PendingSet,
) -> WorkerOutcome {
    let mut outcome = WorkerOutcome::default();

    loop {
        let job = jobs.lock().await.recv().await;
        let Some(DeletionJob { resource, deleter }) = job else {
            break;
        };

        debug!(
            worker,
            resource_type = %resource.resource_type,
            resource_id = %resource.id,
            "Deleting"
        );

        match deleter.delete(&resource).await {
            Ok(()) => {
                pending.remove(&resource.id);
                info!(
                    resource_type = %resource.resource_type,
                    resource_id = %resource.id,
                    "Deleted"
                );
                outcome.deleted.push(resource.id);
            }
            Err(e) => {
                warn!(
                    resource_type = %resource.resource_type,
                    resource_id = %resource.id,
                    error = ?e,
                    "Failed to delete"
                );
                outcome.failed.push((resource.id, format!("{:#}", e)));
            }
        }
    }

    outcome
}
