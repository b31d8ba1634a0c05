//! Assessment job manager
//!
//! Submissions are stored as `Processing` and queued on a bounded channel.
//! A fixed pool of workers drains the queue; each job is written to its
//! terminal state exactly once by the worker that ran it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::AssessmentJob;
use tokio::sync::{mpsc, Mutex, RwLock};

use super::assessment::{AreaAssessor, AssessmentRequest};
use crate::config::JobsConfig;
use crate::error::{AppError, AppResult};

/// Longest pause between retention sweeps
const MAX_SWEEP_INTERVAL_SECS: u64 = 300;

/// Storage for job records. Each write replaces the whole record.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, job: AssessmentJob);

    async fn get(&self, id: &str) -> Option<AssessmentJob>;

    /// Drop terminal jobs last updated before `cutoff`; returns how many
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> usize;
}

#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, AssessmentJob>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: AssessmentJob) {
        self.jobs.write().await.insert(job.id.clone(), job);
    }

    async fn get(&self, id: &str) -> Option<AssessmentJob> {
        self.jobs.read().await.get(id).cloned()
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.status.is_terminal() || job.updated_at >= cutoff);
        before - jobs.len()
    }
}

struct QueuedJob {
    id: String,
    request: AssessmentRequest,
}

pub struct JobManager {
    store: Arc<dyn JobStore>,
    sender: mpsc::Sender<QueuedJob>,
}

impl JobManager {
    /// Spawn the worker pool and the retention sweep. Must be called from
    /// within a tokio runtime.
    pub fn start(
        store: Arc<dyn JobStore>,
        assessor: Arc<dyn AreaAssessor>,
        config: &JobsConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));

        for worker in 0..config.workers.max(1) {
            tokio::spawn(run_worker(
                worker,
                receiver.clone(),
                store.clone(),
                assessor.clone(),
            ));
        }

        if config.retention_secs > 0 {
            tokio::spawn(run_retention_sweep(
                store.clone(),
                Duration::from_secs(config.retention_secs),
            ));
        }

        tracing::info!(
            workers = config.workers.max(1),
            queue_capacity = config.queue_capacity.max(1),
            "Assessment job manager started"
        );

        Self { store, sender }
    }

    /// Record a new `Processing` job and queue it for execution
    pub async fn submit(&self, request: AssessmentRequest) -> AppResult<AssessmentJob> {
        let permit = self.sender.try_reserve().map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => AppError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => {
                AppError::Internal("assessment workers are not running".to_string())
            }
        })?;

        let job = AssessmentJob::new();
        self.store.put(job.clone()).await;
        permit.send(QueuedJob {
            id: job.id.clone(),
            request,
        });

        tracing::info!(job_id = %job.id, "Assessment job submitted");
        Ok(job)
    }

    pub async fn get(&self, id: &str) -> AppResult<AssessmentJob> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| AppError::JobNotFound(id.to_string()))
    }
}

async fn run_worker(
    worker: usize,
    receiver: Arc<Mutex<mpsc::Receiver<QueuedJob>>>,
    store: Arc<dyn JobStore>,
    assessor: Arc<dyn AreaAssessor>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(queued) = next else {
            tracing::debug!(worker, "Job queue closed, worker exiting");
            break;
        };
        execute(queued, &store, assessor.clone()).await;
    }
}

async fn execute(queued: QueuedJob, store: &Arc<dyn JobStore>, assessor: Arc<dyn AreaAssessor>) {
    let QueuedJob { id, request } = queued;
    tracing::debug!(job_id = %id, "Running assessment job");

    // A panic in the pipeline surfaces here as a JoinError
    let outcome = tokio::spawn(async move { assessor.assess_request(request).await }).await;

    let Some(mut job) = store.get(&id).await else {
        tracing::warn!(job_id = %id, "Job record vanished before completion");
        return;
    };

    let transition = match outcome {
        Ok(Ok(result)) => job.complete(result),
        Ok(Err(e)) => {
            tracing::warn!(job_id = %id, "Assessment job failed: {}", e);
            job.fail(e.to_string())
        }
        Err(e) => {
            tracing::error!(job_id = %id, "Assessment job aborted: {}", e);
            job.fail("Assessment aborted unexpectedly")
        }
    };

    match transition {
        Ok(()) => {
            tracing::info!(job_id = %id, status = %job.status, "Assessment job finished");
            store.put(job).await;
        }
        Err(e) => tracing::error!(job_id = %id, "{}", AppError::from(e)),
    }
}

async fn run_retention_sweep(store: Arc<dyn JobStore>, retention: Duration) {
    let Ok(max_age) = chrono::Duration::from_std(retention) else {
        tracing::warn!("Job retention period out of range, sweep disabled");
        return;
    };
    let period = Duration::from_secs(retention.as_secs().clamp(1, MAX_SWEEP_INTERVAL_SECS));
    let mut ticker = tokio::time::interval(period);
    // First tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let purged = store.purge_expired(Utc::now() - max_age).await;
        if purged > 0 {
            tracing::debug!(purged, "Evicted expired assessment jobs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::JobStatus;

    #[tokio::test]
    async fn test_store_put_replaces_record() {
        let store = InMemoryJobStore::new();
        let mut job = AssessmentJob::new();
        store.put(job.clone()).await;

        job.fail("boom").unwrap();
        store.put(job.clone()).await;

        let stored = store.get(&job.id).await.unwrap();
        assert_eq!(stored.status, JobStatus::Failed);
        assert_eq!(stored.error.as_deref(), Some("boom"));
    }

    #[tokio::test]
    async fn test_purge_keeps_processing_jobs() {
        let store = InMemoryJobStore::new();

        let pending = AssessmentJob::new();
        let mut finished = AssessmentJob::new();
        finished.fail("boom").unwrap();
        store.put(pending.clone()).await;
        store.put(finished.clone()).await;

        let purged = store
            .purge_expired(Utc::now() + chrono::Duration::seconds(1))
            .await;

        assert_eq!(purged, 1);
        assert!(store.get(&pending.id).await.is_some());
        assert!(store.get(&finished.id).await.is_none());
    }

    #[tokio::test]
    async fn test_purge_respects_cutoff() {
        let store = InMemoryJobStore::new();
        let mut finished = AssessmentJob::new();
        finished.fail("boom").unwrap();
        store.put(finished.clone()).await;

        let purged = store
            .purge_expired(Utc::now() - chrono::Duration::hours(1))
            .await;
        assert_eq!(purged, 0);
    }
}
