//! Assessment job integration tests
//!
//! Tests for the queued job lifecycle including:
//! - Processing until the worker finishes, then exactly one terminal state
//! - Structural failures recorded as Failed
//! - Unknown ids and a full queue

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::heuristic_service;
use serde_json::json;
use shared::{AssessmentJob, AssessmentResult, JobStatus};
use soil_assessment_backend::config::JobsConfig;
use soil_assessment_backend::error::{AppError, AppResult};
use soil_assessment_backend::services::{
    AreaAssessor, AssessmentOptions, AssessmentRequest, InMemoryJobStore, JobManager,
};
use tokio::sync::Notify;

fn jobs_config(workers: usize, queue_capacity: usize) -> JobsConfig {
    JobsConfig {
        workers,
        queue_capacity,
        retention_secs: 0,
    }
}

fn point_request() -> AssessmentRequest {
    AssessmentRequest {
        area: json!({"type": "Point", "coordinates": [73.86, 18.52]}),
        options: AssessmentOptions::default(),
    }
}

fn start(assessor: Arc<dyn AreaAssessor>, workers: usize, queue_capacity: usize) -> JobManager {
    JobManager::start(
        Arc::new(InMemoryJobStore::new()),
        assessor,
        &jobs_config(workers, queue_capacity),
    )
}

async fn wait_for_terminal(manager: &JobManager, id: &str) -> AssessmentJob {
    for _ in 0..200 {
        let job = manager.get(id).await.unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {} never finished", id);
}

/// Holds every assessment until released
struct GatedAssessor {
    started: Notify,
    release: Notify,
}

impl GatedAssessor {
    fn new() -> Self {
        Self {
            started: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl AreaAssessor for GatedAssessor {
    async fn assess_request(&self, request: AssessmentRequest) -> AppResult<AssessmentResult> {
        self.started.notify_one();
        self.release.notified().await;
        heuristic_service().assess_request(request).await
    }
}

struct PanickingAssessor;

#[async_trait]
impl AreaAssessor for PanickingAssessor {
    async fn assess_request(&self, _request: AssessmentRequest) -> AppResult<AssessmentResult> {
        panic!("pipeline bug");
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_job_is_processing_until_worker_finishes() {
    let assessor = Arc::new(GatedAssessor::new());
    let manager = start(assessor.clone(), 1, 4);

    let submitted = manager.submit(point_request()).await.unwrap();
    assert_eq!(submitted.status, JobStatus::Processing);

    assessor.started.notified().await;
    let polled = manager.get(&submitted.id).await.unwrap();
    assert_eq!(polled.status, JobStatus::Processing);
    assert!(polled.result.is_none());

    assessor.release.notify_one();
    let finished = wait_for_terminal(&manager, &submitted.id).await;
    assert_eq!(finished.status, JobStatus::Completed);
    assert_eq!(finished.result.as_ref().unwrap().nutrient_estimates.len(), 12);
    assert!(finished.error.is_none());

    // Terminal states stick
    tokio::time::sleep(Duration::from_millis(20)).await;
    let later = manager.get(&submitted.id).await.unwrap();
    assert_eq!(later.status, JobStatus::Completed);
    assert_eq!(later.updated_at, finished.updated_at);
}

#[tokio::test]
async fn test_malformed_area_fails_the_job() {
    let manager = start(Arc::new(heuristic_service()), 2, 4);
    let request = AssessmentRequest {
        area: json!({"type": "Polygon", "coordinates": [[[77.0, 12.9], [77.1, 12.9]]]}),
        options: AssessmentOptions::default(),
    };

    let submitted = manager.submit(request).await.unwrap();
    let finished = wait_for_terminal(&manager, &submitted.id).await;

    assert_eq!(finished.status, JobStatus::Failed);
    assert!(finished.result.is_none());
    assert!(finished.error.unwrap().contains("Invalid geometry"));
}

#[tokio::test]
async fn test_panicking_pipeline_is_recorded_as_failed() {
    let manager = start(Arc::new(PanickingAssessor), 1, 4);

    let first = manager.submit(point_request()).await.unwrap();
    let failed = wait_for_terminal(&manager, &first.id).await;
    assert_eq!(failed.status, JobStatus::Failed);

    // The worker survives and keeps draining the queue
    let second = manager.submit(point_request()).await.unwrap();
    let failed = wait_for_terminal(&manager, &second.id).await;
    assert_eq!(failed.status, JobStatus::Failed);
}

#[tokio::test]
async fn test_concurrent_submissions_all_complete() {
    let manager = start(Arc::new(heuristic_service()), 3, 16);

    let mut ids = Vec::new();
    for _ in 0..8 {
        ids.push(manager.submit(point_request()).await.unwrap().id);
    }

    for id in &ids {
        let job = wait_for_terminal(&manager, id).await;
        assert_eq!(job.status, JobStatus::Completed);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

// ============================================================================
// Rejections
// ============================================================================

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let manager = start(Arc::new(heuristic_service()), 1, 4);
    let err = manager.get("does-not-exist").await.unwrap_err();
    assert!(matches!(err, AppError::JobNotFound(_)));
}

#[tokio::test]
async fn test_full_queue_rejects_without_creating_a_job() {
    let assessor = Arc::new(GatedAssessor::new());
    let manager = start(assessor.clone(), 1, 1);

    // The single worker takes the first job and blocks on it
    let running = manager.submit(point_request()).await.unwrap();
    assessor.started.notified().await;

    // The second fills the queue, the third has nowhere to go
    let queued = manager.submit(point_request()).await.unwrap();
    let err = manager.submit(point_request()).await.unwrap_err();
    assert!(matches!(err, AppError::QueueFull));

    assessor.release.notify_one();
    assert_eq!(
        wait_for_terminal(&manager, &running.id).await.status,
        JobStatus::Completed
    );

    assessor.release.notify_one();
    assert_eq!(
        wait_for_terminal(&manager, &queued.id).await.status,
        JobStatus::Completed
    );
}
