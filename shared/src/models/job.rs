//! Assessment job lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::assessment::AssessmentResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("job {job_id} is already {status}")]
pub struct JobTransitionError {
    pub job_id: String,
    pub status: JobStatus,
}

/// A trackable unit of assessment work.
///
/// Created in `Processing`; moves exactly once to `Completed` or `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentJob {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssessmentJob {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            status: JobStatus::Processing,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }

    fn ensure_processing(&self) -> Result<(), JobTransitionError> {
        if self.status.is_terminal() {
            return Err(JobTransitionError {
                job_id: self.id.clone(),
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn complete(&mut self, result: AssessmentResult) -> Result<(), JobTransitionError> {
        self.ensure_processing()?;
        self.status = JobStatus::Completed;
        self.result = Some(result);
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), JobTransitionError> {
        self.ensure_processing()?;
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
        Ok(())
    }
}

impl Default for AssessmentJob {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_job_is_processing() {
        let job = AssessmentJob::new();
        assert_eq!(job.status, JobStatus::Processing);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
        assert!(Uuid::parse_str(&job.id).is_ok());
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(AssessmentJob::new().id, AssessmentJob::new().id);
    }

    #[test]
    fn test_failed_job_never_reverts() {
        let mut job = AssessmentJob::new();
        job.fail("Invalid GeoJSON area provided").unwrap();
        assert_eq!(job.status, JobStatus::Failed);

        let err = job.fail("again").unwrap_err();
        assert_eq!(err.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("Invalid GeoJSON area provided"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Completed).unwrap(),
            "\"completed\""
        );
    }
}
