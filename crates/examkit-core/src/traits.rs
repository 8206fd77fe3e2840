//! Collaborator traits for exam lookup, result storage, and local caching.
//!
//! The exam source and result store are async and implemented by the
//! `examkit-stores` crate. The key/value cache is synchronous, like a
//! browser's local storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{AnswerMap, AttemptRecord, Exam};

// ---------------------------------------------------------------------------
// Exam source
// ---------------------------------------------------------------------------

/// Where exams come from when the local cache does not have them.
#[async_trait]
pub trait ExamSource: Send + Sync {
    /// Human-readable source name (e.g. "http").
    fn name(&self) -> &str;

    /// Fetch one exam. `Ok(None)` means the source does not know the id.
    async fn get_exam_by_id(&self, id: &str) -> anyhow::Result<Option<Exam>>;
}

// ---------------------------------------------------------------------------
// Result store
// ---------------------------------------------------------------------------

/// Durable storage for submitted results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Human-readable store name.
    fn name(&self) -> &str;

    /// Save one submitted result.
    async fn save_result(&self, request: &SaveResultRequest) -> anyhow::Result<()>;
}

/// Payload sent to a [`ResultStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResultRequest {
    /// Exam identifier.
    pub test_id: String,
    /// Submitting user, `"anonymous"` when unknown.
    pub user_id: String,
    /// Identifier of this attempt.
    pub attempt_id: Uuid,
    /// Net score.
    pub score: f64,
    /// Score as a percentage of the baseline.
    pub percentage: f64,
    /// Whether the passing percentage was reached.
    pub passed: bool,
    /// Selected option per question id.
    pub answers: AnswerMap,
    /// Submission time.
    pub submitted_at: DateTime<Utc>,
}

impl From<&AttemptRecord> for SaveResultRequest {
    fn from(record: &AttemptRecord) -> Self {
        Self {
            test_id: record.exam_id.clone(),
            user_id: record.user_id.clone(),
            attempt_id: record.attempt_id,
            score: record.result.score,
            percentage: record.result.percentage,
            passed: record.result.passed,
            answers: record.result.answers.clone(),
            submitted_at: record.submitted_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Local cache
// ---------------------------------------------------------------------------

/// A string key/value store local to this machine.
pub trait KeyValueCache: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}
