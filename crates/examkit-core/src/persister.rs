//! Result persistence: local fallback first, then the durable store.
//!
//! Nothing here fails the submission. The local copy is written before the
//! remote call, so a failed remote save still leaves a readable result.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cache::{result_key, Catalog};
use crate::model::AttemptRecord;
use crate::traits::{KeyValueCache, ResultStore, SaveResultRequest};

/// User id recorded when nobody is signed in.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Outcome of the remote save.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "lowercase")]
pub enum RemoteStatus {
    Saved,
    Failed(String),
}

/// What the persister managed to write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistOutcome {
    /// The record is in the local fallback cache.
    pub local_saved: bool,
    /// The exam's catalog entry got a fresh `last_attempted_at`.
    pub catalog_updated: bool,
    pub remote: RemoteStatus,
}

impl PersistOutcome {
    pub fn remote_saved(&self) -> bool {
        self.remote == RemoteStatus::Saved
    }
}

pub struct ResultPersister {
    store: Arc<dyn ResultStore>,
    cache: Arc<dyn KeyValueCache>,
}

impl ResultPersister {
    pub fn new(store: Arc<dyn ResultStore>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { store, cache }
    }

    /// Store a submitted attempt. Failures are logged and reported in the
    /// outcome, never returned.
    pub async fn persist(&self, record: &AttemptRecord) -> PersistOutcome {
        let local_saved = match self.save_fallback(record) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(exam = %record.exam_id, "failed to write local result: {e:#}");
                false
            }
        };

        let catalog = Catalog::new(self.cache.as_ref(), record.category.as_deref());
        let catalog_updated = match catalog.mark_attempted(&record.exam_id, record.submitted_at) {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(exam = %record.exam_id, "failed to update exam catalog: {e:#}");
                false
            }
        };

        let request = SaveResultRequest::from(record);
        let remote = match self.store.save_result(&request).await {
            Ok(()) => {
                tracing::info!(
                    exam = %record.exam_id,
                    attempt = %record.attempt_id,
                    store = self.store.name(),
                    "result saved"
                );
                RemoteStatus::Saved
            }
            Err(e) => {
                tracing::warn!(
                    exam = %record.exam_id,
                    store = self.store.name(),
                    "remote save failed, local copy kept: {e:#}"
                );
                RemoteStatus::Failed(format!("{e:#}"))
            }
        };

        PersistOutcome {
            local_saved,
            catalog_updated,
            remote,
        }
    }

    /// The last locally stored attempt for an exam.
    pub fn load_fallback(&self, exam_id: &str) -> Result<Option<AttemptRecord>> {
        load_fallback(self.cache.as_ref(), exam_id)
    }

    fn save_fallback(&self, record: &AttemptRecord) -> Result<()> {
        let raw = serde_json::to_string(record).context("failed to serialize result")?;
        self.cache.set(&result_key(&record.exam_id), &raw)
    }
}

/// Read the fallback result for an exam straight from a cache.
pub fn load_fallback(cache: &dyn KeyValueCache, exam_id: &str) -> Result<Option<AttemptRecord>> {
    let key = result_key(exam_id);
    match cache.get(&key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .with_context(|| format!("corrupt result under '{key}'")),
        None => Ok(None),
    }
}
