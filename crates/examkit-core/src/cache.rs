//! Local cache layout: key naming, the exam catalog, and an in-memory cache.
//!
//! All local state lives behind one [`KeyValueCache`]. Exams are kept in a
//! catalog whose key is chosen by category, and the last result of each exam
//! is kept under `examResult_<exam id>`.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::model::{CatalogEntry, Exam};
use crate::traits::KeyValueCache;

/// Key of the catalog used when no category is given.
pub const CATALOG_KEY: &str = "exams";

/// Prefix of the per-exam fallback result key.
pub const RESULT_KEY_PREFIX: &str = "examResult_";

/// Catalog key for a category: `exams` or `exams.<category>`.
pub fn catalog_key(category: Option<&str>) -> String {
    match category.map(str::trim).filter(|c| !c.is_empty()) {
        Some(category) => format!("{CATALOG_KEY}.{category}"),
        None => CATALOG_KEY.to_string(),
    }
}

/// Fallback result key for an exam.
pub fn result_key(exam_id: &str) -> String {
    format!("{RESULT_KEY_PREFIX}{exam_id}")
}

/// One category's list of cached exams.
pub struct Catalog<'a> {
    cache: &'a dyn KeyValueCache,
    key: String,
}

impl<'a> Catalog<'a> {
    pub fn new(cache: &'a dyn KeyValueCache, category: Option<&str>) -> Self {
        Self {
            cache,
            key: catalog_key(category),
        }
    }

    /// The cache key backing this catalog.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// All entries. A catalog that was never written is empty.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>> {
        match self.cache.get(&self.key)? {
            Some(raw) => serde_json::from_str(&raw)
                .with_context(|| format!("corrupt exam catalog under '{}'", self.key)),
            None => Ok(Vec::new()),
        }
    }

    pub fn find(&self, exam_id: &str) -> Result<Option<CatalogEntry>> {
        Ok(self.entries()?.into_iter().find(|e| e.exam.id == exam_id))
    }

    /// Insert or replace an exam, keeping its attempt bookkeeping.
    pub fn upsert(&self, exam: &Exam) -> Result<()> {
        let mut entries = self.entries()?;
        match entries.iter_mut().find(|e| e.exam.id == exam.id) {
            Some(entry) => entry.exam = exam.clone(),
            None => entries.push(CatalogEntry::new(exam.clone())),
        }
        self.save(&entries)
    }

    /// Stamp `last_attempted_at` on an exam. Returns false if the exam is not
    /// in this catalog. `completed` is left as is.
    pub fn mark_attempted(&self, exam_id: &str, at: DateTime<Utc>) -> Result<bool> {
        let mut entries = self.entries()?;
        let Some(entry) = entries.iter_mut().find(|e| e.exam.id == exam_id) else {
            return Ok(false);
        };
        entry.last_attempted_at = Some(at);
        self.save(&entries)?;
        Ok(true)
    }

    fn save(&self, entries: &[CatalogEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries).context("failed to serialize exam catalog")?;
        self.cache.set(&self.key, &raw)
    }
}

/// A process-local cache, for tests and for front ends without disk access.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory cache lock poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}
