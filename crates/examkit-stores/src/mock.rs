//! In-memory backends for testing and demos.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examkit_core::model::Exam;
use examkit_core::traits::{ExamSource, ResultStore, SaveResultRequest};

/// An exam source backed by a map, with optional forced failure.
pub struct InMemoryExamSource {
    /// Map of exam id → exam.
    exams: HashMap<String, Exam>,
    /// Error returned from every lookup when set.
    failure: Option<String>,
    /// Number of lookups made.
    call_count: AtomicU32,
}

impl InMemoryExamSource {
    pub fn new(exams: impl IntoIterator<Item = Exam>) -> Self {
        Self {
            exams: exams.into_iter().map(|e| (e.id.clone(), e)).collect(),
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// A source whose every lookup fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            exams: HashMap::new(),
            failure: Some(message.to_string()),
            call_count: AtomicU32::new(0),
        }
    }

    /// Get the number of lookups made against this source.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ExamSource for InMemoryExamSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_exam_by_id(&self, id: &str) -> anyhow::Result<Option<Exam>> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        Ok(self.exams.get(id).cloned())
    }
}

/// A result store that keeps every request, with optional forced failure.
#[derive(Default)]
pub struct InMemoryResultStore {
    saved: Mutex<Vec<SaveResultRequest>>,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every save fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Get the number of save calls, including failed ones.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Requests saved so far.
    pub fn saved(&self) -> Vec<SaveResultRequest> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save_result(&self, request: &SaveResultRequest) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        self.saved.lock().unwrap().push(request.clone());
        Ok(())
    }
}
