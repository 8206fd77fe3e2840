//! Exam lookup: local catalog first, then the exam source.

use std::collections::HashSet;
use std::sync::Arc;

use crate::cache::Catalog;
use crate::error::LoadError;
use crate::model::Exam;
use crate::traits::{ExamSource, KeyValueCache};

/// An exam ready for an attempt, with the catalog it is cached in.
#[derive(Debug, Clone)]
pub struct LoadedExam {
    pub exam: Exam,
    /// Category of the catalog that holds the exam; `None` is the default
    /// catalog. Results stamp `last_attempted_at` in the same catalog.
    pub category: Option<String>,
}

/// Resolves exams for an attempt.
///
/// The cache catalog is chosen by the requested category alone, for both
/// the lookup and the write-back. A miss falls through to the source once;
/// there are no retries.
pub struct ExamAccessor {
    source: Arc<dyn ExamSource>,
    cache: Arc<dyn KeyValueCache>,
}

impl ExamAccessor {
    pub fn new(source: Arc<dyn ExamSource>, cache: Arc<dyn KeyValueCache>) -> Self {
        Self { source, cache }
    }

    /// Load and validate an exam.
    pub async fn load(&self, id: &str, category: Option<&str>) -> Result<LoadedExam, LoadError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(LoadError::MissingId);
        }
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let catalog = Catalog::new(self.cache.as_ref(), category);

        if let Some(exam) = lookup_cached(&catalog, id) {
            tracing::debug!(exam = %id, catalog = catalog.key(), "exam served from cache");
            validate_loadable(&exam)?;
            return Ok(LoadedExam {
                exam,
                category: category.map(str::to_string),
            });
        }

        tracing::debug!(exam = %id, source = self.source.name(), "cache miss, querying source");
        let exam = self
            .source
            .get_exam_by_id(id)
            .await
            .map_err(|e| LoadError::Unavailable {
                id: id.to_string(),
                message: format!("{e:#}"),
            })?
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;

        validate_loadable(&exam)?;
        if let Err(e) = catalog.upsert(&exam) {
            tracing::warn!("failed to cache exam {} in '{}': {:#}", exam.id, catalog.key(), e);
        }
        Ok(LoadedExam {
            exam,
            category: category.map(str::to_string),
        })
    }
}

fn lookup_cached(catalog: &Catalog<'_>, id: &str) -> Option<Exam> {
    match catalog.find(id) {
        Ok(entry) => entry.map(|e| e.exam),
        Err(e) => {
            tracing::warn!("ignoring exam catalog '{}': {:#}", catalog.key(), e);
            None
        }
    }
}

/// Check that an exam can be attempted: it has an id, at least one section,
/// at least one question, unique question ids, and every correct answer
/// indexes one of its question's options.
pub fn validate_loadable(exam: &Exam) -> Result<(), LoadError> {
    if exam.id.trim().is_empty() {
        return Err(LoadError::MissingId);
    }
    if exam.sections.is_empty() {
        return Err(LoadError::NoSections(exam.id.clone()));
    }
    if exam.sections.iter().all(|s| s.questions.is_empty()) {
        return Err(LoadError::NoQuestions(exam.id.clone()));
    }

    let invalid = |reason: String| LoadError::Invalid {
        id: exam.id.clone(),
        reason,
    };
    let mut seen = HashSet::new();
    for (_, question) in exam.questions() {
        if !seen.insert(question.id.as_str()) {
            return Err(invalid(format!("duplicate question id {}", question.id)));
        }
        if question.correct_answer >= question.options.len() {
            return Err(invalid(format!(
                "question {} has correct_answer {} but {} options",
                question.id,
                question.correct_answer,
                question.options.len()
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use crate::cache::MemoryCache;
    use crate::error::Recovery;
    use crate::model::{MarkingScheme, Question, Section};

    struct StubSource {
        exam: Option<Exam>,
        fail: bool,
        calls: AtomicU32,
    }

    impl StubSource {
        fn with(exam: Option<Exam>) -> Self {
            Self {
                exam,
                fail: false,
                calls: AtomicU32::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                exam: None,
                fail: true,
                calls: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ExamSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn get_exam_by_id(&self, id: &str) -> anyhow::Result<Option<Exam>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            if self.fail {
                anyhow::bail!("connection refused");
            }
            Ok(self.exam.clone().filter(|e| e.id == id))
        }
    }

    fn exam(id: &str, sections: Vec<Section>) -> Exam {
        Exam {
            id: id.into(),
            title: "Title".into(),
            description: None,
            category: None,
            duration_minutes: 10,
            sections,
            marking_scheme: MarkingScheme::default(),
        }
    }

    fn section(questions: usize) -> Section {
        Section {
            name: "S".into(),
            instructions: None,
            negative_marking: 0.0,
            questions: (0..questions)
                .map(|i| Question {
                    id: format!("q{i}"),
                    text: "?".into(),
                    options: vec!["a".into(), "b".into()],
                    correct_answer: 0,
                    weightage: None,
                    explanation: None,
                })
                .collect(),
        }
    }

    fn setup(source: StubSource) -> (Arc<StubSource>, Arc<MemoryCache>, ExamAccessor) {
        let source = Arc::new(source);
        let cache = Arc::new(MemoryCache::new());
        let accessor = ExamAccessor::new(source.clone(), cache.clone());
        (source, cache, accessor)
    }

    #[tokio::test]
    async fn cache_hit_skips_source() {
        let (source, cache, accessor) = setup(StubSource::with(None));
        Catalog::new(cache.as_ref(), Some("mock"))
            .upsert(&exam("e1", vec![section(1)]))
            .unwrap();

        let loaded = accessor.load("e1", Some("mock")).await.unwrap();
        assert_eq!(loaded.exam.id, "e1");
        assert_eq!(loaded.category.as_deref(), Some("mock"));
        assert_eq!(source.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn miss_queries_source_and_remembers() {
        let (source, _cache, accessor) = setup(StubSource::with(Some(exam("e1", vec![section(2)]))));

        accessor.load("e1", None).await.unwrap();
        accessor.load("e1", None).await.unwrap();
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn category_selects_catalog() {
        let (source, cache, accessor) = setup(StubSource::with(Some(exam("e1", vec![section(1)]))));
        Catalog::new(cache.as_ref(), Some("other"))
            .upsert(&exam("e1", vec![section(1)]))
            .unwrap();

        accessor.load("e1", Some("mock")).await.unwrap();
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
        assert!(Catalog::new(cache.as_ref(), Some("mock"))
            .find("e1")
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn own_category_does_not_pick_the_catalog() {
        let mut categorized = exam("e1", vec![section(1)]);
        categorized.category = Some("mock".into());
        let (source, cache, accessor) = setup(StubSource::with(Some(categorized)));

        let loaded = accessor.load("e1", None).await.unwrap();
        assert_eq!(loaded.category, None);
        assert!(Catalog::new(cache.as_ref(), None).find("e1").unwrap().is_some());
        assert!(cache.get("exams.mock").unwrap().is_none());

        accessor.load("e1", None).await.unwrap();
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn blank_category_is_the_default_catalog() {
        let (_, cache, accessor) = setup(StubSource::with(Some(exam("e1", vec![section(1)]))));
        let loaded = accessor.load("e1", Some("  ")).await.unwrap();
        assert_eq!(loaded.category, None);
        assert!(cache.get("exams").unwrap().is_some());
    }

    #[tokio::test]
    async fn not_found() {
        let (_, _, accessor) = setup(StubSource::with(None));
        let err = accessor.load("ghost", None).await.unwrap_err();
        assert!(matches!(err, LoadError::NotFound(ref id) if id == "ghost"));
        assert_eq!(err.recovery(), Recovery::BackToList);
    }

    #[tokio::test]
    async fn empty_id_is_rejected() {
        let (source, _, accessor) = setup(StubSource::with(None));
        assert!(matches!(accessor.load("  ", None).await, Err(LoadError::MissingId)));
        assert_eq!(source.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn no_sections_vs_no_questions() {
        let (_, _, accessor) = setup(StubSource::with(Some(exam("bare", vec![]))));
        assert!(matches!(
            accessor.load("bare", None).await,
            Err(LoadError::NoSections(_))
        ));

        let (_, _, accessor) = setup(StubSource::with(Some(exam(
            "hollow",
            vec![section(0), section(0)],
        ))));
        assert!(matches!(
            accessor.load("hollow", None).await,
            Err(LoadError::NoQuestions(_))
        ));
    }

    #[tokio::test]
    async fn invalid_exam_is_not_cached() {
        let (_, cache, accessor) = setup(StubSource::with(Some(exam("bare", vec![]))));
        let _ = accessor.load("bare", None).await;
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn duplicate_question_ids_are_rejected() {
        let (_, cache, accessor) = setup(StubSource::with(Some(exam(
            "twice",
            vec![section(2), section(1)],
        ))));
        let err = accessor.load("twice", None).await.unwrap_err();
        assert!(matches!(err, LoadError::Invalid { ref reason, .. } if reason.contains("q0")));
        assert_eq!(err.recovery(), Recovery::BackToList);
        assert!(cache.is_empty());
    }

    #[test]
    fn correct_answer_must_index_an_option() {
        let mut broken = exam("e1", vec![section(1)]);
        broken.sections[0].questions[0].correct_answer = 2;
        let err = validate_loadable(&broken).unwrap_err();
        assert!(err.to_string().contains("correct_answer 2 but 2 options"));

        broken.sections[0].questions[0].correct_answer = 1;
        assert!(validate_loadable(&broken).is_ok());
    }

    #[tokio::test]
    async fn source_failure_offers_retry() {
        let (source, _, accessor) = setup(StubSource::failing());
        let err = accessor.load("e1", None).await.unwrap_err();
        assert!(matches!(err, LoadError::Unavailable { .. }));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.recovery(), Recovery::Retry);
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn corrupt_catalog_falls_back_to_source() {
        let (source, cache, accessor) = setup(StubSource::with(Some(exam("e1", vec![section(1)]))));
        cache.set("exams", "{broken").unwrap();

        assert!(accessor.load("e1", None).await.is_ok());
        assert_eq!(source.calls.load(Ordering::Relaxed), 1);
    }
}
