//! Answer tracking for one attempt.

use crate::model::AnswerMap;

/// Holds the option selected for each answered question.
///
/// Entries are only ever added or replaced; there is no way to clear an
/// answer once given.
#[derive(Debug, Clone, Default)]
pub struct AnswerTracker {
    answers: AnswerMap,
}

impl AnswerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, replacing any earlier one for the same question.
    pub fn record(&mut self, question_id: impl Into<String>, option_index: usize) {
        self.answers.insert(question_id.into(), option_index);
    }

    pub fn get(&self, question_id: &str) -> Option<usize> {
        self.answers.get(question_id).copied()
    }

    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answers.contains_key(question_id)
    }

    /// Number of answered questions.
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn into_answers(self) -> AnswerMap {
        self.answers
    }
}
