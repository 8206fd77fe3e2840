//! Error types for loading exams and driving an attempt.

use thiserror::Error;

/// Why an exam could not be loaded for an attempt.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Neither the cache nor the source knows this exam.
    #[error("exam not found: {0}")]
    NotFound(String),

    /// The requested id, or the loaded record's id, is empty.
    #[error("exam has no identifier")]
    MissingId,

    /// The exam exists but has no sections.
    #[error("exam {0} has no sections")]
    NoSections(String),

    /// The exam has sections but none of them holds a question.
    #[error("exam {0} has no questions")]
    NoQuestions(String),

    /// The exam breaks a data-model rule, such as a repeated question id.
    #[error("exam {id} is invalid: {reason}")]
    Invalid { id: String, reason: String },

    /// The exam source failed.
    #[error("failed to load exam {id}: {message}")]
    Unavailable { id: String, message: String },
}

/// The recovery action offered alongside a load error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Try the same load again.
    Retry,
    /// Go back to the exam list.
    BackToList,
}

impl LoadError {
    /// Message suitable for showing to the person taking the exam.
    pub fn user_message(&self) -> &'static str {
        match self {
            LoadError::NotFound(_) => "This exam could not be found.",
            LoadError::MissingId => "This exam link is missing its identifier.",
            LoadError::NoSections(_) => "This exam has no sections yet.",
            LoadError::NoQuestions(_) => "This exam has no questions yet.",
            LoadError::Invalid { .. } => "This exam is malformed and cannot be taken.",
            LoadError::Unavailable { .. } => {
                "The exam could not be loaded. Check your connection and try again."
            }
        }
    }

    pub fn recovery(&self) -> Recovery {
        match self {
            LoadError::Unavailable { .. } => Recovery::Retry,
            _ => Recovery::BackToList,
        }
    }
}

/// Errors raised while driving an attempt.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The cursor does not address a real question.
    #[error("no question at section {section}, question {question}")]
    InvalidCursor { section: usize, question: usize },

    /// The selected option is outside the question's option list.
    #[error("option {option} is out of range for question {question_id} ({available} options)")]
    InvalidOption {
        question_id: String,
        option: usize,
        available: usize,
    },

    /// A result was already produced for this attempt.
    #[error("attempt already submitted")]
    AlreadySubmitted,

    /// A submission is running; the attempt is locked.
    #[error("submission already in progress")]
    SubmissionInFlight,

    /// The exam handed to the session is not loadable.
    #[error(transparent)]
    Load(#[from] LoadError),
}
