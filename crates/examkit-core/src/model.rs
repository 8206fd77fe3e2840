//! Core data model types for examkit.
//!
//! An [`Exam`] is an ordered list of [`Section`]s, each holding ordered
//! [`Question`]s. Exams are loaded once per attempt and never mutated.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mapping from question id to the selected option index.
///
/// A missing key means the question was left unanswered. Ordered so that
/// serialized results are stable.
pub type AnswerMap = BTreeMap<String, usize>;

/// A timed multiple-choice assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exam {
    /// Unique identifier for this exam.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category used to pick the cache catalog (e.g. "mock-tests").
    #[serde(default)]
    pub category: Option<String>,
    /// Time allowed for one attempt, in minutes.
    pub duration_minutes: u32,
    /// Sections in presentation order.
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Exam-wide scoring defaults.
    #[serde(default)]
    pub marking_scheme: MarkingScheme,
}

impl Exam {
    /// Total number of questions across all sections.
    pub fn total_questions(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Iterate over every question together with its owning section.
    pub fn questions(&self) -> impl Iterator<Item = (&Section, &Question)> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter().map(move |q| (s, q)))
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions().map(|(_, q)| q).find(|q| q.id == id)
    }

    /// Points a question is worth when answered correctly.
    pub fn weightage_of(&self, question: &Question) -> f64 {
        question
            .weightage
            .unwrap_or(self.marking_scheme.default_weightage)
    }
}

/// Exam-level scoring defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkingScheme {
    /// Points for a correct answer when a question has no own weightage.
    /// Also the per-question baseline for the percentage.
    #[serde(default = "default_weightage")]
    pub default_weightage: f64,
    /// Minimum percentage needed to pass.
    #[serde(default = "default_passing_percentage")]
    pub passing_percentage: f64,
}

impl Default for MarkingScheme {
    fn default() -> Self {
        Self {
            default_weightage: default_weightage(),
            passing_percentage: default_passing_percentage(),
        }
    }
}

pub(crate) fn default_weightage() -> f64 {
    1.0
}

pub(crate) fn default_passing_percentage() -> f64 {
    40.0
}

/// A named group of questions sharing a negative-marking penalty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Section name shown above its questions.
    pub name: String,
    /// Instructions shown when the section is entered.
    #[serde(default)]
    pub instructions: Option<String>,
    /// Points deducted for each wrong answer in this section.
    #[serde(default)]
    pub negative_marking: f64,
    /// Questions in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Identifier, unique across the whole exam.
    pub id: String,
    /// The question prompt.
    pub text: String,
    /// Answer options in display order.
    pub options: Vec<String>,
    /// Index into `options` of the correct answer.
    pub correct_answer: usize,
    /// Points awarded when correct. Falls back to the marking scheme.
    #[serde(default)]
    pub weightage: Option<f64>,
    /// Explanation shown when reviewing results.
    #[serde(default)]
    pub explanation: Option<String>,
}

/// What ended an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitTrigger {
    /// The user submitted.
    Manual,
    /// The countdown ran out.
    Timeout,
}

impl fmt::Display for SubmitTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitTrigger::Manual => write!(f, "manual"),
            SubmitTrigger::Timeout => write!(f, "timeout"),
        }
    }
}

/// Scores for one section of an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionScore {
    pub name: String,
    pub total_questions: usize,
    pub correct: usize,
    pub wrong: usize,
    pub score: f64,
}

/// The scored outcome of one attempt.
///
/// Derived purely from the exam, the answers, and the elapsed time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub exam_id: String,
    pub total_questions: usize,
    pub answered: usize,
    pub correct: usize,
    pub wrong: usize,
    pub unanswered: usize,
    /// Net score after negative marking. May be negative.
    pub score: f64,
    /// Sum of the weightage of every question.
    pub max_score: f64,
    pub percentage: f64,
    pub passed: bool,
    /// Whole seconds between attempt start and submission.
    pub elapsed_secs: u64,
    /// Per-section breakdown in exam order.
    #[serde(default)]
    pub sections: Vec<SectionScore>,
    pub answers: AnswerMap,
}

/// A submitted attempt: the result plus who, when, and how it ended.
///
/// Written once at submission and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_id: Uuid,
    pub exam_id: String,
    pub exam_title: String,
    /// Catalog the exam was loaded from; `None` is the default catalog.
    #[serde(default)]
    pub category: Option<String>,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub submitted_at: DateTime<Utc>,
    pub trigger: SubmitTrigger,
    pub result: ExamResult,
}

/// An exam as held in a cached catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub exam: Exam,
    /// When the exam was last submitted on this machine.
    #[serde(default)]
    pub last_attempted_at: Option<DateTime<Utc>>,
    /// Never set by examkit; exams stay open for retakes.
    #[serde(default)]
    pub completed: bool,
}

impl CatalogEntry {
    pub fn new(exam: Exam) -> Self {
        Self {
            exam,
            last_attempted_at: None,
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, weightage: Option<f64>) -> Question {
        Question {
            id: id.into(),
            text: format!("Question {id}"),
            options: vec!["a".into(), "b".into()],
            correct_answer: 0,
            weightage,
            explanation: None,
        }
    }

    fn exam() -> Exam {
        Exam {
            id: "exam-1".into(),
            title: "Exam".into(),
            description: None,
            category: None,
            duration_minutes: 10,
            sections: vec![
                Section {
                    name: "A".into(),
                    instructions: None,
                    negative_marking: 0.0,
                    questions: vec![question("q1", None), question("q2", Some(3.0))],
                },
                Section {
                    name: "B".into(),
                    instructions: None,
                    negative_marking: 0.5,
                    questions: vec![question("q3", None)],
                },
            ],
            marking_scheme: MarkingScheme {
                default_weightage: 2.0,
                passing_percentage: 50.0,
            },
        }
    }

    #[test]
    fn totals_and_lookup() {
        let exam = exam();
        assert_eq!(exam.total_questions(), 3);
        assert_eq!(exam.question("q3").map(|q| q.id.as_str()), Some("q3"));
        assert!(exam.question("missing").is_none());
    }

    #[test]
    fn weightage_falls_back_to_scheme() {
        let exam = exam();
        let q1 = exam.question("q1").unwrap();
        let q2 = exam.question("q2").unwrap();
        assert_eq!(exam.weightage_of(q1), 2.0);
        assert_eq!(exam.weightage_of(q2), 3.0);
    }

    #[test]
    fn marking_scheme_defaults_when_missing() {
        let json = r#"{"id":"e","title":"E","duration_minutes":5}"#;
        let exam: Exam = serde_json::from_str(json).unwrap();
        assert_eq!(exam.marking_scheme, MarkingScheme::default());
        assert!(exam.sections.is_empty());
    }

    #[test]
    fn catalog_entry_flattens_exam() {
        let entry = CatalogEntry::new(exam());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], "exam-1");
        assert_eq!(value["completed"], false);

        let back: CatalogEntry = serde_json::from_value(value).unwrap();
        assert_eq!(back.exam.id, "exam-1");
        assert!(back.last_attempted_at.is_none());
    }

    #[test]
    fn trigger_display() {
        assert_eq!(SubmitTrigger::Manual.to_string(), "manual");
        assert_eq!(SubmitTrigger::Timeout.to_string(), "timeout");
    }
}
