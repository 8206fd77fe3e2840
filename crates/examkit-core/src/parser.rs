//! Exam file parser.
//!
//! Loads exams from TOML or JSON files and directories, and validates them.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{
    default_passing_percentage, default_weightage, Exam, MarkingScheme, Question, Section,
};

/// Intermediate TOML structure for parsing exam files.
#[derive(Debug, Deserialize)]
struct TomlExamFile {
    exam: TomlExamHeader,
    #[serde(default)]
    sections: Vec<TomlSection>,
}

#[derive(Debug, Deserialize)]
struct TomlExamHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category: Option<String>,
    duration_minutes: u32,
    #[serde(default = "default_weightage")]
    default_weightage: f64,
    #[serde(default = "default_passing_percentage")]
    passing_percentage: f64,
}

#[derive(Debug, Deserialize)]
struct TomlSection {
    name: String,
    #[serde(default)]
    instructions: Option<String>,
    #[serde(default)]
    negative_marking: f64,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    #[serde(default)]
    id: Option<String>,
    text: String,
    options: Vec<String>,
    correct_answer: usize,
    #[serde(default)]
    weightage: Option<f64>,
    #[serde(default)]
    explanation: Option<String>,
}

/// Parse a single exam file. `.json` files are read as JSON, everything
/// else as TOML.
pub fn parse_exam(path: &Path) -> Result<Exam> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read exam file: {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse JSON: {}", path.display()))
    } else {
        parse_exam_str(&content, path)
    }
}

/// Parse a TOML string into an `Exam` (useful for testing).
///
/// Questions without an `id` get `s<section>q<question>` (1-based).
pub fn parse_exam_str(content: &str, source_path: &Path) -> Result<Exam> {
    let parsed: TomlExamFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let sections = parsed
        .sections
        .into_iter()
        .enumerate()
        .map(|(s_idx, s)| Section {
            name: s.name,
            instructions: s.instructions,
            negative_marking: s.negative_marking,
            questions: s
                .questions
                .into_iter()
                .enumerate()
                .map(|(q_idx, q)| Question {
                    id: q
                        .id
                        .unwrap_or_else(|| format!("s{}q{}", s_idx + 1, q_idx + 1)),
                    text: q.text,
                    options: q.options,
                    correct_answer: q.correct_answer,
                    weightage: q.weightage,
                    explanation: q.explanation,
                })
                .collect(),
        })
        .collect();

    Ok(Exam {
        id: parsed.exam.id,
        title: parsed.exam.title,
        description: parsed.exam.description,
        category: parsed.exam.category,
        duration_minutes: parsed.exam.duration_minutes,
        sections,
        marking_scheme: MarkingScheme {
            default_weightage: parsed.exam.default_weightage,
            passing_percentage: parsed.exam.passing_percentage,
        },
    })
}

/// Recursively load all `.toml` and `.json` exam files from a directory.
pub fn load_exam_directory(dir: &Path) -> Result<Vec<Exam>> {
    let mut exams = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            exams.extend(load_exam_directory(&path)?);
        } else if path
            .extension()
            .is_some_and(|ext| ext == "toml" || ext == "json")
        {
            match parse_exam(&path) {
                Ok(exam) => exams.push(exam),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    Ok(exams)
}

/// A warning from exam validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn exam(message: impl Into<String>) -> Self {
        Self {
            question_id: None,
            message: message.into(),
        }
    }

    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate an exam for common authoring mistakes.
pub fn validate_exam(exam: &Exam) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if exam.id.trim().is_empty() {
        warnings.push(ValidationWarning::exam("exam id is empty"));
    }
    if exam.duration_minutes == 0 {
        warnings.push(ValidationWarning::exam("duration_minutes must be greater than 0"));
    }
    if exam.marking_scheme.default_weightage <= 0.0 {
        warnings.push(ValidationWarning::exam(
            "default_weightage must be positive; percentages will be 0",
        ));
    }
    if !(0.0..=100.0).contains(&exam.marking_scheme.passing_percentage) {
        warnings.push(ValidationWarning::exam(format!(
            "passing_percentage {} is outside 0..=100",
            exam.marking_scheme.passing_percentage
        )));
    }
    if exam.sections.is_empty() {
        warnings.push(ValidationWarning::exam("exam has no sections"));
    }

    for section in &exam.sections {
        if section.questions.is_empty() {
            warnings.push(ValidationWarning::exam(format!(
                "section '{}' has no questions",
                section.name
            )));
        }
        if section.negative_marking < 0.0 {
            warnings.push(ValidationWarning::exam(format!(
                "section '{}' has a negative negative_marking; wrong answers will add points",
                section.name
            )));
        }
    }

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for (_, question) in exam.questions() {
        if !seen_ids.insert(question.id.as_str()) {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!("duplicate question ID: {}", question.id),
            ));
        }
    }

    for (_, question) in exam.questions() {
        if question.correct_answer >= question.options.len() {
            warnings.push(ValidationWarning::question(
                &question.id,
                format!(
                    "correct_answer {} is out of range ({} options)",
                    question.correct_answer,
                    question.options.len()
                ),
            ));
        }
        if question.options.len() < 2 {
            warnings.push(ValidationWarning::question(
                &question.id,
                "question has fewer than two options",
            ));
        }
        if question.text.trim().is_empty() {
            warnings.push(ValidationWarning::question(&question.id, "question text is empty"));
        }
    }

    warnings
}
