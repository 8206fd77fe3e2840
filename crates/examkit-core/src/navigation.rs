//! Cursor movement over an exam's sections and questions.
//!
//! Sections without questions are skipped. Moving past either end of the
//! exam leaves the cursor where it is.

use serde::Serialize;

use crate::answers::AnswerTracker;
use crate::error::SessionError;
use crate::model::{Exam, Question, Section};

/// Position of a question: section index and question index within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Cursor {
    pub section: usize,
    pub question: usize,
}

impl Cursor {
    pub fn new(section: usize, question: usize) -> Self {
        Self { section, question }
    }

    /// The first question of the first non-empty section.
    pub fn first(exam: &Exam) -> Option<Self> {
        exam.sections
            .iter()
            .position(|s| !s.questions.is_empty())
            .map(|section| Self::new(section, 0))
    }

    /// Resolve to a section and question, if the cursor addresses one.
    pub fn resolve<'a>(&self, exam: &'a Exam) -> Option<(&'a Section, &'a Question)> {
        let section = exam.sections.get(self.section)?;
        let question = section.questions.get(self.question)?;
        Some((section, question))
    }
}

/// Move forward one question, into the next non-empty section if needed.
pub fn next(exam: &Exam, cursor: Cursor) -> Cursor {
    let Some(section) = exam.sections.get(cursor.section) else {
        return cursor;
    };
    if cursor.question + 1 < section.questions.len() {
        return Cursor::new(cursor.section, cursor.question + 1);
    }
    exam.sections
        .iter()
        .enumerate()
        .skip(cursor.section + 1)
        .find(|(_, s)| !s.questions.is_empty())
        .map(|(idx, _)| Cursor::new(idx, 0))
        .unwrap_or(cursor)
}

/// Move back one question, into the last question of the previous
/// non-empty section if needed.
pub fn previous(exam: &Exam, cursor: Cursor) -> Cursor {
    if cursor.question > 0 {
        return Cursor::new(cursor.section, cursor.question - 1);
    }
    exam.sections
        .iter()
        .enumerate()
        .take(cursor.section)
        .rev()
        .find(|(_, s)| !s.questions.is_empty())
        .map(|(idx, s)| Cursor::new(idx, s.questions.len() - 1))
        .unwrap_or(cursor)
}

/// Jump directly to a coordinate.
pub fn jump(exam: &Exam, section: usize, question: usize) -> Result<Cursor, SessionError> {
    let cursor = Cursor::new(section, question);
    cursor
        .resolve(exam)
        .map(|_| cursor)
        .ok_or(SessionError::InvalidCursor { section, question })
}

/// 1-based position of the cursor across the whole exam.
pub fn global_number(exam: &Exam, cursor: Cursor) -> usize {
    exam.sections
        .iter()
        .take(cursor.section)
        .map(|s| s.questions.len())
        .sum::<usize>()
        + cursor.question
        + 1
}

/// How a question appears in the palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionStatus {
    Unanswered,
    Answered,
    /// The question under the cursor, answered or not.
    Active,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaletteEntry {
    pub cursor: Cursor,
    pub question_id: String,
    /// 1-based number across the exam.
    pub number: usize,
    pub status: QuestionStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaletteSection {
    pub name: String,
    pub entries: Vec<PaletteEntry>,
}

/// Build the question palette.
pub fn palette(exam: &Exam, answers: &AnswerTracker, active: Cursor) -> Vec<PaletteSection> {
    let mut number = 0;
    exam.sections
        .iter()
        .enumerate()
        .map(|(s_idx, section)| PaletteSection {
            name: section.name.clone(),
            entries: section
                .questions
                .iter()
                .enumerate()
                .map(|(q_idx, question)| {
                    number += 1;
                    let cursor = Cursor::new(s_idx, q_idx);
                    let status = if cursor == active {
                        QuestionStatus::Active
                    } else if answers.is_answered(&question.id) {
                        QuestionStatus::Answered
                    } else {
                        QuestionStatus::Unanswered
                    };
                    PaletteEntry {
                        cursor,
                        question_id: question.id.clone(),
                        number,
                        status,
                    }
                })
                .collect(),
        })
        .collect()
}
