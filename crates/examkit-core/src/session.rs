//! One attempt at an exam, independent of any front end.
//!
//! [`ExamSession`] owns the exam, the answers, the cursor, and the
//! countdown. A front end renders [`ExamSession::current`] and the palette,
//! forwards user input, calls [`ExamSession::tick`] once per second, and
//! calls [`ExamSession::submit`] on a manual submit or when `tick` reports
//! a timeout.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::accessor::{validate_loadable, LoadedExam};
use crate::answers::AnswerTracker;
use crate::countdown::{Countdown, Tick};
use crate::error::SessionError;
use crate::model::{AttemptRecord, Exam, Question, SubmitTrigger};
use crate::navigation::{self, Cursor, PaletteSection};
use crate::persister::{PersistOutcome, ResultPersister, ANONYMOUS_USER};
use crate::scoring;

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptState {
    InProgress,
    /// Scoring and persistence are running; input is locked.
    Submitting,
    Submitted,
}

/// Where the front end goes after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum Destination {
    Results { exam_id: String },
}

/// Everything a front end needs to render the current question.
#[derive(Debug, Clone)]
pub struct QuestionView<'a> {
    pub cursor: Cursor,
    pub section_name: &'a str,
    pub instructions: Option<&'a str>,
    pub question: &'a Question,
    pub selected: Option<usize>,
    /// 1-based position across the exam.
    pub number: usize,
    pub total: usize,
}

/// Summary of the section under the cursor.
#[derive(Debug, Clone, Serialize)]
pub struct SectionInfo {
    pub index: usize,
    pub section_count: usize,
    pub name: String,
    pub instructions: Option<String>,
    pub negative_marking: f64,
    pub question_count: usize,
    pub answered: usize,
}

/// The result of a submission.
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: AttemptRecord,
    pub persistence: PersistOutcome,
    pub destination: Destination,
}

pub struct ExamSession {
    exam: Exam,
    /// Catalog category stamped on the attempt record.
    category: Option<String>,
    answers: AnswerTracker,
    cursor: Cursor,
    countdown: Countdown,
    started_at: DateTime<Utc>,
    state: AttemptState,
}

impl ExamSession {
    /// Start an attempt now. The attempt belongs to the default catalog; use
    /// [`from_loaded`](Self::from_loaded) for exams resolved by category.
    pub fn start(exam: Exam) -> Result<Self, SessionError> {
        Self::start_at(exam, Utc::now())
    }

    /// Start an attempt on an exam from [`ExamAccessor`], keeping the
    /// catalog it was loaded from.
    ///
    /// [`ExamAccessor`]: crate::accessor::ExamAccessor
    pub fn from_loaded(loaded: LoadedExam) -> Result<Self, SessionError> {
        Ok(Self::start(loaded.exam)?.in_catalog(loaded.category))
    }

    /// Attribute the attempt to a catalog category.
    pub fn in_catalog(mut self, category: Option<String>) -> Self {
        self.category = category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    /// Start an attempt with an explicit start time.
    pub fn start_at(exam: Exam, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        validate_loadable(&exam)?;
        let cursor = Cursor::first(&exam).ok_or(SessionError::InvalidCursor {
            section: 0,
            question: 0,
        })?;
        let countdown = Countdown::for_exam(&exam);
        tracing::debug!(exam = %exam.id, secs = countdown.remaining_secs(), "attempt started");
        Ok(Self {
            exam,
            category: None,
            answers: AnswerTracker::new(),
            cursor,
            countdown,
            started_at,
            state: AttemptState::InProgress,
        })
    }

    pub fn exam(&self) -> &Exam {
        &self.exam
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn answers(&self) -> &AnswerTracker {
        &self.answers
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn state(&self) -> AttemptState {
        self.state
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn remaining_secs(&self) -> u64 {
        self.countdown.remaining_secs()
    }

    /// The question under the cursor.
    pub fn current(&self) -> Result<QuestionView<'_>, SessionError> {
        let (section, question) =
            self.cursor
                .resolve(&self.exam)
                .ok_or(SessionError::InvalidCursor {
                    section: self.cursor.section,
                    question: self.cursor.question,
                })?;
        Ok(QuestionView {
            cursor: self.cursor,
            section_name: &section.name,
            instructions: section.instructions.as_deref(),
            question,
            selected: self.answers.get(&question.id),
            number: navigation::global_number(&self.exam, self.cursor),
            total: self.exam.total_questions(),
        })
    }

    /// Select an option for the question under the cursor.
    pub fn select(&mut self, option: usize) -> Result<(), SessionError> {
        let question_id = self.current()?.question.id.clone();
        self.answer(&question_id, option)
    }

    /// Select an option for any question by id.
    pub fn answer(&mut self, question_id: &str, option: usize) -> Result<(), SessionError> {
        self.ensure_open()?;
        let question = self
            .exam
            .question(question_id)
            .ok_or(SessionError::InvalidCursor {
                section: self.cursor.section,
                question: self.cursor.question,
            })?;
        if option >= question.options.len() {
            return Err(SessionError::InvalidOption {
                question_id: question.id.clone(),
                option,
                available: question.options.len(),
            });
        }
        self.answers.record(question_id, option);
        Ok(())
    }

    pub fn next(&mut self) -> Cursor {
        self.cursor = navigation::next(&self.exam, self.cursor);
        self.cursor
    }

    pub fn previous(&mut self) -> Cursor {
        self.cursor = navigation::previous(&self.exam, self.cursor);
        self.cursor
    }

    pub fn jump(&mut self, section: usize, question: usize) -> Result<Cursor, SessionError> {
        self.cursor = navigation::jump(&self.exam, section, question)?;
        Ok(self.cursor)
    }

    pub fn palette(&self) -> Vec<PaletteSection> {
        navigation::palette(&self.exam, &self.answers, self.cursor)
    }

    pub fn section_info(&self) -> Option<SectionInfo> {
        let section = self.exam.sections.get(self.cursor.section)?;
        Some(SectionInfo {
            index: self.cursor.section,
            section_count: self.exam.sections.len(),
            name: section.name.clone(),
            instructions: section.instructions.clone(),
            negative_marking: section.negative_marking,
            question_count: section.questions.len(),
            answered: section
                .questions
                .iter()
                .filter(|q| self.answers.is_answered(&q.id))
                .count(),
        })
    }

    /// Advance the countdown by one second. Returns a timeout trigger the one
    /// time the countdown expires while the attempt is still open.
    pub fn tick(&mut self) -> Option<SubmitTrigger> {
        if self.state != AttemptState::InProgress {
            return None;
        }
        match self.countdown.tick() {
            Tick::Expired => {
                tracing::info!(exam = %self.exam.id, "time is up");
                Some(SubmitTrigger::Timeout)
            }
            Tick::Running(_) | Tick::Idle => None,
        }
    }

    /// Whether a manual submit control should be enabled.
    pub fn submit_enabled(&self) -> bool {
        self.state == AttemptState::InProgress
    }

    /// Stop the countdown for an attempt that is being discarded.
    pub fn abandon(&mut self) {
        self.countdown.stop();
    }

    /// Score and persist the attempt.
    pub async fn submit(
        &mut self,
        persister: &ResultPersister,
        user_id: Option<&str>,
        trigger: SubmitTrigger,
    ) -> Result<Submission, SessionError> {
        self.submit_at(persister, user_id, trigger, Utc::now()).await
    }

    /// [`submit`](Self::submit) with an explicit submission time.
    ///
    /// Dropping the returned future before it completes puts the attempt
    /// back in progress, so it can be submitted again. Persistence steps
    /// that already ran are not undone.
    pub async fn submit_at(
        &mut self,
        persister: &ResultPersister,
        user_id: Option<&str>,
        trigger: SubmitTrigger,
        submitted_at: DateTime<Utc>,
    ) -> Result<Submission, SessionError> {
        self.ensure_open()?;

        let elapsed = scoring::elapsed_between(self.started_at, submitted_at);
        let result = scoring::score(&self.exam, self.answers.answers(), elapsed);
        let user_id = user_id
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or(ANONYMOUS_USER);

        let record = AttemptRecord {
            attempt_id: Uuid::new_v4(),
            exam_id: self.exam.id.clone(),
            exam_title: self.exam.title.clone(),
            category: self.category.clone(),
            user_id: user_id.to_string(),
            started_at: self.started_at,
            submitted_at,
            trigger,
            result,
        };
        tracing::info!(
            exam = %record.exam_id,
            %trigger,
            score = record.result.score,
            percentage = record.result.percentage,
            "submitting attempt"
        );

        let guard = SubmitGuard::enter(&mut self.state);
        let persistence = persister.persist(&record).await;
        guard.finish();
        self.countdown.stop();

        Ok(Submission {
            destination: Destination::Results {
                exam_id: record.exam_id.clone(),
            },
            record,
            persistence,
        })
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        match self.state {
            AttemptState::InProgress => Ok(()),
            AttemptState::Submitting => Err(SessionError::SubmissionInFlight),
            AttemptState::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }
}

/// Holds an attempt in [`AttemptState::Submitting`] and returns it to
/// [`AttemptState::InProgress`] unless [`finish`](Self::finish) is reached.
struct SubmitGuard<'a> {
    state: &'a mut AttemptState,
}

impl<'a> SubmitGuard<'a> {
    fn enter(state: &'a mut AttemptState) -> Self {
        *state = AttemptState::Submitting;
        Self { state }
    }

    fn finish(self) {
        *self.state = AttemptState::Submitted;
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if *self.state == AttemptState::Submitting {
            tracing::warn!("submission cancelled, attempt reopened");
            *self.state = AttemptState::InProgress;
        }
    }
}
