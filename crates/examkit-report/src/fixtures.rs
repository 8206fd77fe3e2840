use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};

use examkit_core::model::{
    AttemptRecord, Exam, MarkingScheme, Question, Section, SubmitTrigger,
};
use examkit_core::scoring::score;

pub(crate) fn exam() -> Exam {
    Exam {
        id: "gk-mock-1".into(),
        title: "General <Knowledge> Mock".into(),
        description: Some("Practice paper".into()),
        category: Some("mock-tests".into()),
        duration_minutes: 20,
        sections: vec![
            Section {
                name: "Geography".into(),
                instructions: None,
                negative_marking: 0.5,
                questions: vec![
                    Question {
                        id: "geo-1".into(),
                        text: "Capital of France?".into(),
                        options: vec!["Berlin".into(), "Paris".into()],
                        correct_answer: 1,
                        weightage: None,
                        explanation: Some("Paris has been the capital since 987.".into()),
                    },
                    Question {
                        id: "geo-2".into(),
                        text: "Longest river?".into(),
                        options: vec!["Nile".into(), "Danube".into()],
                        correct_answer: 0,
                        weightage: None,
                        explanation: None,
                    },
                ],
            },
            Section {
                name: "History".into(),
                instructions: None,
                negative_marking: 0.0,
                questions: vec![Question {
                    id: "his-1".into(),
                    text: "Year the Berlin Wall fell?".into(),
                    options: vec!["1989".into(), "1991".into()],
                    correct_answer: 0,
                    weightage: None,
                    explanation: None,
                }],
            },
        ],
        marking_scheme: MarkingScheme {
            default_weightage: 2.0,
            passing_percentage: 40.0,
        },
    }
}

/// geo-1 right, geo-2 wrong, his-1 unanswered.
pub(crate) fn record() -> AttemptRecord {
    let exam = exam();
    let answers = BTreeMap::from([("geo-1".to_string(), 1), ("geo-2".to_string(), 1)]);
    let started_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let submitted_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 12, 30).unwrap();
    AttemptRecord {
        attempt_id: uuid::Uuid::nil(),
        exam_id: exam.id.clone(),
        exam_title: exam.title.clone(),
        category: exam.category.clone(),
        user_id: "alice".into(),
        started_at,
        submitted_at,
        trigger: SubmitTrigger::Manual,
        result: score(&exam, &answers, 750),
    }
}
