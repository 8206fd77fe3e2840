//! Attempt scoring with per-question weightage and per-section negative marking.

use chrono::{DateTime, Utc};

use crate::model::{AnswerMap, Exam, ExamResult, SectionScore};

/// Score an attempt.
///
/// * Unanswered questions contribute nothing.
/// * A correct answer adds the question's weightage.
/// * A wrong answer subtracts the section's flat `negative_marking`,
///   regardless of the question's own weightage.
///
/// The percentage is taken against `total_questions * default_weightage`,
/// not against the sum of individual weightages. There is no floor: the
/// score and percentage can go negative.
pub fn score(exam: &Exam, answers: &AnswerMap, elapsed_secs: u64) -> ExamResult {
    let mut correct = 0usize;
    let mut wrong = 0usize;
    let mut total_score = 0.0f64;
    let mut max_score = 0.0f64;
    let mut sections = Vec::with_capacity(exam.sections.len());

    for section in &exam.sections {
        let mut section_score = SectionScore {
            name: section.name.clone(),
            total_questions: section.questions.len(),
            correct: 0,
            wrong: 0,
            score: 0.0,
        };

        for question in &section.questions {
            let weightage = exam.weightage_of(question);
            max_score += weightage;

            let Some(&selected) = answers.get(&question.id) else {
                continue;
            };

            if selected == question.correct_answer {
                section_score.correct += 1;
                section_score.score += weightage;
            } else {
                section_score.wrong += 1;
                section_score.score -= section.negative_marking;
            }
        }

        correct += section_score.correct;
        wrong += section_score.wrong;
        total_score += section_score.score;
        sections.push(section_score);
    }

    let total_questions = exam.total_questions();
    let answered = correct + wrong;
    if answered < answers.len() {
        tracing::debug!(
            exam = %exam.id,
            ignored = answers.len() - answered,
            "answers for unknown questions ignored"
        );
    }

    let percentage = percentage_of(
        total_score,
        total_questions,
        exam.marking_scheme.default_weightage,
    );

    ExamResult {
        exam_id: exam.id.clone(),
        total_questions,
        answered,
        correct,
        wrong,
        unanswered: total_questions - answered,
        score: total_score,
        max_score,
        percentage,
        passed: percentage >= exam.marking_scheme.passing_percentage,
        elapsed_secs,
        sections,
        answers: answers.clone(),
    }
}

/// `score / (total_questions * default_weightage) * 100`, or 0 when the
/// baseline is zero.
pub fn percentage_of(score: f64, total_questions: usize, default_weightage: f64) -> f64 {
    let baseline = total_questions as f64 * default_weightage;
    if baseline == 0.0 {
        return 0.0;
    }
    score / baseline * 100.0
}

/// Whole seconds between start and submission, never negative.
pub fn elapsed_between(started_at: DateTime<Utc>, submitted_at: DateTime<Utc>) -> u64 {
    (submitted_at - started_at).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MarkingScheme, Question, Section};

    fn question(id: &str, correct_answer: usize, weightage: Option<f64>) -> Question {
        Question {
            id: id.into(),
            text: id.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer,
            weightage,
            explanation: None,
        }
    }

    fn section(name: &str, negative_marking: f64, questions: Vec<Question>) -> Section {
        Section {
            name: name.into(),
            instructions: None,
            negative_marking,
            questions,
        }
    }

    fn exam(sections: Vec<Section>, default_weightage: f64, passing_percentage: f64) -> Exam {
        Exam {
            id: "exam".into(),
            title: "Exam".into(),
            description: None,
            category: None,
            duration_minutes: 1,
            sections,
            marking_scheme: MarkingScheme {
                default_weightage,
                passing_percentage,
            },
        }
    }

    fn answers(pairs: &[(&str, usize)]) -> AnswerMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn worked_example() {
        let exam = exam(
            vec![section(
                "Only",
                1.0,
                vec![question("q1", 0, Some(2.0)), question("q2", 0, Some(2.0))],
            )],
            2.0,
            40.0,
        );
        let result = score(&exam, &answers(&[("q1", 0), ("q2", 1)]), 30);

        assert_eq!(result.correct, 1);
        assert_eq!(result.wrong, 1);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.total_questions, 2);
        assert_eq!(result.percentage, 1.0 / (2.0 * 2.0) * 100.0);
        assert_eq!(result.max_score, 4.0);
        assert!(!result.passed);
        assert_eq!(result.elapsed_secs, 30);
    }

    #[test]
    fn unanswered_contribute_nothing() {
        let exam = exam(
            vec![
                section("A", 0.5, vec![question("q1", 1, None), question("q2", 2, None)]),
                section("B", 0.25, vec![question("q3", 0, None), question("q4", 3, None)]),
            ],
            1.0,
            50.0,
        );
        let subset = answers(&[("q1", 1), ("q4", 0)]);
        let result = score(&exam, &subset, 0);

        assert_eq!(result.correct + result.wrong, subset.len());
        assert_eq!(result.answered, 2);
        assert_eq!(result.unanswered, 2);
        assert_eq!(result.score, 1.0 - 0.25);
    }

    #[test]
    fn penalty_is_per_section_and_flat() {
        let exam = exam(
            vec![
                section("Heavy", 2.0, vec![question("q1", 0, Some(10.0))]),
                section("Light", 0.0, vec![question("q2", 0, Some(10.0))]),
            ],
            1.0,
            0.0,
        );
        let result = score(&exam, &answers(&[("q1", 1), ("q2", 1)]), 0);
        assert_eq!(result.score, -2.0);
        assert_eq!(result.sections[0].score, -2.0);
        assert_eq!(result.sections[1].score, 0.0);
        assert_eq!(result.sections[1].wrong, 1);
    }

    #[test]
    fn score_can_go_negative() {
        let exam = exam(vec![section("A", 1.0, vec![question("q1", 0, None)])], 1.0, 40.0);
        let result = score(&exam, &answers(&[("q1", 2)]), 0);
        assert_eq!(result.score, -1.0);
        assert_eq!(result.percentage, -100.0);
        assert!(!result.passed);
    }

    #[test]
    fn denominator_ignores_individual_weightage() {
        let exam = exam(
            vec![section(
                "A",
                0.0,
                vec![question("q1", 0, Some(4.0)), question("q2", 0, Some(1.0))],
            )],
            1.0,
            100.0,
        );
        let result = score(&exam, &answers(&[("q1", 0)]), 0);
        // 4 points over a baseline of 2 * 1.0
        assert_eq!(result.percentage, 200.0);
        assert!(result.passed);
    }

    #[test]
    fn pass_threshold_is_inclusive() {
        let exam = exam(
            vec![section("A", 0.0, vec![question("q1", 0, None), question("q2", 0, None)])],
            1.0,
            50.0,
        );
        let result = score(&exam, &answers(&[("q1", 0)]), 0);
        assert_eq!(result.percentage, 50.0);
        assert!(result.passed);
    }

    #[test]
    fn unknown_answer_keys_are_ignored() {
        let exam = exam(vec![section("A", 1.0, vec![question("q1", 0, None)])], 1.0, 40.0);
        let result = score(&exam, &answers(&[("ghost", 0)]), 0);
        assert_eq!(result.answered, 0);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.answers.len(), 1);
    }

    #[test]
    fn scoring_is_deterministic() {
        let exam = exam(
            vec![section("A", 0.33, vec![question("q1", 0, Some(1.7)), question("q2", 1, None)])],
            1.3,
            40.0,
        );
        let given = answers(&[("q1", 0), ("q2", 0)]);
        let first = score(&exam, &given, 42);
        let second = score(&exam, &given, 42);
        assert_eq!(first, second);
        assert_eq!(first.score.to_bits(), second.score.to_bits());
        assert_eq!(first.percentage.to_bits(), second.percentage.to_bits());
    }

    #[test]
    fn zero_baseline_gives_zero_percentage() {
        assert_eq!(percentage_of(3.0, 0, 1.0), 0.0);
        assert_eq!(percentage_of(3.0, 2, 0.0), 0.0);
    }

    #[test]
    fn elapsed_is_whole_seconds() {
        let start = Utc::now();
        let end = start + chrono::Duration::milliseconds(90_900);
        assert_eq!(elapsed_between(start, end), 90);
        assert_eq!(elapsed_between(end, start), 0);
    }
}
