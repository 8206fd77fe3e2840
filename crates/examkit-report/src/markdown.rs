//! Markdown results view.

use examkit_core::countdown::format_remaining;
use examkit_core::model::AttemptRecord;

/// Render an attempt's summary and section breakdown as markdown.
pub fn to_markdown(record: &AttemptRecord) -> String {
    let result = &record.result;
    let mut md = String::new();

    md.push_str(&format!("## {}\n\n", record.exam_title));
    md.push_str(&format!(
        "**Result:** {} ({:.2}%)\n\n",
        if result.passed { "passed" } else { "not passed" },
        result.percentage
    ));
    md.push_str(&format!(
        "**Score:** {} / {} | {} correct, {} wrong, {} unanswered of {}\n\n",
        result.score,
        result.max_score,
        result.correct,
        result.wrong,
        result.unanswered,
        result.total_questions
    ));
    md.push_str(&format!(
        "Submitted by `{}` at {} ({}), time taken {}\n\n",
        record.user_id,
        record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.trigger,
        format_remaining(result.elapsed_secs)
    ));

    if !result.sections.is_empty() {
        md.push_str("### Sections\n\n");
        md.push_str("| Section | Questions | Correct | Wrong | Score |\n");
        md.push_str("|---------|-----------|---------|-------|-------|\n");
        for s in &result.sections {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                s.name.replace('|', "\\|"),
                s.total_questions,
                s.correct,
                s.wrong,
                s.score
            ));
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn markdown_summary() {
        let md = to_markdown(&fixtures::record());
        assert!(md.contains("**Result:** not passed (25.00%)"));
        assert!(md.contains("**Score:** 1.5 / 6 | 1 correct, 1 wrong, 1 unanswered of 3"));
        assert!(md.contains("time taken 12:30"));
        assert!(md.contains("| Geography | 2 | 1 | 1 | 1.5 |"));
        assert!(md.contains("| History | 1 | 0 | 0 | 0 |"));
    }
}
