pub mod init;
pub mod list;
pub mod result;
pub mod score;
pub mod take;
pub mod validate;

use comfy_table::{Cell, Table};

use examkit_core::countdown::format_remaining;
use examkit_core::model::ExamResult;

/// Print the results view: verdict line, summary, and section breakdown.
pub(crate) fn print_result(title: &str, result: &ExamResult) {
    println!("\n=== Results: {title} ===");
    println!(
        "{} with {:.2}% (score {} of {}, time taken {})",
        if result.passed { "PASSED" } else { "NOT PASSED" },
        result.percentage,
        result.score,
        result.max_score,
        format_remaining(result.elapsed_secs),
    );

    let mut summary = Table::new();
    summary.set_header(vec!["Total", "Answered", "Correct", "Wrong", "Unanswered"]);
    summary.add_row(vec![
        Cell::new(result.total_questions),
        Cell::new(result.answered),
        Cell::new(result.correct),
        Cell::new(result.wrong),
        Cell::new(result.unanswered),
    ]);
    println!("{summary}");

    let mut sections = Table::new();
    sections.set_header(vec!["Section", "Questions", "Correct", "Wrong", "Score"]);
    for s in &result.sections {
        sections.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.total_questions),
            Cell::new(s.correct),
            Cell::new(s.wrong),
            Cell::new(s.score),
        ]);
    }
    println!("{sections}");
}
