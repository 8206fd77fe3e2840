//! The `examkit validate` command.

use std::path::PathBuf;

use anyhow::Result;

use examkit_core::accessor::validate_loadable;

pub fn execute(exam_path: PathBuf) -> Result<()> {
    let exams = if exam_path.is_dir() {
        examkit_core::parser::load_exam_directory(&exam_path)?
    } else {
        vec![examkit_core::parser::parse_exam(&exam_path)?]
    };

    if exams.is_empty() {
        println!("No exam files found in {}.", exam_path.display());
        return Ok(());
    }

    let mut total_warnings = 0;

    for exam in &exams {
        println!(
            "Exam: {} [{}] ({} questions in {} sections)",
            exam.title,
            exam.id,
            exam.total_questions(),
            exam.sections.len()
        );

        if let Err(e) = validate_loadable(exam) {
            println!("  ERROR: {e}");
            total_warnings += 1;
        }

        let warnings = examkit_core::parser::validate_exam(exam);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All exams valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
