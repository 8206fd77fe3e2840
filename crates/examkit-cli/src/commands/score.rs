//! The `examkit score` command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use examkit_core::model::AnswerMap;

pub fn execute(exam_path: PathBuf, answers: String, elapsed: u64, format: String) -> Result<()> {
    let exam = examkit_core::parser::parse_exam(&exam_path)?;
    examkit_core::accessor::validate_loadable(&exam)?;
    let answers = read_answers(&answers)?;

    let result = examkit_core::scoring::score(&exam, &answers, elapsed);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        "text" => super::print_result(&exam.title, &result),
        other => anyhow::bail!("unknown format '{other}', expected text or json"),
    }

    Ok(())
}

/// Accept either inline JSON or a path to a JSON file.
fn read_answers(arg: &str) -> Result<AnswerMap> {
    let raw = if arg.trim_start().starts_with('{') {
        arg.to_string()
    } else {
        let path = Path::new(arg);
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read answers file: {}", path.display()))?
    };
    serde_json::from_str(&raw).context("answers must be a JSON object of question id to option index")
}
