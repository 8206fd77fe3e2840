//! The `examkit result` command: reopen the results view of the last attempt.

use std::path::PathBuf;

use anyhow::Result;

use examkit_core::cache::Catalog;
use examkit_core::persister::load_fallback;
use examkit_stores::config::{load_config_from, open_cache};

pub fn execute(
    exam_id: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let cache = open_cache(&config)?;

    let Some(record) = load_fallback(&cache, &exam_id)? else {
        anyhow::bail!(
            "no saved result for exam '{exam_id}'. Take it first with `examkit take --exam {exam_id}`"
        );
    };

    let rendered = match format.as_str() {
        "text" => {
            if output.is_some() {
                anyhow::bail!("--output needs --format json, markdown, or html");
            }
            println!(
                "User: {} | Submitted: {} ({})",
                record.user_id,
                record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
                record.trigger
            );
            super::print_result(&record.exam_title, &record.result);
            return Ok(());
        }
        "json" => serde_json::to_string_pretty(&record)?,
        "markdown" => examkit_report::markdown::to_markdown(&record),
        "html" => {
            let catalog = Catalog::new(&cache, record.category.as_deref());
            let exam = catalog.find(&record.exam_id).ok().flatten().map(|e| e.exam);
            examkit_report::html::generate_html(&record, exam.as_ref())
        }
        other => anyhow::bail!("unknown format '{other}', expected text, json, markdown or html"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)?;
            println!("Wrote {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}
