//! The `examkit list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_core::cache::Catalog;
use examkit_stores::config::{load_config_from, open_cache};

pub fn execute(category: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let cache = open_cache(&config)?;
    let catalog = Catalog::new(&cache, category.as_deref());

    let entries = catalog.entries()?;
    if entries.is_empty() {
        println!(
            "No exams cached under '{}'. Take an exam with `examkit take --exam <id>` to add it.",
            catalog.key()
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Title",
        "Questions",
        "Duration",
        "Last attempted",
    ]);
    for entry in &entries {
        let last = entry
            .last_attempted_at
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&entry.exam.id),
            Cell::new(&entry.exam.title),
            Cell::new(entry.exam.total_questions()),
            Cell::new(format!("{} min", entry.exam.duration_minutes)),
            Cell::new(last),
        ]);
    }
    println!("{table}");

    Ok(())
}
