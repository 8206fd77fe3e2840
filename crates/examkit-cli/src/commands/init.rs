//! The `examkit init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examkit.toml").exists() {
        println!("examkit.toml already exists, skipping.");
    } else {
        std::fs::write("examkit.toml", SAMPLE_CONFIG)?;
        println!("Created examkit.toml");
    }

    std::fs::create_dir_all("exams")?;
    let sample_path = std::path::Path::new("exams/sample.toml");
    if sample_path.exists() {
        println!("exams/sample.toml already exists, skipping.");
    } else {
        std::fs::write(sample_path, SAMPLE_EXAM)?;
        println!("Created exams/sample.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: examkit validate --exam-file exams/sample.toml");
    println!("  2. Run: examkit take --exam sample");
    println!("  3. Run: examkit result --exam sample");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examkit configuration

cache_dir = "./.examkit-cache"
# default_user = "${USER}"

[source]
type = "directory"
path = "./exams"

# Send results to a server instead:
# [results]
# type = "http"
# base_url = "https://exams.example.com/api"
# api_token = "${EXAMKIT_API_TOKEN}"
[results]
type = "directory"
path = "./examkit-results"
"#;

const SAMPLE_EXAM: &str = r#"[exam]
id = "sample"
title = "Sample Exam"
description = "A short exam to get started"
category = "practice"
duration_minutes = 5
default_weightage = 1.0
passing_percentage = 50.0

[[sections]]
name = "General"
instructions = "Choose one answer per question. Wrong answers cost a quarter point."
negative_marking = 0.25

[[sections.questions]]
id = "general-1"
text = "Which planet is closest to the Sun?"
options = ["Venus", "Mercury", "Mars", "Earth"]
correct_answer = 1

[[sections.questions]]
id = "general-2"
text = "How many sides does a hexagon have?"
options = ["5", "6", "7", "8"]
correct_answer = 1

[[sections]]
name = "Arithmetic"
instructions = "No penalty for wrong answers in this section."

[[sections.questions]]
id = "arith-1"
text = "What is 12 x 12?"
options = ["124", "144", "156"]
correct_answer = 1
weightage = 2.0
explanation = "12 x 12 = 144."
"#;
