//! HTML results view.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use examkit_core::countdown::format_remaining;
use examkit_core::model::{AttemptRecord, Exam, SectionScore};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the results page for a submitted attempt.
///
/// The per-question review is only included when the exam is given, since
/// the record itself holds answers but not the questions.
pub fn generate_html(record: &AttemptRecord, exam: Option<&Exam>) -> String {
    let result = &record.result;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Results: {}</title>\n",
        html_escape(&record.exam_title)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&record.exam_title)));
    html.push_str(&format!(
        "<p class=\"meta\">User: <strong>{}</strong> | Submitted {} ({}) | Time taken {}</p>\n",
        html_escape(&record.user_id),
        record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
        record.trigger,
        format_remaining(result.elapsed_secs),
    ));
    html.push_str("</header>\n");

    // Summary
    let verdict_class = if result.passed { "pass" } else { "fail" };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Summary</h2>\n");
    html.push_str(&format!(
        "<p class=\"verdict {verdict_class}\">{} with {:.2}%</p>\n",
        if result.passed { "Passed" } else { "Not passed" },
        result.percentage
    ));
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Score</th><th>Max</th><th>Correct</th><th>Wrong</th><th>Unanswered</th><th>Total</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        result.score,
        result.max_score,
        result.correct,
        result.wrong,
        result.unanswered,
        result.total_questions
    ));
    html.push_str("</table>\n");

    if !result.sections.is_empty() {
        html.push_str(&generate_section_chart(&result.sections));
    }
    html.push_str("</section>\n");

    // Per-section breakdown
    html.push_str("<section class=\"sections\">\n");
    html.push_str("<h2>Sections</h2>\n");
    html.push_str("<table>\n");
    html.push_str(
        "<thead><tr><th>Section</th><th>Questions</th><th>Correct</th><th>Wrong</th><th>Score</th></tr></thead>\n",
    );
    html.push_str("<tbody>\n");
    for s in &result.sections {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&s.name),
            s.total_questions,
            s.correct,
            s.wrong,
            s.score
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    if let Some(exam) = exam {
        html.push_str(&generate_review(record, exam));
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(record).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the results page to a file.
pub fn write_html_report(record: &AttemptRecord, exam: Option<&Exam>, path: &Path) -> Result<()> {
    let html = generate_html(record, exam);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn generate_review(record: &AttemptRecord, exam: &Exam) -> String {
    let answers = &record.result.answers;
    let mut html = String::new();

    html.push_str("<section class=\"review\">\n");
    html.push_str("<h2>Review</h2>\n");
    html.push_str("<p><label><input type=\"checkbox\" onchange=\"toggleCorrect(this.checked)\"> Hide correct answers</label></p>\n");
    html.push_str("<table id=\"review\">\n");
    html.push_str("<thead><tr><th>#</th><th>Section</th><th>Question</th><th>Your answer</th><th>Correct answer</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for (number, (section, question)) in exam.questions().enumerate() {
        let selected = answers.get(&question.id).copied();
        let (class, yours) = match selected {
            None => ("skipped", "-".to_string()),
            Some(i) => (
                if i == question.correct_answer {
                    "pass"
                } else {
                    "fail"
                },
                option_label(&question.options, i),
            ),
        };

        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}",
            number + 1,
            html_escape(&section.name),
            html_escape(&question.text),
        ));
        if let Some(explanation) = &question.explanation {
            html.push_str(&format!(
                "<div class=\"explanation\">{}</div>",
                html_escape(explanation)
            ));
        }
        html.push_str(&format!(
            "</td><td>{}</td><td>{}</td></tr>\n",
            html_escape(&yours),
            html_escape(&option_label(&question.options, question.correct_answer)),
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");
    html
}

fn option_label(options: &[String], index: usize) -> String {
    match options.get(index) {
        Some(text) => format!("{}. {}", option_letter(index), text),
        None => format!("option {}", index + 1),
    }
}

fn option_letter(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i))
        .unwrap_or('?')
}

/// Horizontal bars of each section's score against its share of the maximum.
fn generate_section_chart(sections: &[SectionScore]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let best = sections
        .iter()
        .map(|s| s.score.abs())
        .fold(0.0f64, f64::max);

    let total_height = sections.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, section) in sections.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = if best > 0.0 {
            section.score.abs() / best
        } else {
            0.0
        };
        let width = (ratio * max_width as f64) as usize;
        let color = if section.score < 0.0 {
            "#ef4444"
        } else if section.wrong == 0 {
            "#22c55e"
        } else {
            "#eab308"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&section.name)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            section.score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --skip: #f3f4f6; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --skip: #1f2937; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.verdict { font-size: 1.4rem; font-weight: bold; padding: 0.5rem 1rem; border-radius: 8px; display: inline-block; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; vertical-align: top; }
th { background: var(--border); }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.skipped { background: var(--skip); }
.explanation { margin-top: 0.4rem; font-size: 0.85rem; color: #6b7280; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function toggleCorrect(hide) {
  const table = document.getElementById('review');
  if (!table) return;
  table.querySelectorAll('tbody tr.pass').forEach(r => {
    r.style.display = hide ? 'none' : '';
  });
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn html_contains_summary_and_sections() {
        let record = fixtures::record();
        let html = generate_html(&record, None);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Not passed with 25.00%"));
        assert!(html.contains("Geography"));
        assert!(html.contains("History"));
        assert!(html.contains("alice"));
        assert!(!html.contains("id=\"review\""));
    }

    #[test]
    fn html_escapes_titles() {
        let html = generate_html(&fixtures::record(), None);
        assert!(html.contains("General &lt;Knowledge&gt; Mock"));
        assert!(!html.contains("General <Knowledge> Mock"));
    }

    #[test]
    fn review_marks_each_question() {
        let exam = fixtures::exam();
        let html = generate_html(&fixtures::record(), Some(&exam));

        assert!(html.contains("id=\"review\""));
        assert!(html.contains("<tr class=\"pass\"><td>1</td>"));
        assert!(html.contains("<tr class=\"fail\"><td>2</td>"));
        assert!(html.contains("<tr class=\"skipped\"><td>3</td>"));
        assert!(html.contains("B. Paris"));
        assert!(html.contains("Paris has been the capital since 987."));
    }

    #[test]
    fn option_letters() {
        assert_eq!(option_letter(0), 'A');
        assert_eq!(option_letter(25), 'Z');
        assert_eq!(option_letter(26), '?');
        assert_eq!(option_label(&["x".into()], 3), "option 4");
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("result.html");

        write_html_report(&fixtures::record(), None, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
