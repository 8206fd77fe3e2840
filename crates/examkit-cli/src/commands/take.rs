//! The `examkit take` command: an interactive, timed attempt over stdin.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use examkit_core::accessor::ExamAccessor;
use examkit_core::countdown::{format_remaining, TickSource};
use examkit_core::error::{Recovery, SessionError};
use examkit_core::model::SubmitTrigger;
use examkit_core::navigation::QuestionStatus;
use examkit_core::persister::{RemoteStatus, ResultPersister};
use examkit_core::session::{Destination, ExamSession};
use examkit_stores::config::{create_exam_source, create_result_store, load_config_from, open_cache};

/// Seconds remaining at which a reminder is printed.
const REMINDERS: [u64; 3] = [300, 60, 10];

const LIST_HINT: &str = "Run `examkit list` to see cached exams.";

/// How the input loop ended.
enum Ending {
    Submit(SubmitTrigger),
    Quit,
    Broken(SessionError),
}

/// A parsed line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Select(usize),
    Next,
    Previous,
    /// 0-based section and question.
    Jump(usize, usize),
    Palette,
    Time,
    Section,
    Help,
    Submit,
    Quit,
    Empty,
}

/// Parse one input line. Commands take precedence over option letters.
fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Input::Empty);
    };

    let input = match head.to_ascii_lowercase().as_str() {
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "palette" => Input::Palette,
        "t" | "time" => Input::Time,
        "s" | "section" => Input::Section,
        "h" | "help" | "?" => Input::Help,
        "submit" => Input::Submit,
        "q" | "quit" => Input::Quit,
        "g" | "go" => {
            let mut index = || {
                words
                    .next()
                    .and_then(|w| w.parse::<usize>().ok())
                    .filter(|n| *n > 0)
                    .map(|n| n - 1)
            };
            match (index(), index()) {
                (Some(section), Some(question)) => Input::Jump(section, question),
                _ => return Err("usage: g <section> <question> (both start at 1)".into()),
            }
        }
        other => return parse_option(other).map(Input::Select),
    };
    Ok(input)
}

/// `a`..`z` or `1`.. to a 0-based option index.
fn parse_option(token: &str) -> Result<usize, String> {
    if let Ok(n) = token.parse::<usize>() {
        return n
            .checked_sub(1)
            .ok_or_else(|| "options are numbered from 1".to_string());
    }
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok((c as u8 - b'a') as usize),
        _ => Err(format!("unknown command '{token}', type 'help' for commands")),
    }
}

fn option_letter(index: usize) -> String {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map(|i| char::from(b'A' + i).to_string())
        .unwrap_or_else(|| (index + 1).to_string())
}

/// Forward stdin lines from a plain thread, so a pending read never holds up
/// runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// The message shown when the attempt cannot render a question and ends.
fn view_failure(error: &SessionError) -> String {
    format!("Cannot show this question: {error}\n{LIST_HINT}")
}

fn render_question(session: &ExamSession, announce_section: bool) -> Result<(), SessionError> {
    if announce_section {
        if let Some(info) = session.section_info() {
            println!(
                "\n--- Section {}/{}: {} ({} questions",
                info.index + 1,
                info.section_count,
                info.name,
                info.question_count
            );
            if info.negative_marking > 0.0 {
                println!("    {} deducted per wrong answer)", info.negative_marking);
            } else {
                println!("    no negative marking)");
            }
            if let Some(instructions) = &info.instructions {
                println!("    {instructions}");
            }
        }
    }

    let view = session.current()?;
    println!(
        "\nQ{} of {} [{}] ({} left)",
        view.number,
        view.total,
        view.section_name,
        format_remaining(session.remaining_secs())
    );
    println!("{}", view.question.text);
    for (i, option) in view.question.options.iter().enumerate() {
        let marker = if view.selected == Some(i) { '*' } else { ' ' };
        println!("{marker} {}) {option}", option_letter(i));
    }
    Ok(())
}

fn render_palette(session: &ExamSession) {
    for section in session.palette() {
        let cells: Vec<String> = section
            .entries
            .iter()
            .map(|e| match e.status {
                QuestionStatus::Active => format!("[{}]", e.number),
                QuestionStatus::Answered => format!("{}*", e.number),
                QuestionStatus::Unanswered => e.number.to_string(),
            })
            .collect();
        println!("{}: {}", section.name, cells.join(" "));
    }
    println!(
        "Answered {} of {} (* answered, [n] current)",
        session.answers().len(),
        session.exam().total_questions()
    );
}

fn print_help() {
    println!("Commands:");
    println!("  a, b, c ... or 1, 2, 3 ...   select an option");
    println!("  n / next, p / prev           move between questions");
    println!("  g <section> <question>       jump to a question");
    println!("  palette                      show answered and unanswered questions");
    println!("  section                      show the current section");
    println!("  time                         show the time left");
    println!("  submit                       submit the attempt");
    println!("  quit                         leave without submitting");
    println!("Commands win over option letters: use numbers for options n, p, s, t, h, q or g.");
}

pub async fn execute(
    exam_id: String,
    category: Option<String>,
    user: Option<String>,
    config_path: Option<PathBuf>,
    html: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let cache = Arc::new(open_cache(&config)?);
    let source = create_exam_source(&config.source)?;
    let store = create_result_store(&config.results)?;
    tracing::debug!(source = source.name(), store = store.name(), "backends ready");

    let accessor = ExamAccessor::new(source, cache.clone());
    let loaded = match accessor.load(&exam_id, category.as_deref()).await {
        Ok(loaded) => loaded,
        Err(e) => {
            let hint = match e.recovery() {
                Recovery::Retry => "Try again in a moment.",
                Recovery::BackToList => LIST_HINT,
            };
            println!("{}\n{hint}", e.user_message());
            return Err(e.into());
        }
    };

    let mut session = ExamSession::from_loaded(loaded)?;
    let persister = ResultPersister::new(store, cache);
    let user = user.or(config.default_user);

    println!("=== {} ===", session.exam().title);
    if let Some(description) = &session.exam().description {
        println!("{description}");
    }
    println!(
        "{} questions in {} sections, {} minutes. Pass mark {}%. Type 'help' for commands.",
        session.exam().total_questions(),
        session.exam().sections.len(),
        session.exam().duration_minutes,
        session.exam().marking_scheme.passing_percentage
    );

    let mut input = spawn_stdin_reader();
    let mut ticks = TickSource::every_second();

    let ending = match render_question(&session, true) {
        Err(e) => Ending::Broken(e),
        Ok(()) => loop {
            tokio::select! {
                line = input.recv() => {
                    let Some(line) = line else {
                        break Ending::Quit;
                    };
                    let line = line?;
                    let before = session.cursor();
                    let moved = |session: &ExamSession| {
                        render_question(session, session.cursor().section != before.section)
                    };
                    let shown = match parse_input(&line) {
                        Ok(Input::Empty) => Ok(()),
                        Ok(Input::Select(option)) => match session.select(option) {
                            Ok(()) => {
                                println!("Selected {}.", option_letter(option));
                                if session.next() != before {
                                    moved(&session)
                                } else {
                                    println!("Last question. Type 'submit' when ready.");
                                    Ok(())
                                }
                            }
                            Err(e) => {
                                println!("{e}");
                                Ok(())
                            }
                        },
                        Ok(Input::Next) => {
                            if session.next() == before {
                                println!("Already at the last question.");
                                Ok(())
                            } else {
                                moved(&session)
                            }
                        }
                        Ok(Input::Previous) => {
                            if session.previous() == before {
                                println!("Already at the first question.");
                                Ok(())
                            } else {
                                moved(&session)
                            }
                        }
                        Ok(Input::Jump(section, question)) => match session.jump(section, question) {
                            Ok(_) => moved(&session),
                            Err(e) => {
                                println!("{e}");
                                Ok(())
                            }
                        },
                        Ok(Input::Palette) => {
                            render_palette(&session);
                            Ok(())
                        }
                        Ok(Input::Section) => render_question(&session, true),
                        Ok(Input::Time) => {
                            println!("{} left.", format_remaining(session.remaining_secs()));
                            Ok(())
                        }
                        Ok(Input::Help) => {
                            print_help();
                            Ok(())
                        }
                        Ok(Input::Submit) => break Ending::Submit(SubmitTrigger::Manual),
                        Ok(Input::Quit) => break Ending::Quit,
                        Err(message) => {
                            println!("{message}");
                            Ok(())
                        }
                    };
                    if let Err(e) = shown {
                        break Ending::Broken(e);
                    }
                }
                Some(()) = ticks.next() => {
                    if let Some(trigger) = session.tick() {
                        println!("\nTime is up. Submitting your answers.");
                        break Ending::Submit(trigger);
                    }
                    let remaining = session.remaining_secs();
                    if REMINDERS.contains(&remaining) {
                        println!("\n{} left.", format_remaining(remaining));
                    }
                }
            }
        },
    };
    ticks.stop();

    let trigger = match ending {
        Ending::Submit(trigger) => trigger,
        Ending::Quit => {
            session.abandon();
            println!("Attempt abandoned. Nothing was saved.");
            return Ok(());
        }
        Ending::Broken(e) => {
            session.abandon();
            println!("{}", view_failure(&e));
            return Err(e.into());
        }
    };

    let submission = session.submit(&persister, user.as_deref(), trigger).await?;
    let record = &submission.record;
    super::print_result(&record.exam_title, &record.result);

    if let RemoteStatus::Failed(message) = &submission.persistence.remote {
        println!("Warning: the result could not be sent ({message}). A local copy was kept.");
    }
    if !submission.persistence.local_saved {
        println!("Warning: the local copy of the result could not be written.");
    }

    if let Some(path) = html {
        examkit_report::html::write_html_report(record, Some(session.exam()), &path)?;
        println!("Wrote {}", path.display());
    }

    let Destination::Results { exam_id } = &submission.destination;
    println!("Reopen this result with: examkit result --exam {exam_id}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("n"), Ok(Input::Next));
        assert_eq!(parse_input(" PREV "), Ok(Input::Previous));
        assert_eq!(parse_input("submit"), Ok(Input::Submit));
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
        assert_eq!(parse_input(""), Ok(Input::Empty));
        assert_eq!(parse_input("palette"), Ok(Input::Palette));
    }

    #[test]
    fn parses_options() {
        assert_eq!(parse_input("a"), Ok(Input::Select(0)));
        assert_eq!(parse_input("C"), Ok(Input::Select(2)));
        assert_eq!(parse_input("2"), Ok(Input::Select(1)));
        assert!(parse_input("0").is_err());
        assert!(parse_input("banana").is_err());
    }

    #[test]
    fn parses_jumps_one_based() {
        assert_eq!(parse_input("g 2 3"), Ok(Input::Jump(1, 2)));
        assert!(parse_input("g 0 1").is_err());
        assert!(parse_input("g 1").is_err());
    }

    #[test]
    fn view_failure_points_back_to_the_list() {
        let message = view_failure(&SessionError::InvalidCursor {
            section: 2,
            question: 0,
        });
        assert!(message.starts_with("Cannot show this question: no question at section 2"));
        assert!(message.ends_with("Run `examkit list` to see cached exams."));
    }

    #[test]
    fn letters_for_options() {
        assert_eq!(option_letter(0), "A");
        assert_eq!(option_letter(30), "31");
    }
}
