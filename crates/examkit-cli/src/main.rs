//! examkit CLI: take timed multiple-choice exams from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "examkit", version, about = "Timed multiple-choice exams")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take an exam interactively
    Take {
        /// Exam identifier
        #[arg(long)]
        exam: String,

        /// Category used to pick the cached catalog
        #[arg(long)]
        category: Option<String>,

        /// User recorded on the result (defaults to config, then "anonymous")
        #[arg(long)]
        user: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Also write the results view as HTML
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Validate exam files
    Validate {
        /// Path to an exam file or directory
        #[arg(long)]
        exam_file: PathBuf,
    },

    /// Score a set of answers against an exam file
    Score {
        /// Path to the exam file
        #[arg(long)]
        exam_file: PathBuf,

        /// JSON object of question id to option index, inline or as a file path
        #[arg(long)]
        answers: String,

        /// Seconds taken, recorded on the result
        #[arg(long, default_value = "0")]
        elapsed: u64,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show the saved result of the last attempt at an exam
    Result {
        /// Exam identifier
        #[arg(long)]
        exam: String,

        /// Output format: text, json, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List cached exams
    List {
        /// Category catalog to list
        #[arg(long)]
        category: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and a sample exam
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("examkit=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            exam,
            category,
            user,
            config,
            html,
        } => commands::take::execute(exam, category, user, config, html).await,
        Commands::Validate { exam_file } => commands::validate::execute(exam_file),
        Commands::Score {
            exam_file,
            answers,
            elapsed,
            format,
        } => commands::score::execute(exam_file, answers, elapsed, format),
        Commands::Result {
            exam,
            format,
            output,
            config,
        } => commands::result::execute(exam, format, output, config),
        Commands::List { category, config } => commands::list::execute(category, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
