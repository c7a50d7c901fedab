//! learnpath CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "learnpath",
    version,
    about = "Exercise grading and module progress for classrooms"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade a submission against an exercise
    Grade {
        /// Exercise definition (.json or .toml)
        #[arg(long)]
        exercise: PathBuf,

        /// Submitted answers as JSON (object keyed by position, or array)
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Report a student's progress through learning modules
    Progress {
        /// Student id
        #[arg(long)]
        student: String,

        /// Module codes to report (comma-separated, default: all loaded modules)
        #[arg(long, conflicts_with = "classroom")]
        modules: Option<String>,

        /// Report the modules assigned to this classroom, in classroom order
        #[arg(long)]
        classroom: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate learning module TOML files
    Validate {
        /// Path to module file or directory
        #[arg(long)]
        modules: PathBuf,
    },

    /// Create starter config, an example module and an empty records file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("learnpath=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            exercise,
            answers,
            format,
            config,
        } => commands::grade::execute(exercise, answers, format, config),
        Commands::Progress {
            student,
            modules,
            classroom,
            format,
            config,
        } => commands::progress::execute(student, modules, classroom, format, config).await,
        Commands::Validate { modules } => commands::validate::execute(modules),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
