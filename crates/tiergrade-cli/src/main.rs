//! tiergrade CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use tiergrade_core::Tier;

mod commands;

#[derive(Parser)]
#[command(name = "tiergrade", version, about = "Tiered answer grading engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one answer against a question's rule
    Grade {
        /// Path to a .toml rule set
        #[arg(long)]
        rules: PathBuf,

        /// Question id within the rule set
        #[arg(long)]
        question: String,

        /// The answer text (omit for a blank submission)
        #[arg(long, conflicts_with = "answer_file")]
        answer: Option<String>,

        /// Read the answer from a file
        #[arg(long)]
        answer_file: Option<PathBuf>,

        /// Context values as key=value (repeatable)
        #[arg(long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Also ask the configured AI judge and merge its verdict
        #[arg(long)]
        ai: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Appeal a grade with the configured adjudicator
    Appeal {
        /// Path to a .toml rule set
        #[arg(long)]
        rules: PathBuf,

        /// Question id within the rule set
        #[arg(long)]
        question: String,

        /// The answer that was graded
        #[arg(long)]
        answer: String,

        /// Why the grade should change
        #[arg(long)]
        reasoning: String,

        /// JSON result from `tiergrade grade --format json`
        #[arg(long, conflicts_with = "prior_tier")]
        prior: Option<PathBuf>,

        /// Prior tier (E, P, I); the answer is re-graded when neither prior is given
        #[arg(long)]
        prior_tier: Option<Tier>,

        /// Context values as key=value (repeatable)
        #[arg(long = "context", value_name = "KEY=VALUE")]
        context: Vec<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate rule set TOML files
    Validate {
        /// Path to rule set file or directory
        #[arg(long)]
        rules: PathBuf,
    },

    /// Create starter config and example rule set
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tiergrade=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            rules,
            question,
            answer,
            answer_file,
            context,
            ai,
            format,
            config,
        } => {
            commands::grade::execute(commands::grade::GradeArgs {
                rules,
                question,
                answer,
                answer_file,
                context,
                ai,
                format,
                config,
            })
            .await
        }
        Commands::Appeal {
            rules,
            question,
            answer,
            reasoning,
            prior,
            prior_tier,
            context,
            config,
        } => {
            commands::appeal::execute(commands::appeal::AppealArgs {
                rules,
                question,
                answer,
                reasoning,
                prior,
                prior_tier,
                context,
                config,
            })
            .await
        }
        Commands::Validate { rules } => commands::validate::execute(rules),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
