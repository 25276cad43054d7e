//! quiztutor CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "quiztutor", version, about = "LLM-backed multiple-choice quiz tutor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz on a topic
    Play {
        /// Topic to be quizzed on
        #[arg(long)]
        topic: String,

        /// Difficulty: easy, medium, hard (unrecognized values fall back to easy)
        #[arg(long, default_value = "easy")]
        difficulty: String,

        /// Provider name from the config (default: config's default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model to use (default: config's default_model, else the provider's default)
        #[arg(long)]
        model: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write the final score summary as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,

        /// Log every prompt sent to the model
        #[arg(long)]
        echo_prompts: bool,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "quiztutor=info"
    } else {
        "quiztutor=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(matches!(
        cli.command,
        Commands::Play {
            echo_prompts: true,
            ..
        }
    ));

    let result = match cli.command {
        Commands::Play {
            topic,
            difficulty,
            provider,
            model,
            config,
            summary_json,
            echo_prompts,
        } => {
            commands::play::execute(commands::play::PlayArgs {
                topic,
                difficulty,
                provider,
                model,
                config,
                summary_json,
                echo_prompts,
            })
            .await
        }
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config).await
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
