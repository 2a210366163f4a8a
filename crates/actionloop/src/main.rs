//! actionloop - agents that act through the action protocol

use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{
    bsm_command, cache_clear_command, init_command, run_command, status_command, BsmArgs,
    RunArgs,
};

/// actionloop - action-protocol agents for your terminal
#[derive(Parser)]
#[command(name = "actionloop")]
#[command(about = "◆ Agents that act through a tag-based action protocol")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config, workspace and cache
    Init,
    /// Show configuration status
    Status,
    /// Run the looping agent on a task inside the workspace
    Run {
        /// Task to accomplish
        #[arg(short, long)]
        task: String,
        /// Retries allowed for unparsable answers
        #[arg(long)]
        tries: Option<u32>,
        /// Maximum number of steps
        #[arg(long)]
        max_steps: Option<usize>,
        /// Bypass the prompt cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Answer a question with branch-solve-merge
    Bsm {
        /// Question to answer
        #[arg(short, long)]
        question: String,
        /// Number of candidate answers
        #[arg(long, default_value_t = 2)]
        answers: usize,
        /// Number of evaluation criteria
        #[arg(long, default_value_t = 3)]
        criteria: usize,
        /// Criterion to evaluate with (repeatable)
        #[arg(long = "criterion")]
        criterion_names: Vec<String>,
        /// Bypass the prompt cache
        #[arg(long)]
        no_cache: bool,
    },
    /// Manage the prompt cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Remove every cached prompt and answer
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init => init_command().await,
        Commands::Status => status_command().await,
        Commands::Run {
            task,
            tries,
            max_steps,
            no_cache,
        } => {
            run_command(RunArgs {
                task,
                tries,
                max_steps,
                no_cache,
            })
            .await
        }
        Commands::Bsm {
            question,
            answers,
            criteria,
            criterion_names,
            no_cache,
        } => {
            bsm_command(BsmArgs {
                question,
                answers,
                criteria,
                criterion_names,
                no_cache,
            })
            .await
        }
        Commands::Cache { command } => match command {
            CacheCommands::Clear => cache_clear_command().await,
        },
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
