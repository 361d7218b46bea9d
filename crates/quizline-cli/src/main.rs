//! quizline CLI — the terminal front end for quiz sessions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "quizline", version, about = "Multiple-choice quiz runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz interactively
    Play {
        /// Path to a .toml/.json bank file or a directory of them
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Tag to quiz on ("all" for every question)
        #[arg(long)]
        filter: Option<String>,

        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank files
    Validate {
        /// Path to bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// List the tags in a bank with question counts
    Tags {
        /// Path to bank file or directory
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example bank
    Init,
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quizline=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            bank,
            filter,
            seed,
            config,
        } => commands::play::execute(bank, filter, seed, config),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Tags { bank, config } => commands::tags::execute(bank, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
