//! # xwalk CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xwalk_cli::crosswalk::{run_crosswalk, CrosswalkArgs};
use xwalk_cli::score::{run_score, ScoreArgs};

/// Cross-framework control mapping engine.
#[derive(Parser, Debug)]
#[command(name = "xwalk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a framework's crosswalk from a catalog file.
    Crosswalk(CrosswalkArgs),

    /// Score the similarity of two controls.
    Score(ScoreArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays valid JSON.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Crosswalk(args) => run_crosswalk(&args, &mut stdout),
        Commands::Score(args) => run_score(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
