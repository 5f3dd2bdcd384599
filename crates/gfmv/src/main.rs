//! gfmv CLI - GitHub-flavored markdown previewer.
//!
//! Provides commands for:
//! - `preview`: Render a markdown file once
//! - `watch`: Re-render a markdown file whenever it changes
//! - `credentials`: Manage the stored GitHub identifier and secret

mod commands;
mod error;
mod output;
mod sink;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CredentialsCommand, PreviewArgs, WatchArgs};
use output::Output;

/// gfmv - preview markdown exactly as GitHub renders it.
#[derive(Parser)]
#[command(name = "gfmv", version, about)]
struct Cli {
    /// Enable verbose output (request and delivery logs).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a markdown file once.
    Preview(PreviewArgs),
    /// Re-render a markdown file every time it changes.
    Watch(WatchArgs),
    /// Manage stored GitHub credentials.
    #[command(subcommand)]
    Credentials(CredentialsCommand),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Preview(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::Watch(args) => {
            let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
            rt.block_on(args.execute())
        }
        Commands::Credentials(cmd) => cmd.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
