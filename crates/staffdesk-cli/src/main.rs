//! Staffdesk CLI - background replication between the local database and Supabase
//!
//! Runs the sync scheduler by default; `sync` runs a single cycle.

mod auth;
mod cli;
mod commands;
mod error;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::sync::{run_service, run_sync};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy()
                .add_directive("staffdesk=info".parse().unwrap_or_else(|_| LevelFilter::INFO.into())),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Run) => run_service().await,
        Some(Commands::Sync) => run_sync().await,
        Some(Commands::Auth { command }) => run_auth(command).await,
    }
}
