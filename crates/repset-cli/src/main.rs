//! Repset CLI - log workouts from the command line, online or off
//!
//! Completions are queued locally whenever the remote store is unreachable
//! and pushed on the next sync.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};

use crate::cli::{Cli, Commands};
use crate::commands::completions::run_completions;
use crate::commands::conflicts::run_conflicts;
use crate::commands::list::run_list;
use crate::commands::log::run_log;
use crate::commands::resolve::run_resolve;
use crate::commands::retry::run_retry;
use crate::commands::status::run_status;
use crate::commands::sync::run_sync;
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
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("repset=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Log {
            title,
            duration,
            exercises,
        }) => run_log(title, *duration, exercises, &cli).await?,
        Some(Commands::List { json }) => run_list(*json, &cli).await?,
        Some(Commands::Sync) => run_sync(&cli).await?,
        Some(Commands::Conflicts { json }) => run_conflicts(*json, &cli).await?,
        Some(Commands::Resolve { id, strategy }) => run_resolve(id, *strategy, &cli).await?,
        Some(Commands::Retry { id }) => run_retry(id, &cli).await?,
        Some(Commands::Status { json }) => run_status(*json, &cli).await?,
        Some(Commands::Completions { shell, output }) => {
            run_completions(*shell, output.as_deref())?;
        }
        None => {
            // Quick log mode: repset "Leg Day"
            if cli.title.is_empty() {
                Cli::command().print_help().map_err(CliError::Io)?;
                println!();
            } else {
                let title = cli.title.clone();
                run_log(&title, None, &[], &cli).await?;
            }
        }
    }

    Ok(())
}
