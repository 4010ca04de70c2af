use serde::Serialize;

use crate::cli::Cli;
use crate::commands::common::open_engine;
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub online: bool,
    pub api_configured: bool,
    pub pending_workouts: usize,
    pub conflicts: usize,
    pub has_failed_syncs: bool,
}

pub async fn run_status(as_json: bool, cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    let engine = &handle.engine;

    let report = StatusReport {
        online: engine.is_online(),
        api_configured: handle.configured,
        pending_workouts: engine.pending_workouts().await?,
        conflicts: engine.conflicts().await?.len(),
        has_failed_syncs: engine.has_failed_syncs().await?,
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let remote = if report.api_configured {
        if report.online {
            "online"
        } else {
            "unreachable"
        }
    } else {
        "not configured"
    };
    println!("Remote:    {remote}");
    println!("Pending:   {}", report.pending_workouts);
    println!("Conflicts: {}", report.conflicts);
    if report.has_failed_syncs {
        println!("Some workouts have failed sync attempts (see `repset list`)");
    }
    Ok(())
}
