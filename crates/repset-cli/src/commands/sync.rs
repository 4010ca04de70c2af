use crate::cli::Cli;
use crate::commands::common::open_engine;
use crate::error::CliError;

pub async fn run_sync(cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    if !handle.configured {
        return Err(CliError::ApiNotConfigured);
    }

    let engine = handle.engine;
    if !engine.is_online() {
        println!("Remote store is unreachable; workouts stay queued.");
        return Ok(());
    }

    let synced = engine.sync_workouts().await?;
    println!("Synced {synced} workout(s)");

    let conflicts = engine.conflicts().await?.len();
    if conflicts > 0 {
        println!("{conflicts} conflict(s) need resolution (see `repset conflicts`)");
    }

    let pending = engine.pending_workouts().await?;
    if pending > 0 {
        if engine.has_failed_syncs().await? {
            println!("{pending} workout(s) still queued, some with failed attempts (see `repset list`)");
        } else {
            println!("{pending} workout(s) still queued");
        }
    }
    Ok(())
}
