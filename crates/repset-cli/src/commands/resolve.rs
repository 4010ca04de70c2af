use repset_core::models::Resolution;

use crate::cli::{Cli, ResolutionArg};
use crate::commands::common::{open_engine, resolve_id_prefix};
use crate::error::CliError;

pub async fn run_resolve(id_query: &str, strategy: ResolutionArg, cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    let engine = handle.engine;

    let conflicts = engine.conflicts().await?;
    let conflict = resolve_id_prefix(&conflicts, |conflict| conflict.id.as_str(), id_query)?
        .ok_or_else(|| CliError::ConflictNotFound(id_query.to_string()))?;
    let conflict_id = conflict.id;
    let resolution = Resolution::from(strategy);

    if engine.resolve_conflict(&conflict_id, resolution).await? {
        println!("Conflict {conflict_id} resolved ({resolution})");
        Ok(())
    } else {
        Err(CliError::ConflictNotFound(id_query.to_string()))
    }
}
