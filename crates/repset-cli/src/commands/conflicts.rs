use crate::cli::Cli;
use crate::commands::common::{
    conflict_to_item, format_conflict_lines, open_engine, ConflictListItem,
};
use crate::error::CliError;

pub async fn run_conflicts(as_json: bool, cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    let conflicts = handle.engine.conflicts().await?;

    if as_json {
        let json_items = conflicts
            .iter()
            .map(conflict_to_item)
            .collect::<Vec<ConflictListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No conflicts awaiting resolution.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts) {
        println!("{line}");
    }
    println!("Resolve with `repset resolve <id> <local|server|merged>`");
    Ok(())
}
