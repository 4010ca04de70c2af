use crate::cli::Cli;
use crate::commands::common::{format_workout_lines, open_engine, workout_to_item, WorkoutListItem};
use crate::error::CliError;

pub async fn run_list(as_json: bool, cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    let workouts = handle.engine.offline_workouts().await?;
    let now_ms = chrono::Utc::now().timestamp_millis();

    if as_json {
        let json_items = workouts
            .iter()
            .map(|workout| workout_to_item(workout, now_ms))
            .collect::<Vec<WorkoutListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if workouts.is_empty() {
        println!("No workouts waiting to sync.");
        return Ok(());
    }

    for line in format_workout_lines(&workouts, now_ms) {
        println!("{line}");
    }
    Ok(())
}
