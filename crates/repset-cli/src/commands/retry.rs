use crate::cli::Cli;
use crate::commands::common::{open_engine, resolve_id_prefix};
use crate::error::CliError;

pub async fn run_retry(id_query: &str, cli: &Cli) -> Result<(), CliError> {
    let handle = open_engine(cli).await?;
    let engine = handle.engine;

    let workouts = engine.offline_workouts().await?;
    let workout = resolve_id_prefix(&workouts, |workout| workout.id.as_str(), id_query)?
        .ok_or_else(|| CliError::WorkoutNotFound(id_query.to_string()))?;
    let workout_id = workout.id;

    match engine.retry_workout(&workout_id).await {
        Ok(()) => {
            println!("Workout {workout_id} re-armed for the next sync");
            Ok(())
        }
        // Conflicted records live outside the plain queue and cannot be retried
        Err(repset_core::Error::NotFound(_)) => {
            Err(CliError::WorkoutNotFound(id_query.to_string()))
        }
        Err(error) => Err(error.into()),
    }
}
