use repset_core::{LogOutcome, WorkoutDraft};

use crate::cli::Cli;
use crate::commands::common::{open_engine, parse_exercise_spec, resolve_title};
use crate::error::CliError;

pub async fn run_log(
    title_parts: &[String],
    duration: Option<u32>,
    exercise_specs: &[String],
    cli: &Cli,
) -> Result<(), CliError> {
    let title = resolve_title(title_parts)?;
    let exercises = exercise_specs
        .iter()
        .map(|spec| parse_exercise_spec(spec))
        .collect::<Result<Vec<_>, _>>()?;

    let handle = open_engine(cli).await?;
    let outcome = handle
        .engine
        .log_workout(WorkoutDraft {
            title,
            duration_min: duration,
            exercises,
        })
        .await?;

    match outcome {
        LogOutcome::Synced { remote_id } => println!("Synced to remote (#{remote_id})"),
        LogOutcome::Queued { local_id } => println!("{local_id} (queued offline)"),
    }
    Ok(())
}
