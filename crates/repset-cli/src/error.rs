use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] repset_core::Error),
    #[error(transparent)]
    Remote(#[from] repset_core::remote::RemoteError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No workout title provided")]
    EmptyTitle,
    #[error("Invalid exercise spec '{0}' (expected NAME:SETSxREPS[@WEIGHT])")]
    InvalidExerciseSpec(String),
    #[error("Workout not found for id/prefix: {0}")]
    WorkoutNotFound(String),
    #[error("Conflict not found for id/prefix: {0}")]
    ConflictNotFound(String),
    #[error("{0}")]
    AmbiguousId(String),
    #[error(
        "Remote API is not configured. Pass --api-url or set REPSET_API_URL in the environment."
    )]
    ApiNotConfigured,
}
