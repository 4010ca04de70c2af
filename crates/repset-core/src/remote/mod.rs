//! Remote workout store client
//!
//! The engine consumes the remote store through [`RemoteStore`]:
//! a submission endpoint, a recent-records query used for conflict
//! comparison, and an update-by-id capability used by resolution.

mod http;
mod memory;

pub use http::HttpRemoteStore;
pub use memory::InMemoryRemoteStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ExerciseEntry, LocalWorkout, RemoteWorkout};

/// Errors from remote store operations
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP transport failure
    #[error("Remote store HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The API rejected the request
    #[error("Remote store API error: {0}")]
    Api(String),
    /// The API answered with a payload the client cannot use
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
    /// The store is unreachable
    #[error("Remote store is unreachable")]
    Offline,
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Workout data accepted by the submission and update endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPayload {
    /// Workout title
    pub title: String,
    /// Completion timestamp (Unix ms)
    pub completed_at: i64,
    /// Total duration in minutes
    pub duration_min: Option<u32>,
    /// Exercise completions
    pub exercises: Vec<ExerciseEntry>,
}

impl WorkoutPayload {
    /// Build a submission payload from a queued local record
    #[must_use]
    pub fn from_local(workout: &LocalWorkout) -> Self {
        Self {
            title: workout.title.clone(),
            completed_at: workout.logged_at,
            duration_min: workout.duration_min,
            exercises: workout.exercises.clone(),
        }
    }
}

/// Client-side view of the remote workout store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Submit a new workout completion, returning the server-assigned id
    async fn submit(&self, user_id: &str, payload: &WorkoutPayload) -> RemoteResult<i64>;

    /// Recent workout records for a user, used for conflict comparison
    async fn recent_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>>;

    /// Overwrite an existing remote record by id
    async fn update(&self, workout_id: i64, payload: &WorkoutPayload) -> RemoteResult<()>;

    /// Cheap reachability probe
    async fn ping(&self) -> bool;
}
