//! Server-side workout record

use serde::{Deserialize, Serialize};

use super::ExerciseEntry;

/// A workout record as stored by the remote store
///
/// Owned exclusively by the remote system; the engine reads it for conflict
/// comparison and writes to it on submission and resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteWorkout {
    /// Server-assigned identifier, monotonically increasing
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Workout title, if the server stores one
    pub title: Option<String>,
    /// Completion timestamp (Unix ms)
    pub completed_at: i64,
    /// Number of exercise completions
    pub exercise_count: u32,
    /// Total duration in minutes
    pub duration_min: Option<u32>,
    /// Estimated calories burned
    pub calories: Option<u32>,
    /// Exercise completions, when the server returns them
    #[serde(default)]
    pub exercises: Vec<ExerciseEntry>,
}
