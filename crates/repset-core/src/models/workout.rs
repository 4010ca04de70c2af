//! Local workout models

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a locally logged workout, using UUID v7 (time-sortable)
///
/// Generated on-device at completion time and stable across retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkoutId(Uuid);

impl WorkoutId {
    /// Create a new unique workout ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for WorkoutId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkoutId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A single exercise completion inside a workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    /// Exercise name, e.g. "Back Squat"
    pub name: String,
    /// Sets completed
    pub sets: u32,
    /// Reps per set
    pub reps: u32,
    /// Working weight in kilograms, if the exercise was loaded
    pub weight_kg: Option<f64>,
}

impl ExerciseEntry {
    /// Whether two entries describe the same exercise (name, case-insensitive)
    #[must_use]
    pub fn same_exercise(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

/// Caller-provided data for logging a completed workout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutDraft {
    /// Workout title, e.g. "Leg Day"
    pub title: String,
    /// Total duration in minutes
    pub duration_min: Option<u32>,
    /// Ordered exercise completions
    pub exercises: Vec<ExerciseEntry>,
}

/// A workout completion awaiting (or having failed) remote submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalWorkout {
    /// Unique identifier, stable across retries
    pub id: WorkoutId,
    /// Workout title
    pub title: String,
    /// Completion timestamp (Unix ms)
    pub logged_at: i64,
    /// Total duration in minutes
    pub duration_min: Option<u32>,
    /// Ordered exercise completions
    pub exercises: Vec<ExerciseEntry>,
    /// True once the remote store has durably accepted this record
    pub synced: bool,
    /// Failed submission attempts so far
    pub sync_attempts: u32,
    /// Last submission failure message
    pub sync_error: Option<String>,
    /// Mutation counter backing compare-and-swap queue updates
    pub version: i64,
}

impl LocalWorkout {
    /// Create a new unsynced record from a draft, stamped with the current time
    #[must_use]
    pub fn new(draft: WorkoutDraft) -> Self {
        Self {
            id: WorkoutId::new(),
            title: draft.title,
            logged_at: chrono::Utc::now().timestamp_millis(),
            duration_min: draft.duration_min,
            exercises: draft.exercises,
            synced: false,
            sync_attempts: 0,
            sync_error: None,
            version: 0,
        }
    }

    /// Number of exercise completions in this workout
    #[must_use]
    pub fn exercise_count(&self) -> u32 {
        u32::try_from(self.exercises.len()).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn squat() -> ExerciseEntry {
        ExerciseEntry {
            name: "Back Squat".to_string(),
            sets: 5,
            reps: 5,
            weight_kg: Some(100.0),
        }
    }

    #[test]
    fn test_workout_id_unique() {
        let id1 = WorkoutId::new();
        let id2 = WorkoutId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_workout_id_parse() {
        let id = WorkoutId::new();
        let parsed: WorkoutId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_new_workout_is_unsynced() {
        let workout = LocalWorkout::new(WorkoutDraft {
            title: "Leg Day".to_string(),
            duration_min: Some(45),
            exercises: vec![squat()],
        });
        assert!(!workout.synced);
        assert_eq!(workout.sync_attempts, 0);
        assert!(workout.sync_error.is_none());
        assert_eq!(workout.version, 0);
        assert!(workout.logged_at > 0);
        assert_eq!(workout.exercise_count(), 1);
    }

    #[test]
    fn test_same_exercise_ignores_case() {
        let a = squat();
        let mut b = squat();
        b.name = "BACK SQUAT".to_string();
        b.weight_kg = None;
        assert!(a.same_exercise(&b));

        let mut c = squat();
        c.name = "Front Squat".to_string();
        assert!(!a.same_exercise(&c));
    }
}
