//! Data models for Repset

mod conflict;
mod remote;
mod workout;

pub use conflict::{ConflictId, Resolution, SyncConflict};
pub use remote::RemoteWorkout;
pub use workout::{ExerciseEntry, LocalWorkout, WorkoutDraft, WorkoutId};
