//! Conflict resolution payload construction
//!
//! The write orchestration lives on the engine; this module builds the
//! payloads so the merge rules can be tested in isolation.

use crate::models::{ExerciseEntry, SyncConflict};
use crate::remote::WorkoutPayload;

/// Union of exercise completions for the `merged` strategy
///
/// Remote entries keep their positions; local entries with no remote
/// counterpart (matched by exercise identity, case-insensitive name) are
/// appended in local order.
#[must_use]
pub fn merge_exercises(remote: &[ExerciseEntry], local: &[ExerciseEntry]) -> Vec<ExerciseEntry> {
    let mut merged = remote.to_vec();
    for entry in local {
        if !merged.iter().any(|existing| existing.same_exercise(entry)) {
            merged.push(entry.clone());
        }
    }
    merged
}

/// Combined record for the `merged` strategy
///
/// The remote record is authoritative for "when" (and identity); exercises
/// are the union of both sides; remaining fields prefer the remote value and
/// fall back to the local one.
#[must_use]
pub fn merged_payload(conflict: &SyncConflict) -> WorkoutPayload {
    let local = &conflict.local;
    let remote = &conflict.remote;
    WorkoutPayload {
        title: remote.title.clone().unwrap_or_else(|| local.title.clone()),
        completed_at: remote.completed_at,
        duration_min: remote.duration_min.or(local.duration_min),
        exercises: merge_exercises(&remote.exercises, &local.exercises),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocalWorkout, RemoteWorkout, WorkoutDraft};
    use pretty_assertions::assert_eq;

    fn entry(name: &str) -> ExerciseEntry {
        ExerciseEntry {
            name: name.to_string(),
            sets: 3,
            reps: 10,
            weight_kg: None,
        }
    }

    fn conflict(
        local_exercises: Vec<ExerciseEntry>,
        remote_exercises: Vec<ExerciseEntry>,
    ) -> SyncConflict {
        let local = LocalWorkout::new(WorkoutDraft {
            title: "Leg Day".to_string(),
            duration_min: Some(45),
            exercises: local_exercises,
        });
        let remote = RemoteWorkout {
            id: 42,
            user_id: "u1".to_string(),
            title: Some("Lower Body".to_string()),
            completed_at: local.logged_at + 3_600_000,
            exercise_count: u32::try_from(remote_exercises.len()).unwrap(),
            duration_min: None,
            calories: Some(400),
            exercises: remote_exercises,
        };
        SyncConflict::new(local, remote)
    }

    #[test]
    fn test_merge_appends_missing_local_entries() {
        let merged = merge_exercises(
            &[entry("Back Squat"), entry("Leg Press")],
            &[entry("back squat"), entry("Calf Raise")],
        );
        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Back Squat", "Leg Press", "Calf Raise"]);
    }

    #[test]
    fn test_merge_keeps_remote_variant_on_overlap() {
        let mut remote_squat = entry("Back Squat");
        remote_squat.weight_kg = Some(110.0);
        let mut local_squat = entry("back squat");
        local_squat.weight_kg = Some(100.0);

        let merged = merge_exercises(&[remote_squat], &[local_squat]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].weight_kg, Some(110.0));
    }

    #[test]
    fn test_merged_payload_remote_identity_wins() {
        let conflict = conflict(
            vec![entry("Back Squat"), entry("Calf Raise")],
            vec![entry("Back Squat")],
        );
        let payload = merged_payload(&conflict);

        assert_eq!(payload.title, "Lower Body");
        assert_eq!(payload.completed_at, conflict.remote.completed_at);
        // Remote has no duration, so the local value fills in
        assert_eq!(payload.duration_min, Some(45));
        assert_eq!(payload.exercises.len(), 2);
    }

    #[test]
    fn test_merged_payload_falls_back_to_local_title() {
        let mut conflict = conflict(vec![entry("Back Squat")], vec![entry("Back Squat")]);
        conflict.remote.title = None;
        let payload = merged_payload(&conflict);
        assert_eq!(payload.title, "Leg Day");
    }
}
