//! Duplicate-session detection
//!
//! Offline sessions are logged close to, not exactly at, completion time, so
//! matching is a heuristic: a time window around the local timestamp plus a
//! tolerance on the exercise count. Uncertain matches become conflicts for
//! the user to settle; only clear non-matches are submitted directly.

use crate::config::SyncSettings;
use crate::models::{LocalWorkout, RemoteWorkout};

/// Find the remote record most likely describing the same session as `local`
///
/// A candidate matches when its completion time falls within the configured
/// window of the local timestamp (inclusive) and its exercise count is within
/// the configured tolerance. Among matches, the smallest absolute time delta
/// wins; ties are broken toward the highest remote id (most recently created)
/// so the result is deterministic. Returns `None` when nothing matches, in
/// which case the local record is safe to submit as-is.
pub fn find_conflict<'a>(
    local: &LocalWorkout,
    candidates: &'a [RemoteWorkout],
    settings: &SyncSettings,
) -> Option<&'a RemoteWorkout> {
    let window_ms = settings.match_window_ms();
    candidates
        .iter()
        .filter(|remote| {
            time_delta(local, remote) <= window_ms
                && remote.exercise_count.abs_diff(local.exercise_count())
                    <= settings.count_tolerance
        })
        .min_by(|a, b| {
            time_delta(local, a)
                .cmp(&time_delta(local, b))
                .then_with(|| b.id.cmp(&a.id))
        })
}

fn time_delta(local: &LocalWorkout, remote: &RemoteWorkout) -> i64 {
    (remote.completed_at - local.logged_at).abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseEntry, WorkoutDraft};

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn local(logged_at: i64, exercises: u32) -> LocalWorkout {
        let mut workout = LocalWorkout::new(WorkoutDraft {
            title: "Leg Day".to_string(),
            duration_min: None,
            exercises: (0..exercises)
                .map(|i| ExerciseEntry {
                    name: format!("Exercise {i}"),
                    sets: 3,
                    reps: 10,
                    weight_kg: None,
                })
                .collect(),
        });
        workout.logged_at = logged_at;
        workout
    }

    fn remote(id: i64, completed_at: i64, exercise_count: u32) -> RemoteWorkout {
        RemoteWorkout {
            id,
            user_id: "u1".to_string(),
            title: None,
            completed_at,
            exercise_count,
            duration_min: None,
            calories: None,
            exercises: Vec::new(),
        }
    }

    #[test]
    fn test_no_candidates_is_no_conflict() {
        let settings = SyncSettings::default();
        assert!(find_conflict(&local(0, 5), &[], &settings).is_none());
    }

    #[test]
    fn test_close_candidate_matches() {
        let settings = SyncSettings::default();
        let candidates = vec![remote(1, HOUR_MS, 5)];
        let found = find_conflict(&local(0, 5), &candidates, &settings).unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let settings = SyncSettings::default();
        let window = settings.match_window_ms();

        let at_edge = vec![remote(1, window, 5)];
        assert!(find_conflict(&local(0, 5), &at_edge, &settings).is_some());

        let past_edge = vec![remote(1, window + 1, 5)];
        assert!(find_conflict(&local(0, 5), &past_edge, &settings).is_none());
    }

    #[test]
    fn test_count_tolerance_boundary() {
        let settings = SyncSettings::default();

        // Default tolerance is 2: a 5-exercise local matches 3..=7 remote
        let within = vec![remote(1, 0, 7)];
        assert!(find_conflict(&local(0, 5), &within, &settings).is_some());

        let beyond = vec![remote(1, 0, 8)];
        assert!(find_conflict(&local(0, 5), &beyond, &settings).is_none());
    }

    #[test]
    fn test_smallest_time_delta_wins() {
        let settings = SyncSettings::default();
        let candidates = vec![remote(1, 3 * HOUR_MS, 5), remote(2, HOUR_MS, 5)];
        let found = find_conflict(&local(0, 5), &candidates, &settings).unwrap();
        assert_eq!(found.id, 2);
    }

    #[test]
    fn test_equal_deltas_break_toward_higher_id() {
        let settings = SyncSettings::default();
        // Same absolute delta on both sides of the local timestamp
        let candidates = vec![remote(3, -HOUR_MS, 5), remote(7, HOUR_MS, 5)];
        let found = find_conflict(&local(0, 5), &candidates, &settings).unwrap();
        assert_eq!(found.id, 7);
    }

    #[test]
    fn test_time_match_with_wrong_count_is_ignored() {
        let settings = SyncSettings::default();
        let candidates = vec![remote(1, 0, 12)];
        assert!(find_conflict(&local(0, 5), &candidates, &settings).is_none());
    }
}
