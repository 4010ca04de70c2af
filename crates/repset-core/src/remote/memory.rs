//! In-memory remote store
//!
//! Backs the engine's tests and offline experimentation: supports seeding
//! existing records, injecting failures, and toggling reachability.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::models::RemoteWorkout;

use super::{RemoteError, RemoteResult, RemoteStore, WorkoutPayload};

/// In-process implementation of [`RemoteStore`]
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    workouts: Vec<RemoteWorkout>,
    next_id: i64,
    fail_requests: u32,
    reachable: bool,
    submit_calls: u32,
    update_calls: u32,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            workouts: Vec::new(),
            next_id: 1,
            fail_requests: 0,
            reachable: true,
            submit_calls: 0,
            update_calls: 0,
        }
    }
}

impl InMemoryRemoteStore {
    /// Create an empty, reachable store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an existing remote record, e.g. one synced from another device
    pub fn seed(&self, workout: RemoteWorkout) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id = inner.next_id.max(workout.id + 1);
        inner.workouts.push(workout);
    }

    /// Make the next `count` submit/update requests fail
    pub fn fail_next(&self, count: u32) {
        self.inner.lock().unwrap().fail_requests = count;
    }

    /// Toggle reachability; unreachable stores fail every call
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.lock().unwrap().reachable = reachable;
    }

    /// Snapshot of all stored records
    #[must_use]
    pub fn workouts(&self) -> Vec<RemoteWorkout> {
        self.inner.lock().unwrap().workouts.clone()
    }

    /// Submission attempts seen so far, including failed ones
    #[must_use]
    pub fn submit_calls(&self) -> u32 {
        self.inner.lock().unwrap().submit_calls
    }

    /// Update attempts seen so far, including failed ones
    #[must_use]
    pub fn update_calls(&self) -> u32 {
        self.inner.lock().unwrap().update_calls
    }

    fn check_available(inner: &mut Inner) -> RemoteResult<()> {
        if !inner.reachable {
            return Err(RemoteError::Offline);
        }
        if inner.fail_requests > 0 {
            inner.fail_requests -= 1;
            return Err(RemoteError::Api("injected failure (500)".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn submit(&self, user_id: &str, payload: &WorkoutPayload) -> RemoteResult<i64> {
        let mut inner = self.inner.lock().unwrap();
        inner.submit_calls += 1;
        Self::check_available(&mut inner)?;

        let id = inner.next_id;
        inner.next_id += 1;
        inner.workouts.push(RemoteWorkout {
            id,
            user_id: user_id.to_string(),
            title: Some(payload.title.clone()),
            completed_at: payload.completed_at,
            exercise_count: u32::try_from(payload.exercises.len()).unwrap_or(u32::MAX),
            duration_min: payload.duration_min,
            calories: None,
            exercises: payload.exercises.clone(),
        });
        Ok(id)
    }

    async fn recent_workouts(&self, user_id: &str) -> RemoteResult<Vec<RemoteWorkout>> {
        let inner = self.inner.lock().unwrap();
        if !inner.reachable {
            return Err(RemoteError::Offline);
        }
        Ok(inner
            .workouts
            .iter()
            .filter(|workout| workout.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, workout_id: i64, payload: &WorkoutPayload) -> RemoteResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.update_calls += 1;
        Self::check_available(&mut inner)?;

        let workout = inner
            .workouts
            .iter_mut()
            .find(|workout| workout.id == workout_id)
            .ok_or_else(|| RemoteError::Api(format!("workout {workout_id} not found (404)")))?;

        workout.title = Some(payload.title.clone());
        workout.completed_at = payload.completed_at;
        workout.duration_min = payload.duration_min;
        workout.exercise_count = u32::try_from(payload.exercises.len()).unwrap_or(u32::MAX);
        workout.exercises = payload.exercises.clone();
        Ok(())
    }

    async fn ping(&self) -> bool {
        self.inner.lock().unwrap().reachable
    }
}
