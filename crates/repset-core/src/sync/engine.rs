//! Sync engine: queue drain, conflict handling, and the client facade
//!
//! One explicitly constructed engine instance backs a client; callers share
//! it behind `Arc`. Persisted queue state is the single source of truth for
//! every count the facade reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::SyncSettings;
use crate::db::{Database, SqliteWorkoutQueue, WorkoutQueue};
use crate::error::{Error, Result};
use crate::models::{ConflictId, LocalWorkout, Resolution, SyncConflict, WorkoutDraft, WorkoutId};
use crate::net::NetworkMonitor;
use crate::remote::{RemoteError, RemoteStore, WorkoutPayload};

use super::{detector, resolver};

/// Outcome of logging a workout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutcome {
    /// The remote store accepted the record immediately; nothing was queued
    Synced {
        /// Server-assigned id
        remote_id: i64,
    },
    /// The record was stored in the durable queue for a later drain
    Queued {
        /// Locally generated id, stable across retries
        local_id: WorkoutId,
    },
}

/// Offline-first sync engine and the facade presentation code talks to
pub struct SyncEngine {
    db: Arc<Mutex<Database>>,
    store: Arc<dyn RemoteStore>,
    monitor: NetworkMonitor,
    settings: SyncSettings,
    user_id: String,
    draining: AtomicBool,
}

impl SyncEngine {
    /// Create an engine over an opened database and remote store
    ///
    /// The database already holds any queue state persisted by previous runs.
    #[must_use]
    pub fn new(
        db: Database,
        store: Arc<dyn RemoteStore>,
        monitor: NetworkMonitor,
        settings: SyncSettings,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            store,
            monitor,
            settings,
            user_id: user_id.into(),
            draining: AtomicBool::new(false),
        }
    }

    /// The connectivity monitor driving automatic drains
    pub const fn monitor(&self) -> &NetworkMonitor {
        &self.monitor
    }

    /// Current connectivity
    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Whether a drain is in progress
    pub fn is_loading(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Count of queued, unsynced, non-conflicting records
    pub async fn pending_workouts(&self) -> Result<usize> {
        self.with_queue(|queue| queue.pending_count()).await
    }

    /// Whether any queued record has accumulated failed attempts
    pub async fn has_failed_syncs(&self) -> Result<bool> {
        self.with_queue(|queue| queue.has_failed()).await
    }

    /// Unresolved conflicts awaiting a user decision, in detection order
    pub async fn conflicts(&self) -> Result<Vec<SyncConflict>> {
        self.with_queue(|queue| queue.list_conflicts()).await
    }

    /// Every unsynced local record: the pending queue in FIFO order,
    /// followed by the local halves of unresolved conflicts
    pub async fn offline_workouts(&self) -> Result<Vec<LocalWorkout>> {
        self.with_queue(|queue| {
            let mut workouts = queue.list()?;
            for conflict in queue.list_conflicts()? {
                workouts.push(conflict.local);
            }
            Ok(workouts)
        })
        .await
    }

    /// Log a completed workout
    ///
    /// Attempts one bounded immediate submission when online; on success
    /// nothing is queued. Any failure, including being offline, falls back to
    /// the durable queue; network trouble is never surfaced as an error here.
    pub async fn log_workout(&self, draft: WorkoutDraft) -> Result<LogOutcome> {
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidInput(
                "workout title must not be empty".to_string(),
            ));
        }
        let workout = LocalWorkout::new(draft);

        if self.monitor.is_online() {
            let payload = WorkoutPayload::from_local(&workout);
            match self.store.submit(&self.user_id, &payload).await {
                Ok(remote_id) => {
                    tracing::debug!(workout = %workout.id, remote_id, "workout accepted remotely");
                    return Ok(LogOutcome::Synced { remote_id });
                }
                Err(error) => {
                    tracing::warn!(workout = %workout.id, %error, "immediate submission failed, queueing");
                }
            }
        }

        self.with_queue(|queue| queue.enqueue(&workout)).await?;
        tracing::debug!(workout = %workout.id, "workout queued for sync");
        Ok(LogOutcome::Queued {
            local_id: workout.id,
        })
    }

    /// Drain the queue once, returning how many records were newly synced
    ///
    /// Returns 0 immediately when offline or when another drain is already in
    /// flight. Records are processed sequentially in FIFO order so two
    /// submissions never race.
    pub async fn sync_workouts(&self) -> Result<usize> {
        if !self.monitor.is_online() {
            return Ok(0);
        }
        if self.draining.swap(true, Ordering::SeqCst) {
            tracing::debug!("drain already in progress, skipping");
            return Ok(0);
        }

        let result = self.drain().await;
        self.draining.store(false, Ordering::SeqCst);
        result
    }

    async fn drain(&self) -> Result<usize> {
        let queued = self.with_queue(|queue| queue.list()).await?;
        if queued.is_empty() {
            return Ok(0);
        }

        // Without the remote set, submitting would risk creating the very
        // duplicates conflict detection exists to prevent.
        let candidates = match self.store.recent_workouts(&self.user_id).await {
            Ok(candidates) => candidates,
            Err(error) => {
                tracing::warn!(%error, "could not fetch remote records, aborting drain");
                return Ok(0);
            }
        };

        let mut synced = 0;
        for workout in queued {
            if workout.synced {
                // Already accepted remotely; eligible for removal
                self.with_queue(|queue| queue.remove(&workout.id)).await?;
                continue;
            }
            if workout.sync_attempts >= self.settings.max_sync_attempts {
                // Parked until an explicit user-triggered retry
                continue;
            }

            if let Some(remote) = detector::find_conflict(&workout, &candidates, &self.settings) {
                let conflict = SyncConflict::new(workout.clone(), remote.clone());
                tracing::info!(
                    conflict = %conflict.id,
                    workout = %workout.id,
                    remote_id = remote.id,
                    "conflict detected, awaiting user resolution"
                );
                self.with_queue(|queue| queue.promote_to_conflict(&conflict))
                    .await?;
                continue;
            }

            let payload = WorkoutPayload::from_local(&workout);
            match self.store.submit(&self.user_id, &payload).await {
                Ok(remote_id) => {
                    self.with_queue(|queue| queue.remove(&workout.id)).await?;
                    synced += 1;
                    tracing::info!(workout = %workout.id, remote_id, "queued workout synced");
                }
                Err(error) => self.record_failure(workout, &error).await?,
            }
        }

        Ok(synced)
    }

    async fn record_failure(&self, mut workout: LocalWorkout, error: &RemoteError) -> Result<()> {
        let expected = workout.version;
        workout.sync_attempts += 1;
        workout.sync_error = Some(error.to_string());

        if workout.sync_attempts >= self.settings.max_sync_attempts {
            tracing::warn!(
                workout = %workout.id,
                attempts = workout.sync_attempts,
                %error,
                "workout parked after repeated sync failures"
            );
        } else {
            tracing::debug!(
                workout = %workout.id,
                attempts = workout.sync_attempts,
                %error,
                "sync attempt failed, will retry on next drain"
            );
        }

        match self
            .with_queue(|queue| queue.update(&workout, expected))
            .await
        {
            Ok(()) => Ok(()),
            Err(Error::VersionConflict(id)) => {
                // A resolution raced this drain; the next drain re-reads
                tracing::debug!(workout = %id, "record changed during drain, skipping");
                Ok(())
            }
            Err(error) => Err(error),
        }
    }

    /// Settle a detected conflict with the given strategy
    ///
    /// Returns `Ok(false)` for an unknown conflict id and `Ok(true)` once the
    /// conflict is settled; a repeated call for an already-settled conflict
    /// is a no-op success with no second remote write. A failed resolution
    /// write leaves the conflict pending and propagates the error, so local
    /// data is never discarded before the remote mutation is confirmed.
    pub async fn resolve_conflict(&self, id: &ConflictId, resolution: Resolution) -> Result<bool> {
        let Some(conflict) = self.with_queue(|queue| queue.get_conflict(id)).await? else {
            return Ok(false);
        };
        if conflict.is_resolved() {
            return Ok(true);
        }

        match resolution {
            Resolution::Server => {}
            Resolution::Local => {
                let payload = WorkoutPayload::from_local(&conflict.local);
                self.store.update(conflict.remote.id, &payload).await?;
            }
            Resolution::Merged => {
                let payload = resolver::merged_payload(&conflict);
                self.store.update(conflict.remote.id, &payload).await?;
            }
        }

        self.with_queue(|queue| queue.mark_conflict_resolved(id, resolution))
            .await?;
        tracing::info!(conflict = %id, strategy = %resolution, "conflict resolved");
        Ok(true)
    }

    /// Reset a parked record's failure state so the next drain retries it
    pub async fn retry_workout(&self, id: &WorkoutId) -> Result<()> {
        self.with_queue(|queue| {
            let Some(mut workout) = queue.get(id)? else {
                return Err(Error::NotFound(id.to_string()));
            };
            let expected = workout.version;
            workout.sync_attempts = 0;
            workout.sync_error = None;
            queue.update(&workout, expected)
        })
        .await
    }

    /// Spawn a background task that drains the queue whenever connectivity
    /// returns
    ///
    /// Bursts of transitions collapse onto the single-flight drain lane; the
    /// watch channel only holds the latest state, so event delivery is never
    /// blocked by an in-flight drain.
    pub fn spawn_auto_sync(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut connectivity = engine.monitor.subscribe();
        tokio::spawn(async move {
            while connectivity.changed().await.is_ok() {
                if !*connectivity.borrow_and_update() {
                    continue;
                }
                tracing::debug!("connectivity restored, draining sync queue");
                match engine.sync_workouts().await {
                    Ok(count) if count > 0 => {
                        tracing::info!(count, "automatically synced queued workouts");
                    }
                    Ok(_) => {}
                    Err(error) => tracing::warn!(%error, "automatic sync failed"),
                }
            }
        })
    }

    async fn with_queue<T>(
        &self,
        op: impl FnOnce(&SqliteWorkoutQueue<'_>) -> Result<T>,
    ) -> Result<T> {
        let db = self.db.lock().await;
        op(&SqliteWorkoutQueue::new(db.connection()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseEntry, RemoteWorkout};
    use crate::remote::InMemoryRemoteStore;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const HOUR_MS: i64 = 60 * 60 * 1000;

    fn engine_with(online: bool, settings: SyncSettings) -> (SyncEngine, Arc<InMemoryRemoteStore>) {
        let store = Arc::new(InMemoryRemoteStore::new());
        let engine = SyncEngine::new(
            Database::open_in_memory().unwrap(),
            Arc::clone(&store) as Arc<dyn RemoteStore>,
            NetworkMonitor::new(online),
            settings,
            "u1",
        );
        (engine, store)
    }

    fn draft(title: &str, exercises: u32) -> WorkoutDraft {
        WorkoutDraft {
            title: title.to_string(),
            duration_min: Some(45),
            exercises: (0..exercises)
                .map(|i| ExerciseEntry {
                    name: format!("Exercise {i}"),
                    sets: 3,
                    reps: 10,
                    weight_kg: None,
                })
                .collect(),
        }
    }

    fn seeded_remote(id: i64, completed_at: i64, exercise_count: u32) -> RemoteWorkout {
        RemoteWorkout {
            id,
            user_id: "u1".to_string(),
            title: Some("Lower Body".to_string()),
            completed_at,
            exercise_count,
            duration_min: None,
            calories: None,
            exercises: (0..exercise_count)
                .map(|i| ExerciseEntry {
                    name: format!("Exercise {i}"),
                    sets: 3,
                    reps: 10,
                    weight_kg: None,
                })
                .collect(),
        }
    }

    async fn queued_id(engine: &SyncEngine, title: &str, exercises: u32) -> WorkoutId {
        match engine.log_workout(draft(title, exercises)).await.unwrap() {
            LogOutcome::Queued { local_id } => local_id,
            LogOutcome::Synced { .. } => panic!("expected the record to be queued"),
        }
    }

    #[tokio::test]
    async fn test_offline_logging_conserves_records() {
        let (engine, store) = engine_with(false, SyncSettings::default());

        for i in 0..3 {
            queued_id(&engine, &format!("Workout {i}"), 4).await;
        }

        assert_eq!(engine.pending_workouts().await.unwrap(), 3);
        assert_eq!(engine.offline_workouts().await.unwrap().len(), 3);
        assert_eq!(store.submit_calls(), 0);
        assert!(!engine.has_failed_syncs().await.unwrap());
    }

    #[tokio::test]
    async fn test_online_log_submits_immediately() {
        let (engine, store) = engine_with(true, SyncSettings::default());

        let outcome = engine.log_workout(draft("Leg Day", 5)).await.unwrap();
        assert!(matches!(outcome, LogOutcome::Synced { .. }));
        assert_eq!(engine.pending_workouts().await.unwrap(), 0);
        assert_eq!(store.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_immediate_submission_queues_with_zero_attempts() {
        let (engine, store) = engine_with(true, SyncSettings::default());
        store.fail_next(1);

        let id = queued_id(&engine, "Leg Day", 5).await;

        let offline = engine.offline_workouts().await.unwrap();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].id, id);
        assert_eq!(offline[0].sync_attempts, 0);
    }

    #[tokio::test]
    async fn test_drain_submits_queued_records_round_trip() {
        let (engine, store) = engine_with(false, SyncSettings::default());
        queued_id(&engine, "Leg Day", 5).await;
        assert_eq!(engine.pending_workouts().await.unwrap(), 1);

        engine.monitor().set_online(true);
        let synced = engine.sync_workouts().await.unwrap();

        assert_eq!(synced, 1);
        assert_eq!(engine.pending_workouts().await.unwrap(), 0);
        assert!(engine.offline_workouts().await.unwrap().is_empty());

        let remote = store.workouts();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].title.as_deref(), Some("Leg Day"));
        assert_eq!(remote[0].exercise_count, 5);
        assert_eq!(remote[0].exercises.len(), 5);
    }

    #[tokio::test]
    async fn test_sync_while_offline_is_a_noop() {
        let (engine, _store) = engine_with(false, SyncSettings::default());
        queued_id(&engine, "Leg Day", 5).await;

        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        assert_eq!(engine.pending_workouts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sync_skips_when_drain_in_flight() {
        let (engine, _store) = engine_with(false, SyncSettings::default());
        queued_id(&engine, "Leg Day", 5).await;
        engine.monitor().set_online(true);
        engine.draining.store(true, Ordering::SeqCst);

        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        assert!(engine.is_loading());

        engine.draining.store(false, Ordering::SeqCst);
        assert!(!engine.is_loading());
    }

    #[tokio::test]
    async fn test_candidate_fetch_failure_aborts_drain_untouched() {
        let (engine, store) = engine_with(false, SyncSettings::default());
        queued_id(&engine, "Leg Day", 5).await;

        engine.monitor().set_online(true);
        store.set_reachable(false);

        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        let offline = engine.offline_workouts().await.unwrap();
        assert_eq!(offline.len(), 1);
        assert_eq!(offline[0].sync_attempts, 0);
        assert!(!engine.is_loading());
    }

    #[tokio::test]
    async fn test_retry_cap_parks_record_until_manual_retry() {
        let settings = SyncSettings::default().with_max_sync_attempts(2);
        let (engine, store) = engine_with(false, settings);
        queued_id(&engine, "Leg Day", 5).await;

        engine.monitor().set_online(true);
        store.fail_next(2);

        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        assert!(engine.has_failed_syncs().await.unwrap());

        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        let parked = &engine.offline_workouts().await.unwrap()[0];
        assert_eq!(parked.sync_attempts, 2);
        assert!(parked.sync_error.is_some());

        // At the cap: the next drain must not attempt another submission
        let attempts_before = store.submit_calls();
        assert_eq!(engine.sync_workouts().await.unwrap(), 0);
        assert_eq!(store.submit_calls(), attempts_before);
        assert_eq!(engine.offline_workouts().await.unwrap().len(), 1);

        // An explicit retry resets the budget and the record syncs
        engine.retry_workout(&parked.id).await.unwrap();
        assert_eq!(engine.sync_workouts().await.unwrap(), 1);
        assert_eq!(engine.pending_workouts().await.unwrap(), 0);
        assert!(!engine.has_failed_syncs().await.unwrap());
    }

    #[tokio::test]
    async fn test_conflict_detected_and_resolved_with_server() {
        let (engine, store) = engine_with(false, SyncSettings::default());
        let local_id = queued_id(&engine, "Leg Day", 5).await;

        let logged_at = engine.offline_workouts().await.unwrap()[0].logged_at;
        store.seed(seeded_remote(42, logged_at + HOUR_MS, 5));

        engine.monitor().set_online(true);
        assert_eq!(engine.sync_workouts().await.unwrap(), 0);

        let conflicts = engine.conflicts().await.unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].local.title, "Leg Day");
        assert_eq!(conflicts[0].local.id, local_id);
        assert_eq!(conflicts[0].remote.id, 42);
        // Promoted out of the plain queue, still visible as an offline record
        assert_eq!(engine.pending_workouts().await.unwrap(), 0);
        assert_eq!(engine.offline_workouts().await.unwrap().len(), 1);

        let conflict_id = conflicts[0].id;
        assert!(engine
            .resolve_conflict(&conflict_id, Resolution::Server)
            .await
            .unwrap());
        assert!(engine.conflicts().await.unwrap().is_empty());
        assert!(engine.offline_workouts().await.unwrap().is_empty());

        // Idempotent: settling again succeeds without another remote write
        assert!(engine
            .resolve_conflict(&conflict_id, Resolution::Server)
            .await
            .unwrap());
        assert_eq!(store.update_calls(), 0);
        // Only one remote record remains: the seeded one
        assert_eq!(store.workouts().len(), 1);
    }

    #[tokio::test]
    async fn test_merged_resolution_unions_exercises() {
        let (engine, store) = engine_with(false, SyncSettings::default());

        let mut exercises = draft("Leg Day", 4).exercises;
        exercises.push(ExerciseEntry {
            name: "Calf Raise".to_string(),
            sets: 4,
            reps: 12,
            weight_kg: None,
        });
        engine
            .log_workout(WorkoutDraft {
                title: "Leg Day".to_string(),
                duration_min: Some(45),
                exercises,
            })
            .await
            .unwrap();

        let logged_at = engine.offline_workouts().await.unwrap()[0].logged_at;
        store.seed(seeded_remote(42, logged_at + HOUR_MS, 4));

        engine.monitor().set_online(true);
        engine.sync_workouts().await.unwrap();
        let conflict_id = engine.conflicts().await.unwrap()[0].id;

        assert!(engine
            .resolve_conflict(&conflict_id, Resolution::Merged)
            .await
            .unwrap());
        assert_eq!(store.update_calls(), 1);

        let remote = &store.workouts()[0];
        assert_eq!(remote.id, 42);
        assert_eq!(remote.completed_at, logged_at + HOUR_MS);
        assert_eq!(remote.exercise_count, 5);
        assert!(remote
            .exercises
            .iter()
            .any(|entry| entry.name == "Calf Raise"));
    }

    #[tokio::test]
    async fn test_failed_resolution_write_keeps_conflict() {
        let (engine, store) = engine_with(false, SyncSettings::default());
        queued_id(&engine, "Leg Day", 5).await;

        let logged_at = engine.offline_workouts().await.unwrap()[0].logged_at;
        store.seed(seeded_remote(42, logged_at + HOUR_MS, 5));

        engine.monitor().set_online(true);
        engine.sync_workouts().await.unwrap();
        let conflict_id = engine.conflicts().await.unwrap()[0].id;

        store.fail_next(1);
        let result = engine.resolve_conflict(&conflict_id, Resolution::Local).await;
        assert!(result.is_err());
        assert_eq!(engine.conflicts().await.unwrap().len(), 1);

        // Retrying after the store recovers settles the conflict
        assert!(engine
            .resolve_conflict(&conflict_id, Resolution::Local)
            .await
            .unwrap());
        assert!(engine.conflicts().await.unwrap().is_empty());
        assert_eq!(store.update_calls(), 2);
    }

    #[tokio::test]
    async fn test_resolve_unknown_conflict_returns_false() {
        let (engine, _store) = engine_with(true, SyncSettings::default());
        let resolved = engine
            .resolve_conflict(&ConflictId::new(), Resolution::Server)
            .await
            .unwrap();
        assert!(!resolved);
    }

    #[tokio::test]
    async fn test_reconnect_triggers_automatic_drain() {
        let (engine, store) = engine_with(false, SyncSettings::default());
        let engine = Arc::new(engine);
        let _task = engine.spawn_auto_sync();

        queued_id(&engine, "Leg Day", 5).await;
        assert_eq!(engine.pending_workouts().await.unwrap(), 1);

        engine.monitor().set_online(true);
        for _ in 0..100 {
            if engine.pending_workouts().await.unwrap() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(engine.pending_workouts().await.unwrap(), 0);
        assert_eq!(store.workouts().len(), 1);
    }
}
