//! Durable queue for pending workouts and detected conflicts

use crate::error::{Error, Result};
use crate::models::{ConflictId, LocalWorkout, Resolution, SyncConflict, WorkoutId};
use rusqlite::{params, Connection, OptionalExtension};

/// Trait for durable sync-queue storage operations
///
/// Persisted state is the sole source of truth for pending and conflict
/// counts; callers never cache a separate copy. Each operation is atomic per
/// record, so a failed write cannot corrupt previously persisted rows.
pub trait WorkoutQueue {
    /// Add a record to the pending queue
    fn enqueue(&self, workout: &LocalWorkout) -> Result<()>;

    /// Get a queued record by ID
    fn get(&self, id: &WorkoutId) -> Result<Option<LocalWorkout>>;

    /// List queued records in enqueue (FIFO) order
    fn list(&self) -> Result<Vec<LocalWorkout>>;

    /// Persist a record mutation via compare-and-swap
    ///
    /// Fails with [`Error::VersionConflict`] when the stored version no
    /// longer equals `expected_version`; the stored version is bumped on
    /// success.
    fn update(&self, workout: &LocalWorkout, expected_version: i64) -> Result<()>;

    /// Remove a record from the pending queue
    fn remove(&self, id: &WorkoutId) -> Result<()>;

    /// Number of queued, unsynced records
    fn pending_count(&self) -> Result<usize>;

    /// Whether any unsynced record has accumulated failed attempts
    fn has_failed(&self) -> Result<bool>;

    /// Record a detected conflict
    fn enqueue_conflict(&self, conflict: &SyncConflict) -> Result<()>;

    /// Get a conflict by ID, resolved or not
    fn get_conflict(&self, id: &ConflictId) -> Result<Option<SyncConflict>>;

    /// List unresolved conflicts in detection order
    fn list_conflicts(&self) -> Result<Vec<SyncConflict>>;

    /// Settle a conflict, keeping the row as an audit trail
    fn mark_conflict_resolved(&self, id: &ConflictId, resolution: Resolution) -> Result<()>;

    /// Delete a conflict row entirely
    fn remove_conflict(&self, id: &ConflictId) -> Result<()>;

    /// Atomically record a conflict and drop its record from the pending queue
    ///
    /// A crash between the two writes must not leave the record in both
    /// collections, so they happen in one transaction.
    fn promote_to_conflict(&self, conflict: &SyncConflict) -> Result<()>;
}

/// `SQLite` implementation of `WorkoutQueue`
pub struct SqliteWorkoutQueue<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteWorkoutQueue<'a> {
    /// Create a new queue with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a pending workout from a database row
    fn parse_workout(row: &rusqlite::Row<'_>) -> rusqlite::Result<LocalWorkout> {
        let id: String = row.get(0)?;
        let exercises: String = row.get(4)?;
        Ok(LocalWorkout {
            id: id.parse().unwrap_or_default(),
            title: row.get(1)?,
            logged_at: row.get(2)?,
            duration_min: row.get(3)?,
            exercises: serde_json::from_str(&exercises).map_err(|e| json_column_error(4, e))?,
            synced: row.get::<_, i32>(5)? != 0,
            sync_attempts: row.get(6)?,
            sync_error: row.get(7)?,
            version: row.get(8)?,
        })
    }

    /// Parse a conflict from a database row
    fn parse_conflict(row: &rusqlite::Row<'_>) -> rusqlite::Result<SyncConflict> {
        let id: String = row.get(0)?;
        let local: String = row.get(1)?;
        let remote: String = row.get(2)?;
        let resolution: Option<String> = row.get(3)?;
        Ok(SyncConflict {
            id: id.parse().unwrap_or_default(),
            local: serde_json::from_str(&local).map_err(|e| json_column_error(1, e))?,
            remote: serde_json::from_str(&remote).map_err(|e| json_column_error(2, e))?,
            resolution: resolution.and_then(|value| value.parse().ok()),
            detected_at: row.get(4)?,
            resolved_at: row.get(5)?,
        })
    }
}

fn json_column_error(index: usize, error: serde_json::Error) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
}

impl WorkoutQueue for SqliteWorkoutQueue<'_> {
    fn enqueue(&self, workout: &LocalWorkout) -> Result<()> {
        let exercises = serde_json::to_string(&workout.exercises)?;
        self.conn.execute(
            "INSERT INTO pending_workouts
             (id, title, logged_at, duration_min, exercises, synced, sync_attempts, sync_error, version, queued_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                workout.id.as_str(),
                workout.title,
                workout.logged_at,
                workout.duration_min,
                exercises,
                i32::from(workout.synced),
                workout.sync_attempts,
                workout.sync_error,
                workout.version,
                chrono::Utc::now().timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    fn get(&self, id: &WorkoutId) -> Result<Option<LocalWorkout>> {
        let workout = self
            .conn
            .query_row(
                "SELECT id, title, logged_at, duration_min, exercises, synced, sync_attempts, sync_error, version
                 FROM pending_workouts WHERE id = ?",
                params![id.as_str()],
                Self::parse_workout,
            )
            .optional()?;
        Ok(workout)
    }

    fn list(&self) -> Result<Vec<LocalWorkout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, logged_at, duration_min, exercises, synced, sync_attempts, sync_error, version
             FROM pending_workouts
             ORDER BY rowid",
        )?;

        let workouts = stmt
            .query_map([], Self::parse_workout)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(workouts)
    }

    fn update(&self, workout: &LocalWorkout, expected_version: i64) -> Result<()> {
        let exercises = serde_json::to_string(&workout.exercises)?;
        let rows = self.conn.execute(
            "UPDATE pending_workouts
             SET title = ?, logged_at = ?, duration_min = ?, exercises = ?,
                 synced = ?, sync_attempts = ?, sync_error = ?, version = version + 1
             WHERE id = ? AND version = ?",
            params![
                workout.title,
                workout.logged_at,
                workout.duration_min,
                exercises,
                i32::from(workout.synced),
                workout.sync_attempts,
                workout.sync_error,
                workout.id.as_str(),
                expected_version,
            ],
        )?;

        if rows == 0 {
            return if self.get(&workout.id)?.is_some() {
                Err(Error::VersionConflict(workout.id.to_string()))
            } else {
                Err(Error::NotFound(workout.id.to_string()))
            };
        }

        Ok(())
    }

    fn remove(&self, id: &WorkoutId) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM pending_workouts WHERE id = ?",
            params![id.as_str()],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn pending_count(&self) -> Result<usize> {
        let count: usize = self.conn.query_row(
            "SELECT COUNT(*) FROM pending_workouts WHERE synced = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn has_failed(&self) -> Result<bool> {
        let failed: i32 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM pending_workouts WHERE synced = 0 AND sync_attempts > 0)",
            [],
            |row| row.get(0),
        )?;
        Ok(failed != 0)
    }

    fn enqueue_conflict(&self, conflict: &SyncConflict) -> Result<()> {
        let local = serde_json::to_string(&conflict.local)?;
        let remote = serde_json::to_string(&conflict.remote)?;
        self.conn.execute(
            "INSERT INTO sync_conflicts (id, local_workout, remote_workout, resolution, detected_at, resolved_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            params![
                conflict.id.as_str(),
                local,
                remote,
                conflict.resolution.map(Resolution::as_str),
                conflict.detected_at,
                conflict.resolved_at,
            ],
        )?;
        Ok(())
    }

    fn get_conflict(&self, id: &ConflictId) -> Result<Option<SyncConflict>> {
        let conflict = self
            .conn
            .query_row(
                "SELECT id, local_workout, remote_workout, resolution, detected_at, resolved_at
                 FROM sync_conflicts WHERE id = ?",
                params![id.as_str()],
                Self::parse_conflict,
            )
            .optional()?;
        Ok(conflict)
    }

    fn list_conflicts(&self) -> Result<Vec<SyncConflict>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, local_workout, remote_workout, resolution, detected_at, resolved_at
             FROM sync_conflicts
             WHERE resolution IS NULL
             ORDER BY detected_at, rowid",
        )?;

        let conflicts = stmt
            .query_map([], Self::parse_conflict)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(conflicts)
    }

    fn mark_conflict_resolved(&self, id: &ConflictId, resolution: Resolution) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE sync_conflicts SET resolution = ?, resolved_at = ? WHERE id = ?",
            params![
                resolution.as_str(),
                chrono::Utc::now().timestamp_millis(),
                id.as_str(),
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn remove_conflict(&self, id: &ConflictId) -> Result<()> {
        let rows = self.conn.execute(
            "DELETE FROM sync_conflicts WHERE id = ?",
            params![id.as_str()],
        )?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    fn promote_to_conflict(&self, conflict: &SyncConflict) -> Result<()> {
        let local = serde_json::to_string(&conflict.local)?;
        let remote = serde_json::to_string(&conflict.remote)?;

        self.conn.execute("BEGIN IMMEDIATE", [])?;

        let result = self
            .conn
            .execute(
                "INSERT INTO sync_conflicts (id, local_workout, remote_workout, resolution, detected_at, resolved_at)
                 VALUES (?, ?, ?, NULL, ?, NULL)",
                params![conflict.id.as_str(), local, remote, conflict.detected_at],
            )
            .and_then(|_| {
                self.conn.execute(
                    "DELETE FROM pending_workouts WHERE id = ?",
                    params![conflict.local.id.as_str()],
                )
            });

        match result {
            Ok(_) => {
                self.conn.execute("COMMIT", [])?;
                Ok(())
            }
            Err(error) => {
                self.conn.execute("ROLLBACK", []).ok();
                Err(error.into())
            }
        }
    }
}
