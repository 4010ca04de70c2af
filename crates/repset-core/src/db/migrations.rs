//! Database migrations

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations
pub fn run(conn: &Connection) -> Result<()> {
    let version = get_version(conn)?;

    if version < 1 {
        migrate_v1(conn)?;
    }
    if version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Get the current schema version
fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get::<_, i32>(0).map(|flag| flag != 0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version)
}

/// Migration to version 1: pending workout queue
fn migrate_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY
         );
         CREATE TABLE IF NOT EXISTS pending_workouts (
             id TEXT PRIMARY KEY,
             title TEXT NOT NULL,
             logged_at INTEGER NOT NULL,
             duration_min INTEGER,
             exercises TEXT NOT NULL,
             synced INTEGER NOT NULL DEFAULT 0,
             sync_attempts INTEGER NOT NULL DEFAULT 0,
             sync_error TEXT,
             version INTEGER NOT NULL DEFAULT 0,
             queued_at INTEGER NOT NULL
         );
         CREATE INDEX IF NOT EXISTS idx_pending_workouts_queued
             ON pending_workouts(queued_at);
         CREATE INDEX IF NOT EXISTS idx_pending_workouts_attempts
             ON pending_workouts(sync_attempts);
         INSERT INTO schema_version (version) VALUES (1);
         COMMIT;",
    )?;

    tracing::info!("Migrated database to version 1");
    Ok(())
}

/// Migration to version 2: detected conflicts, kept after resolution as an audit trail
fn migrate_v2(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
         CREATE TABLE IF NOT EXISTS sync_conflicts (
             id TEXT PRIMARY KEY,
             local_workout TEXT NOT NULL,
             remote_workout TEXT NOT NULL,
             resolution TEXT,
             detected_at INTEGER NOT NULL,
             resolved_at INTEGER
         );
         CREATE INDEX IF NOT EXISTS idx_sync_conflicts_detected
             ON sync_conflicts(detected_at);
         CREATE INDEX IF NOT EXISTS idx_sync_conflicts_resolution
             ON sync_conflicts(resolution);
         INSERT INTO schema_version (version) VALUES (2);
         COMMIT;",
    )?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}
