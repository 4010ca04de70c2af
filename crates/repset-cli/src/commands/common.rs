use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use repset_core::db::Database;
use repset_core::models::{ExerciseEntry, LocalWorkout, RemoteWorkout, SyncConflict};
use repset_core::remote::{
    HttpRemoteStore, RemoteError, RemoteResult, RemoteStore, WorkoutPayload,
};
use repset_core::{NetworkMonitor, SyncEngine, SyncSettings};
use serde::Serialize;

use crate::cli::Cli;
use crate::error::CliError;

/// An opened engine plus whether a remote API was configured for this run
pub struct EngineHandle {
    pub engine: SyncEngine,
    pub configured: bool,
}

/// Open the engine for one CLI invocation
///
/// When an API base URL is configured the remote store is probed once and
/// the connectivity monitor primed with the result; otherwise the engine
/// starts offline and every command degrades to queue-only behavior.
pub async fn open_engine(cli: &Cli) -> Result<EngineHandle, CliError> {
    let settings = SyncSettings::default();
    let db = Database::open(resolve_db_path(cli.db_path.clone()))?;

    let api_url = resolve_api_url(cli.api_url.clone());
    let configured = api_url.is_some();
    let store: Arc<dyn RemoteStore> = match api_url {
        Some(url) => {
            let mut store = HttpRemoteStore::new(url, settings.request_timeout)?;
            if let Some(token) = resolve_api_token(cli.api_token.clone()) {
                store = store.with_auth_token(token);
            }
            Arc::new(store)
        }
        None => Arc::new(UnconfiguredRemoteStore),
    };

    let monitor = NetworkMonitor::new(false);
    if configured {
        monitor.set_online(store.ping().await);
    }

    let engine = SyncEngine::new(db, store, monitor, settings, resolve_user(cli.user.clone()));
    Ok(EngineHandle { engine, configured })
}

pub fn resolve_db_path(flag: Option<PathBuf>) -> PathBuf {
    flag.unwrap_or_else(default_db_path)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("repset")
        .join("repset.db")
}

pub fn resolve_api_url(flag: Option<String>) -> Option<String> {
    flag.or_else(|| env::var("REPSET_API_URL").ok())
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

pub fn resolve_api_token(flag: Option<String>) -> Option<String> {
    flag.or_else(|| env::var("REPSET_API_TOKEN").ok())
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

pub fn resolve_user(flag: Option<String>) -> String {
    flag.or_else(|| env::var("REPSET_USER").ok())
        .map(|user| user.trim().to_string())
        .filter(|user| !user.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

/// Join quick-log words into a workout title
pub fn resolve_title(parts: &[String]) -> Result<String, CliError> {
    let title = parts.join(" ").trim().to_string();
    if title.is_empty() {
        return Err(CliError::EmptyTitle);
    }
    Ok(title)
}

/// Parse "NAME:SETSxREPS[@WEIGHT]" into an exercise entry
///
/// Examples: "Back Squat:5x5@100", "Pull-up:3x8"
pub fn parse_exercise_spec(spec: &str) -> Result<ExerciseEntry, CliError> {
    let invalid = || CliError::InvalidExerciseSpec(spec.to_string());

    let (name, volume) = spec.rsplit_once(':').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid());
    }

    let (volume, weight_kg) = match volume.split_once('@') {
        Some((volume, weight)) => {
            let weight = weight.trim().parse::<f64>().map_err(|_| invalid())?;
            (volume, Some(weight))
        }
        None => (volume, None),
    };

    let (sets, reps) = volume.split_once(['x', 'X']).ok_or_else(invalid)?;
    Ok(ExerciseEntry {
        name: name.to_string(),
        sets: sets.trim().parse().map_err(|_| invalid())?,
        reps: reps.trim().parse().map_err(|_| invalid())?,
        weight_kg,
    })
}

/// Match a unique item by ID prefix
///
/// Returns `None` when nothing matches and an error naming the candidates
/// when the prefix is ambiguous.
pub fn resolve_id_prefix<'a, T>(
    items: &'a [T],
    id_of: impl Fn(&T) -> String,
    query: &str,
) -> Result<Option<&'a T>, CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(None);
    }

    let matching: Vec<&T> = items
        .iter()
        .filter(|item| id_of(item).starts_with(query))
        .collect();

    match matching.len() {
        0 => Ok(None),
        1 => Ok(Some(matching[0])),
        _ => {
            let options = matching
                .iter()
                .map(|item| short_id(&id_of(item)))
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// First 8 characters of an ID, enough to be unique in practice
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn format_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::<chrono::Utc>::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |instant| instant.format("%Y-%m-%d %H:%M").to_string(),
    )
}

#[derive(Debug, Serialize)]
pub struct WorkoutListItem {
    pub id: String,
    pub title: String,
    pub logged_at: i64,
    pub exercise_count: u32,
    pub sync_attempts: u32,
    pub sync_error: Option<String>,
    pub relative_time: String,
}

pub fn workout_to_item(workout: &LocalWorkout, now_ms: i64) -> WorkoutListItem {
    WorkoutListItem {
        id: workout.id.as_str(),
        title: workout.title.clone(),
        logged_at: workout.logged_at,
        exercise_count: workout.exercise_count(),
        sync_attempts: workout.sync_attempts,
        sync_error: workout.sync_error.clone(),
        relative_time: format_relative_time(workout.logged_at, now_ms),
    }
}

pub fn format_workout_lines(workouts: &[LocalWorkout], now_ms: i64) -> Vec<String> {
    workouts
        .iter()
        .map(|workout| {
            let mut line = format!(
                "{}  {}  {} exercise(s)  {}",
                short_id(&workout.id.as_str()),
                workout.title,
                workout.exercise_count(),
                format_relative_time(workout.logged_at, now_ms),
            );
            if workout.sync_attempts > 0 {
                let error = workout.sync_error.as_deref().unwrap_or("unknown error");
                line.push_str(&format!(
                    "  [{} failed attempt(s): {error}]",
                    workout.sync_attempts
                ));
            }
            line
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ConflictListItem {
    pub id: String,
    pub local_title: String,
    pub local_logged_at: i64,
    pub local_exercises: u32,
    pub remote_id: i64,
    pub remote_title: Option<String>,
    pub remote_completed_at: i64,
    pub remote_exercises: u32,
    pub detected_at: i64,
}

pub fn conflict_to_item(conflict: &SyncConflict) -> ConflictListItem {
    ConflictListItem {
        id: conflict.id.as_str(),
        local_title: conflict.local.title.clone(),
        local_logged_at: conflict.local.logged_at,
        local_exercises: conflict.local.exercise_count(),
        remote_id: conflict.remote.id,
        remote_title: conflict.remote.title.clone(),
        remote_completed_at: conflict.remote.completed_at,
        remote_exercises: conflict.remote.exercise_count,
        detected_at: conflict.detected_at,
    }
}

pub fn format_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    conflicts
        .iter()
        .map(|conflict| {
            format!(
                "{}  local '{}' ({} exercise(s), {}) vs remote #{} ({} exercise(s), {})",
                short_id(&conflict.id.as_str()),
                conflict.local.title,
                conflict.local.exercise_count(),
                format_timestamp(conflict.local.logged_at),
                conflict.remote.id,
                conflict.remote.exercise_count,
                format_timestamp(conflict.remote.completed_at),
            )
        })
        .collect()
}

/// Stand-in store used when no API base URL is configured
///
/// Every call reports the store unreachable, so the engine stays in
/// queue-only mode and commands that genuinely need the network fail
/// with a clear message instead.
struct UnconfiguredRemoteStore;

#[async_trait]
impl RemoteStore for UnconfiguredRemoteStore {
    async fn submit(&self, _user_id: &str, _payload: &WorkoutPayload) -> RemoteResult<i64> {
        Err(RemoteError::Offline)
    }

    async fn recent_workouts(&self, _user_id: &str) -> RemoteResult<Vec<RemoteWorkout>> {
        Err(RemoteError::Offline)
    }

    async fn update(&self, _workout_id: i64, _payload: &WorkoutPayload) -> RemoteResult<()> {
        Err(RemoteError::Offline)
    }

    async fn ping(&self) -> bool {
        false
    }
}
