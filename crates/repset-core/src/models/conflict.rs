//! Sync conflict model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{LocalWorkout, RemoteWorkout};

/// A unique identifier for a detected conflict (not the workout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a new unique conflict ID using UUID v7
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

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConflictId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Strategy chosen by the user to settle a conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Keep the local record's data, overwriting the matched remote entry
    Local,
    /// Keep the remote entry, discarding the local record
    Server,
    /// Combine both: remote identity and timestamp, union of exercises
    Merged,
}

impl Resolution {
    /// Stable lowercase name, matching the persisted form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Server => "server",
            Self::Merged => "merged",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "server" => Ok(Self::Server),
            "merged" => Ok(Self::Merged),
            other => Err(format!("unknown resolution strategy: {other}")),
        }
    }
}

/// A queued local workout paired with the remote record it appears to duplicate
///
/// Created only by the conflict detector, settled only by the conflict
/// resolver. Settled conflicts keep their row as an audit trail; the pending
/// set is the subset with no resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConflict {
    /// Conflict identifier
    pub id: ConflictId,
    /// The queued local record
    pub local: LocalWorkout,
    /// The matching remote record
    pub remote: RemoteWorkout,
    /// Strategy applied, absent until the user settles the conflict
    pub resolution: Option<Resolution>,
    /// Detection timestamp (Unix ms)
    pub detected_at: i64,
    /// Resolution timestamp (Unix ms)
    pub resolved_at: Option<i64>,
}

impl SyncConflict {
    /// Pair a local record with its remote duplicate
    #[must_use]
    pub fn new(local: LocalWorkout, remote: RemoteWorkout) -> Self {
        Self {
            id: ConflictId::new(),
            local,
            remote,
            resolution: None,
            detected_at: chrono::Utc::now().timestamp_millis(),
            resolved_at: None,
        }
    }

    /// Whether this conflict has been settled
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.resolution.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_round_trips_through_str() {
        for resolution in [Resolution::Local, Resolution::Server, Resolution::Merged] {
            let parsed: Resolution = resolution.as_str().parse().unwrap();
            assert_eq!(parsed, resolution);
        }
        assert!("lww".parse::<Resolution>().is_err());
    }

    #[test]
    fn test_resolution_serde_uses_lowercase() {
        let json = serde_json::to_string(&Resolution::Merged).unwrap();
        assert_eq!(json, "\"merged\"");
    }
}
