//! Tunable settings for the sync engine
//!
//! The conflict heuristic is intentionally approximate, so its tolerances
//! live here as configuration rather than as hardcoded invariants.

use std::time::Duration;

/// Configuration knobs for conflict detection and retry behavior
#[derive(Debug, Clone)]
pub struct SyncSettings {
    /// A remote record completed within this window of a local record's
    /// timestamp may describe the same session (inclusive comparison)
    pub match_window: Duration,
    /// Allowed difference between local and remote exercise counts for a match
    pub count_tolerance: u32,
    /// Automatic submission attempts before a record is parked as failed
    /// and requires an explicit user-triggered retry
    pub max_sync_attempts: u32,
    /// Bound on a single remote submission attempt
    pub request_timeout: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            match_window: Duration::from_secs(6 * 60 * 60),
            count_tolerance: 2,
            max_sync_attempts: 3,
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl SyncSettings {
    /// Set the conflict-matching time window
    #[must_use]
    pub const fn with_match_window(mut self, window: Duration) -> Self {
        self.match_window = window;
        self
    }

    /// Set the allowed exercise-count difference for a match
    #[must_use]
    pub const fn with_count_tolerance(mut self, tolerance: u32) -> Self {
        self.count_tolerance = tolerance;
        self
    }

    /// Set the automatic retry cap
    #[must_use]
    pub const fn with_max_sync_attempts(mut self, attempts: u32) -> Self {
        self.max_sync_attempts = attempts;
        self
    }

    /// Set the per-request network timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The match window in milliseconds, as stored timestamps are Unix ms
    pub fn match_window_ms(&self) -> i64 {
        i64::try_from(self.match_window.as_millis()).unwrap_or(i64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let settings = SyncSettings::default();
        assert_eq!(settings.match_window, Duration::from_secs(21_600));
        assert_eq!(settings.count_tolerance, 2);
        assert_eq!(settings.max_sync_attempts, 3);
    }

    #[test]
    fn builder_overrides_apply() {
        let settings = SyncSettings::default()
            .with_match_window(Duration::from_secs(60))
            .with_count_tolerance(0)
            .with_max_sync_attempts(1);
        assert_eq!(settings.match_window_ms(), 60_000);
        assert_eq!(settings.count_tolerance, 0);
        assert_eq!(settings.max_sync_attempts, 1);
    }
}
