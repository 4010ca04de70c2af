//! repset-core - Core library for Repset
//!
//! Offline-first workout logging: the durable pending queue, connectivity
//! tracking, duplicate detection, and the sync engine shared by all Repset
//! interfaces.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod net;
pub mod remote;
pub mod sync;

pub use config::SyncSettings;
pub use error::{Error, Result};
pub use models::{LocalWorkout, SyncConflict, WorkoutDraft, WorkoutId};
pub use net::NetworkMonitor;
pub use sync::{LogOutcome, SyncEngine};
