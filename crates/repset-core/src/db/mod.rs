//! Database layer for Repset

mod connection;
mod migrations;
mod queue;

pub use connection::Database;
pub use queue::{SqliteWorkoutQueue, WorkoutQueue};
