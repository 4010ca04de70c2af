use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use repset_core::models::Resolution;

#[derive(Parser)]
#[command(name = "repset")]
#[command(about = "Log workouts from the command line, online or off")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Workout API base URL (falls back to REPSET_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the workout API (falls back to REPSET_API_TOKEN)
    #[arg(long, global = true, value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// User the workouts belong to (falls back to REPSET_USER)
    #[arg(long, global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Quick log: repset "Leg Day"
    #[arg(trailing_var_arg = true)]
    pub title: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log a completed workout
    #[command(alias = "add")]
    Log {
        /// Workout title
        title: Vec<String>,
        /// Total duration in minutes
        #[arg(short, long, value_name = "MIN")]
        duration: Option<u32>,
        /// Exercise completion, e.g. "Back Squat:5x5@100" (repeatable)
        #[arg(short, long = "exercise", value_name = "SPEC")]
        exercises: Vec<String>,
    },
    /// List workouts waiting to sync
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Push queued workouts to the remote store
    Sync,
    /// List conflicts awaiting resolution
    Conflicts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a conflict
    Resolve {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Which side wins
        #[arg(value_enum)]
        strategy: ResolutionArg,
    },
    /// Re-arm a workout parked after repeated sync failures
    Retry {
        /// Workout ID or unique ID prefix
        id: String,
    },
    /// Show sync status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ResolutionArg {
    Local,
    Server,
    Merged,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Local => Self::Local,
            ResolutionArg::Server => Self::Server,
            ResolutionArg::Merged => Self::Merged,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
