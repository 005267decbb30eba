use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "turnforge")]
#[command(about = "Turn-resolution engine for AI-mediated freeform tabletop play", long_about = None)]
#[command(version)]
pub struct Cli {
    /// SQLite store path
    #[arg(long, default_value = "turnforge.db", global = true)]
    pub db: PathBuf,

    /// Campaign id
    #[arg(long, default_value = "default", global = true)]
    pub campaign: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or upgrade the store schema
    InitDb,

    /// Execute one player turn
    RunTurn {
        /// Player input text
        #[arg(long)]
        input: String,

        /// Prompt version pins as JSON, e.g. '{"interpreter":"v1"}'
        #[arg(long)]
        prompt_versions: Option<String>,

        /// Print the full turn result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a persisted event record
    ShowEvent {
        /// Turn number
        #[arg(long)]
        turn: i64,

        /// Print a single field (e.g. state_diff_json) instead of the record
        #[arg(long)]
        field: Option<String>,
    },

    /// Re-run turns read-only in a snapshot sandbox
    Replay {
        /// First turn to replay
        #[arg(long)]
        start: i64,

        /// Last turn to replay
        #[arg(long)]
        end: i64,

        /// Prompt overrides as JSON, e.g. '{"narrator":"v2"}'
        #[arg(long)]
        prompt_overrides: Option<String>,
    },
}
