//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::planner::SaveMode;

/// Study Planner - embeddable study task widget
#[derive(Parser)]
#[command(
    name = "sp",
    about = "Study planner widget that syncs its task list with a host application",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the widget (default)
    Run {
        /// Host socket to embed into; standalone when neither this nor config sets one
        #[arg(long, value_name = "PATH")]
        host_socket: Option<PathBuf>,

        /// Save after every change (auto) or on demand (manual)
        #[arg(long, value_name = "MODE")]
        save_mode: Option<SaveMode>,
    },

    /// Run a development host the widget can embed into
    Host {
        /// Socket to listen on
        #[arg(short, long, value_name = "PATH")]
        socket: Option<PathBuf>,

        /// Email sent to the widget
        #[arg(short, long, default_value = "student@example.com")]
        email: String,

        /// File the saved items are loaded from and written to
        #[arg(short, long, value_name = "FILE")]
        data: Option<PathBuf>,

        /// Answer every save with a failure
        #[arg(long)]
        reject_saves: bool,
    },

    /// Print the effective configuration as YAML
    Config,
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyplanner")
        .join("logs")
        .join("studyplanner.log")
}
