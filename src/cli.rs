//! CLI argument parsing for Task Genius.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tg",
    about = "Generate, track and reorder learning tasks",
    version,
    after_help = "Logs are written to: ~/.local/share/taskgenius/logs/taskgenius.log"
)]
pub struct Cli {
    /// SQLite database to use directly (default: ~/.local/share/taskgenius/tasks.db)
    #[arg(short = 'd', long, global = true)]
    pub db: Option<PathBuf>,

    /// Talk to a running task service instead of the local database
    #[arg(short, long, global = true)]
    pub server: Option<String>,

    /// Owner identifier to act as
    #[arg(short, long, global = true, default_value = taskgenius::config::DEFAULT_OWNER)]
    pub owner: String,

    /// Apply the returned record after toggles and deletes instead of re-fetching the list
    #[arg(long, global = true)]
    pub no_reload: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP task service
    Serve {
        /// Bind host (overrides TASKGENIUS_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides TASKGENIUS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List tasks in display order
    List,

    /// Add a task
    Add {
        /// Task content
        content: String,
    },

    /// Toggle a task's completion
    Toggle {
        /// Task ID
        id: String,
    },

    /// Delete a task
    Rm {
        /// Task ID
        id: String,
    },

    /// Move a task to a new position (0 = top)
    Mv {
        /// Task ID
        id: String,

        /// Target position in the final list
        position: usize,
    },

    /// Generate learning tasks for a topic
    Generate {
        /// Topic to learn about
        topic: String,

        /// Save the generated tasks
        #[arg(long)]
        save: bool,
    },

    /// Show completion progress
    Progress,
}
