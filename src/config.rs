//! Startup configuration.
//!
//! Read once at startup and threaded into the server as an immutable value;
//! no component performs ambient config lookups after that.

use clap::Parser;
use std::path::PathBuf;

/// DevLink Core: WebSocket command server rooted at a single project
/// directory. All relative paths in client commands resolve against `root`.
#[derive(Parser, Debug, Clone)]
#[command(name = "devlink-core", version)]
pub struct Config {
    /// Project root directory all client paths are resolved against
    #[arg(long, env = "DEVLINK_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Port for the WebSocket listener
    #[arg(long, env = "DEVLINK_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Shell command executed by the run-tests command, in the project root
    #[arg(long, env = "DEVLINK_TASK", default_value = "make test")]
    pub task_command: String,
}
