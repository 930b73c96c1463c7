//! Shared server context and error types.
//!
//! The context is built once at startup from [`Config`](crate::Config) and
//! threaded into every handler; errors carry a stable wire code used for
//! logging while the Display string becomes the response `message`.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::Config;
use crate::server::file_store::FileStore;
use crate::server::protocol::COMMANDS;

/// Per-server immutable context shared by all connections and handlers.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub store: FileStore,
    /// Shell command run by the run-tests command.
    pub task_command: String,
}

impl ServerContext {
    pub fn new(config: &Config) -> Self {
        ServerContext {
            store: FileStore::new(config.root.clone()),
            task_command: config.task_command.clone(),
        }
    }

    /// Project root all relative paths resolve against.
    pub fn root(&self) -> &PathBuf {
        self.store.root()
    }
}

/// Unified command error, converted into a top-level error response by the
/// dispatch layer or captured per item inside batch results.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Missing or malformed required field, reported before any I/O.
    #[error("{0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Unsupported patch input, invalid JSON, or a failed patch precondition.
    #[error("Patch error: {0}")]
    Patch(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Unrecognized command '{0}'. Valid commands: {}", COMMANDS.join(", "))]
    UnknownCommand(String),
}

impl CommandError {
    /// Stable error code, used for structured logging.
    pub fn code(&self) -> &'static str {
        match self {
            CommandError::Validation(_) => "validation_error",
            CommandError::NotFound(_) => "not_found",
            CommandError::AlreadyExists(_) => "already_exists",
            CommandError::Patch(_) => "patch_error",
            CommandError::Io(_) => "io_error",
            CommandError::Task(_) => "task_error",
            CommandError::UnknownCommand(_) => "unknown_command",
        }
    }
}
