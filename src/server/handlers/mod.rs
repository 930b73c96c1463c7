//! Command handlers, one function per protocol command.
//!
//! The dispatcher is stateless: one request in, one response out. Shape
//! validation happens before any I/O; handler errors become top-level error
//! responses, while batch commands capture per-item failures internally.

pub mod bulk;
pub mod file;
pub mod task;

use crate::server::batch::BatchReport;
use crate::server::context::{CommandError, ServerContext};
use crate::server::protocol::{Command, ResponseBody, Status};

/// A handler's successful outcome: payload plus the aggregate status
/// (batch commands report `error` when any item failed, even though the
/// command itself completed).
#[derive(Debug)]
pub struct CommandOutput {
    pub status: Status,
    pub body: ResponseBody,
}

impl CommandOutput {
    pub fn success(body: ResponseBody) -> Self {
        CommandOutput {
            status: Status::Success,
            body,
        }
    }

    pub fn batch(report: BatchReport) -> Self {
        CommandOutput {
            status: report.status(),
            body: ResponseBody::Batch {
                results: report.results,
            },
        }
    }
}

/// Route a parsed command to its handler.
pub async fn dispatch(ctx: &ServerContext, command: Command) -> Result<CommandOutput, CommandError> {
    match command {
        Command::GetFile { path } => file::get_file(ctx, &path).await,
        Command::ListFiles {
            dir_path,
            extensions,
        } => file::list_files(ctx, &dir_path, &extensions).await,
        Command::CreateFile { path, content } => file::create_file(ctx, &path, &content).await,
        Command::CreateFiles { files } => bulk::create_files(ctx, files).await,
        Command::UpdateFiles { files } => bulk::update_files(ctx, files).await,
        Command::DeleteFiles {
            dir_path,
            extensions,
            paths,
        } => bulk::delete_files(ctx, dir_path, extensions, paths).await,
        Command::PatchFiles { files } => bulk::patch_files(ctx, files).await,
        Command::CopyFiles {
            source_dir,
            dest_dir,
            extensions,
        } => bulk::transfer_files(ctx, &source_dir, &dest_dir, &extensions, false).await,
        Command::MoveFiles {
            source_dir,
            dest_dir,
            extensions,
        } => bulk::transfer_files(ctx, &source_dir, &dest_dir, &extensions, true).await,
        Command::RenameFiles {
            dir_path,
            rename_pattern,
            extensions,
        } => bulk::rename_files(ctx, &dir_path, &rename_pattern, &extensions).await,
        Command::ExecuteCommand {
            shell_command,
            output_file,
        } => task::execute_command(ctx, &shell_command, output_file.as_deref()).await,
        Command::RunTests { output_file } => task::run_tests(ctx, output_file.as_deref()).await,
    }
}
