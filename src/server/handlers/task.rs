//! Task commands: execute-command and run-tests.

use tracing::info;

use crate::server::context::{CommandError, ServerContext};
use crate::server::handlers::CommandOutput;
use crate::server::protocol::ResponseBody;
use crate::server::task::run_shell;

pub async fn execute_command(
    ctx: &ServerContext,
    shell_command: &str,
    output_file: Option<&str>,
) -> Result<CommandOutput, CommandError> {
    if shell_command.is_empty() {
        return Err(CommandError::Validation(
            "shellCommand (non-empty string) is required for execute-command.".to_string(),
        ));
    }

    let out = run_shell(ctx.root(), shell_command).await?;

    if let Some(path) = output_file {
        let combined = format!("{}{}", out.stdout, out.stderr);
        ctx.store.write_upsert(path, combined.as_bytes()).await?;
        info!(path, "Command output written");
    }

    Ok(CommandOutput::success(ResponseBody::Exec {
        stdout: out.stdout,
        stderr: out.stderr,
    }))
}

/// Run the configured project task command, optionally writing the captured
/// result as pretty JSON to a file under the root.
pub async fn run_tests(
    ctx: &ServerContext,
    output_file: Option<&str>,
) -> Result<CommandOutput, CommandError> {
    info!(task = %ctx.task_command, "run-tests");
    let out = run_shell(ctx.root(), &ctx.task_command).await?;

    if let Some(path) = output_file {
        let report = serde_json::json!({
            "status": "success",
            "stdout": out.stdout,
            "stderr": out.stderr,
        });
        let body = serde_json::to_string_pretty(&report)
            .map_err(|e| CommandError::Task(e.to_string()))?;
        ctx.store.write_upsert(path, body.as_bytes()).await?;
        info!(path, "Test results written");
    }

    Ok(CommandOutput::success(ResponseBody::Exec {
        stdout: out.stdout,
        stderr: out.stderr,
    }))
}
