use clap::Parser;
use tracing::info;

use devlink_core::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    devlink_core::util::init_logging();

    let config = Config::parse();

    info!(
        root = %config.root.display(),
        port = config.port,
        task = %config.task_command,
        "Starting DevLink Core server"
    );

    devlink_core::run_server(config).await
}
