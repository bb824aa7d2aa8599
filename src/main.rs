// panelkit demo binary
//
// Builds the demo panel tree and runs it on the terminal:
// - Root controller: owns the tree, routes keys and focus on one task
// - Command workers: tokio tasks running deferred panel work
// - Logging: tracing events captured into the in-memory log panel
// - Config: ~/.config/panelkit/config.toml with env overrides

use anyhow::Result;
use panelkit::config::Config;
use panelkit::logging::{init_tracing, LogBuffer};
use panelkit::{cli, demo, runtime};

#[tokio::main]
async fn main() -> Result<()> {
    // Handle CLI commands first (config --show, --reset, --edit, --path)
    if cli::handle_cli() {
        return Ok(());
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();
    let config = Config::from_env();

    // Logs go to the buffer shown in the log panel, never to the terminal.
    // The guard must stay alive for file logs to flush.
    let log_buffer = LogBuffer::new();
    let _file_guard = init_tracing(&config.logging, log_buffer.clone());

    tracing::info!(
        version = panelkit::config::VERSION,
        workers = config.workers,
        queue_capacity = config.queue_capacity,
        "starting panelkit demo"
    );

    let mut root = demo::demo_root(&config, log_buffer);
    if let Err(e) = runtime::run_in_terminal(&mut root).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
