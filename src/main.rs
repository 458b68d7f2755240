// Entrypoint for the CLI application.
// - Keeps `main` small: read config, build the HTTP client and hand it to
//   the UI loop.
// - Returns `anyhow::Result` so setup failures print a single error line.

use anyhow::{Context, Result};
use clap::Parser;
use drive_folders_cli::config::{Cli, Config};
use drive_folders_cli::http::ReqwestExecutor;
use drive_folders_cli::prompt::{DialoguerPrompter, LinePrompter, Prompter};
use drive_folders_cli::ui::{start_session, Shell};
use drive_folders_cli::FolderClient;
use std::io::{self, IsTerminal};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    init_tracing(&config);

    let interactive = !config.plain && io::stdin().is_terminal();
    if interactive {
        run(&config, DialoguerPrompter, true)
    } else {
        run(&config, LinePrompter::new(io::stdin().lock(), io::stdout()), false)
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run<P: Prompter>(config: &Config, mut prompter: P, interactive: bool) -> Result<()> {
    let mut out = io::stdout();
    let session = start_session(&mut prompter, &mut out, config.api_token.as_deref())?;

    let executor = ReqwestExecutor::new(config.timeouts).context("Failed to build HTTP client")?;
    let client = FolderClient::new(executor, config.base_url.clone(), session);

    let mut shell = Shell::new(client, prompter, out, io::stderr())
        .with_spinner(interactive && io::stderr().is_terminal());
    shell.main_menu()
}
