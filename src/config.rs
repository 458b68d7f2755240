// Configuration: command line flags with environment fallbacks, turned
// into a validated `Config` the binary wires everything from.

use crate::api::DEFAULT_BASE_URL;
use crate::http::Timeouts;
use anyhow::{ensure, Result};
use clap::Parser;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "drive-folders",
    version,
    about = "Manage Document360 drive folders from the terminal"
)]
pub struct Cli {
    /// Drive folders endpoint.
    #[arg(long, env = "DRIVE_FOLDERS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// API token. Prompted for when not given.
    #[arg(long, env = "DRIVE_FOLDERS_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Connect timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub connect_timeout: u64,

    /// Read timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub read_timeout: u64,

    /// Use plain line prompts even on a terminal.
    #[arg(long)]
    pub plain: bool,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub api_token: Option<String>,
    pub timeouts: Timeouts,
    pub plain: bool,
    pub verbose: u8,
}

impl Cli {
    pub fn into_config(self) -> Result<Config> {
        let base_url = self.base_url.trim().to_string();
        ensure!(!base_url.is_empty(), "base URL must not be empty");
        ensure!(self.connect_timeout > 0, "connect timeout must be positive");
        ensure!(self.read_timeout > 0, "read timeout must be positive");

        Ok(Config {
            base_url,
            api_token: self
                .api_token
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            timeouts: Timeouts {
                connect: Duration::from_secs(self.connect_timeout),
                read: Duration::from_secs(self.read_timeout),
            },
            plain: self.plain,
            verbose: self.verbose,
        })
    }
}

impl Config {
    /// Default tracing filter directive for the chosen verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
