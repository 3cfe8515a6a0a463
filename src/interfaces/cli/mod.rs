//! CLI interface module
//!
//! One-shot subcommands and the interactive menu shell. Both drive the same
//! [`LinkService`]; neither talks to storage directly.

pub mod commands;
pub mod shell;

use std::fmt;

use crate::cli::Commands;
use crate::errors::TtlinkError;
use crate::services::{LinkPolicy, LinkService};
use commands::{
    config_generate, create_link, delete_link, go_link, link_info, reclaim_expired, set_limit,
};

pub use commands::{save_token, save_token_in};
pub use shell::{MenuSignal, Shell};

#[derive(Debug)]
pub enum CliError {
    Service(TtlinkError),
    IoError(String),
    CommandError(String),
}

impl CliError {
    /// Format as simple output
    pub fn format_simple(&self) -> String {
        match self {
            CliError::Service(err) => err.format_simple(),
            CliError::IoError(msg) => format!("I/O error: {}", msg),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    /// Format as colored output
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::Service(err) => err.format_colored(),
            CliError::IoError(msg) => format!("{} {}", "I/O error:".red().bold(), msg.white()),
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<TtlinkError> for CliError {
    fn from(err: TtlinkError) -> Self {
        CliError::Service(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError(err.to_string())
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(
    service: &LinkService,
    policy: &LinkPolicy,
    cmd: Commands,
) -> Result<(), CliError> {
    match cmd {
        Commands::Create {
            target_url,
            ttl,
            limit,
            save_token,
        } => create_link(service, policy, target_url, ttl, limit, save_token).await,

        Commands::Info { uuid, json } => link_info(service, &uuid, json).await,

        Commands::Go { short_url } => go_link(service, &short_url).await,

        Commands::SetLimit { uuid, limit } => set_limit(service, &uuid, limit).await,

        Commands::Delete { uuid } => delete_link(service, &uuid).await,

        Commands::Reclaim => reclaim_expired(service).await,

        Commands::ConfigGen { output_path, force } => config_generate(output_path, force),

        Commands::Shell => {
            let input = std::io::BufReader::new(std::io::stdin());
            let mut shell = Shell::new(service, *policy, input, std::io::stdout());
            shell.run().await
        }
    }
}
