//! Command-line interface definitions using clap
//!
//! This module defines the CLI structure for ttlink using clap's derive macros.

use clap::{Parser, Subcommand};

/// 默认有效期（秒）
pub const DEFAULT_TTL_SECS: u64 = 3600;
/// 默认访问上限
pub const DEFAULT_TRAFFIC_LIMIT: u32 = 5;

/// ttlink - Short links with a time-to-live and a visit budget
#[derive(Parser)]
#[command(name = "ttlink")]
#[command(version)]
#[command(about = "Short links with a time-to-live and a visit budget", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create a short link and print its owner UUID
    Create {
        /// Target URL (http:// or https://)
        target_url: String,

        /// Requested lifetime in seconds (capped by the configured maximum)
        #[arg(long, default_value_t = DEFAULT_TTL_SECS)]
        ttl: u64,

        /// Requested visit limit (raised to the configured minimum)
        #[arg(long, default_value_t = DEFAULT_TRAFFIC_LIMIT)]
        limit: u32,

        /// Write the owner UUID to this file in the working directory
        #[arg(long)]
        save_token: Option<String>,
    },

    /// Show a link by its owner UUID
    Info {
        uuid: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow a short URL, consuming one visit
    Go {
        /// Short URL, e.g. clck.ru/abc123
        short_url: String,
    },

    /// Change the visit limit of a link
    SetLimit { uuid: String, limit: u32 },

    /// Delete a link by its owner UUID
    Delete { uuid: String },

    /// Remove expired links now
    Reclaim,

    /// Generate example configuration file
    ConfigGen {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Interactive menu (default)
    Shell,
}
