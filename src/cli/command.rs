//! Command-line interface definitions.
//!
//! Defines the CLI structure for the cascade daemon using `clap`. The CLI
//! supports running the delivery daemon, validating configuration, and
//! managing consumers through a running daemon's admin API.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Change-feed fan-out delivery daemon
#[derive(Parser, Debug)]
#[command(name = "cascade")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, default_value = "cascade.toml")]
    pub config: PathBuf,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the cascade CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the delivery daemon (foreground)
    Run,

    /// Validate the configuration and print a summary
    Check,

    /// Inspect and manage consumers via a running daemon's admin API
    Consumers(ConsumersArgs),
}

#[derive(Args, Debug)]
pub struct ConsumersArgs {
    /// Base URL of the daemon's admin API
    #[arg(long, default_value = "http://127.0.0.1:8070")]
    pub admin_url: String,

    #[command(subcommand)]
    pub command: ConsumersCommand,
}

/// Consumer management subcommands.
#[derive(Subcommand, Debug)]
pub enum ConsumersCommand {
    /// List consumers and their health state
    List,

    /// Take a consumer out of rotation
    Suspend {
        /// Consumer endpoint URL
        endpoint: String,
    },

    /// Bring a suspended consumer back into rotation
    Reactivate {
        /// Consumer endpoint URL
        endpoint: String,
    },
}
