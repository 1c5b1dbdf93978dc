//! Command-line interface definitions for tinker.
//!
//! Global options select the environment and logging; subcommands decide what
//! to do with the session once it is established.
//!
//! # Example
//!
//! ```bash
//! # Create (or restore) a sandbox session and show who you are
//! tinker login
//!
//! # Overview of the user, aliases and primary account in production
//! TINKER_API_KEY=... tinker --env production overview
//!
//! # Send account mutation callbacks to your own endpoint
//! tinker add-callback-url https://example.com/tinker/hook
//!
//! # Inspect or discard the stored sandbox credentials
//! tinker show
//! tinker forget
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::environment::EnvironmentType;

/// Banking API demo client.
///
/// Establishes a device identity and session against the sandbox or
/// production API, keeps it in a local credential file and prints what the
/// session can see.
#[derive(Debug, Parser)]
#[command(name = "tinker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// API environment to talk to
    #[arg(short, long = "env", value_enum, default_value = "sandbox", global = true)]
    pub environment: EnvironmentArg,

    /// Configuration file to load on top of the platform default
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding credential files (overrides config)
    #[arg(long, value_name = "DIR", global = true)]
    pub credential_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Establish or restore a session and print a short summary
    Login(OutputArgs),
    /// Print the user, their aliases, the primary account and its latest activity
    Overview(OutputArgs),
    /// Register a URL to receive account mutation callbacks
    AddCallbackUrl(CallbackArgs),
    /// Print the stored credential record without contacting the API
    Show,
    /// Delete the stored credential file for the selected environment
    Forget,
    /// Print the effective configuration as TOML
    Config,
}

/// Output selection shared by session commands.
#[derive(Debug, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for `add-callback-url`.
#[derive(Debug, Args)]
pub struct CallbackArgs {
    /// HTTPS URL that should receive the callbacks
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Environment selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EnvironmentArg {
    /// Test environment with disposable users
    Sandbox,
    /// Live environment; requires an API key
    Production,
}

impl From<EnvironmentArg> for EnvironmentType {
    fn from(arg: EnvironmentArg) -> Self {
        match arg {
            EnvironmentArg::Sandbox => EnvironmentType::Sandbox,
            EnvironmentArg::Production => EnvironmentType::Production,
        }
    }
}

/// Output format for session summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
