// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! nagstat CLI - monitoring status across Opsview and Thruk servers.
//!
//! # Examples
//!
//! ```bash
//! # Poll every enabled server once
//! nagstat
//!
//! # Poll one server, including healthy entries
//! nagstat status --server prod --all
//!
//! # JSON output
//! nagstat --format json --pretty
//!
//! # Watch mode
//! nagstat watch --interval 30
//!
//! # Acknowledge a service problem
//! nagstat ack --server prod web01 http --comment "on it" --sticky
//!
//! # Two hours of downtime for a host
//! nagstat downtime --server prod db01 --comment upgrade --hours 2
//!
//! # List backend types and the command fields they accept
//! nagstat backends
//! ```

mod commands;
mod config;
mod output;
mod scheduler;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use nagstat_core::BackendError;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{ack, backends, downtime, recheck, status, submit, watch};
use config::AppConfig;

// ============================================================================
// CLI Definition
// ============================================================================

/// nagstat CLI - unified monitoring status.
#[derive(Parser)]
#[command(name = "nagstat")]
#[command(about = "Unified status for Opsview and Thruk monitoring servers")]
#[command(long_about = r#"
nagstat polls monitoring servers, shows their problems in one report and
sends acknowledgements, downtimes, rechecks and passive results back.

Supported backends:
  • Opsview (opsview)
  • Thruk (thruk)

Examples:
  nagstat                               # Poll all enabled servers
  nagstat status --server prod          # Single server
  nagstat --format json                 # JSON output
  nagstat recheck --server prod web01   # Force a host check
"#)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run. If none, runs 'status' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file (defaults to the user config directory).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Poll servers once (default if no command specified).
    #[command(visible_alias = "s")]
    Status(status::StatusArgs),

    /// Poll continuously.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Acknowledge a problem.
    #[command(visible_alias = "a")]
    Ack(ack::AckArgs),

    /// Schedule a downtime.
    #[command(visible_alias = "d")]
    Downtime(downtime::DowntimeArgs),

    /// Force an immediate check.
    #[command(visible_alias = "r")]
    Recheck(recheck::RecheckArgs),

    /// Submit a passive check result.
    Submit(submit::SubmitArgs),

    /// List available backend types.
    #[command(visible_alias = "b")]
    Backends,

    /// Manage configuration.
    Config(commands::config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Bad configuration or arguments; nothing was sent.
    Config = 2,
}

impl ExitCode {
    fn for_error(error: &anyhow::Error) -> Self {
        let local = error
            .chain()
            .filter_map(|cause| cause.downcast_ref::<BackendError>())
            .any(BackendError::is_local);
        if local { Self::Config } else { Self::Error }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: &str) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("nagstat=debug,info")
    } else {
        EnvFilter::try_new(format!("nagstat={level}"))
            .unwrap_or_else(|_| EnvFilter::new("nagstat=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::load(cli.config.as_deref());
    let level = loaded
        .as_ref()
        .map_or("warn", |config| config.general.log_level.as_str());
    setup_logging(cli.verbose, cli.quiet, level);

    let result = run(&cli, loaded).await;

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(ExitCode::for_error(&e) as i32);
    }

    Ok(())
}

async fn run(cli: &Cli, loaded: Result<AppConfig>) -> Result<()> {
    use commands::config::ConfigAction;

    // These work without a readable config file.
    match &cli.command {
        Some(Commands::Backends) => return backends::run(cli),
        Some(Commands::Config(args))
            if matches!(args.action, ConfigAction::Path | ConfigAction::Init { .. }) =>
        {
            return commands::config::run(args, cli, &AppConfig::default());
        }
        _ => {}
    }

    let config = loaded?;
    match &cli.command {
        Some(Commands::Status(args)) => status::run(args, cli, &config).await,
        Some(Commands::Watch(args)) => watch::run(args, cli, &config).await,
        Some(Commands::Ack(args)) => ack::run(args, cli, &config).await,
        Some(Commands::Downtime(args)) => downtime::run(args, cli, &config).await,
        Some(Commands::Recheck(args)) => recheck::run(args, cli, &config).await,
        Some(Commands::Submit(args)) => submit::run(args, cli, &config).await,
        Some(Commands::Config(args)) => commands::config::run(args, cli, &config),
        Some(Commands::Backends) => backends::run(cli),
        None => {
            // Default to status command
            status::run(&status::StatusArgs::default(), cli, &config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ack() {
        let cli = Cli::parse_from([
            "nagstat", "ack", "--server", "prod", "web01", "http", "--comment", "on it", "--sticky",
        ]);
        let Some(Commands::Ack(args)) = cli.command else {
            panic!("expected ack");
        };
        assert_eq!(args.target.target().to_string(), "web01/http");
        assert!(args.sticky && !args.notify);
    }

    #[test]
    fn test_local_errors_map_to_config_exit_code() {
        let err = anyhow::Error::new(BackendError::UnknownBackendType("x".into()));
        assert!(matches!(ExitCode::for_error(&err), ExitCode::Config));

        let err = anyhow::Error::new(BackendError::SessionExpired).context("polling prod");
        assert!(matches!(ExitCode::for_error(&err), ExitCode::Error));
    }
}
