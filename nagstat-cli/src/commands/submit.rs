//! Submit command - submit a passive check result.

use anyhow::{Result, anyhow};
use clap::Args;
use nagstat_core::{CheckResult, CommandKind, Status};
use tracing::info;

use super::{TargetArgs, connect_server, print_command_ok};
use crate::Cli;
use crate::config::AppConfig;

/// Arguments for the submit command.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Reported state: up, down, unreachable, ok, warning, critical, unknown.
    #[arg(long, value_parser = parse_state)]
    pub state: Status,

    /// Comment text.
    #[arg(long, short)]
    pub comment: Option<String>,

    /// Plugin output.
    #[arg(long, short)]
    pub output: Option<String>,

    /// Performance data.
    #[arg(long)]
    pub perfdata: Option<String>,
}

fn parse_state(label: &str) -> Result<Status> {
    match Status::from_label(label) {
        Some(Status::Pending) | None => Err(anyhow!("'{label}' is not a submittable state")),
        Some(status) => Ok(status),
    }
}

/// Runs the submit command.
///
/// Fields the backend cannot carry are rejected by the adapter before any
/// request is made.
pub async fn run(args: &SubmitArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let backend = connect_server(config, &args.target.server)?;
    let result = CheckResult {
        target: args.target.target(),
        state: args.state,
        comment: args.comment.clone(),
        check_output: args.output.clone(),
        performance_data: args.perfdata.clone(),
    };

    info!(server = %backend.name(), target = %result.target, state = %result.state, "Submitting check result");
    backend.submit_check_result(&result).await?;
    print_command_ok(cli, backend.name(), CommandKind::SubmitCheckResult, &result.target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_state() {
        assert_eq!(parse_state("critical").unwrap(), Status::Critical);
        assert_eq!(parse_state("DOWN").unwrap(), Status::Down);
        assert!(parse_state("pending").is_err());
        assert!(parse_state("broken").is_err());
    }
}
