//! Recheck command - force an immediate check.

use anyhow::Result;
use clap::Args;
use nagstat_core::CommandKind;
use tracing::info;

use super::{TargetArgs, connect_server, print_command_ok};
use crate::Cli;
use crate::config::AppConfig;

/// Arguments for the recheck command.
#[derive(Args, Debug)]
pub struct RecheckArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Runs the recheck command.
pub async fn run(args: &RecheckArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let backend = connect_server(config, &args.target.server)?;
    let target = args.target.target();

    info!(server = %backend.name(), target = %target, "Forcing recheck");
    backend.force_recheck(&target).await?;
    print_command_ok(cli, backend.name(), CommandKind::Recheck, &target)
}
