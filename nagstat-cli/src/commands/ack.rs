//! Ack command - acknowledge a host or service problem.

use anyhow::Result;
use clap::Args;
use nagstat_core::{Acknowledgement, CommandField, CommandKind};
use tracing::info;

use super::{TargetArgs, connect_server, print_command_ok, warn_unsupported};
use crate::Cli;
use crate::config::AppConfig;

/// Arguments for the ack command.
#[derive(Args, Debug)]
pub struct AckArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Comment text.
    #[arg(long, short)]
    pub comment: String,

    /// Author name (defaults to the server's login name).
    #[arg(long)]
    pub author: Option<String>,

    /// Keep the acknowledgement until the object recovers.
    #[arg(long)]
    pub sticky: bool,

    /// Send a notification.
    #[arg(long)]
    pub notify: bool,

    /// Keep the comment across restarts.
    #[arg(long)]
    pub persistent: bool,
}

/// Runs the ack command.
pub async fn run(args: &AckArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let backend = connect_server(config, &args.target.server)?;
    let caps = backend.capabilities();
    let kind = CommandKind::Acknowledge;
    warn_unsupported(caps, kind, CommandField::Author, args.author.is_some());
    warn_unsupported(caps, kind, CommandField::Sticky, args.sticky);
    warn_unsupported(caps, kind, CommandField::Notify, args.notify);
    warn_unsupported(caps, kind, CommandField::Persistent, args.persistent);

    let ack = Acknowledgement {
        target: args.target.target(),
        author: super::author(config, &args.target.server, args.author.as_deref()),
        comment: args.comment.clone(),
        sticky: args.sticky,
        notify: args.notify,
        persistent: args.persistent,
    };

    info!(server = %backend.name(), target = %ack.target, "Acknowledging");
    backend.acknowledge(&ack).await?;
    print_command_ok(cli, backend.name(), kind, &ack.target)
}
