//! Watch command - poll continuously and print reports as they arrive.

use anyhow::Result;
use clap::Args;
use std::io::{Write, stdout};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

use super::status::selected_servers;
use crate::config::AppConfig;
use crate::output::{JsonFormatter, TextFormatter};
use crate::scheduler;
use crate::{Cli, OutputFormat};

/// Arguments for the watch command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Only watch this server.
    #[arg(long, short)]
    pub server: Option<String>,

    /// Also list healthy hosts and services.
    #[arg(long, short)]
    pub all: bool,

    /// Minimum interval to use.
    #[arg(long, default_value = "10")]
    pub min_interval: u64,
}

/// Runs the watch command until Ctrl+C.
pub async fn run(args: &WatchArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let servers = selected_servers(config, args.server.as_deref())?;
    let refresh = args
        .interval
        .unwrap_or(config.general.refresh_interval_secs)
        .max(args.min_interval);

    info!(interval = refresh, servers = servers.len(), "Starting watch mode");

    let adapters = scheduler::connect(servers)?;
    let (tx, mut rx) = mpsc::channel(adapters.len().max(1) * 2);
    let handles = scheduler::spawn_watchers(&adapters, Duration::from_secs(refresh), &tx);
    drop(tx);

    let text = TextFormatter::new(!cli.no_color).with_all_entries(args.all);
    let json = JsonFormatter::new(cli.pretty);

    loop {
        tokio::select! {
            report = rx.recv() => {
                let Some(report) = report else { break };
                match cli.format {
                    OutputFormat::Text => {
                        println!("{}", text.format_report(&report));
                        println!();
                    }
                    OutputFormat::Json => println!("{}", json.format_report(&report)?),
                }
                stdout().flush()?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watchers");
                break;
            }
        }
    }

    for handle in handles {
        handle.abort();
    }
    Ok(())
}
