//! Status command - poll every configured server once.

use anyhow::{Result, bail};
use clap::Args;
use nagstat_core::BackendConfig;
use tracing::info;

use crate::config::AppConfig;
use crate::output::{JsonFormatter, TextFormatter};
use crate::scheduler::{self, PollReport};
use crate::{Cli, OutputFormat};

/// Arguments for the status command.
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Only poll this server.
    #[arg(long, short)]
    pub server: Option<String>,

    /// Also list healthy hosts and services.
    #[arg(long, short)]
    pub all: bool,
}

/// Picks the servers to poll: the named one, or every enabled server.
pub(crate) fn selected_servers<'a>(
    config: &'a AppConfig,
    only: Option<&str>,
) -> Result<Vec<&'a BackendConfig>> {
    config.validate()?;
    let servers: Vec<&BackendConfig> = match only {
        Some(name) => vec![config.server(name)?],
        None => config.enabled_servers().collect(),
    };
    if servers.is_empty() {
        bail!("No servers configured; run `nagstat config init` to create a sample");
    }
    Ok(servers)
}

/// Runs the status command.
pub async fn run(args: &StatusArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let servers = selected_servers(config, args.server.as_deref())?;
    info!(servers = servers.len(), "Polling");

    let adapters = scheduler::connect(servers)?;
    let reports = scheduler::poll_all(&adapters).await;
    print_reports(&reports, args.all, cli)
}

fn print_reports(reports: &[PollReport], all: bool, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color).with_all_entries(all);
            for report in reports {
                println!("{}", formatter.format_report(report));
                println!();
            }
            if !cli.quiet {
                println!("{}", formatter.format_summary(reports));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_reports(reports)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selected_servers() {
        let mut config = AppConfig::sample();
        assert!(selected_servers(&config, None).is_err());

        config.servers[1].enabled = true;
        let servers = selected_servers(&config, None).unwrap();
        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].name, "thruk");

        let named = selected_servers(&config, Some("opsview")).unwrap();
        assert_eq!(named[0].kind, "opsview");
        assert!(selected_servers(&config, Some("nope")).is_err());
    }
}
