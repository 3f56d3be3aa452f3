//! Config command - inspect and create the configuration file.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::config::AppConfig;
use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the loaded configuration (passwords masked).
    Show,

    /// Show the configuration file path.
    Path,

    /// Write a sample configuration.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Validate the configuration without contacting any server.
    Check,
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, config),
        ConfigAction::Path => show_path(cli),
        ConfigAction::Init { force } => init_config(cli, *force),
        ConfigAction::Check => check_config(cli, config),
    }
}

fn config_path(cli: &Cli) -> PathBuf {
    cli.config.clone().unwrap_or_else(AppConfig::default_path)
}

/// Copy of `config` safe to print.
fn masked(config: &AppConfig) -> AppConfig {
    let mut config = config.clone();
    for server in &mut config.servers {
        if !server.password.is_empty() {
            server.password = "********".to_string();
        }
    }
    config
}

fn show_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    let config = masked(config);

    match cli.format {
        OutputFormat::Text => {
            println!("nagstat Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Refresh interval: {}s", config.general.refresh_interval_secs);
            println!("Log level:        {}", config.general.log_level);
            println!();
            println!("Servers:");
            for server in &config.servers {
                let state = if server.enabled { "" } else { " (disabled)" };
                println!("  • {} [{}] {}{}", server.name, server.kind, server.monitor_url, state);
                if let Some(cgi) = &server.monitor_cgi_url {
                    println!("      cgi: {cgi}");
                }
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&config)?);
        }
    }

    Ok(())
}

fn show_path(cli: &Cli) -> Result<()> {
    let path = config_path(cli);

    match cli.format {
        OutputFormat::Text => println!("Config file: {}", path.display()),
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_file": path.display().to_string(),
                "exists": path.exists(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let path = config_path(cli);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    AppConfig::sample().save_to(&path)?;
    info!(path = %path.display(), "Sample configuration written");
    println!("Wrote {}", path.display());
    println!("Edit the servers and set \"enabled\": true to start polling.");

    Ok(())
}

fn check_config(cli: &Cli, config: &AppConfig) -> Result<()> {
    config.validate()?;
    let enabled = config.enabled_servers().count();

    match cli.format {
        OutputFormat::Text => println!(
            "Configuration OK: {} servers ({enabled} enabled)",
            config.servers.len()
        ),
        OutputFormat::Json => {
            let summary = serde_json::json!({
                "valid": true,
                "servers": config.servers.len(),
                "enabled": enabled,
            });
            println!("{}", JsonFormatter::new(cli.pretty).format(&summary)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_hides_passwords() {
        let config = masked(&AppConfig::sample());
        assert!(config.servers.iter().all(|s| s.password == "********"));
        assert_eq!(config.servers[0].username, "admin");
    }
}
