//! CLI command implementations.

pub mod ack;
pub mod backends;
pub mod config;
pub mod downtime;
pub mod recheck;
pub mod status;
pub mod submit;
pub mod watch;

use anyhow::Result;
use clap::Args;
use nagstat_backends::{BackendAdapter, BackendRegistry};
use nagstat_core::{Capabilities, CommandField, CommandKind, Target};
use tracing::warn;

use crate::config::AppConfig;
use crate::output::{CommandOutput, JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Server and host/service a command is aimed at.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Configured server name.
    #[arg(long, short)]
    pub server: String,

    /// Host name.
    pub host: String,

    /// Service name; omit to target the host.
    pub service: Option<String>,
}

impl TargetArgs {
    /// Returns the command target.
    pub fn target(&self) -> Target {
        match &self.service {
            Some(service) => Target::service(&self.host, service),
            None => Target::host(&self.host),
        }
    }
}

/// Builds an HTTP-backed adapter for the named server.
pub(crate) fn connect_server(config: &AppConfig, name: &str) -> Result<Box<dyn BackendAdapter>> {
    let server = config.server(name)?;
    Ok(BackendRegistry::create_http(server.clone())?)
}

/// Resolves the author name: explicit, then the server's login name.
pub(crate) fn author(config: &AppConfig, server: &str, explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| {
            config
                .server(server)
                .ok()
                .map(|s| s.username.clone())
                .filter(|u| !u.is_empty())
        })
        .unwrap_or_else(|| "nagstat".to_string())
}

/// Warns about a flag the backend will not transmit.
pub(crate) fn warn_unsupported(
    caps: &Capabilities,
    kind: CommandKind,
    field: CommandField,
    given: bool,
) {
    if given && !caps.supports(kind, field) {
        warn!(field = field.name(), command = kind.label(), "Not supported by this backend, ignored");
    }
}

/// Prints the confirmation of an accepted command.
pub(crate) fn print_command_ok(cli: &Cli, server: &str, kind: CommandKind, target: &Target) -> Result<()> {
    if cli.quiet {
        return Ok(());
    }
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_command_ok(server, kind, &target.to_string()));
        }
        OutputFormat::Json => {
            let output = CommandOutput {
                server,
                command: kind,
                target: target.to_string(),
                ok: true,
            };
            println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);
        }
    }
    Ok(())
}
