//! Backends command - list registered backend types.

use anyhow::Result;
use nagstat_backends::BackendRegistry;
use tracing::info;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the backends command.
pub fn run(cli: &Cli) -> Result<()> {
    info!("Listing backends");

    let backends = BackendRegistry::all();

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_backends_header());
            println!("{}", "─".repeat(70));

            for desc in backends {
                println!("{}", formatter.format_backend(desc));
            }

            println!();
            println!("Total: {} backends", BackendRegistry::count());
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_backends(backends)?);
        }
    }

    Ok(())
}
