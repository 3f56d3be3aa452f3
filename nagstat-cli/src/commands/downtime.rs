//! Downtime command - schedule a downtime starting now.

use anyhow::Result;
use chrono::{DateTime, Duration, Local};
use clap::Args;
use nagstat_backends::BackendAdapter;
use nagstat_core::{CommandField, CommandKind, Downtime};
use tracing::info;

use super::{TargetArgs, connect_server, print_command_ok, warn_unsupported};
use crate::Cli;
use crate::config::AppConfig;

/// Arguments for the downtime command.
#[derive(Args, Debug)]
pub struct DowntimeArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Comment text.
    #[arg(long, short)]
    pub comment: String,

    /// Author name (defaults to the server's login name).
    #[arg(long)]
    pub author: Option<String>,

    /// Window length in hours (defaults to the backend's usual window).
    #[arg(long)]
    pub hours: Option<u32>,

    /// Additional window minutes.
    #[arg(long)]
    pub minutes: Option<u32>,

    /// Schedule a flexible downtime instead of a fixed one.
    #[arg(long)]
    pub flexible: bool,

    /// Length of a flexible downtime in minutes (defaults to the window).
    #[arg(long, requires = "flexible")]
    pub length: Option<u64>,
}

impl DowntimeArgs {
    /// Returns the explicitly requested window length, if any.
    fn window(&self) -> Option<Duration> {
        if self.hours.is_none() && self.minutes.is_none() {
            return None;
        }
        let hours = i64::from(self.hours.unwrap_or(0));
        let minutes = i64::from(self.minutes.unwrap_or(0));
        Some(Duration::hours(hours) + Duration::minutes(minutes))
    }

    /// Builds the downtime starting at `now`.
    pub fn downtime(
        &self,
        backend: &dyn BackendAdapter,
        author: String,
        now: DateTime<Local>,
    ) -> Downtime {
        let (start, end) = match self.window() {
            Some(length) => (now, now + length),
            None => backend.default_downtime_window(now),
        };
        Downtime {
            target: self.target.target(),
            author,
            comment: self.comment.clone(),
            fixed: !self.flexible,
            start,
            end,
            duration: self
                .length
                .map(|minutes| std::time::Duration::from_secs(minutes * 60)),
        }
    }
}

/// Runs the downtime command.
pub async fn run(args: &DowntimeArgs, cli: &Cli, config: &AppConfig) -> Result<()> {
    let backend = connect_server(config, &args.target.server)?;
    let caps = backend.capabilities();
    let kind = CommandKind::Downtime;
    warn_unsupported(caps, kind, CommandField::Author, args.author.is_some());
    warn_unsupported(caps, kind, CommandField::Fixed, args.flexible);
    warn_unsupported(caps, kind, CommandField::Duration, args.length.is_some());

    let author = super::author(config, &args.target.server, args.author.as_deref());
    let downtime = args.downtime(backend.as_ref(), author, Local::now());

    info!(
        server = %backend.name(),
        target = %downtime.target,
        start = %downtime.start,
        end = %downtime.end,
        "Scheduling downtime"
    );
    backend.schedule_downtime(&downtime).await?;
    print_command_ok(cli, backend.name(), kind, &downtime.target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::TargetArgs;
    use chrono::TimeZone;
    use nagstat_backends::BackendRegistry;
    use nagstat_core::BackendConfig;
    use nagstat_fetch::{ScriptedTransport, Transport};
    use std::sync::Arc;

    fn args(hours: Option<u32>, minutes: Option<u32>) -> DowntimeArgs {
        DowntimeArgs {
            target: TargetArgs {
                server: "ops".into(),
                host: "db01".into(),
                service: Some("mysql".into()),
            },
            comment: "upgrade".into(),
            author: None,
            hours,
            minutes,
            flexible: false,
            length: None,
        }
    }

    fn backend(kind: &str) -> Box<dyn BackendAdapter> {
        let transport: Arc<dyn Transport> = Arc::new(ScriptedTransport::new());
        BackendRegistry::create(BackendConfig::new("x", kind, "https://mon"), transport).unwrap()
    }

    #[test]
    fn test_default_window_comes_from_backend() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let downtime = args(None, None).downtime(backend("opsview").as_ref(), "ops".into(), now);
        assert_eq!(downtime.end - downtime.start, Duration::hours(24));
        assert!(downtime.fixed);
        assert_eq!(downtime.target.to_string(), "db01/mysql");

        let downtime = args(None, None).downtime(backend("thruk").as_ref(), "ops".into(), now);
        assert_eq!(downtime.end - downtime.start, Duration::hours(2));
    }

    #[test]
    fn test_explicit_window() {
        let now = Local.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let downtime = args(Some(1), Some(30)).downtime(backend("opsview").as_ref(), "ops".into(), now);
        assert_eq!(downtime.start, now);
        assert_eq!(downtime.end - now, Duration::minutes(90));

        let downtime = args(None, Some(15)).downtime(backend("thruk").as_ref(), "ops".into(), now);
        assert_eq!(downtime.end - now, Duration::minutes(15));
    }

    #[test]
    fn test_flexible_length() {
        let now = Local::now();
        let mut flexible = args(Some(4), None);
        flexible.flexible = true;
        flexible.length = Some(45);
        let downtime = flexible.downtime(backend("thruk").as_ref(), "ops".into(), now);
        assert!(!downtime.fixed);
        assert_eq!(downtime.duration, Some(std::time::Duration::from_secs(45 * 60)));
    }
}
