//! JSON output formatting.

use anyhow::Result;
use nagstat_backends::BackendDescriptor;
use nagstat_core::{CommandField, CommandKind, HostMap};
use serde::Serialize;

use crate::scheduler::PollReport;

// ============================================================================
// Output Types
// ============================================================================

/// JSON output for one server's poll.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerOutput<'a> {
    pub server: &'a str,
    pub backend: &'static str,
    pub problems: usize,
    pub finished_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<&'a HostMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Backend type info output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendInfoOutput {
    pub tag: &'static str,
    pub display_name: &'static str,
    pub auth: &'static str,
    pub acknowledge: &'static [CommandField],
    pub downtime: &'static [CommandField],
    pub submit_check_result: &'static [CommandField],
}

/// Result of a remote command.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandOutput<'a> {
    pub server: &'a str,
    pub command: CommandKind,
    pub target: String,
    pub ok: bool,
}

// ============================================================================
// JSON Formatter
// ============================================================================

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats any serializable value.
    pub fn format<T: Serialize>(&self, data: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        };
        Ok(json)
    }

    /// Formats poll reports as an array, one entry per server.
    pub fn format_reports(&self, reports: &[PollReport]) -> Result<String> {
        let outputs: Vec<ServerOutput<'_>> = reports.iter().map(report_to_output).collect();
        self.format(&outputs)
    }

    /// Formats a single poll report, as streamed by watch mode.
    pub fn format_report(&self, report: &PollReport) -> Result<String> {
        self.format(&report_to_output(report))
    }

    /// Formats the registered backend types.
    pub fn format_backends(&self, descriptors: &[BackendDescriptor]) -> Result<String> {
        let outputs: Vec<BackendInfoOutput> = descriptors
            .iter()
            .map(|desc| BackendInfoOutput {
                tag: desc.tag(),
                display_name: desc.display_name(),
                auth: desc.auth_scheme.label(),
                acknowledge: desc.capabilities.fields(CommandKind::Acknowledge),
                downtime: desc.capabilities.fields(CommandKind::Downtime),
                submit_check_result: desc.capabilities.fields(CommandKind::SubmitCheckResult),
            })
            .collect();
        self.format(&outputs)
    }
}

fn report_to_output(report: &PollReport) -> ServerOutput<'_> {
    let (hosts, error) = match &report.result {
        Ok(hosts) => (Some(hosts), None),
        Err(e) => (None, Some(e.to_string())),
    };
    ServerOutput {
        server: &report.server,
        backend: report.kind.tag(),
        problems: report.problem_count(),
        finished_at: report.finished_at.to_rfc3339(),
        hosts,
        error,
    }
}
