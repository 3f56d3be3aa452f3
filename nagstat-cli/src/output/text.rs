//! Text output formatting with colors.

use nagstat_backends::BackendDescriptor;
use nagstat_core::{CommandKind, Host, Service, Status};

use crate::scheduler::PollReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const MAGENTA: &str = "\x1b[35m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    problems_only: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            problems_only: true,
        }
    }

    /// Also list healthy hosts and services.
    pub fn with_all_entries(mut self, all: bool) -> Self {
        self.problems_only = !all;
        self
    }

    /// Formats one backend's poll report.
    pub fn format_report(&self, report: &PollReport) -> String {
        let mut lines = Vec::new();

        // Header: "prod (Opsview)"
        let header = format!("{} ({})", self.bold(&report.server), report.kind);

        let hosts = match &report.result {
            Ok(hosts) => hosts,
            Err(e) => {
                lines.push(format!("{header}  {}", self.red(&format!("Error: {e}"))));
                return lines.join("\n");
            }
        };

        let problems = report.problem_count();
        let summary = if problems == 0 {
            self.green(&format!("all OK ({} hosts)", hosts.len()))
        } else {
            self.red(&format!(
                "{problems} problem{} on {} hosts",
                plural(problems),
                hosts.len()
            ))
        };
        lines.push(format!(
            "{header}  {summary}  {}",
            self.dim(&report.finished_at.format("%H:%M:%S").to_string())
        ));

        for host in hosts.values() {
            let services: Vec<&Service> = host
                .services
                .values()
                .filter(|s| !self.problems_only || s.status.is_problem())
                .collect();
            if self.problems_only && !host.is_problem() && services.is_empty() {
                continue;
            }
            lines.push(self.format_host(host));
            for service in services {
                lines.push(self.format_service(service));
            }
        }

        lines.join("\n")
    }

    fn format_host(&self, host: &Host) -> String {
        let flags = self.flags(
            host.acknowledged,
            host.scheduled_downtime,
            host.flapping,
            host.notifications_disabled,
            host.passiveonly,
        );
        let mut line = format!("  {} {}", self.status(host.status), self.bold(&host.name));
        push_details(&mut line, &host.status_information, &host.duration, host.attempt);
        if !flags.is_empty() {
            line.push(' ');
            line.push_str(&flags);
        }
        line
    }

    fn format_service(&self, service: &Service) -> String {
        let flags = self.flags(
            service.acknowledged,
            service.scheduled_downtime,
            service.flapping,
            service.notifications_disabled,
            service.passiveonly,
        );
        let mut line = format!("    {} {}", self.status(service.status), service.name);
        push_details(
            &mut line,
            &service.status_information,
            &service.duration,
            service.attempt,
        );
        if !flags.is_empty() {
            line.push(' ');
            line.push_str(&flags);
        }
        line
    }

    fn flags(&self, ack: bool, downtime: bool, flapping: bool, muted: bool, passive: bool) -> String {
        let mut flags = Vec::new();
        if ack {
            flags.push("ACK");
        }
        if downtime {
            flags.push("DOWNTIME");
        }
        if flapping {
            flags.push("FLAPPING");
        }
        if muted {
            flags.push("NOTIFY-OFF");
        }
        if passive {
            flags.push("PASSIVE");
        }
        if flags.is_empty() {
            return String::new();
        }
        self.cyan(&format!("[{}]", flags.join(",")))
    }

    /// Formats a status label padded to a fixed width.
    pub fn status(&self, status: Status) -> String {
        let label = format!("{:<11}", status.label());
        match status {
            Status::Up | Status::Ok => self.green(&label),
            Status::Warning => self.yellow(&label),
            Status::Unknown => self.magenta(&label),
            Status::Pending => self.dim(&label),
            Status::Down | Status::Unreachable | Status::Critical => self.red(&label),
        }
    }

    /// Formats the closing summary line of a status run.
    pub fn format_summary(&self, reports: &[PollReport]) -> String {
        let problems: usize = reports.iter().map(PollReport::problem_count).sum();
        let failed = reports.iter().filter(|r| r.result.is_err()).count();

        let mut line = format!(
            "Total: {problems} problem{} across {} server{}",
            plural(problems),
            reports.len(),
            plural(reports.len())
        );
        if failed > 0 {
            line.push_str(&format!(", {}", self.red(&format!("{failed} unreachable"))));
        }
        line
    }

    /// Header for the backends listing.
    pub fn format_backends_header(&self) -> String {
        self.bold(&format!(
            "{:<10} {:<12} {:<12} {}",
            "TAG", "NAME", "AUTH", "COMMAND FIELDS"
        ))
    }

    /// One backend type with its accepted command fields.
    pub fn format_backend(&self, desc: &BackendDescriptor) -> String {
        let mut lines = vec![format!(
            "{:<10} {:<12} {:<12}",
            desc.tag(),
            desc.display_name(),
            desc.auth_scheme.label()
        )];
        for kind in CommandKind::all() {
            let fields: Vec<&str> = desc
                .capabilities
                .fields(*kind)
                .iter()
                .map(|f| f.name())
                .collect();
            let fields = if fields.is_empty() {
                self.dim("-")
            } else {
                fields.join(", ")
            };
            lines.push(format!("{:<36} {:<20} {}", "", kind.label(), fields));
        }
        lines.join("\n")
    }

    /// Confirms a command was accepted.
    pub fn format_command_ok(&self, server: &str, kind: CommandKind, target: &str) -> String {
        format!("{} {} {} on {}", self.green("✓"), kind.label(), target, server)
    }

    /// Formats an error for one server.
    pub fn format_error(&self, server: &str, error: &str) -> String {
        format!("{} {}: {}", self.red("✗"), self.bold(server), error)
    }

    // Color helpers

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn magenta(&self, text: &str) -> String {
        self.paint(MAGENTA, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

fn push_details(line: &mut String, info: &str, duration: &str, attempt: Option<nagstat_core::Attempt>) {
    if !info.is_empty() {
        line.push_str("  ");
        line.push_str(info);
    }
    if !duration.is_empty() {
        line.push_str(&format!("  ({duration})"));
    }
    if let Some(attempt) = attempt {
        line.push_str(&format!("  {attempt}"));
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}
