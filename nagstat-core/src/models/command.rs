//! Remote command payloads and backend capability declarations.
//!
//! - [`Target`] - Host or host/service addressed by a command
//! - [`Acknowledgement`], [`Downtime`], [`CheckResult`] - Command payloads
//! - [`Capabilities`] - Which optional fields a backend accepts per command

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::status::Status;
use crate::error::{BackendError, BackendResult};

// ============================================================================
// Target
// ============================================================================

/// The object a command acts on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Host name.
    pub host: String,
    /// Service name, absent for host-level commands.
    pub service: Option<String>,
}

impl Target {
    /// Targets a host.
    pub fn host(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: None,
        }
    }

    /// Targets a service on a host.
    pub fn service(host: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            service: Some(service.into()),
        }
    }

    /// Returns the service name if this is a service target.
    ///
    /// An empty service name is treated as a host target.
    pub fn service_name(&self) -> Option<&str> {
        self.service.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns true if this targets a service.
    pub fn is_service(&self) -> bool {
        self.service_name().is_some()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.service_name() {
            Some(service) => write!(f, "{}/{}", self.host, service),
            None => f.write_str(&self.host),
        }
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// Acknowledge a problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    /// What to acknowledge.
    pub target: Target,
    /// Author name.
    pub author: String,
    /// Comment text.
    pub comment: String,
    /// Keep the acknowledgement until the object recovers.
    pub sticky: bool,
    /// Send a notification.
    pub notify: bool,
    /// Keep the comment across restarts.
    pub persistent: bool,
}

/// Schedule a downtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Downtime {
    /// What to put into downtime.
    pub target: Target,
    /// Author name.
    pub author: String,
    /// Comment text.
    pub comment: String,
    /// Fixed (true) or flexible (false) downtime.
    pub fixed: bool,
    /// Start of the downtime window.
    pub start: DateTime<Local>,
    /// End of the downtime window.
    pub end: DateTime<Local>,
    /// Length of a flexible downtime.
    pub duration: Option<Duration>,
}

/// Submit a passive check result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    /// Object the result is for.
    pub target: Target,
    /// Reported state.
    pub state: Status,
    /// Comment text.
    pub comment: Option<String>,
    /// Plugin output.
    pub check_output: Option<String>,
    /// Performance data.
    pub performance_data: Option<String>,
}

// ============================================================================
// Capabilities
// ============================================================================

/// The remote commands a backend can issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Acknowledge a problem.
    Acknowledge,
    /// Schedule a downtime.
    Downtime,
    /// Force an immediate recheck.
    Recheck,
    /// Submit a passive check result.
    SubmitCheckResult,
}

impl CommandKind {
    /// Returns a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Acknowledge => "Acknowledge",
            Self::Downtime => "Downtime",
            Self::Recheck => "Recheck",
            Self::SubmitCheckResult => "Submit check result",
        }
    }

    /// Returns all command kinds.
    pub fn all() -> &'static [CommandKind] {
        &[
            Self::Acknowledge,
            Self::Downtime,
            Self::Recheck,
            Self::SubmitCheckResult,
        ]
    }
}

/// Optional command fields whose support differs between backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandField {
    /// Author name.
    Author,
    /// Free-text comment.
    Comment,
    /// Sticky acknowledgement.
    Sticky,
    /// Send notifications.
    Notify,
    /// Persistent comment.
    Persistent,
    /// Fixed/flexible downtime switch.
    Fixed,
    /// Flexible downtime duration.
    Duration,
    /// Plugin output of a check result.
    CheckOutput,
    /// Performance data of a check result.
    PerformanceData,
}

impl CommandField {
    /// Returns the field name as used in forms.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Comment => "comment",
            Self::Sticky => "sticky",
            Self::Notify => "notify",
            Self::Persistent => "persistent",
            Self::Fixed => "fixed",
            Self::Duration => "duration",
            Self::CheckOutput => "check_output",
            Self::PerformanceData => "performance_data",
        }
    }
}

/// Static declaration of the command fields a backend accepts.
///
/// UIs consult this before offering a field; adapters use it to reject
/// non-empty values for unsupported text fields before any network call.
/// Unsupported toggles are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Fields accepted by acknowledgements.
    pub acknowledge: &'static [CommandField],
    /// Fields accepted by downtimes.
    pub downtime: &'static [CommandField],
    /// Fields accepted by check result submissions.
    pub check_result: &'static [CommandField],
}

impl Capabilities {
    /// Returns the fields supported by the given command.
    pub fn fields(&self, kind: CommandKind) -> &'static [CommandField] {
        match kind {
            CommandKind::Acknowledge => self.acknowledge,
            CommandKind::Downtime => self.downtime,
            CommandKind::Recheck => &[],
            CommandKind::SubmitCheckResult => self.check_result,
        }
    }

    /// Returns true if `field` is accepted by `kind`.
    pub fn supports(&self, kind: CommandKind, field: CommandField) -> bool {
        self.fields(kind).contains(&field)
    }

    /// Rejects a non-empty value for a field the backend cannot transmit.
    pub fn require_text(
        &self,
        kind: CommandKind,
        field: CommandField,
        value: Option<&str>,
    ) -> BackendResult<()> {
        let has_value = value.is_some_and(|v| !v.trim().is_empty());
        if has_value && !self.supports(kind, field) {
            return Err(BackendError::UnsupportedOperation(format!(
                "{} does not accept field '{}'",
                kind.label(),
                field.name()
            )));
        }
        Ok(())
    }

    /// Returns `value` only when the field is supported and non-empty.
    pub fn keep_text<'a>(
        &self,
        kind: CommandKind,
        field: CommandField,
        value: Option<&'a str>,
    ) -> Option<&'a str> {
        value.filter(|v| !v.is_empty() && self.supports(kind, field))
    }

    /// Validates a check result before anything is sent.
    ///
    /// Non-empty text in a field the backend cannot transmit is rejected,
    /// as is a state without a plugin return code.
    pub fn validate_check_result(&self, result: &CheckResult) -> BackendResult<()> {
        let kind = CommandKind::SubmitCheckResult;
        require_host(&result.target)?;
        self.require_text(kind, CommandField::Comment, result.comment.as_deref())?;
        self.require_text(kind, CommandField::CheckOutput, result.check_output.as_deref())?;
        self.require_text(
            kind,
            CommandField::PerformanceData,
            result.performance_data.as_deref(),
        )?;
        if result.state.plugin_code().is_none() {
            return Err(BackendError::UnsupportedOperation(format!(
                "Cannot submit state {}",
                result.state
            )));
        }
        Ok(())
    }

    /// Validates an acknowledgement. Unsupported fields are ignored.
    pub fn validate_acknowledgement(&self, ack: &Acknowledgement) -> BackendResult<()> {
        require_host(&ack.target)
    }

    /// Validates a downtime. Unsupported fields are ignored.
    pub fn validate_downtime(&self, downtime: &Downtime) -> BackendResult<()> {
        require_host(&downtime.target)?;
        if downtime.end <= downtime.start {
            return Err(BackendError::UnsupportedOperation(
                "Downtime must end after it starts".to_string(),
            ));
        }
        Ok(())
    }
}

/// Rejects commands without a host name.
pub fn require_host(target: &Target) -> BackendResult<()> {
    if target.host.trim().is_empty() {
        return Err(BackendError::UnsupportedOperation(
            "Command target has no host name".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIMITED: Capabilities = Capabilities {
        acknowledge: &[CommandField::Comment, CommandField::Sticky],
        downtime: &[CommandField::Comment],
        check_result: &[CommandField::Comment],
    };

    #[test]
    fn test_target_disambiguation() {
        assert!(!Target::host("web01").is_service());
        assert!(Target::service("web01", "http").is_service());
        assert!(!Target::service("web01", "").is_service());
        assert_eq!(Target::service("web01", "http").to_string(), "web01/http");
    }

    #[test]
    fn test_unsupported_text_is_rejected() {
        let result = CheckResult {
            target: Target::host("web01"),
            state: Status::Down,
            comment: Some("manual".into()),
            check_output: Some("PING CRITICAL".into()),
            performance_data: None,
        };
        let err = LIMITED.validate_check_result(&result).unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedOperation(_)));
    }

    #[test]
    fn test_empty_unsupported_text_is_ignored() {
        let result = CheckResult {
            target: Target::host("web01"),
            state: Status::Down,
            comment: Some("manual".into()),
            check_output: Some(String::new()),
            performance_data: None,
        };
        assert!(LIMITED.validate_check_result(&result).is_ok());
    }

    #[test]
    fn test_pending_state_cannot_be_submitted() {
        let result = CheckResult {
            target: Target::host("web01"),
            state: Status::Pending,
            comment: None,
            check_output: None,
            performance_data: None,
        };
        assert!(LIMITED.validate_check_result(&result).is_err());
    }

    #[test]
    fn test_downtime_window_must_be_ordered() {
        let now = Local::now();
        let downtime = Downtime {
            target: Target::host("web01"),
            author: "ops".into(),
            comment: "patching".into(),
            fixed: true,
            start: now,
            end: now,
            duration: None,
        };
        assert!(LIMITED.validate_downtime(&downtime).is_err());
    }

    #[test]
    fn test_empty_host_is_rejected() {
        assert!(require_host(&Target::host(" ")).is_err());
    }

    #[test]
    fn test_recheck_has_no_fields() {
        assert!(LIMITED.fields(CommandKind::Recheck).is_empty());
        assert!(!LIMITED.supports(CommandKind::Recheck, CommandField::Comment));
    }

    #[test]
    fn test_keep_text() {
        let kind = CommandKind::SubmitCheckResult;
        assert_eq!(LIMITED.keep_text(kind, CommandField::Comment, Some("x")), Some("x"));
        assert_eq!(LIMITED.keep_text(kind, CommandField::CheckOutput, Some("x")), None);
    }
}
