//! Thruk CGI endpoints and wire records.

use serde::Deserialize;

use crate::wire::WireValue;

// ============================================================================
// Constants
// ============================================================================

/// CGI directory used when no explicit CGI URL is configured.
pub const DEFAULT_CGI_PATH: &str = "/cgi-bin";

/// Form login endpoint.
pub const LOGIN_PATH: &str = "/login.cgi?";

/// Command endpoint.
pub const COMMAND_PATH: &str = "/cmd.cgi";

/// Problem hosts (DOWN and UNREACHABLE) as JSON.
pub const HOSTS_PATH: &str = "/status.cgi?hostgroup=all&style=hostdetail&hoststatustypes=12&\
    view_mode=json&entries=all&\
    columns=name,state,last_check,last_state_change,plugin_output,current_attempt,\
    max_check_attempts,active_checks_enabled,notifications_enabled,is_flapping,\
    acknowledged,scheduled_downtime_depth,state_type";

/// Problem services (WARNING, UNKNOWN and CRITICAL) as JSON.
pub const SERVICES_PATH: &str = "/status.cgi?host=all&servicestatustypes=28&view_mode=json&\
    entries=all&columns=host_name,description,state,last_check,last_state_change,\
    plugin_output,current_attempt,max_check_attempts,active_checks_enabled,is_flapping,\
    notifications_enabled,acknowledged,state_type,scheduled_downtime_depth";

// ============================================================================
// Response Types
// ============================================================================

/// One row of the host status view.
#[derive(Debug, Deserialize)]
pub struct HostRow {
    /// Host name.
    pub name: String,
    /// Numeric state.
    pub state: WireValue,
    /// Numeric state type.
    #[serde(default)]
    pub state_type: Option<WireValue>,
    /// Unix timestamp of the last check.
    #[serde(default)]
    pub last_check: Option<WireValue>,
    /// Unix timestamp of the last state change.
    #[serde(default)]
    pub last_state_change: Option<WireValue>,
    /// Plugin output.
    #[serde(default)]
    pub plugin_output: String,
    /// Current attempt.
    #[serde(default)]
    pub current_attempt: Option<WireValue>,
    /// Max attempts.
    #[serde(default)]
    pub max_check_attempts: Option<WireValue>,
    /// Flags; see [`Flags`].
    #[serde(flatten)]
    pub flags: Flags,
}

/// One row of the service status view.
#[derive(Debug, Deserialize)]
pub struct ServiceRow {
    /// Owning host name.
    pub host_name: String,
    /// Service name.
    pub description: String,
    /// Numeric state.
    pub state: WireValue,
    /// Numeric state type.
    #[serde(default)]
    pub state_type: Option<WireValue>,
    /// Unix timestamp of the last check.
    #[serde(default)]
    pub last_check: Option<WireValue>,
    /// Unix timestamp of the last state change.
    #[serde(default)]
    pub last_state_change: Option<WireValue>,
    /// Plugin output.
    #[serde(default)]
    pub plugin_output: String,
    /// Current attempt.
    #[serde(default)]
    pub current_attempt: Option<WireValue>,
    /// Max attempts.
    #[serde(default)]
    pub max_check_attempts: Option<WireValue>,
    /// Flags; see [`Flags`].
    #[serde(flatten)]
    pub flags: Flags,
}

/// Stringified-integer flags shared by hosts and services.
#[derive(Debug, Default, Deserialize)]
pub struct Flags {
    /// `"0"` when the object is passive only.
    #[serde(default)]
    pub active_checks_enabled: Option<WireValue>,
    /// `"0"` when notifications are off.
    #[serde(default)]
    pub notifications_enabled: Option<WireValue>,
    /// Flapping.
    #[serde(default)]
    pub is_flapping: Option<WireValue>,
    /// Acknowledged.
    #[serde(default)]
    pub acknowledged: Option<WireValue>,
    /// Number of active downtimes.
    #[serde(default)]
    pub scheduled_downtime_depth: Option<WireValue>,
}
