//! Opsview REST endpoints and wire records.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};

use crate::wire::WireValue;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint; answers with a session token.
pub const LOGIN_PATH: &str = "/rest/login";

/// Combined host/service status, filtered server-side to WARNING, CRITICAL
/// and UNKNOWN.
pub const STATUS_PATH: &str = "/rest/status/service?state=1&state=2&state=3";

/// Downtime endpoint.
pub const DOWNTIME_PATH: &str = "/rest/downtime";

/// Passive check result endpoint.
pub const CHECK_RESULT_PATH: &str = "/rest/status";

/// Acknowledgement endpoint.
pub const ACKNOWLEDGE_PATH: &str = "/rest/acknowledge";

/// Recheck endpoint.
pub const RECHECK_PATH: &str = "/rest/recheck";

/// Header carrying the login name on authenticated requests.
pub const USERNAME_HEADER: &str = "X-Opsview-Username";

/// Header carrying the session token on authenticated requests.
pub const TOKEN_HEADER: &str = "X-Opsview-Token";

// ============================================================================
// Response Types
// ============================================================================

/// Response of the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// Session token.
    #[serde(default)]
    pub token: Option<String>,
}

/// Response of the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    /// Hosts with at least one matching service.
    pub list: Vec<HostRecord>,
}

/// One host entry.
#[derive(Debug, Deserialize)]
pub struct HostRecord {
    /// Host name.
    pub name: String,
    /// Lower-case state label.
    pub state: String,
    /// `SOFT` or `HARD`.
    #[serde(default)]
    pub state_type: Option<String>,
    /// Unix timestamp of the last check.
    #[serde(default)]
    pub last_check: Option<WireValue>,
    /// Seconds in the current state.
    #[serde(default)]
    pub state_duration: Option<WireValue>,
    /// Current attempt.
    #[serde(default)]
    pub current_check_attempt: Option<WireValue>,
    /// Max attempts.
    #[serde(default)]
    pub max_check_attempts: Option<WireValue>,
    /// Plugin output.
    #[serde(default)]
    pub output: String,
    /// Downtime code; `2` means in downtime.
    #[serde(default)]
    pub downtime: Option<WireValue>,
    /// Present only when acknowledged.
    #[serde(default, deserialize_with = "present")]
    pub acknowledged: bool,
    /// Present only when flapping.
    #[serde(default, deserialize_with = "present")]
    pub flapping: bool,
    /// Embedded services.
    #[serde(default)]
    pub services: Vec<ServiceRecord>,
}

/// One service entry embedded in a host.
#[derive(Debug, Deserialize)]
pub struct ServiceRecord {
    /// Service name.
    pub name: String,
    /// Lower-case state label.
    pub state: String,
    /// `SOFT` or `HARD`.
    #[serde(default)]
    pub state_type: Option<String>,
    /// Unix timestamp of the last check.
    #[serde(default)]
    pub last_check: Option<WireValue>,
    /// Seconds in the current state.
    #[serde(default)]
    pub state_duration: Option<WireValue>,
    /// Current attempt.
    #[serde(default)]
    pub current_check_attempt: Option<WireValue>,
    /// Max attempts.
    #[serde(default)]
    pub max_check_attempts: Option<WireValue>,
    /// Plugin output.
    #[serde(default)]
    pub output: String,
    /// Downtime code; `2` means in downtime.
    #[serde(default)]
    pub downtime: Option<WireValue>,
    /// Present only when acknowledged.
    #[serde(default, deserialize_with = "present")]
    pub acknowledged: bool,
    /// Present only when flapping.
    #[serde(default, deserialize_with = "present")]
    pub flapping: bool,
    /// Opsview internal object id.
    #[serde(default)]
    pub service_object_id: Option<WireValue>,
}

/// A key that is present means true, whatever it holds, `null` included.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer).map(|_| true)
}
