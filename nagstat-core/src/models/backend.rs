//! Backend kinds and per-instance configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::{BackendError, BackendResult};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Backend Kind
// ============================================================================

/// Supported monitoring backend types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Opsview REST/JSON API with token login.
    Opsview,
    /// Thruk CGI/JSON views with basic or form-cookie login.
    Thruk,
}

impl BackendKind {
    /// Returns the display name for this backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Opsview => "Opsview",
            Self::Thruk => "Thruk",
        }
    }

    /// Returns the configuration tag for this backend.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Opsview => "opsview",
            Self::Thruk => "thruk",
        }
    }

    /// Returns all backend kinds.
    pub fn all() -> &'static [BackendKind] {
        &[Self::Opsview, Self::Thruk]
    }

    /// Resolves a configuration tag, ignoring case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.tag().eq_ignore_ascii_case(tag.trim()))
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Backend Config
// ============================================================================

/// Configuration of one monitored backend instance.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Instance name, unique across the configuration.
    pub name: String,
    /// Backend type tag, resolved by the registry.
    pub kind: String,
    /// Base URL of the monitoring web interface.
    pub monitor_url: String,
    /// CGI base URL, for backends that use one.
    #[serde(default)]
    pub monitor_cgi_url: Option<String>,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password or API token.
    #[serde(default)]
    pub password: String,
    /// Whether this instance is polled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl BackendConfig {
    /// Creates a configuration with defaults for the optional fields.
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        monitor_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            monitor_url: monitor_url.into(),
            monitor_cgi_url: None,
            username: String::new(),
            password: String::new(),
            enabled: true,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the CGI base URL.
    pub fn with_cgi_url(mut self, url: impl Into<String>) -> Self {
        self.monitor_cgi_url = Some(url.into());
        self
    }

    /// Resolves the type tag.
    pub fn backend_kind(&self) -> BackendResult<BackendKind> {
        BackendKind::from_tag(&self.kind)
            .ok_or_else(|| BackendError::UnknownBackendType(self.kind.clone()))
    }

    /// Returns the monitor URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.monitor_url.trim_end_matches('/')
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("monitor_url", &self.monitor_url)
            .field("monitor_cgi_url", &self.monitor_cgi_url)
            .field("username", &self.username)
            .field("enabled", &self.enabled)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
