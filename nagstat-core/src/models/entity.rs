//! Host and service entities.
//!
//! Every adapter produces a fresh [`HostMap`] per poll cycle. Constructors
//! default every flag to `false` and every optional attribute to absent, so a
//! partial backend row never leaves a field in an undefined state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::status::{Attempt, Status, StatusType};

/// Hosts of one backend keyed by host name.
pub type HostMap = BTreeMap<String, Host>;

// ============================================================================
// Host
// ============================================================================

/// A monitored host and the services attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    /// Host name, unique per backend.
    pub name: String,
    /// Name of the backend instance this host came from.
    pub server: String,
    /// Current state.
    pub status: Status,
    /// Soft or hard.
    pub status_type: Option<StatusType>,
    /// Time of the last check.
    pub last_check: Option<DateTime<Utc>>,
    /// Human-readable time in the current state.
    pub duration: String,
    /// Check attempt pair.
    pub attempt: Option<Attempt>,
    /// Single-line plugin output.
    pub status_information: String,
    /// Problem has been acknowledged.
    pub acknowledged: bool,
    /// Host is in scheduled downtime.
    pub scheduled_downtime: bool,
    /// Host is flapping.
    pub flapping: bool,
    /// Notifications are disabled.
    pub notifications_disabled: bool,
    /// Active checks disabled, fed by passive results only.
    pub passiveonly: bool,
    /// Services keyed by service name.
    pub services: BTreeMap<String, Service>,
}

impl Host {
    /// Creates a host with the given state and all flags cleared.
    pub fn new(name: impl Into<String>, server: impl Into<String>, status: Status) -> Self {
        Self {
            name: name.into(),
            server: server.into(),
            status,
            status_type: None,
            last_check: None,
            duration: String::new(),
            attempt: None,
            status_information: String::new(),
            acknowledged: false,
            scheduled_downtime: false,
            flapping: false,
            notifications_disabled: false,
            passiveonly: false,
            services: BTreeMap::new(),
        }
    }

    /// Creates a host that is only known through its services.
    ///
    /// Absence of host-level failure data is taken to mean the host is up.
    pub fn synthesized(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self::new(name, server, Status::Up)
    }

    /// Inserts a service, replacing any previous one with the same name.
    pub fn add_service(&mut self, service: Service) {
        self.services.insert(service.name.clone(), service);
    }

    /// Returns true if the host itself is in a problem state.
    pub fn is_problem(&self) -> bool {
        self.status.is_problem()
    }

    /// Counts the host (if failing) plus its failing services.
    pub fn problem_count(&self) -> usize {
        usize::from(self.is_problem())
            + self.services.values().filter(|s| s.status.is_problem()).count()
    }

    /// Returns the worst state among the host and its services.
    pub fn worst_status(&self) -> Status {
        self.services
            .values()
            .map(|s| s.status)
            .chain(std::iter::once(self.status))
            .max_by_key(Status::severity)
            .unwrap_or(self.status)
    }
}

// ============================================================================
// Service
// ============================================================================

/// Backend-owned extra data attached to a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum ServiceExtension {
    /// Opsview internal object id, required to submit check results.
    Opsview {
        /// Opsview `service_object_id`.
        service_object_id: String,
    },
}

/// A service check on a host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Owning host name.
    pub host: String,
    /// Service name, unique per host.
    pub name: String,
    /// Name of the backend instance this service came from.
    pub server: String,
    /// Current state.
    pub status: Status,
    /// Soft or hard.
    pub status_type: Option<StatusType>,
    /// Time of the last check.
    pub last_check: Option<DateTime<Utc>>,
    /// Human-readable time in the current state.
    pub duration: String,
    /// Check attempt pair.
    pub attempt: Option<Attempt>,
    /// Single-line plugin output.
    pub status_information: String,
    /// Problem has been acknowledged.
    pub acknowledged: bool,
    /// Service is in scheduled downtime.
    pub scheduled_downtime: bool,
    /// Service is flapping.
    pub flapping: bool,
    /// Notifications are disabled.
    pub notifications_disabled: bool,
    /// Active checks disabled, fed by passive results only.
    pub passiveonly: bool,
    /// Backend-specific data, if any.
    pub extension: Option<ServiceExtension>,
}

impl Service {
    /// Creates a service with the given state and all flags cleared.
    pub fn new(
        host: impl Into<String>,
        name: impl Into<String>,
        server: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            host: host.into(),
            name: name.into(),
            server: server.into(),
            status,
            status_type: None,
            last_check: None,
            duration: String::new(),
            attempt: None,
            status_information: String::new(),
            acknowledged: false,
            scheduled_downtime: false,
            flapping: false,
            notifications_disabled: false,
            passiveonly: false,
            extension: None,
        }
    }

    /// Returns the Opsview object id, if this service carries one.
    pub fn opsview_object_id(&self) -> Option<&str> {
        match &self.extension {
            Some(ServiceExtension::Opsview { service_object_id }) => Some(service_object_id),
            None => None,
        }
    }
}

/// Collapses plugin output into a single trimmed line.
pub fn single_line(text: &str) -> String {
    text.replace('\n', " ").trim().to_string()
}
