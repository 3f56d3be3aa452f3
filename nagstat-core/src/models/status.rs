//! Status vocabulary shared by every backend.
//!
//! This module contains the closed set of states an adapter may produce:
//! - [`Status`] - Host and service states
//! - [`StatusType`] - Soft/hard state classification
//! - [`Attempt`] - Current/max check attempt pair

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Status
// ============================================================================

/// Normalized monitoring state.
///
/// Hosts normally report `Up`, `Down`, `Unreachable` or `Pending`; services
/// report `Ok`, `Warning`, `Critical` or `Unknown`. Some backends report host
/// rows in the service vocabulary, so both live in one enum and each adapter
/// declares which wire codes map to which member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// Host is up.
    Up,
    /// Host is down.
    Down,
    /// Host is unreachable.
    Unreachable,
    /// Not checked yet.
    Pending,
    /// Service is fine.
    Ok,
    /// Service warning.
    Warning,
    /// Service critical.
    Critical,
    /// Service state unknown.
    Unknown,
}

impl Status {
    /// Returns the canonical upper-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Unreachable => "UNREACHABLE",
            Self::Pending => "PENDING",
            Self::Ok => "OK",
            Self::Warning => "WARNING",
            Self::Critical => "CRITICAL",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Returns a severity score (0 = healthy, 4 = worst).
    pub fn severity(&self) -> u8 {
        match self {
            Self::Up | Self::Ok => 0,
            Self::Pending => 1,
            Self::Unknown => 2,
            Self::Warning => 3,
            Self::Down | Self::Unreachable | Self::Critical => 4,
        }
    }

    /// Returns the plugin return code used when submitting check results.
    ///
    /// Host and service vocabularies share the codes 0..=2; `Pending` has
    /// no code and cannot be submitted.
    pub fn plugin_code(&self) -> Option<u8> {
        match self {
            Self::Up | Self::Ok => Some(0),
            Self::Down | Self::Warning => Some(1),
            Self::Unreachable | Self::Critical => Some(2),
            Self::Unknown => Some(3),
            Self::Pending => None,
        }
    }

    /// Returns true if this state needs attention.
    pub fn is_problem(&self) -> bool {
        !matches!(self, Self::Up | Self::Ok | Self::Pending)
    }

    /// Returns true if this is a host-vocabulary state.
    pub fn is_host_state(&self) -> bool {
        matches!(self, Self::Up | Self::Down | Self::Unreachable | Self::Pending)
    }

    /// Returns every member in declaration order.
    pub fn all() -> &'static [Status] {
        &[
            Self::Up,
            Self::Down,
            Self::Unreachable,
            Self::Pending,
            Self::Ok,
            Self::Warning,
            Self::Critical,
            Self::Unknown,
        ]
    }

    /// Looks up a state by its label, ignoring case.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(label))
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Status Type
// ============================================================================

/// Whether a state is still within its retry window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatusType {
    /// Still retrying.
    Soft,
    /// Confirmed after max attempts.
    Hard,
}

impl StatusType {
    /// Parses `soft`/`hard` in any case.
    pub fn from_label(label: &str) -> Option<Self> {
        if label.eq_ignore_ascii_case("soft") {
            Some(Self::Soft)
        } else if label.eq_ignore_ascii_case("hard") {
            Some(Self::Hard)
        } else {
            None
        }
    }

    /// Parses the Nagios numeric encoding (0 = soft, 1 = hard).
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Soft),
            1 => Some(Self::Hard),
            _ => None,
        }
    }

    /// Returns the upper-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Soft => "SOFT",
            Self::Hard => "HARD",
        }
    }
}

impl fmt::Display for StatusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Attempt
// ============================================================================

/// Current/max check attempt pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attempt {
    /// Current attempt.
    pub current: u32,
    /// Attempts before the state turns hard.
    pub max: u32,
}

impl Attempt {
    /// Creates a new attempt pair.
    pub fn new(current: u32, max: u32) -> Self {
        Self { current, max }
    }
}

impl fmt::Display for Attempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.current, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_label() {
        assert_eq!(Status::from_label("critical"), Some(Status::Critical));
        assert_eq!(Status::from_label("UP"), Some(Status::Up));
        assert_eq!(Status::from_label("broken"), None);
    }

    #[test]
    fn test_status_severity_order() {
        assert!(Status::Critical.severity() > Status::Warning.severity());
        assert!(Status::Warning.severity() > Status::Unknown.severity());
        assert_eq!(Status::Ok.severity(), Status::Up.severity());
    }

    #[test]
    fn test_plugin_codes() {
        assert_eq!(Status::Ok.plugin_code(), Some(0));
        assert_eq!(Status::Down.plugin_code(), Some(1));
        assert_eq!(Status::Critical.plugin_code(), Some(2));
        assert_eq!(Status::Unknown.plugin_code(), Some(3));
        assert_eq!(Status::Pending.plugin_code(), None);
    }

    #[test]
    fn test_status_type() {
        assert_eq!(StatusType::from_label("hard"), Some(StatusType::Hard));
        assert_eq!(StatusType::from_code(0), Some(StatusType::Soft));
        assert_eq!(StatusType::from_code(7), None);
        assert_eq!(StatusType::Hard.to_string(), "HARD");
    }

    #[test]
    fn test_attempt_display() {
        assert_eq!(Attempt::new(2, 3).to_string(), "2/3");
    }

    #[test]
    fn test_status_serializes_upper_case() {
        let json = serde_json::to_string(&Status::Unreachable).unwrap();
        assert_eq!(json, "\"UNREACHABLE\"");
    }
}
