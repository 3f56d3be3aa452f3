//! The contract every backend variant implements.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use nagstat_core::{
    Acknowledgement, BackendKind, BackendResult, Capabilities, CheckResult, Downtime, HostMap,
    Target,
};
use nagstat_fetch::SessionState;

/// One configured monitoring backend.
///
/// Every operation reports failure through [`BackendResult`]; nothing
/// escapes as a panic. Status fetches on one instance are serialized, while
/// commands reuse the established session and may run alongside a fetch.
#[async_trait]
pub trait BackendAdapter: Send + Sync {
    /// Returns the backend type.
    fn kind(&self) -> BackendKind;

    /// Returns the configured instance name.
    fn name(&self) -> &str;

    /// Returns the command fields this backend accepts.
    fn capabilities(&self) -> &'static Capabilities;

    /// Returns true while a status fetch is in flight.
    fn is_checking(&self) -> bool;

    /// Returns the current session state.
    fn session_state(&self) -> SessionState;

    /// Returns the default downtime window starting at `now`.
    fn default_downtime_window(&self, now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
        (now, now + Duration::hours(2))
    }

    /// Drives the session to `Authenticated`, performing a handshake if needed.
    async fn authenticate(&self) -> BackendResult<()>;

    /// Fetches and normalizes the current problem state.
    async fn fetch_status(&self) -> BackendResult<HostMap>;

    /// Acknowledges a host or service problem.
    async fn acknowledge(&self, ack: &Acknowledgement) -> BackendResult<()>;

    /// Schedules a downtime.
    async fn schedule_downtime(&self, downtime: &Downtime) -> BackendResult<()>;

    /// Forces an immediate recheck.
    async fn force_recheck(&self, target: &Target) -> BackendResult<()>;

    /// Submits a passive check result.
    async fn submit_check_result(&self, result: &CheckResult) -> BackendResult<()>;
}
