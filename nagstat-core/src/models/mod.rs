//! Domain models for nagstat.
//!
//! ## Submodules
//!
//! - [`status`] - Shared status vocabulary (Status, StatusType, Attempt)
//! - [`entity`] - Host and service entities
//! - [`command`] - Command payloads and capabilities
//! - [`backend`] - Backend kinds and configuration

mod backend;
mod command;
mod entity;
mod status;

pub use backend::{BackendConfig, BackendKind};
pub use command::{
    Acknowledgement, Capabilities, CheckResult, CommandField, CommandKind, Downtime, Target, require_host,
};
pub use entity::{Host, HostMap, Service, ServiceExtension, single_line};
pub use status::{Attempt, Status, StatusType};
