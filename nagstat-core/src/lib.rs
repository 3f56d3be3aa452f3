// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # nagstat Core
//!
//! Core types and models shared by every nagstat crate.
//!
//! This crate provides the normalized status model every backend adapter
//! produces and every consumer reads:
//!
//! - Domain models (hosts, services, status vocabulary)
//! - Command payloads and per-backend capability declarations
//! - Backend kinds and instance configuration
//! - The error type every backend operation returns
//!
//! ## Key Types
//!
//! ### Status Model
//! - [`Host`] / [`Service`] - Normalized entities
//! - [`HostMap`] - Fresh per poll cycle, keyed by host name
//! - [`Status`], [`StatusType`], [`Attempt`] - Closed status vocabulary
//!
//! ### Commands
//! - [`Target`] - Host or host/service
//! - [`Acknowledgement`], [`Downtime`], [`CheckResult`] - Payloads
//! - [`Capabilities`] - Fields a backend accepts per command
//!
//! ### Backends
//! - [`BackendKind`] - Supported backend types
//! - [`BackendConfig`] - One configured instance
//! - [`BackendError`] / [`BackendResult`] - Uniform error protocol

pub mod duration;
pub mod error;
pub mod models;

// Re-export error types
pub use error::{BackendError, BackendResult};

// Re-export all model types
pub use models::{
    // Status model
    Attempt,
    Host,
    HostMap,
    Service,
    ServiceExtension,
    Status,
    StatusType,
    // Commands
    Acknowledgement,
    Capabilities,
    CheckResult,
    CommandField,
    CommandKind,
    Downtime,
    Target,
    // Backends
    BackendConfig,
    BackendKind,
};
