// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # nagstat Backends
//!
//! Monitoring backend adapters for nagstat.
//!
//! Every backend implements [`BackendAdapter`]: authenticate, fetch a
//! normalized [`HostMap`](nagstat_core::HostMap), and issue commands. The
//! [`BackendRegistry`] builds the right adapter for a configured type tag.
//!
//! ## Supported Backends
//!
//! | Backend | Wire format | Authentication |
//! |---------|-------------|----------------|
//! | Opsview | REST/JSON   | Login token headers |
//! | Thruk   | CGI/JSON    | Basic auth or form-login cookie |
//!
//! ## Example
//!
//! ```ignore
//! use nagstat_backends::BackendRegistry;
//! use nagstat_core::BackendConfig;
//!
//! let config = BackendConfig::new("prod", "thruk", "https://thruk.example.com/thruk")
//!     .with_credentials("admin", "secret");
//! let backend = BackendRegistry::create_http(config)?;
//! backend.authenticate().await?;
//! let hosts = backend.fetch_status().await?;
//! ```

pub mod adapter;
pub mod descriptor;
pub mod instance;
pub mod registry;
pub mod wire;

pub mod opsview;
pub mod thruk;

pub use adapter::BackendAdapter;
pub use descriptor::BackendDescriptor;
pub use registry::BackendRegistry;

pub use opsview::{OPSVIEW_CAPABILITIES, OpsviewBackend};
pub use thruk::{THRUK_CAPABILITIES, ThrukBackend};
