//! Backend descriptor system.
//!
//! A descriptor holds the static facts about one backend type:
//! - Kind and display name
//! - Initial authentication scheme
//! - Command capabilities
//! - Adapter constructor

use nagstat_core::{BackendConfig, BackendKind, Capabilities};
use nagstat_fetch::{AuthScheme, Transport};
use std::sync::Arc;

use crate::adapter::BackendAdapter;

/// Constructor for one adapter variant.
pub type BuildAdapter = fn(BackendConfig, Arc<dyn Transport>) -> Box<dyn BackendAdapter>;

/// Static description of a backend type.
pub struct BackendDescriptor {
    /// Backend identifier.
    pub kind: BackendKind,
    /// Scheme a fresh session starts with.
    pub auth_scheme: AuthScheme,
    /// Command fields the backend accepts.
    pub capabilities: &'static Capabilities,
    /// Builds an adapter instance.
    pub build: BuildAdapter,
}

impl BackendDescriptor {
    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        self.kind.display_name()
    }

    /// Returns the configuration tag.
    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }

    /// Builds an adapter for `config`.
    pub fn create(&self, config: BackendConfig, transport: Arc<dyn Transport>) -> Box<dyn BackendAdapter> {
        (self.build)(config, transport)
    }
}

impl std::fmt::Debug for BackendDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendDescriptor")
            .field("kind", &self.kind)
            .field("auth_scheme", &self.auth_scheme)
            .field("capabilities", &self.capabilities)
            .finish_non_exhaustive()
    }
}
