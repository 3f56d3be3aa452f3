//! Thruk backend descriptor.

use nagstat_core::{BackendConfig, BackendKind};
use nagstat_fetch::{AuthScheme, Transport};
use std::sync::Arc;

use super::backend::ThrukBackend;
use super::commands::CAPABILITIES;
use crate::adapter::BackendAdapter;
use crate::descriptor::BackendDescriptor;

/// Describes the Thruk backend.
pub fn thruk_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        kind: BackendKind::Thruk,
        auth_scheme: AuthScheme::Basic,
        capabilities: &CAPABILITIES,
        build: build_thruk,
    }
}

fn build_thruk(config: BackendConfig, transport: Arc<dyn Transport>) -> Box<dyn BackendAdapter> {
    Box::new(ThrukBackend::new(config, transport))
}
