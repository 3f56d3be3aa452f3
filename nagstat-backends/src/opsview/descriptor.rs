//! Opsview backend descriptor.

use nagstat_core::{BackendConfig, BackendKind};
use nagstat_fetch::{AuthScheme, Transport};
use std::sync::Arc;

use super::backend::OpsviewBackend;
use super::commands::CAPABILITIES;
use crate::adapter::BackendAdapter;
use crate::descriptor::BackendDescriptor;

/// Describes the Opsview backend.
pub fn opsview_descriptor() -> BackendDescriptor {
    BackendDescriptor {
        kind: BackendKind::Opsview,
        auth_scheme: AuthScheme::Token,
        capabilities: &CAPABILITIES,
        build: build_opsview,
    }
}

fn build_opsview(config: BackendConfig, transport: Arc<dyn Transport>) -> Box<dyn BackendAdapter> {
    Box::new(OpsviewBackend::new(config, transport))
}
