//! Backend registry.
//!
//! Maps configured type tags to adapter constructors. An unknown tag is a
//! configuration error reported before any network activity.

use nagstat_core::{BackendConfig, BackendError, BackendKind, BackendResult};
use nagstat_fetch::{HttpTransport, Transport, TransportSettings};
use std::sync::{Arc, OnceLock};
use tracing::debug;
use url::Url;

use crate::adapter::BackendAdapter;
use crate::descriptor::BackendDescriptor;
use crate::opsview::opsview_descriptor;
use crate::thruk::thruk_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

/// Static storage for all backend descriptors.
static DESCRIPTORS: OnceLock<Vec<BackendDescriptor>> = OnceLock::new();

fn init_descriptors() -> Vec<BackendDescriptor> {
    vec![opsview_descriptor(), thruk_descriptor()]
}

// ============================================================================
// Backend Registry
// ============================================================================

/// Global registry of backend descriptors.
pub struct BackendRegistry;

impl BackendRegistry {
    /// Returns all backend descriptors.
    pub fn all() -> &'static [BackendDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a descriptor by kind.
    pub fn get(kind: BackendKind) -> Option<&'static BackendDescriptor> {
        Self::all().iter().find(|d| d.kind == kind)
    }

    /// Looks up a descriptor by configuration tag, ignoring case.
    pub fn get_by_tag(tag: &str) -> Option<&'static BackendDescriptor> {
        Self::get(BackendKind::from_tag(tag)?)
    }

    /// Returns the number of registered backends.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all registered kinds.
    pub fn kinds() -> Vec<BackendKind> {
        Self::all().iter().map(|d| d.kind).collect()
    }

    /// Builds an adapter for `config` on the given transport.
    pub fn create(
        config: BackendConfig,
        transport: Arc<dyn Transport>,
    ) -> BackendResult<Box<dyn BackendAdapter>> {
        let descriptor = Self::get_by_tag(&config.kind)
            .ok_or_else(|| BackendError::UnknownBackendType(config.kind.clone()))?;
        validate(&config)?;

        debug!(
            backend = %config.name,
            kind = descriptor.tag(),
            auth = descriptor.auth_scheme.label(),
            "Creating backend adapter"
        );
        Ok(descriptor.create(config, transport))
    }

    /// Builds an adapter with its own HTTP transport and cookie jar.
    pub fn create_http(config: BackendConfig) -> BackendResult<Box<dyn BackendAdapter>> {
        Self::get_by_tag(&config.kind)
            .ok_or_else(|| BackendError::UnknownBackendType(config.kind.clone()))?;
        let settings = TransportSettings::default().with_timeout(config.timeout());
        let transport = HttpTransport::new(settings)
            .map_err(|e| BackendError::InvalidConfig(e.to_string()))?;
        Self::create(config, Arc::new(transport))
    }
}

fn validate(config: &BackendConfig) -> BackendResult<()> {
    if config.name.trim().is_empty() {
        return Err(BackendError::InvalidConfig("backend name is empty".to_string()));
    }
    Url::parse(config.base_url()).map_err(|e| {
        BackendError::InvalidConfig(format!(
            "{}: invalid monitor URL '{}': {e}",
            config.name, config.monitor_url
        ))
    })?;
    if let Some(cgi) = config.monitor_cgi_url.as_deref().filter(|u| !u.trim().is_empty()) {
        Url::parse(cgi).map_err(|e| {
            BackendError::InvalidConfig(format!("{}: invalid CGI URL '{cgi}': {e}", config.name))
        })?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nagstat_fetch::ScriptedTransport;

    #[test]
    fn test_registry_has_both_backends() {
        assert_eq!(BackendRegistry::count(), 2);
        assert_eq!(
            BackendRegistry::kinds(),
            vec![BackendKind::Opsview, BackendKind::Thruk]
        );
    }

    #[test]
    fn test_lookup_by_tag() {
        let desc = BackendRegistry::get_by_tag("Thruk").unwrap();
        assert_eq!(desc.kind, BackendKind::Thruk);
        assert_eq!(desc.display_name(), "Thruk");
        assert!(BackendRegistry::get_by_tag("icinga").is_none());
    }

    #[test]
    fn test_unknown_tag_fails_before_network() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = BackendConfig::new("x", "zabbix", "https://mon.example.com");
        let result = BackendRegistry::create(config, Arc::clone(&transport) as Arc<dyn Transport>);
        assert!(matches!(result, Err(BackendError::UnknownBackendType(tag)) if tag == "zabbix"));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let config = BackendConfig::new("x", "opsview", "not a url");
        let result = BackendRegistry::create(config, Arc::new(ScriptedTransport::new()));
        assert!(matches!(result, Err(BackendError::InvalidConfig(_))));
    }

    #[test]
    fn test_creates_matching_variant() {
        let config = BackendConfig::new("ops", "opsview", "https://mon.example.com");
        let adapter = BackendRegistry::create(config, Arc::new(ScriptedTransport::new())).unwrap();
        assert_eq!(adapter.kind(), BackendKind::Opsview);
        assert_eq!(adapter.name(), "ops");
        assert!(!adapter.is_checking());
    }
}
