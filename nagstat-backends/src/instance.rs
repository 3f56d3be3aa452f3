//! State shared by every backend variant.
//!
//! A [`BackendInstance`] owns the config, transport and session of one
//! configured backend. Fetch cycles and handshakes are serialized by the
//! cycle lock; the session mutex is only ever held for a few field reads and
//! never across an `.await`.

use nagstat_core::{BackendConfig, BackendError, BackendResult};
use nagstat_fetch::{AuthScheme, Credentials, HttpRequest, RawResponse, Session, SessionState, Transport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};
use url::Url;

/// Config, transport and session of one backend.
pub struct BackendInstance {
    config: BackendConfig,
    transport: Arc<dyn Transport>,
    session: Mutex<Session>,
    cycle: tokio::sync::Mutex<()>,
    checking: AtomicBool,
}

impl BackendInstance {
    /// Creates an instance whose session starts with `scheme`.
    pub fn new(config: BackendConfig, transport: Arc<dyn Transport>, scheme: AuthScheme) -> Self {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        Self {
            config,
            transport,
            session: Mutex::new(Session::new(credentials, scheme)),
            cycle: tokio::sync::Mutex::new(()),
            checking: AtomicBool::new(false),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Returns the instance name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the transport.
    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// Locks the session for a short read or transition.
    pub fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current session state.
    pub fn session_state(&self) -> SessionState {
        self.session().state()
    }

    /// Returns true if the next request needs a handshake first.
    pub fn needs_handshake(&self) -> bool {
        self.session().needs_handshake()
    }

    /// Serializes fetch cycles and handshakes on this instance.
    pub async fn lock_cycle(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.cycle.lock().await
    }

    /// Returns true while a status fetch is running.
    pub fn is_checking(&self) -> bool {
        self.checking.load(Ordering::SeqCst)
    }

    /// Marks a status fetch as running until the guard is dropped.
    pub fn begin_check(&self) -> CheckingGuard<'_> {
        self.checking.store(true, Ordering::SeqCst);
        CheckingGuard {
            flag: &self.checking,
        }
    }

    /// Joins `path` onto the configured monitor URL.
    pub fn monitor_url(&self, path: &str) -> BackendResult<Url> {
        join_url(self.config.base_url(), path)
    }

    /// Sends a request with the session's auth headers attached.
    pub async fn send(&self, request: HttpRequest) -> BackendResult<RawResponse> {
        let headers = self.session().auth_headers();
        let request = request.headers(headers);
        debug!(
            backend = %self.config.name,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );
        let response = self.transport.fetch(request).await?;
        debug!(backend = %self.config.name, status = response.status, "Received response");
        Ok(response)
    }

    /// Sends a request and rejects non-2xx answers.
    ///
    /// 401/403 expire the session so the next call re-authenticates.
    pub async fn send_checked(&self, request: HttpRequest) -> BackendResult<RawResponse> {
        let response = self.send(request).await?;
        if response.is_unauthorized() {
            warn!(backend = %self.config.name, status = response.status, "Credentials rejected");
            self.session().expire();
            return Err(BackendError::Auth(format!("HTTP {}", response.status)));
        }
        if !response.is_success() {
            return Err(BackendError::Transport(format!("HTTP {}", response.status)));
        }
        Ok(response)
    }
}

/// Resets the checking flag on drop, including on early error returns.
pub struct CheckingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for CheckingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Joins a base URL and a path that may carry a query string.
pub fn join_url(base: &str, path: &str) -> BackendResult<Url> {
    let base = base.trim_end_matches('/');
    Url::parse(&format!("{base}{path}"))
        .map_err(|e| BackendError::InvalidConfig(format!("invalid URL '{base}{path}': {e}")))
}
