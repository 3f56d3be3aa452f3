//! Opsview adapter.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Local};
use nagstat_core::{
    Acknowledgement, BackendConfig, BackendError, BackendKind, BackendResult, Capabilities,
    CheckResult, Downtime, HostMap, Target,
};
use nagstat_fetch::{AuthScheme, HttpRequest, SessionState, Transport};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::api::{
    ACKNOWLEDGE_PATH, CHECK_RESULT_PATH, DOWNTIME_PATH, LOGIN_PATH, LoginResponse, RECHECK_PATH,
    STATUS_PATH, TOKEN_HEADER, USERNAME_HEADER,
};
use super::commands::{self, CAPABILITIES, Params};
use super::parser;
use crate::adapter::BackendAdapter;
use crate::instance::BackendInstance;

/// Opsview REST adapter with token authentication.
///
/// The token is fetched on first use and kept until the server rejects it.
pub struct OpsviewBackend {
    instance: BackendInstance,
}

impl OpsviewBackend {
    /// Creates an adapter for `config` using `transport`.
    pub fn new(config: BackendConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            instance: BackendInstance::new(config, transport, AuthScheme::Token),
        }
    }

    /// Runs the login handshake if no token is held. Caller holds the cycle lock.
    async fn handshake(&self) -> BackendResult<()> {
        let started = self.instance.session().begin_handshake();
        if !started {
            return Ok(());
        }

        match self.login().await {
            Ok(headers) => {
                self.instance.session().complete_with_headers(headers);
                info!(backend = %self.instance.name(), "Opsview login succeeded");
                Ok(())
            }
            Err(e) => {
                self.instance.session().fail();
                warn!(backend = %self.instance.name(), error = %e, "Opsview login failed");
                Err(e)
            }
        }
    }

    async fn login(&self) -> BackendResult<Vec<(String, String)>> {
        let username = self.instance.config().username.clone();
        let password = self.instance.config().password.clone();
        let url = self.instance.monitor_url(LOGIN_PATH)?;
        let request = HttpRequest::post(url).form([
            ("username", username.clone()),
            ("password", password),
        ]);

        let response = self.instance.send(request).await?;
        if !response.is_success() {
            return Err(BackendError::Auth(format!("login returned HTTP {}", response.status)));
        }

        let login: LoginResponse = serde_json::from_str(&response.body)
            .map_err(|e| BackendError::Auth(format!("unexpected login response: {e}")))?;
        let token = login
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BackendError::Auth("login response carried no token".to_string()))?;

        debug!(backend = %self.instance.name(), "Fetched login token");
        Ok(vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            (USERNAME_HEADER.to_string(), username),
            (TOKEN_HEADER.to_string(), token),
        ])
    }

    /// Makes sure a token is held before a command is sent.
    ///
    /// Commands only wait on the cycle lock when a handshake is needed.
    async fn ensure_session(&self) -> BackendResult<()> {
        let ready = self.instance.session().is_authenticated();
        if ready {
            return Ok(());
        }
        let _cycle = self.instance.lock_cycle().await;
        self.handshake().await
    }

    async fn poll(&self) -> BackendResult<HostMap> {
        self.handshake().await?;
        let url = self.instance.monitor_url(STATUS_PATH)?;
        let response = self.instance.send_checked(HttpRequest::get(url)).await?;
        parser::parse_status(&response.body, self.instance.name())
    }

    async fn send_command(&self, path: &str, params: Params) -> BackendResult<()> {
        self.ensure_session().await?;
        let mut url = self.instance.monitor_url(path)?;
        url.query_pairs_mut().extend_pairs(params.iter());
        self.instance.send_checked(HttpRequest::post(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl BackendAdapter for OpsviewBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Opsview
    }

    fn name(&self) -> &str {
        self.instance.name()
    }

    fn capabilities(&self) -> &'static Capabilities {
        &CAPABILITIES
    }

    fn is_checking(&self) -> bool {
        self.instance.is_checking()
    }

    fn session_state(&self) -> SessionState {
        self.instance.session_state()
    }

    fn default_downtime_window(&self, now: DateTime<Local>) -> (DateTime<Local>, DateTime<Local>) {
        (now, now + Duration::hours(24))
    }

    #[instrument(skip(self), fields(backend = %self.instance.name()))]
    async fn authenticate(&self) -> BackendResult<()> {
        let _cycle = self.instance.lock_cycle().await;
        self.handshake().await
    }

    #[instrument(skip(self), fields(backend = %self.instance.name()))]
    async fn fetch_status(&self) -> BackendResult<HostMap> {
        let _cycle = self.instance.lock_cycle().await;
        let _checking = self.instance.begin_check();

        let result = self.poll().await;
        match &result {
            Ok(hosts) => debug!(hosts = hosts.len(), "Status fetched"),
            Err(e) => warn!(error = %e, "Status fetch failed"),
        }
        result
    }

    #[instrument(skip(self, ack), fields(backend = %self.instance.name(), target = %ack.target))]
    async fn acknowledge(&self, ack: &Acknowledgement) -> BackendResult<()> {
        CAPABILITIES.validate_acknowledgement(ack)?;
        self.send_command(ACKNOWLEDGE_PATH, commands::acknowledge_params(ack))
            .await
    }

    #[instrument(skip(self, downtime), fields(backend = %self.instance.name(), target = %downtime.target))]
    async fn schedule_downtime(&self, downtime: &Downtime) -> BackendResult<()> {
        CAPABILITIES.validate_downtime(downtime)?;
        self.send_command(DOWNTIME_PATH, commands::downtime_params(downtime))
            .await
    }

    #[instrument(skip(self), fields(backend = %self.instance.name()))]
    async fn force_recheck(&self, target: &Target) -> BackendResult<()> {
        nagstat_core::models::require_host(target)?;
        self.send_command(RECHECK_PATH, commands::recheck_params(target))
            .await
    }

    #[instrument(skip(self, result), fields(backend = %self.instance.name(), target = %result.target))]
    async fn submit_check_result(&self, result: &CheckResult) -> BackendResult<()> {
        CAPABILITIES.validate_check_result(result)?;
        let params = commands::check_result_params(result)?;
        self.send_command(CHECK_RESULT_PATH, params).await
    }
}
