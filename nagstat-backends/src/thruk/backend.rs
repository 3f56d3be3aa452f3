//! Thruk adapter.

use async_trait::async_trait;
use chrono::{Local, Utc};
use nagstat_core::{
    Acknowledgement, BackendConfig, BackendError, BackendKind, BackendResult, Capabilities,
    CheckResult, Downtime, HostMap, Target,
};
use nagstat_fetch::{AuthScheme, HttpRequest, SessionState, Transport};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::api::{COMMAND_PATH, DEFAULT_CGI_PATH, HOSTS_PATH, LOGIN_PATH, SERVICES_PATH};
use super::commands::{self, CAPABILITIES, Form};
use super::parser::{self, Payload};
use crate::adapter::BackendAdapter;
use crate::instance::{BackendInstance, join_url};

/// Thruk CGI adapter.
///
/// Sessions start with basic auth. The first handshake, from a poll or a
/// command, probes the form login; if the server hands out a cookie, the
/// adapter switches to cookie sessions. A login page where JSON or a command
/// result was expected forces cookie mode too.
pub struct ThrukBackend {
    instance: BackendInstance,
    cgi_url: String,
    probed: AtomicBool,
}

impl ThrukBackend {
    /// Creates an adapter for `config` using `transport`.
    pub fn new(config: BackendConfig, transport: Arc<dyn Transport>) -> Self {
        let cgi_url = cgi_url(&config);
        Self {
            instance: BackendInstance::new(config, transport, AuthScheme::Basic),
            cgi_url,
            probed: AtomicBool::new(false),
        }
    }

    /// Returns the CGI base URL.
    pub fn cgi_url(&self) -> &str {
        &self.cgi_url
    }

    fn cgi(&self, path: &str) -> BackendResult<Url> {
        join_url(&self.cgi_url, path)
    }

    /// Probes and performs the form login as needed. Caller holds the cycle lock.
    async fn handshake(&self) -> BackendResult<()> {
        if !self.probed.swap(true, Ordering::SeqCst) {
            self.probe_form_login().await;
        }

        let started = self.instance.session().begin_handshake();
        if !started {
            return Ok(());
        }

        match self.form_login().await {
            Ok(()) => {
                self.instance.session().complete();
                info!(backend = %self.instance.name(), "Thruk form login succeeded");
                Ok(())
            }
            Err(e) => {
                self.instance.session().fail();
                warn!(backend = %self.instance.name(), error = %e, "Thruk form login failed");
                Err(e)
            }
        }
    }

    // A failed probe leaves basic auth in place.
    async fn probe_form_login(&self) {
        match self.form_login().await {
            Ok(()) => {
                let mut session = self.instance.session();
                session.switch_scheme(AuthScheme::FormCookie);
                session.complete();
                drop(session);
                info!(backend = %self.instance.name(), "Server set a session cookie, using form login");
            }
            Err(e) => {
                debug!(backend = %self.instance.name(), error = %e, "No cookie from form login, using basic auth");
            }
        }
    }

    /// Posts the login form and checks that a cookie came back.
    async fn form_login(&self) -> BackendResult<()> {
        let config = self.instance.config();
        let url = self.cgi(LOGIN_PATH)?;
        let request = HttpRequest::post(url).form([
            ("login", config.username.clone()),
            ("password", config.password.clone()),
            ("submit", "Login".to_string()),
            ("referer", String::new()),
        ]);
        self.instance.send(request).await?;

        let cookie_url = self.cgi("/")?;
        if self.instance.transport().has_cookies(&cookie_url) {
            Ok(())
        } else {
            Err(BackendError::Auth(
                "form login did not set a session cookie".to_string(),
            ))
        }
    }

    /// Makes sure a session exists before a command is sent.
    ///
    /// A fresh instance runs the form-login probe first.
    async fn ensure_session(&self) -> BackendResult<()> {
        let ready =
            self.probed.load(Ordering::SeqCst) && self.instance.session().is_authenticated();
        if ready {
            return Ok(());
        }
        let _cycle = self.instance.lock_cycle().await;
        self.handshake().await
    }

    fn login_page_seen(&self) -> BackendError {
        self.instance.session().switch_scheme(AuthScheme::FormCookie);
        BackendError::SessionExpired
    }

    /// Fetches one status view, treating a login page as an expired session.
    async fn fetch_view(&self, path: &str) -> BackendResult<String> {
        let url = self.cgi(path)?;
        let response = self.instance.send(HttpRequest::get(url)).await?;

        if parser::classify(&response.body) == Payload::Markup {
            warn!(backend = %self.instance.name(), "Got a login page, switching to form login");
            return Err(self.login_page_seen());
        }
        if response.is_unauthorized() {
            self.instance.session().expire();
            return Err(BackendError::Auth(format!("HTTP {}", response.status)));
        }
        if !response.is_success() {
            return Err(BackendError::Transport(format!("HTTP {}", response.status)));
        }
        Ok(response.body)
    }

    async fn poll(&self) -> BackendResult<HostMap> {
        self.handshake().await?;
        let hosts_raw = self.fetch_view(HOSTS_PATH).await?;
        let services_raw = self.fetch_view(SERVICES_PATH).await?;
        parser::parse_status(&hosts_raw, &services_raw, self.instance.name(), Utc::now())
    }

    async fn send_command(&self, form: Form) -> BackendResult<()> {
        self.ensure_session().await?;
        let url = self.cgi(COMMAND_PATH)?;
        let response = self
            .instance
            .send_checked(HttpRequest::post(url).form(form))
            .await?;

        // cmd.cgi answers with HTML either way; only the login form means rejection.
        if parser::is_login_page(&response.body) {
            warn!(backend = %self.instance.name(), "Command answered with a login page, switching to form login");
            return Err(self.login_page_seen());
        }
        Ok(())
    }
}

/// Returns the configured CGI URL or `{monitor_url}/cgi-bin`.
fn cgi_url(config: &BackendConfig) -> String {
    match config.monitor_cgi_url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
        _ => format!("{}{DEFAULT_CGI_PATH}", config.base_url()),
    }
}

#[async_trait]
impl BackendAdapter for ThrukBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Thruk
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
        self.send_command(commands::acknowledge_form(ack)).await
    }

    #[instrument(skip(self, downtime), fields(backend = %self.instance.name(), target = %downtime.target))]
    async fn schedule_downtime(&self, downtime: &Downtime) -> BackendResult<()> {
        CAPABILITIES.validate_downtime(downtime)?;
        self.send_command(commands::downtime_form(downtime)).await
    }

    #[instrument(skip(self), fields(backend = %self.instance.name()))]
    async fn force_recheck(&self, target: &Target) -> BackendResult<()> {
        nagstat_core::models::require_host(target)?;
        self.send_command(commands::recheck_form(target, Local::now()))
            .await
    }

    #[instrument(skip(self, result), fields(backend = %self.instance.name(), target = %result.target))]
    async fn submit_check_result(&self, result: &CheckResult) -> BackendResult<()> {
        CAPABILITIES.validate_check_result(result)?;
        let form = commands::check_result_form(result)?;
        self.send_command(form).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nagstat_core::Status;
    use nagstat_fetch::ScriptedTransport;

    fn backend(transport: &Arc<ScriptedTransport>) -> ThrukBackend {
        let config = BackendConfig::new("thruk", "thruk", "https://thruk.example.com/thruk/")
            .with_credentials("admin", "secret");
        ThrukBackend::new(config, Arc::clone(transport) as Arc<dyn Transport>)
    }

    #[test]
    fn test_cgi_url_defaults() {
        let transport = Arc::new(ScriptedTransport::new());
        assert_eq!(
            backend(&transport).cgi_url(),
            "https://thruk.example.com/thruk/cgi-bin"
        );

        let config = BackendConfig::new("t", "thruk", "https://thruk.example.com")
            .with_cgi_url("https://cgi.example.com/thruk/cgi-bin/");
        assert_eq!(cgi_url(&config), "https://cgi.example.com/thruk/cgi-bin");
    }

    #[tokio::test]
    async fn test_basic_auth_when_no_cookie() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond("login.cgi", "")
            .respond("style=hostdetail", "[]")
            .respond("servicestatustypes", "[]");
        let thruk = backend(&transport);

        let hosts = thruk.fetch_status().await.unwrap();
        assert!(hosts.is_empty());
        assert_eq!(thruk.session_state(), SessionState::Authenticated);

        let status = &transport.requests_to("style=hostdetail")[0];
        assert_eq!(status.header("Authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_cookie_switches_to_form_login() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond("login.cgi", "")
            .set_cookie_on("login.cgi")
            .respond("style=hostdetail", "[]")
            .respond("servicestatustypes", "[]");
        let thruk = backend(&transport);

        thruk.authenticate().await.unwrap();
        let login = &transport.requests_to("login.cgi")[0];
        assert_eq!(login.form_field("login"), Some("admin"));
        assert_eq!(login.form_field("submit"), Some("Login"));
        assert_eq!(login.form_field("referer"), Some(""));

        thruk.fetch_status().await.unwrap();
        let status = &transport.requests_to("style=hostdetail")[0];
        assert_eq!(status.header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_login_page_is_session_expired() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond("login.cgi", "")
            .respond("style=hostdetail", "<html><body>Login</body></html>")
            .respond("servicestatustypes", "[]");
        let thruk = backend(&transport);

        let err = thruk.fetch_status().await.unwrap_err();
        assert_eq!(err, BackendError::SessionExpired);
        assert_eq!(err.to_string(), "Login failed.");
        assert_eq!(thruk.session_state(), SessionState::NoSession);
        assert!(!thruk.is_checking());
        assert!(transport.requests_to("servicestatustypes").is_empty());
    }

    #[tokio::test]
    async fn test_recheck_posts_form() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("login.cgi", "").respond("cmd.cgi", "");
        let thruk = backend(&transport);

        thruk
            .force_recheck(&Target::service("db01", "mysql"))
            .await
            .unwrap();

        let sent = &transport.requests_to("cmd.cgi")[0];
        assert_eq!(sent.form_field("cmd_typ"), Some("7"));
        assert_eq!(sent.form_field("force_check"), Some("on"));
        assert_eq!(sent.form_field("service"), Some("mysql"));
    }

    #[tokio::test]
    async fn test_command_on_fresh_instance_logs_in_first() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond("login.cgi", "")
            .set_cookie_on("login.cgi")
            .respond("cmd.cgi", "<html><body>Your command request was successfully submitted</body></html>");
        let thruk = backend(&transport);

        thruk.force_recheck(&Target::host("db01")).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].url.as_str().contains("login.cgi"));
        assert!(sent[1].url.as_str().contains("cmd.cgi"));
        assert_eq!(sent[1].header("Authorization"), None);
        assert_eq!(sent[1].form_field("cmd_typ"), Some("96"));
    }

    #[tokio::test]
    async fn test_probe_runs_once_across_commands() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond("login.cgi", "").respond("cmd.cgi", "");
        let thruk = backend(&transport);

        thruk.force_recheck(&Target::host("db01")).await.unwrap();
        thruk.force_recheck(&Target::host("db02")).await.unwrap();

        assert_eq!(transport.requests_to("login.cgi").len(), 1);
        let sent = transport.requests_to("cmd.cgi");
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].header("Authorization"), Some("Basic YWRtaW46c2VjcmV0"));
    }

    #[tokio::test]
    async fn test_login_page_from_command_is_session_expired() {
        let transport = Arc::new(ScriptedTransport::new());
        transport
            .respond("login.cgi", "")
            .respond("cmd.cgi", "<html><head><title>Thruk Login</title></head></html>");
        let thruk = backend(&transport);

        let err = thruk.force_recheck(&Target::host("db01")).await.unwrap_err();
        assert_eq!(err, BackendError::SessionExpired);
        assert_eq!(thruk.session_state(), SessionState::NoSession);
    }

    #[tokio::test]
    async fn test_comment_on_check_result_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new());
        let thruk = backend(&transport);

        let result = CheckResult {
            target: Target::host("db01"),
            state: Status::Up,
            comment: Some("manual".into()),
            check_output: Some("OK".into()),
            performance_data: None,
        };
        let err = thruk.submit_check_result(&result).await.unwrap_err();
        assert!(matches!(err, BackendError::UnsupportedOperation(_)));
        assert!(transport.requests().is_empty());
    }
}
