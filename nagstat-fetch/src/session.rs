//! Per-backend session and authentication state.
//!
//! A [`Session`] holds the credentials of one backend instance and tracks
//! whether a usable session exists:
//!
//! ```text
//! NoSession ──begin──▶ Authenticating ──complete──▶ Authenticated
//!     ▲                      │                            │
//!     └──────── fail ────────┘◀────────── expire ─────────┘
//! ```
//!
//! Basic auth has no handshake and is always `Authenticated`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fmt;

// ============================================================================
// Credentials
// ============================================================================

/// Login name and password (or API token).
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Login name.
    pub username: String,
    /// Password or token.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Returns the value of a basic `Authorization` header.
    pub fn basic_header(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Scheme & State
// ============================================================================

/// How a backend authenticates requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthScheme {
    /// Credentials header on every request; no handshake.
    Basic,
    /// Login endpoint returns a token that is sent as request headers.
    Token,
    /// Form login; the transport's cookie jar keeps the session cookie.
    FormCookie,
}

impl AuthScheme {
    /// Returns a short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Token => "token",
            Self::FormCookie => "form-cookie",
        }
    }
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No usable session.
    NoSession,
    /// Handshake in progress.
    Authenticating,
    /// Requests can be sent.
    Authenticated,
}

// ============================================================================
// Session
// ============================================================================

/// Authentication state of one backend instance.
#[derive(Debug, Clone)]
pub struct Session {
    credentials: Credentials,
    scheme: AuthScheme,
    state: SessionState,
    token_headers: Vec<(String, String)>,
}

impl Session {
    /// Creates a session for the given scheme.
    pub fn new(credentials: Credentials, scheme: AuthScheme) -> Self {
        let state = match scheme {
            AuthScheme::Basic => SessionState::Authenticated,
            AuthScheme::Token | AuthScheme::FormCookie => SessionState::NoSession,
        };
        Self {
            credentials,
            scheme,
            state,
            token_headers: Vec::new(),
        }
    }

    /// Returns the credentials.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the active scheme.
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if requests can be sent.
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// Returns true if a handshake must run before the next request.
    pub fn needs_handshake(&self) -> bool {
        self.state == SessionState::NoSession
    }

    /// Enters `Authenticating`. Returns false if no handshake is needed.
    pub fn begin_handshake(&mut self) -> bool {
        if !self.needs_handshake() {
            return false;
        }
        self.state = SessionState::Authenticating;
        true
    }

    /// Completes a token handshake, storing the headers to send from now on.
    pub fn complete_with_headers(&mut self, headers: Vec<(String, String)>) {
        self.token_headers = headers;
        self.state = SessionState::Authenticated;
    }

    /// Completes a handshake whose result lives in the cookie jar.
    pub fn complete(&mut self) {
        self.state = SessionState::Authenticated;
    }

    /// Handshake failed; retried on the next cycle.
    pub fn fail(&mut self) {
        self.reset();
    }

    /// The backend signalled that the session is gone.
    ///
    /// Basic auth has nothing to invalidate.
    pub fn expire(&mut self) {
        if self.scheme != AuthScheme::Basic {
            self.reset();
        }
    }

    /// Switches to another scheme and drops any session state.
    pub fn switch_scheme(&mut self, scheme: AuthScheme) {
        self.scheme = scheme;
        self.token_headers.clear();
        self.state = match scheme {
            AuthScheme::Basic => SessionState::Authenticated,
            AuthScheme::Token | AuthScheme::FormCookie => SessionState::NoSession,
        };
    }

    /// Returns the headers to attach to an outgoing request.
    pub fn auth_headers(&self) -> Vec<(String, String)> {
        match self.scheme {
            AuthScheme::Basic => vec![(
                "Authorization".to_string(),
                self.credentials.basic_header(),
            )],
            AuthScheme::Token if self.is_authenticated() => self.token_headers.clone(),
            AuthScheme::Token | AuthScheme::FormCookie => Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.token_headers.clear();
        self.state = SessionState::NoSession;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("admin", "secret")
    }

    #[test]
    fn test_basic_is_always_authenticated() {
        let mut session = Session::new(creds(), AuthScheme::Basic);
        assert!(session.is_authenticated());
        assert!(!session.begin_handshake());
        session.expire();
        assert!(session.is_authenticated());

        let headers = session.auth_headers();
        assert_eq!(headers[0].0, "Authorization");
        assert_eq!(headers[0].1, "Basic YWRtaW46c2VjcmV0");
    }

    #[test]
    fn test_token_lifecycle() {
        let mut session = Session::new(creds(), AuthScheme::Token);
        assert_eq!(session.state(), SessionState::NoSession);
        assert!(session.auth_headers().is_empty());

        assert!(session.begin_handshake());
        assert_eq!(session.state(), SessionState::Authenticating);

        session.complete_with_headers(vec![("X-Token".into(), "t1".into())]);
        assert!(session.is_authenticated());
        assert_eq!(session.auth_headers(), vec![("X-Token".into(), "t1".into())]);

        session.expire();
        assert_eq!(session.state(), SessionState::NoSession);
        assert!(session.auth_headers().is_empty());
    }

    #[test]
    fn test_failed_handshake_returns_to_no_session() {
        let mut session = Session::new(creds(), AuthScheme::FormCookie);
        assert!(session.begin_handshake());
        session.fail();
        assert!(session.needs_handshake());
    }

    #[test]
    fn test_switch_to_form_cookie() {
        let mut session = Session::new(creds(), AuthScheme::Basic);
        session.switch_scheme(AuthScheme::FormCookie);
        assert_eq!(session.scheme(), AuthScheme::FormCookie);
        assert!(session.needs_handshake());
        assert!(session.auth_headers().is_empty());
    }

    #[test]
    fn test_debug_redacts_password() {
        assert!(!format!("{:?}", creds()).contains("secret"));
    }
}
