//! reqwest-backed transport with tracing and a per-instance cookie jar.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::error::TransportError;
use crate::transport::{HttpMethod, HttpRequest, RawResponse, RequestBody, Transport};

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for nagstat.
const USER_AGENT: &str = concat!("nagstat/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Settings
// ============================================================================

/// Settings for an [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// Request timeout.
    pub timeout: Duration,
    /// User agent header.
    pub user_agent: String,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl TransportSettings {
    /// Sets a custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// HTTP transport for one backend instance.
///
/// Each instance owns its cookie jar, so sessions never leak between
/// backends.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: Client,
    jar: Arc<Jar>,
    timeout: Duration,
}

impl HttpTransport {
    /// Creates a transport with the given settings.
    pub fn new(settings: TransportSettings) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(settings.user_agent)
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| TransportError::Setup(e.to_string()))?;

        Ok(Self {
            inner: client,
            jar,
            timeout: settings.timeout,
        })
    }

    /// Creates a transport with default settings.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(TransportSettings::default())
    }

    fn header_map(headers: &[(String, String)]) -> Result<HeaderMap, TransportError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url.path()))]
    async fn fetch(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let headers = Self::header_map(&request.headers)?;

        let mut builder = match request.method {
            HttpMethod::Get => self.inner.get(request.url),
            HttpMethod::Post => self.inner.post(request.url),
        }
        .headers(headers);

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder,
        };

        debug!("Sending request");
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout.as_secs())
            } else {
                TransportError::Http(e)
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, len = body.len(), "Response received");

        Ok(RawResponse { status, body })
    }

    fn has_cookies(&self, url: &Url) -> bool {
        self.jar.cookies(url).is_some()
    }
}
