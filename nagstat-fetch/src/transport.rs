//! Transport facade.
//!
//! Adapters describe a request with [`HttpRequest`] and hand it to a
//! [`Transport`]. The transport returns the raw body and never looks at its
//! content; all interpretation happens in the adapter.

use async_trait::async_trait;
use std::fmt;
use url::Url;

use crate::error::TransportError;

// ============================================================================
// Request
// ============================================================================

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// Request body encodings used by the backends.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document.
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` pairs, in order.
    Form(Vec<(String, String)>),
}

/// A backend request described independently of the HTTP client.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method.
    pub method: HttpMethod,
    /// Absolute URL including any query string.
    pub url: Url,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Creates a GET request.
    pub fn get(url: Url) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a POST request without a body.
    pub fn post(url: Url) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Sets a form body.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Appends headers.
    pub fn headers(mut self, headers: impl IntoIterator<Item = (String, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Returns the value of a query parameter, if present.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Returns the value of a form field, if present.
    pub fn form_field(&self, key: &str) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Form(pairs)) => pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Returns the value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Response
// ============================================================================

/// Raw response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Body decoded as text.
    pub body: String,
}

impl RawResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 401/403.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status, 401 | 403)
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Issues HTTP requests on behalf of one backend instance.
///
/// Implementations own their cookie jar, so cookies set by a login response
/// are sent automatically with later requests to the same host.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the raw response.
    ///
    /// Only network-level failures are errors; any HTTP status is returned
    /// as a [`RawResponse`].
    async fn fetch(&self, request: HttpRequest) -> Result<RawResponse, TransportError>;

    /// Returns true if the cookie jar holds cookies for `url`.
    fn has_cookies(&self, _url: &Url) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let url = Url::parse("https://mon/rest/recheck?host=web01").unwrap();
        let req = HttpRequest::post(url)
            .headers(vec![("X-Opsview-Token".to_string(), "abc".to_string())])
            .form([("login", "admin")]);

        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.query_param("host").as_deref(), Some("web01"));
        assert_eq!(req.query_param("servicecheck"), None);
        assert_eq!(req.header("x-opsview-token"), Some("abc"));
        assert_eq!(req.form_field("login"), Some("admin"));
    }

    #[test]
    fn test_response_classification() {
        assert!(RawResponse::ok("[]").is_success());
        assert!(RawResponse::new(401, "").is_unauthorized());
        assert!(!RawResponse::new(500, "").is_success());
    }
}
