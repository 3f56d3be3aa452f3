//! In-memory transport that replays scripted responses.
//!
//! Used to drive adapters in tests without a network.
//! Every request is recorded so callers can inspect what an adapter sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use url::Url;

use crate::error::TransportError;
use crate::transport::{HttpRequest, RawResponse, Transport};

#[derive(Debug, Clone)]
enum Reply {
    Response(RawResponse),
    Timeout,
}

#[derive(Debug)]
struct Route {
    pattern: String,
    replies: VecDeque<Reply>,
}

/// Transport answering from per-URL reply queues.
///
/// A request is matched against routes in registration order by substring
/// of its full URL. The last reply of a route is repeated once the queue
/// runs down to it.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
    cookie_patterns: Mutex<Vec<String>>,
    cookies: AtomicBool,
}

impl ScriptedTransport {
    /// Creates an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a `200 OK` body for URLs containing `pattern`.
    pub fn respond(&self, pattern: &str, body: impl Into<String>) -> &Self {
        self.push(pattern, Reply::Response(RawResponse::ok(body)))
    }

    /// Queues a response with an explicit status.
    pub fn respond_with(&self, pattern: &str, response: RawResponse) -> &Self {
        self.push(pattern, Reply::Response(response))
    }

    /// Queues a timeout for URLs containing `pattern`.
    pub fn time_out(&self, pattern: &str) -> &Self {
        self.push(pattern, Reply::Timeout)
    }

    /// Pretends the server sets a session cookie when `pattern` is requested.
    pub fn set_cookie_on(&self, pattern: &str) -> &Self {
        lock(&self.cookie_patterns).push(pattern.to_string());
        self
    }

    /// Returns all requests received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// Returns requests whose URL contains `pattern`.
    pub fn requests_to(&self, pattern: &str) -> Vec<HttpRequest> {
        lock(&self.requests)
            .iter()
            .filter(|r| r.url.as_str().contains(pattern))
            .cloned()
            .collect()
    }

    fn push(&self, pattern: &str, reply: Reply) -> &Self {
        let mut routes = lock(&self.routes);
        if let Some(route) = routes.iter_mut().find(|r| r.pattern == pattern) {
            route.replies.push_back(reply);
        } else {
            routes.push(Route {
                pattern: pattern.to_string(),
                replies: VecDeque::from([reply]),
            });
        }
        self
    }

    fn next_reply(&self, url: &str) -> Option<Reply> {
        let mut routes = lock(&self.routes);
        let route = routes
            .iter_mut()
            .find(|r| url.contains(&r.pattern) && !r.replies.is_empty())?;
        if route.replies.len() > 1 {
            route.replies.pop_front()
        } else {
            route.replies.front().cloned()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn fetch(&self, request: HttpRequest) -> Result<RawResponse, TransportError> {
        let url = request.url.to_string();
        lock(&self.requests).push(request);

        if lock(&self.cookie_patterns).iter().any(|p| url.contains(p)) {
            self.cookies.store(true, Ordering::SeqCst);
        }

        match self.next_reply(&url) {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Timeout) => Err(TransportError::Timeout(30)),
            None => Err(TransportError::InvalidUrl(format!(
                "no scripted response for {url}"
            ))),
        }
    }

    fn has_cookies(&self, _url: &Url) -> bool {
        self.cookies.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_replies_in_order_then_repeats_last() {
        let transport = ScriptedTransport::new();
        transport.respond("/status", "first").respond("/status", "second");

        let get = || HttpRequest::get(url("https://mon/status"));
        assert_eq!(transport.fetch(get()).await.unwrap().body, "first");
        assert_eq!(transport.fetch(get()).await.unwrap().body, "second");
        assert_eq!(transport.fetch(get()).await.unwrap().body, "second");
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_unrouted_request_fails() {
        let transport = ScriptedTransport::new();
        let result = transport.fetch(HttpRequest::get(url("https://mon/x"))).await;
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn test_cookie_flag() {
        let transport = ScriptedTransport::new();
        transport.respond("login.cgi", "").set_cookie_on("login.cgi");
        let target = url("https://mon/cgi-bin/");
        assert!(!transport.has_cookies(&target));

        transport
            .fetch(HttpRequest::post(url("https://mon/cgi-bin/login.cgi")))
            .await
            .unwrap();
        assert!(transport.has_cookies(&target));
    }
}
