// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # nagstat Fetch
//!
//! Transport facade and session state for nagstat backend adapters.
//!
//! ## Transport
//!
//! - [`transport::Transport`] - The single `fetch` contract adapters call
//! - [`http::HttpTransport`] - reqwest implementation with its own cookie jar
//! - `scripted::ScriptedTransport` - In-memory replay for tests (`test-util` feature)
//!
//! ## Session
//!
//! - [`session::Session`] - Credentials plus the authentication state machine
//! - [`session::AuthScheme`] - Basic, token header, or form-login cookie
//!
//! ## Example
//!
//! ```ignore
//! use nagstat_fetch::{HttpRequest, HttpTransport, Transport};
//!
//! let transport = HttpTransport::with_defaults()?;
//! let url = url::Url::parse("https://opsview.example.com/rest/status/service")?;
//! let response = transport.fetch(HttpRequest::get(url)).await?;
//! ```

pub mod error;
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod scripted;
pub mod session;
pub mod transport;

// Errors
pub use error::TransportError;

// Transport
pub use http::{HttpTransport, TransportSettings};
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;
pub use transport::{HttpMethod, HttpRequest, RawResponse, RequestBody, Transport};

// Session
pub use session::{AuthScheme, Credentials, Session, SessionState};
