//! Thruk backend implementation.
//!
//! Thruk serves the Nagios status CGIs with a JSON view mode. Hosts and
//! services come from separate endpoints; authentication is basic auth or,
//! when the server uses it, a form login whose cookie the transport keeps.

mod api;
mod backend;
mod commands;
mod descriptor;
pub(crate) mod parser;

pub use backend::ThrukBackend;
pub use commands::CAPABILITIES as THRUK_CAPABILITIES;
pub use descriptor::thruk_descriptor;
pub use parser::{Payload, classify, parse_status};
