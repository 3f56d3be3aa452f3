//! Opsview backend implementation.
//!
//! Opsview exposes a REST/JSON API. A token from `/rest/login` is sent as
//! `X-Opsview-Username`/`X-Opsview-Token` headers; one combined endpoint
//! returns hosts with their embedded services.

mod api;
mod backend;
mod commands;
mod descriptor;
pub(crate) mod parser;

pub use backend::OpsviewBackend;
pub use commands::CAPABILITIES as OPSVIEW_CAPABILITIES;
pub use descriptor::opsview_descriptor;
pub use parser::parse_status;
