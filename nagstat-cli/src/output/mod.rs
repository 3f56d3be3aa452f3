//! Output formatting for CLI.

mod json;
mod text;

pub use json::{CommandOutput, JsonFormatter};
pub use text::TextFormatter;
