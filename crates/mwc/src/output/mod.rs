//! Output formatting for fit results.

mod json;

pub use json::{to_json, to_json_pretty};
