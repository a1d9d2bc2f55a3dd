//! Record formatting
//!
//! Canonical layout, each optional part omitted when absent:
//!
//! ```text
//! <event>: <message>: <error description> [<file> <function>]
//! ```

use super::{CallSite, ErrorValue};

/// Assemble the final message string of a record
pub fn format_message(
    message: &str,
    event: Option<&str>,
    error: Option<&ErrorValue>,
    site: &CallSite,
) -> String {
    let mut out = String::with_capacity(message.len() + 32);
    if let Some(event) = event {
        out.push_str(event);
        out.push_str(": ");
    }
    out.push_str(message);
    if let Some(error) = error {
        out.push_str(": ");
        out.push_str(&error.description());
    }
    out.push(' ');
    out.push_str(&site.tag());
    out
}
