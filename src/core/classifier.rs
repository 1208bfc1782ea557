// Line categories

use crate::core::constants::RESPONSE_MARKER;

/// The two live categories of inbound line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Carries the `[RESPONSE]` marker anywhere in the line.
    Response,
    /// Anything else; displayed verbatim.
    Plain,
}

pub fn classify(line: &str) -> Category {
    if line.contains(RESPONSE_MARKER) {
        Category::Response
    } else {
        Category::Plain
    }
}

/// Removes every occurrence of the response marker.
pub fn strip_marker(line: &str) -> String {
    line.replace(RESPONSE_MARKER, "")
}
