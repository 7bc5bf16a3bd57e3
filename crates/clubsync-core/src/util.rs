//! Text helpers for config values and remote error bodies.

const COMPACT_CHARS: usize = 180;

/// Trim a config or environment value. Blank means unset.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Whether an API base URL carries an `http` or `https` scheme.
/// The scheme is matched case-insensitively.
pub fn is_http_url(value: &str) -> bool {
    let head = value.get(..8).unwrap_or(value).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

/// Single-line excerpt of a response body for logs and error messages.
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(COMPACT_CHARS)
        .collect()
}
