//! UTF-8-safe string truncation utilities
//!
//! Server bodies that are not JSON (challenge pages, error pages) are logged
//! and carried in `FetchOutcome::NonJson`. They are trimmed here without ever
//! slicing through a multi-byte character.

use super::constants::EXCERPT_CHARS;

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// # Examples
/// ```
/// # use idx_scrape::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Pengumuman ✓✓✓", 12), "Pengumuman ✓");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Diagnostic excerpt of a response body
///
/// Trims surrounding whitespace and caps the text at `EXCERPT_CHARS`
/// characters, appending `...` when something was cut.
#[must_use]
pub fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    let cut = safe_truncate_chars(trimmed, EXCERPT_CHARS);
    if cut.len() < trimmed.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// Whether a body looks like a JSON document (object or array)
///
/// Challenge pages come back with status 200 and an HTML body, so the first
/// non-whitespace character is the cheapest reliable discriminator.
#[must_use]
pub fn looks_like_json(body: &str) -> bool {
    let stripped = body.trim_start();
    stripped.starts_with('{') || stripped.starts_with('[')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_keeps_short_bodies_intact() {
        assert_eq!(excerpt("  <html>blocked</html>\n"), "<html>blocked</html>");
    }

    #[test]
    fn excerpt_caps_long_bodies() {
        let body = "x".repeat(EXCERPT_CHARS + 50);
        let out = excerpt(&body);
        assert_eq!(out.len(), EXCERPT_CHARS + 3);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn json_detection() {
        assert!(looks_like_json("  {\"ResultCount\":0}"));
        assert!(looks_like_json("[]"));
        assert!(!looks_like_json("<!DOCTYPE html>"));
        assert!(!looks_like_json(""));
    }
}
