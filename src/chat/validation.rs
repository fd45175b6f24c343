//! Message validation and sanitization.
//!
//! `validate` gates raw input; `sanitize` escapes accepted text for safe
//! embedding in an HTML text node. Callers must validate before sanitizing;
//! `sanitize` itself never rejects.

use std::sync::LazyLock;

use regex::Regex;

/// Script-injection and dangerous-URI markers. A defense-in-depth filter,
/// not a full HTML sanitizer.
static UNSAFE_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script|javascript:|data:").expect("valid pattern"));

/// Why a raw message was rejected. All variants are user-facing and
/// recoverable: the user edits the input and retries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Message cannot be empty")]
    Empty,
    #[error("Message cannot exceed {max} characters")]
    TooLong { len: usize, max: usize },
    #[error("Invalid content detected")]
    UnsafeContent,
}

/// Checks the trimmed text against emptiness, length and content-safety
/// rules. `max_chars` defaults to 500 at the session level.
pub fn validate(raw: &str, max_chars: usize) -> Result<(), ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(ValidationError::TooLong {
            len,
            max: max_chars,
        });
    }
    if UNSAFE_CONTENT.is_match(trimmed) {
        return Err(ValidationError::UnsafeContent);
    }
    Ok(())
}

/// Trims the text, then escapes `< > & " ' /` in one pass over the
/// original string. A produced escape sequence is never re-escaped, so the
/// output is safe to embed directly in an HTML text node.
pub fn sanitize(text: &str) -> String {
    let trimmed = text.trim();
    let mut escaped = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        match ch {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            '/' => escaped.push_str("&#x2F;"),
            other => escaped.push(other),
        }
    }
    escaped
}
