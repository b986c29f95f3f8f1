//! Sensitive-data redaction for event details
//!
//! Every piece of free text destined for a log line or alert channel passes
//! through [`redact`] before it is stored on an event.

/// Keywords whose trailing values must never reach a log or channel
const SENSITIVE_KEYWORDS: &[&str] = &["password", "token", "secret", "key", "credential"];

/// Marker substituted for everything following a sensitive keyword
const REDACTION_MARKER: &str = ": [REDACTED]";

/// Redact values following recognized sensitive keywords.
///
/// Matching is case-insensitive; everything after the first occurrence of a
/// keyword is replaced with the redaction marker. Keywords are applied in a
/// fixed order against the already-redacted text, so a message carrying
/// several markers collapses at the earliest one.
pub fn redact(message: &str) -> String {
    let mut message = message.to_string();

    for keyword in SENSITIVE_KEYWORDS {
        // ASCII-only keywords keep byte offsets stable across case folding
        let folded = message.to_ascii_lowercase();
        if let Some(idx) = folded.find(keyword) {
            message.truncate(idx + keyword.len());
            message.push_str(REDACTION_MARKER);
        }
    }

    message
}

/// Truncate to a bounded number of characters, preserving char boundaries
pub fn bound_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
