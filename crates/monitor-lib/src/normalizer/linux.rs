//! Linux auth-log line normalization

use crate::models::{Event, EventCategory, LogOrigin, UNKNOWN_ACTOR};
use crate::sanitize;
use chrono::Utc;

/// Maximum characters kept from a raw line as event details
const MAX_DETAIL_CHARS: usize = 200;

/// Ordered privilege-escalation indicators; the first substring match wins
/// and determines the category, even when a line matches several patterns.
pub const LINUX_PATTERNS: &[(&str, EventCategory)] = &[
    ("sudo", EventCategory::SudoKeywordMatch),
    ("su -", EventCategory::SuKeywordMatch),
    ("COMMAND", EventCategory::CommandKeywordMatch),
    ("authentication failure", EventCategory::AuthFailure),
    ("FAILED su", EventCategory::FailedSuAttempt),
    ("session opened for user root", EventCategory::RootSessionOpened),
];

/// Normalize one auth-log line; lines matching no pattern yield `None`.
///
/// Auth-log timestamps carry no year, so the event timestamp is the
/// detection time.
pub fn normalize_auth_line(line: &str) -> Option<Event> {
    let (_, category) = LINUX_PATTERNS
        .iter()
        .find(|(pattern, _)| line.contains(pattern))?;

    Some(Event {
        timestamp: Utc::now(),
        category: *category,
        actor: extract_actor(line),
        details: sanitize::bound_chars(&sanitize::redact(line), MAX_DETAIL_CHARS),
        origin: LogOrigin::LinuxAuthLog,
    })
}

/// Best-effort actor extraction: the whitespace-delimited token following
/// the first `user=` marker.
fn extract_actor(line: &str) -> String {
    line.split_once("user=")
        .and_then(|(_, rest)| rest.split_whitespace().next())
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string())
}
