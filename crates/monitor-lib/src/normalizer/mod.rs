//! Event normalization from raw source records
//!
//! Converts heterogeneous raw records into the canonical [`Event`]. The
//! normalizer is total: it never fails, and input matching no monitored
//! id or pattern yields `None`.

mod linux;
mod windows;

pub use linux::{normalize_auth_line, LINUX_PATTERNS};
pub use windows::{describe_event_id, normalize_windows_record, MONITORED_EVENT_IDS};

use crate::models::Event;
use crate::source::RawRecord;

/// Normalize one platform-tagged raw record. No side effects.
pub fn normalize(record: &RawRecord) -> Option<Event> {
    match record {
        RawRecord::Windows(windows_record) => windows::normalize_windows_record(windows_record),
        RawRecord::Linux { line, .. } => linux::normalize_auth_line(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventCategory;
    use crate::source::WindowsRecord;
    use std::path::PathBuf;

    #[test]
    fn test_normalize_routes_windows_records() {
        let record = RawRecord::Windows(WindowsRecord {
            event_id: 4688,
            string_inserts: vec!["alice".to_string()],
            time_created: None,
        });

        let event = normalize(&record).unwrap();
        assert_eq!(event.category, EventCategory::ProcessCreated);
        assert_eq!(event.actor, "alice");
    }

    #[test]
    fn test_normalize_routes_linux_lines() {
        let record = RawRecord::Linux {
            line: "Nov 11 20:00:00 host sudo: alice : user=alice ; COMMAND=/bin/ls".to_string(),
            path: PathBuf::from("/var/log/auth.log"),
        };

        let event = normalize(&record).unwrap();
        assert_eq!(event.category, EventCategory::SudoKeywordMatch);
        assert_eq!(event.actor, "alice");
    }

    #[test]
    fn test_normalize_is_idempotent_on_unmatched_input() {
        let record = RawRecord::Linux {
            line: "Nov 11 20:00:00 host kernel: usb 1-1 disconnected".to_string(),
            path: PathBuf::from("/var/log/auth.log"),
        };

        assert!(normalize(&record).is_none());
        assert!(normalize(&record).is_none());
    }
}
