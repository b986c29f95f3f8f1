//! Windows security-log record normalization

use crate::models::{Event, EventCategory, LogOrigin, UNKNOWN_ACTOR};
use crate::source::WindowsRecord;
use chrono::Utc;

/// Security event ids indicating privilege changes
pub const MONITORED_EVENT_IDS: &[u32] = &[4672, 4673, 4688, 4697, 4698, 4732];

fn category_for_event_id(event_id: u32) -> Option<EventCategory> {
    match event_id {
        4672 => Some(EventCategory::SpecialPrivilegesAssigned),
        4673 => Some(EventCategory::PrivilegedServiceCalled),
        4688 => Some(EventCategory::ProcessCreated),
        4697 => Some(EventCategory::ServiceInstalled),
        4698 => Some(EventCategory::ScheduledTaskCreated),
        4732 => Some(EventCategory::GroupMembershipChanged),
        _ => None,
    }
}

/// Static human-readable description for a monitored event id
pub fn describe_event_id(event_id: u32) -> &'static str {
    match event_id {
        4672 => "Special privileges assigned to new logon",
        4673 => "A privileged service was called",
        4688 => "A new process has been created",
        4697 => "A service was installed on the system",
        4698 => "A scheduled task was created",
        4732 => "A member was added to a security-enabled local group",
        _ => "Unknown event type",
    }
}

/// Normalize one security-log record; unmonitored ids yield `None`.
pub fn normalize_windows_record(record: &WindowsRecord) -> Option<Event> {
    let category = category_for_event_id(record.event_id)?;

    let actor = record
        .string_inserts
        .first()
        .filter(|insert| !insert.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN_ACTOR.to_string());

    Some(Event {
        timestamp: record.time_created.unwrap_or_else(Utc::now),
        category,
        actor,
        details: describe_event_id(record.event_id).to_string(),
        origin: LogOrigin::WindowsSecurityLog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(event_id: u32, inserts: Vec<&str>) -> WindowsRecord {
        WindowsRecord {
            event_id,
            string_inserts: inserts.into_iter().map(str::to_string).collect(),
            time_created: None,
        }
    }

    #[test]
    fn test_monitored_ids_map_to_categories() {
        let cases = [
            (4672, EventCategory::SpecialPrivilegesAssigned),
            (4673, EventCategory::PrivilegedServiceCalled),
            (4688, EventCategory::ProcessCreated),
            (4697, EventCategory::ServiceInstalled),
            (4698, EventCategory::ScheduledTaskCreated),
            (4732, EventCategory::GroupMembershipChanged),
        ];

        for (event_id, expected) in cases {
            let event = normalize_windows_record(&record(event_id, vec!["alice"])).unwrap();
            assert_eq!(event.category, expected, "event id {}", event_id);
        }
    }

    #[test]
    fn test_unmonitored_id_yields_nothing() {
        assert!(normalize_windows_record(&record(9999, vec!["alice"])).is_none());
    }

    #[test]
    fn test_actor_defaults_to_unknown() {
        let event = normalize_windows_record(&record(4672, vec![])).unwrap();
        assert_eq!(event.actor, UNKNOWN_ACTOR);

        let event = normalize_windows_record(&record(4672, vec![""])).unwrap();
        assert_eq!(event.actor, UNKNOWN_ACTOR);
    }

    #[test]
    fn test_details_carry_static_description() {
        let event = normalize_windows_record(&record(4672, vec!["SYSTEM"])).unwrap();
        assert_eq!(event.details, "Special privileges assigned to new logon");
    }

    #[test]
    fn test_source_timestamp_preserved() {
        let generated = Utc.with_ymd_and_hms(2025, 11, 11, 20, 0, 0).unwrap();
        let record = WindowsRecord {
            event_id: 4688,
            string_inserts: vec!["alice".to_string()],
            time_created: Some(generated),
        };

        let event = normalize_windows_record(&record).unwrap();
        assert_eq!(event.timestamp, generated);
    }

    #[test]
    fn test_missing_timestamp_defaults_to_detection_time() {
        let before = Utc::now();
        let event = normalize_windows_record(&record(4688, vec!["alice"])).unwrap();
        assert!(event.timestamp >= before);
    }
}
