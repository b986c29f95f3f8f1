//! Core data models for the privilege escalation monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor sentinel used when no user can be resolved from a record
pub const UNKNOWN_ACTOR: &str = "Unknown";

/// Classification of a monitored security event
///
/// Windows variants map one-to-one onto the monitored security event ids.
/// Linux variants map one-to-one onto the monitored auth-log patterns, so
/// the category alone identifies which pattern matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    SpecialPrivilegesAssigned,
    PrivilegedServiceCalled,
    ProcessCreated,
    ServiceInstalled,
    ScheduledTaskCreated,
    GroupMembershipChanged,
    SudoKeywordMatch,
    SuKeywordMatch,
    CommandKeywordMatch,
    AuthFailure,
    FailedSuAttempt,
    RootSessionOpened,
    Unknown,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::SpecialPrivilegesAssigned => write!(f, "SpecialPrivilegesAssigned"),
            EventCategory::PrivilegedServiceCalled => write!(f, "PrivilegedServiceCalled"),
            EventCategory::ProcessCreated => write!(f, "ProcessCreated"),
            EventCategory::ServiceInstalled => write!(f, "ServiceInstalled"),
            EventCategory::ScheduledTaskCreated => write!(f, "ScheduledTaskCreated"),
            EventCategory::GroupMembershipChanged => write!(f, "GroupMembershipChanged"),
            EventCategory::SudoKeywordMatch => write!(f, "SudoKeywordMatch"),
            EventCategory::SuKeywordMatch => write!(f, "SuKeywordMatch"),
            EventCategory::CommandKeywordMatch => write!(f, "CommandKeywordMatch"),
            EventCategory::AuthFailure => write!(f, "AuthFailure"),
            EventCategory::FailedSuAttempt => write!(f, "FailedSuAttempt"),
            EventCategory::RootSessionOpened => write!(f, "RootSessionOpened"),
            EventCategory::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Which adapter produced an event, for diagnostics only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogOrigin {
    WindowsSecurityLog,
    LinuxAuthLog,
}

impl std::fmt::Display for LogOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogOrigin::WindowsSecurityLog => write!(f, "windows_security_log"),
            LogOrigin::LinuxAuthLog => write!(f, "linux_auth_log"),
        }
    }
}

/// Canonical detected occurrence
///
/// All fields are always present: `category` and `actor` default to their
/// `Unknown` sentinels and `timestamp` falls back to detection time when the
/// source record carries none. `details` is sanitized and bounded before the
/// event is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    pub actor: String,
    pub details: String,
    pub origin: LogOrigin,
}

/// Composite key identifying one counting bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TrackingKey {
    pub category: EventCategory,
    pub actor: String,
}

impl TrackingKey {
    /// Derive the tracking key from an event alone
    pub fn from_event(event: &Event) -> Self {
        Self {
            category: event.category,
            actor: event.actor.clone(),
        }
    }
}

/// Decision artifact produced when a counting bucket reaches threshold
///
/// Immutable once created; owned transiently by the dispatcher until all
/// channels have been attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub event: Event,
    pub triggered_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            triggered_at: Utc::now(),
        }
    }
}
