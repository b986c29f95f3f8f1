//! Threshold-based detection engine
//!
//! Tracks occurrence counts per `(category, actor)` key and produces an
//! [`Alert`] the instant a bucket reaches the configured threshold. Pure
//! state transition: no I/O, no blocking, no external calls.

use crate::models::{Alert, Event, TrackingKey};
use dashmap::DashMap;
use tracing::debug;

/// Default occurrence threshold before an alert fires
pub const DEFAULT_ALERT_THRESHOLD: u32 = 3;

/// Per-key occurrence tracker with threshold-triggered reset
///
/// Shared across polling loops behind an `Arc`; the read-increment-compare-
/// reset sequence for one key runs under that key's map entry guard, so
/// concurrent observers can neither double-trigger nor lose an update.
pub struct DetectionEngine {
    threshold: u32,
    counters: DashMap<TrackingKey, u32>,
}

impl DetectionEngine {
    /// Create an engine with the given occurrence threshold
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            counters: DashMap::new(),
        }
    }

    /// Record one event occurrence; returns an alert when its bucket
    /// reaches the threshold.
    ///
    /// Never rejects an event: whatever key the event yields is tracked.
    /// The comparison is `>=` so a lowered threshold takes effect without
    /// suppressing the next trigger, and the bucket resets to exactly zero
    /// on trigger (the key itself persists for continued tracking).
    pub fn observe(&self, event: Event) -> Option<Alert> {
        let key = TrackingKey::from_event(&event);

        let mut count = self.counters.entry(key).or_insert(0);
        *count += 1;

        if *count >= self.threshold {
            *count = 0;
            drop(count);

            debug!(
                category = %event.category,
                actor = %event.actor,
                threshold = self.threshold,
                "Occurrence threshold reached"
            );
            return Some(Alert::new(event));
        }

        None
    }

    /// Configured threshold
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Current count for a key (diagnostics and tests)
    pub fn count_for(&self, key: &TrackingKey) -> u32 {
        self.counters.get(key).map(|count| *count).unwrap_or(0)
    }

    /// Number of keys ever observed
    pub fn tracked_keys(&self) -> usize {
        self.counters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventCategory, LogOrigin};
    use chrono::Utc;
    use std::sync::Arc;

    fn event(category: EventCategory, actor: &str) -> Event {
        Event {
            timestamp: Utc::now(),
            category,
            actor: actor.to_string(),
            details: "test".to_string(),
            origin: LogOrigin::LinuxAuthLog,
        }
    }

    #[test]
    fn test_alert_fires_exactly_at_threshold() {
        let engine = DetectionEngine::new(3);

        assert!(engine.observe(event(EventCategory::ProcessCreated, "alice")).is_none());
        assert!(engine.observe(event(EventCategory::ProcessCreated, "alice")).is_none());

        let alert = engine
            .observe(event(EventCategory::ProcessCreated, "alice"))
            .expect("third occurrence must alert");
        assert_eq!(alert.event.category, EventCategory::ProcessCreated);
        assert_eq!(alert.event.actor, "alice");
    }

    #[test]
    fn test_counter_is_zero_after_trigger() {
        let engine = DetectionEngine::new(3);
        let key = TrackingKey {
            category: EventCategory::ProcessCreated,
            actor: "alice".to_string(),
        };

        for _ in 0..3 {
            engine.observe(event(EventCategory::ProcessCreated, "alice"));
        }
        assert_eq!(engine.count_for(&key), 0);

        // The next occurrence starts a fresh count from zero
        assert!(engine.observe(event(EventCategory::ProcessCreated, "alice")).is_none());
        assert_eq!(engine.count_for(&key), 1);
    }

    #[test]
    fn test_alert_cadence_repeats_every_threshold() {
        let engine = DetectionEngine::new(3);
        let mut alerts = 0;

        for _ in 0..9 {
            if engine.observe(event(EventCategory::SudoKeywordMatch, "bob")).is_some() {
                alerts += 1;
            }
        }

        assert_eq!(alerts, 3);
    }

    #[test]
    fn test_key_isolation() {
        let engine = DetectionEngine::new(3);
        let alice = TrackingKey {
            category: EventCategory::ProcessCreated,
            actor: "alice".to_string(),
        };

        engine.observe(event(EventCategory::ProcessCreated, "alice"));
        engine.observe(event(EventCategory::ProcessCreated, "bob"));
        engine.observe(event(EventCategory::ServiceInstalled, "alice"));

        assert_eq!(engine.count_for(&alice), 1);
        assert_eq!(engine.tracked_keys(), 3);
    }

    #[test]
    fn test_threshold_one_alerts_every_time() {
        let engine = DetectionEngine::new(1);

        for _ in 0..5 {
            assert!(engine.observe(event(EventCategory::AuthFailure, "eve")).is_some());
        }
    }

    #[test]
    fn test_unknown_fields_still_tracked() {
        let engine = DetectionEngine::new(2);

        assert!(engine.observe(event(EventCategory::Unknown, "Unknown")).is_none());
        assert!(engine.observe(event(EventCategory::Unknown, "Unknown")).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_observers_trigger_exactly_once_per_window() {
        let engine = Arc::new(DetectionEngine::new(10));

        let mut handles = Vec::new();
        for _ in 0..10 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                let mut alerts = 0;
                for _ in 0..10 {
                    if engine
                        .observe(event(EventCategory::PrivilegedServiceCalled, "alice"))
                        .is_some()
                    {
                        alerts += 1;
                    }
                }
                alerts
            }));
        }

        let mut total_alerts = 0;
        for handle in handles {
            total_alerts += handle.await.unwrap();
        }

        // 100 observations at threshold 10: every window triggers exactly once
        assert_eq!(total_alerts, 10);

        let key = TrackingKey {
            category: EventCategory::PrivilegedServiceCalled,
            actor: "alice".to_string(),
        };
        assert_eq!(engine.count_for(&key), 0);
    }
}
