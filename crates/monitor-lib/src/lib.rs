//! Core library for the privilege escalation monitor
//!
//! This crate provides the detection pipeline:
//! - Raw record acquisition from platform log sources
//! - Normalization into canonical events
//! - Per-actor occurrence tracking with threshold-triggered alerts
//! - Alert fan-out to console, secure log and email channels

pub mod dispatch;
pub mod engine;
pub mod models;
pub mod normalizer;
pub mod poll;
pub mod sanitize;
pub mod source;

pub use engine::{DetectionEngine, DEFAULT_ALERT_THRESHOLD};
pub use models::*;
pub use poll::{CycleStats, PollLoop, DEFAULT_POLL_INTERVAL};
