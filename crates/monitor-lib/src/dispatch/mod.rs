//! Alert fan-out to delivery channels
//!
//! The dispatcher attempts every configured channel independently; a
//! channel failing, skipping or crashing its delivery never blocks the
//! others and never propagates to the caller.

mod console;
mod email;
mod secure_log;

pub use console::ConsoleChannel;
pub use email::{EmailChannel, EmailConfig};
pub use secure_log::{RotationPolicy, SecureLogChannel};

use crate::models::Alert;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Channel-level delivery failures
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("malformed address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("smtp delivery failed: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Typed delivery result, so callers branch without error plumbing
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The channel accepted the alert
    Delivered,
    /// The channel chose not to attempt delivery (e.g. unconfigured)
    Skipped(String),
    /// Delivery was attempted and failed
    Failed(ChannelError),
}

/// One alert-delivery mechanism
#[async_trait]
pub trait AlertChannel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Attempt delivery of one alert. Never retried by the dispatcher.
    async fn deliver(&self, alert: &Alert) -> DeliveryOutcome;
}

/// Per-dispatch tally across channels
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Fans triggered alerts out to every configured channel
#[derive(Default)]
pub struct Dispatcher {
    channels: Vec<Arc<dyn AlertChannel>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            channels: Vec::new(),
        }
    }

    /// Add a delivery channel; channels are attempted in insertion order
    pub fn channel(mut self, channel: Arc<dyn AlertChannel>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Attempt delivery on every channel, independently.
    ///
    /// Returns after all channels have been attempted; per-channel failures
    /// are logged, counted and otherwise swallowed.
    pub async fn dispatch(&self, alert: &Alert) -> DispatchReport {
        let mut report = DispatchReport::default();

        for channel in &self.channels {
            match channel.deliver(alert).await {
                DeliveryOutcome::Delivered => {
                    report.delivered += 1;
                    debug!(channel = channel.name(), "Alert delivered");
                }
                DeliveryOutcome::Skipped(reason) => {
                    report.skipped += 1;
                    info!(channel = channel.name(), reason = %reason, "Alert channel skipped");
                }
                DeliveryOutcome::Failed(err) => {
                    report.failed += 1;
                    error!(channel = channel.name(), error = %err, "Alert delivery failed");
                }
            }
        }

        report
    }
}

/// Shared plain-text rendering used by the console banner and email body
pub(crate) fn render_alert_block(alert: &Alert) -> String {
    format!(
        "Timestamp: {}\nEvent Type: {}\nUser: {}\nDetails: {}",
        alert.event.timestamp.to_rfc3339(),
        alert.event.category,
        alert.event.actor,
        alert.event.details,
    )
}
