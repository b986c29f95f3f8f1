//! Console alert channel

use super::{render_alert_block, AlertChannel, DeliveryOutcome};
use crate::models::Alert;
use async_trait::async_trait;
use tracing::warn;

const BANNER: &str = "==================================================";

/// Prints a banner-framed alert summary to stdout
pub struct ConsoleChannel;

#[async_trait]
impl AlertChannel for ConsoleChannel {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn deliver(&self, alert: &Alert) -> DeliveryOutcome {
        println!("\n{}", BANNER);
        println!("PRIVILEGE ESCALATION ALERT");
        println!("{}", render_alert_block(alert));
        println!("{}\n", BANNER);

        warn!(
            category = %alert.event.category,
            actor = %alert.event.actor,
            "Console alert displayed"
        );

        DeliveryOutcome::Delivered
    }
}
