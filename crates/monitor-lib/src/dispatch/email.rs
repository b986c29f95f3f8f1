//! SMTP email alert channel

use super::{render_alert_block, AlertChannel, ChannelError, DeliveryOutcome};
use crate::models::Alert;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

const ALERT_SUBJECT: &str = "SECURITY ALERT: Privilege Escalation Detected";

const CALL_TO_ACTION: &str =
    "Action Required: Investigate this event immediately and verify if this was an authorized action.";

/// SMTP settings for the email channel
///
/// Sender credentials and recipient are optional; the channel skips
/// delivery (rather than failing) while any of them is unconfigured.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: Option<String>,
    pub sender_password: Option<String>,
    pub recipient_email: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender_email: None,
            sender_password: None,
            recipient_email: None,
        }
    }
}

/// Delivers alerts over SMTP with STARTTLS
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn render_body(alert: &Alert) -> String {
        format!(
            "PRIVILEGE ESCALATION ALERT\n\n{}\n\n{}\n",
            render_alert_block(alert),
            CALL_TO_ACTION,
        )
    }

    async fn send(&self, alert: &Alert, sender: &str, password: &str, recipient: &str) -> Result<(), ChannelError> {
        let message = Message::builder()
            .from(sender.parse()?)
            .to(recipient.parse()?)
            .subject(ALERT_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(Self::render_body(alert))?;

        let credentials = Credentials::new(sender.to_string(), password.to_string());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_server)?
            .port(self.config.smtp_port)
            .credentials(credentials)
            .build();

        mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl AlertChannel for EmailChannel {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn deliver(&self, alert: &Alert) -> DeliveryOutcome {
        let (Some(sender), Some(password)) = (
            self.config.sender_email.as_deref(),
            self.config.sender_password.as_deref(),
        ) else {
            return DeliveryOutcome::Skipped("email credentials not configured".to_string());
        };

        let Some(recipient) = self.config.recipient_email.as_deref() else {
            return DeliveryOutcome::Skipped("no recipient configured".to_string());
        };

        match self.send(alert, sender, password, recipient).await {
            Ok(()) => {
                info!(recipient = %recipient, "Email alert sent");
                DeliveryOutcome::Delivered
            }
            Err(e) => DeliveryOutcome::Failed(e),
        }
    }
}
