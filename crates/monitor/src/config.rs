//! Monitor configuration

use anyhow::{ensure, Result};
use serde::Deserialize;

/// Monitor configuration, loaded from `MONITOR_`-prefixed environment
/// variables with compiled-in defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    /// Occurrences of one tracking key before an alert fires
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: u32,

    /// Pause between polling cycles in seconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Trailing auth-log lines fetched per cycle (Linux)
    #[serde(default = "default_tail_lines")]
    pub tail_lines: usize,

    /// Auth log files to tail (Linux)
    #[serde(default = "default_auth_log_paths")]
    pub auth_log_paths: Vec<String>,

    /// Secure alert log location
    #[serde(default = "default_secure_log_path")]
    pub secure_log_path: String,

    /// Rotate the secure log past this size
    #[serde(default = "default_secure_log_max_bytes")]
    pub secure_log_max_bytes: u64,

    /// Rotated secure-log backups kept
    #[serde(default = "default_secure_log_backups")]
    pub secure_log_backups: usize,

    /// SMTP relay for the email channel
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Sender address; the email channel is skipped while unset
    #[serde(default)]
    pub sender_email: Option<String>,

    /// Sender app password; the email channel is skipped while unset
    #[serde(default)]
    pub sender_password: Option<String>,

    #[serde(default)]
    pub recipient_email: Option<String>,
}

fn default_alert_threshold() -> u32 {
    3
}

fn default_poll_interval() -> u64 {
    60
}

fn default_tail_lines() -> usize {
    100
}

fn default_auth_log_paths() -> Vec<String> {
    vec!["/var/log/auth.log".to_string(), "/var/log/secure".to_string()]
}

fn default_secure_log_path() -> String {
    "logs/privilege_events.log".to_string()
}

fn default_secure_log_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_secure_log_backups() -> usize {
    5
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            alert_threshold: default_alert_threshold(),
            poll_interval_secs: default_poll_interval(),
            tail_lines: default_tail_lines(),
            auth_log_paths: default_auth_log_paths(),
            secure_log_path: default_secure_log_path(),
            secure_log_max_bytes: default_secure_log_max_bytes(),
            secure_log_backups: default_secure_log_backups(),
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            sender_email: None,
            sender_password: None,
            recipient_email: None,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("MONITOR")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("auth_log_paths"),
            )
            .build()?;

        let config: MonitorConfig = config.try_deserialize().unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.alert_threshold >= 1, "alert threshold must be positive");
        ensure!(self.poll_interval_secs >= 1, "poll interval must be positive");
        Ok(())
    }
}
