//! Privilege escalation monitor daemon
//!
//! Polls the platform security log at a fixed interval, tracks repeated
//! privilege-change events per actor and fans alerts out to the console,
//! a secure log file and email.

use anyhow::{bail, Result};
use monitor_lib::dispatch::{
    ConsoleChannel, Dispatcher, EmailChannel, EmailConfig, RotationPolicy, SecureLogChannel,
};
use monitor_lib::engine::DetectionEngine;
use monitor_lib::poll::PollLoop;
use monitor_lib::source::{AuthLogTailer, LogSource, SecurityLogReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const MONITOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!(version = MONITOR_VERSION, "Starting privesc-monitor");

    let config = config::MonitorConfig::load()?;
    info!(
        os = std::env::consts::OS,
        threshold = config.alert_threshold,
        interval_secs = config.poll_interval_secs,
        secure_log = %config.secure_log_path,
        "Monitor configured"
    );

    let source: Arc<dyn LogSource> = match std::env::consts::OS {
        "windows" => Arc::new(SecurityLogReader::new().with_max_events(config.tail_lines)),
        "linux" => Arc::new(
            AuthLogTailer::new()
                .with_paths(config.auth_log_paths.iter().map(PathBuf::from).collect())
                .with_tail_lines(config.tail_lines),
        ),
        other => bail!("unsupported platform: {other}"),
    };

    let engine = Arc::new(DetectionEngine::new(config.alert_threshold));

    let secure_log = SecureLogChannel::new(
        &config.secure_log_path,
        RotationPolicy {
            max_bytes: config.secure_log_max_bytes,
            backups: config.secure_log_backups,
        },
    )?;

    let email = EmailChannel::new(EmailConfig {
        smtp_server: config.smtp_server.clone(),
        smtp_port: config.smtp_port,
        sender_email: config.sender_email.clone(),
        sender_password: config.sender_password.clone(),
        recipient_email: config.recipient_email.clone(),
    });

    if config.sender_email.is_none() || config.sender_password.is_none() {
        info!("Email credentials not configured, email channel will be skipped");
    }

    let dispatcher = Arc::new(
        Dispatcher::new()
            .channel(Arc::new(ConsoleChannel))
            .channel(Arc::new(secure_log))
            .channel(Arc::new(email)),
    );

    let (shutdown_tx, _) = broadcast::channel(1);
    let poll = PollLoop::new(
        source,
        engine,
        dispatcher,
        Duration::from_secs(config.poll_interval_secs),
    );
    let poll_handle = tokio::spawn(poll.run(shutdown_tx.subscribe()));

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received, shutting down");
    let _ = shutdown_tx.send(());
    let _ = poll_handle.await;

    Ok(())
}
