//! Secure append-only alert log with size-based rotation

use super::{AlertChannel, DeliveryOutcome};
use crate::models::Alert;
use async_trait::async_trait;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::error;

/// Rotation bounds for the secure log; exact values are deployment
/// configuration, not a core contract.
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    /// Rotate once the active file would exceed this size
    pub max_bytes: u64,
    /// Number of rotated backups kept (`file.1` .. `file.N`)
    pub backups: usize,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 10 * 1024 * 1024,
            backups: 5,
        }
    }
}

/// Appends one formatted line per alert to a dedicated log file
///
/// Line format: `ISO8601 | Type: <category> | User: <actor> | Details: <text>`.
/// Event details are sanitized upstream, so lines never carry secrets.
pub struct SecureLogChannel {
    path: PathBuf,
    policy: RotationPolicy,
    // Serializes the size check, rotation and append as one unit
    write_lock: Mutex<()>,
}

impl SecureLogChannel {
    /// Create the channel, ensuring the parent directory exists
    pub fn new(path: impl Into<PathBuf>, policy: RotationPolicy) -> std::io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            path,
            policy,
            write_lock: Mutex::new(()),
        })
    }

    /// Format the line appended for one alert
    pub fn format_line(alert: &Alert) -> String {
        format!(
            "{} | Type: {} | User: {} | Details: {}",
            alert.triggered_at.to_rfc3339(),
            alert.event.category,
            alert.event.actor,
            alert.event.details,
        )
    }

    fn append_line(&self, line: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        self.rotate_if_needed(line.len() as u64 + 1)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;

        Ok(())
    }

    /// Shift `file.N-1` -> `file.N` down the chain and move the active file
    /// to `file.1` when the pending write would cross the size bound.
    fn rotate_if_needed(&self, pending_bytes: u64) -> std::io::Result<()> {
        let current_len = match fs::metadata(&self.path) {
            Ok(meta) => meta.len(),
            Err(_) => return Ok(()),
        };

        if current_len + pending_bytes <= self.policy.max_bytes {
            return Ok(());
        }

        if self.policy.backups == 0 {
            fs::remove_file(&self.path)?;
            return Ok(());
        }

        let oldest = backup_path(&self.path, self.policy.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for index in (1..self.policy.backups).rev() {
            let from = backup_path(&self.path, index);
            if from.exists() {
                fs::rename(&from, backup_path(&self.path, index + 1))?;
            }
        }

        fs::rename(&self.path, backup_path(&self.path, 1))?;
        Ok(())
    }
}

fn backup_path(path: &Path, index: usize) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!(".{}", index));
    PathBuf::from(name)
}

#[async_trait]
impl AlertChannel for SecureLogChannel {
    fn name(&self) -> &'static str {
        "secure_log"
    }

    async fn deliver(&self, alert: &Alert) -> DeliveryOutcome {
        let line = Self::format_line(alert);

        // Critical severity: every dispatched alert lands in the audit trail
        error!(
            category = %alert.event.category,
            actor = %alert.event.actor,
            path = %self.path.display(),
            "Privilege escalation alert recorded"
        );

        match self.append_line(&line) {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::Failed(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Event, EventCategory, LogOrigin};
    use chrono::Utc;

    fn sample_alert(details: &str) -> Alert {
        Alert::new(Event {
            timestamp: Utc::now(),
            category: EventCategory::ServiceInstalled,
            actor: "alice".to_string(),
            details: details.to_string(),
            origin: LogOrigin::WindowsSecurityLog,
        })
    }

    #[tokio::test]
    async fn test_appends_formatted_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privilege_events.log");
        let channel = SecureLogChannel::new(&path, RotationPolicy::default()).unwrap();

        let alert = sample_alert("A service was installed on the system");
        assert!(matches!(
            channel.deliver(&alert).await,
            DeliveryOutcome::Delivered
        ));

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("| Type: ServiceInstalled |"));
        assert!(contents.contains("| User: alice |"));
        assert!(contents.contains("| Details: A service was installed on the system"));
        assert!(contents.contains(&alert.triggered_at.to_rfc3339()));
    }

    #[tokio::test]
    async fn test_creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("privilege_events.log");

        let channel = SecureLogChannel::new(&path, RotationPolicy::default()).unwrap();
        channel.deliver(&sample_alert("x")).await;

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_rotation_bounds_file_size_and_backup_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("privilege_events.log");
        let policy = RotationPolicy {
            max_bytes: 256,
            backups: 2,
        };
        let channel = SecureLogChannel::new(&path, policy).unwrap();

        for _ in 0..20 {
            channel.deliver(&sample_alert(&"d".repeat(64))).await;
        }

        assert!(fs::metadata(&path).unwrap().len() <= 256);
        assert!(backup_path(&path, 1).exists());
        assert!(backup_path(&path, 2).exists());
        assert!(!backup_path(&path, 3).exists());
    }

    #[test]
    fn test_line_format() {
        let alert = sample_alert("details here");
        let line = SecureLogChannel::format_line(&alert);

        let parts: Vec<&str> = line.split(" | ").collect();
        assert_eq!(parts.len(), 4);
        assert!(parts[1].starts_with("Type: "));
        assert!(parts[2].starts_with("User: "));
        assert!(parts[3].starts_with("Details: "));
    }
}
