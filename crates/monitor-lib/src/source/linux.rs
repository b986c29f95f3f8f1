//! Linux auth-log adapter
//!
//! Reads the tail of the system auth logs through a `tail` subprocess, the
//! same way the journald-style tailers in this space shell out rather than
//! parse binary logs directly. Requires read access to the log files, which
//! usually means running as root or a member of `adm`.

use super::{LogSource, RawRecord, SourceError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Default auth log locations (Debian-family, then RHEL-family)
const DEFAULT_LOG_PATHS: &[&str] = &["/var/log/auth.log", "/var/log/secure"];

/// Default number of trailing lines fetched per cycle
const DEFAULT_TAIL_LINES: usize = 100;

/// Per-file read deadline
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Tails Linux auth logs for privilege-escalation indicators
pub struct AuthLogTailer {
    log_paths: Vec<PathBuf>,
    tail_lines: usize,
    read_timeout: Duration,
}

impl AuthLogTailer {
    pub fn new() -> Self {
        Self {
            log_paths: DEFAULT_LOG_PATHS.iter().map(PathBuf::from).collect(),
            tail_lines: DEFAULT_TAIL_LINES,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override the set of log files to tail
    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.log_paths = paths;
        self
    }

    /// Override how many trailing lines are fetched per cycle
    pub fn with_tail_lines(mut self, lines: usize) -> Self {
        self.tail_lines = lines;
        self
    }

    /// Override the per-file read deadline
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Read the last `tail_lines` lines of one log file
    async fn tail_file(&self, path: &Path) -> Result<Vec<String>, SourceError> {
        let output = Command::new("tail")
            .arg("-n")
            .arg(self.tail_lines.to_string())
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SourceError::Unavailable(format!(
                "tail {} failed: {}",
                path.display(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

impl Default for AuthLogTailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for AuthLogTailer {
    fn name(&self) -> &'static str {
        "linux_auth_log"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let mut records = Vec::new();

        for path in &self.log_paths {
            // Hosts carry one of auth.log/secure, not both
            if !path.exists() {
                debug!(path = %path.display(), "Auth log not present, skipping");
                continue;
            }

            match timeout(self.read_timeout, self.tail_file(path)).await {
                Ok(Ok(lines)) => {
                    records.extend(lines.into_iter().map(|line| RawRecord::Linux {
                        line,
                        path: path.clone(),
                    }));
                }
                Ok(Err(e)) => {
                    warn!(path = %path.display(), error = %e, "Failed to read auth log");
                }
                Err(_) => {
                    warn!(
                        path = %path.display(),
                        timeout_secs = self.read_timeout.as_secs(),
                        "Timed out reading auth log"
                    );
                }
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_fetch_skips_missing_files() {
        let tailer = AuthLogTailer::new()
            .with_paths(vec![PathBuf::from("/nonexistent/auth.log")]);

        let records = tailer.fetch().await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_reads_trailing_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for i in 0..10 {
            writeln!(file, "line {}", i).unwrap();
        }
        file.flush().unwrap();

        let tailer = AuthLogTailer::new()
            .with_paths(vec![file.path().to_path_buf()])
            .with_tail_lines(3);

        let records = tailer.fetch().await.unwrap();
        assert_eq!(records.len(), 3);

        match &records[0] {
            RawRecord::Linux { line, path } => {
                assert_eq!(line, "line 7");
                assert_eq!(path, file.path());
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_preserves_line_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "first").unwrap();
        writeln!(file, "second").unwrap();
        file.flush().unwrap();

        let tailer = AuthLogTailer::new().with_paths(vec![file.path().to_path_buf()]);

        let records = tailer.fetch().await.unwrap();
        let lines: Vec<_> = records
            .iter()
            .map(|r| match r {
                RawRecord::Linux { line, .. } => line.clone(),
                other => panic!("unexpected record: {:?}", other),
            })
            .collect();

        assert_eq!(lines, vec!["first", "second"]);
    }
}
