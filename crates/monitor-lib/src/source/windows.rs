//! Windows security-log adapter
//!
//! Queries the Security channel through a PowerShell `Get-WinEvent`
//! subprocess emitting JSON, filtered server-side to the monitored event
//! ids. Requires an elevated session to read the Security log.

use super::{LogSource, RawRecord, SourceError, WindowsRecord};
use crate::normalizer::MONITORED_EVENT_IDS;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

/// Default number of records queried per cycle
const DEFAULT_MAX_EVENTS: usize = 100;

/// Deadline for the whole PowerShell query
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads privilege-escalation event ids from the Windows security log
pub struct SecurityLogReader {
    max_events: usize,
    read_timeout: Duration,
}

impl SecurityLogReader {
    pub fn new() -> Self {
        Self {
            max_events: DEFAULT_MAX_EVENTS,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Override how many records are queried per cycle
    pub fn with_max_events(mut self, max_events: usize) -> Self {
        self.max_events = max_events;
        self
    }

    /// Override the query deadline
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Build the PowerShell query for the monitored id set
    fn query_script(&self) -> String {
        let ids = MONITORED_EVENT_IDS
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "Get-WinEvent -FilterHashtable @{{LogName='Security'; Id=@({ids})}} \
             -MaxEvents {max} -ErrorAction Stop | \
             Select-Object Id, \
             @{{Name='TimeCreated';Expression={{$_.TimeCreated.ToUniversalTime().ToString('o')}}}}, \
             @{{Name='Inserts';Expression={{@($_.Properties | ForEach-Object {{ [string]$_.Value }})}}}} | \
             ConvertTo-Json -Depth 3",
            ids = ids,
            max = self.max_events,
        )
    }
}

impl Default for SecurityLogReader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LogSource for SecurityLogReader {
    fn name(&self) -> &'static str {
        "windows_security_log"
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError> {
        let script = self.query_script();
        let mut command = Command::new("powershell");
        command.args(["-NoProfile", "-NonInteractive", "-Command", &script]);

        let output = timeout(self.read_timeout, command.output())
            .await
            .map_err(|_| SourceError::Timeout("Security log query".to_string()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            // An empty result set is reported as an error by Get-WinEvent
            if stderr.contains("No events were found") {
                return Ok(Vec::new());
            }
            return Err(SourceError::Unavailable(format!(
                "Get-WinEvent failed: {}",
                stderr.trim()
            )));
        }

        let records = parse_security_events(&output.stdout);
        debug!(count = records.len(), "Fetched security log records");

        Ok(records.into_iter().map(RawRecord::Windows).collect())
    }
}

/// Parse the JSON emitted by the query into structured records.
///
/// ConvertTo-Json emits a bare object for a single result and an array
/// otherwise; malformed entries are dropped individually.
fn parse_security_events(stdout: &[u8]) -> Vec<WindowsRecord> {
    let parsed: Value = match serde_json::from_slice(stdout) {
        Ok(value) => value,
        Err(_) => return Vec::new(),
    };

    let entries = match parsed {
        Value::Array(entries) => entries,
        single @ Value::Object(_) => vec![single],
        _ => return Vec::new(),
    };

    entries
        .iter()
        .filter_map(parse_security_event)
        .filter(|record| MONITORED_EVENT_IDS.contains(&record.event_id))
        .collect()
}

fn parse_security_event(entry: &Value) -> Option<WindowsRecord> {
    let event_id = entry.get("Id")?.as_u64()? as u32;

    let time_created = entry
        .get("TimeCreated")
        .and_then(|v| v.as_str())
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc));

    let string_inserts = match entry.get("Inserts") {
        // A single property serializes as a bare string
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    };

    Some(WindowsRecord {
        event_id,
        string_inserts,
        time_created,
    })
}
