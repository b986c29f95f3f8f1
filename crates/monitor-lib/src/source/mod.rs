//! Raw record acquisition from platform log sources
//!
//! Each adapter produces platform-tagged [`RawRecord`]s for the normalizer.
//! Adapters are polled by the loop in [`crate::poll`]; every failure they can
//! report is recoverable and at worst costs one cycle's contribution.

mod linux;
mod windows;

pub use linux::AuthLogTailer;
pub use windows::SecurityLogReader;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use thiserror::Error;

/// Structured record read from the Windows security log
#[derive(Debug, Clone)]
pub struct WindowsRecord {
    /// Security event id (4672, 4688, ...)
    pub event_id: u32,
    /// String-insert array; the first entry is the best-effort actor
    pub string_inserts: Vec<String>,
    /// Record generation time, if the source supplied a parseable one
    pub time_created: Option<DateTime<Utc>>,
}

/// One raw record from a platform adapter, tagged with its origin
#[derive(Debug, Clone)]
pub enum RawRecord {
    Windows(WindowsRecord),
    Linux {
        line: String,
        /// Log file the line came from, for diagnostics
        path: PathBuf,
    },
}

/// Recoverable adapter failures
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source cannot be read at all this cycle (permission denied,
    /// reader missing, unsupported platform)
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// The fetch exceeded its deadline
    #[error("timed out reading {0}")]
    Timeout(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Contract between the poll loop and a platform adapter
#[async_trait]
pub trait LogSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch a fresh batch of raw records.
    ///
    /// Implementations bound their own blocking calls with explicit
    /// timeouts; an error here skips the cycle's contribution from this
    /// source and is never fatal to the loop.
    async fn fetch(&self) -> Result<Vec<RawRecord>, SourceError>;
}
