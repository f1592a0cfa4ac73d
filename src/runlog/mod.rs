//! TZ-015: Append-only JSONL run event log.
//!
//! Opt-in observability for polyglot runs: one JSON object per line,
//! timestamped, appended to `runs.jsonl` under the chosen log
//! directory. Log failures never fail a run.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Run event for the JSONL log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        source: String,
        trenza_version: String,
    },
    BlockStarted {
        run_id: String,
        index: usize,
        language: String,
    },
    BlockCompleted {
        run_id: String,
        index: usize,
        language: String,
        duration_seconds: f64,
    },
    BlockFailed {
        run_id: String,
        index: usize,
        language: String,
        exit_code: i32,
        error: String,
    },
    RunCompleted {
        run_id: String,
        blocks_run: u32,
        blocks_failed: u32,
        total_seconds: f64,
    },
}

/// Timestamped event wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEvent {
    pub ts: String,
    #[serde(flatten)]
    pub event: RunEvent,
}

/// Generate an ISO 8601 timestamp.
pub fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Generate a run ID.
pub fn generate_run_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("r-{:012x}", nanos & 0xFFFF_FFFF_FFFF)
}

/// Append-only event sink for one log directory.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("runs.jsonl"),
        }
    }

    /// The file events land in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event.
    pub fn append(&self, event: RunEvent) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create log dir: {}", e))?;
        }

        let te = TimestampedEvent {
            ts: now_iso8601(),
            event,
        };
        let json = serde_json::to_string(&te).map_err(|e| format!("JSON serialize error: {}", e))?;

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| format!("cannot open run log {}: {}", self.path.display(), e))?;

        writeln!(file, "{}", json).map_err(|e| format!("write error: {}", e))?;

        Ok(())
    }
}
