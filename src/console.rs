//! Live console of the Chatipelago client.
//!
//! The admin API pushes log lines as server-sent events on `/api/console`,
//! each event's `data:` holding `{"timestamp", "level", "message"}`.
//! [`SseDecoder`] turns raw response chunks into [`LogEntry`] values and
//! [`LogBuffer`] keeps a bounded tail of them.

use chrono::{DateTime, Local, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// History kept by default before the oldest lines are dropped.
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "log" => Ok(LogLevel::Log),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!(
                "unknown log level '{other}' (expected debug, log, info, warn or error)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// As sent by the server, normally RFC 3339.
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn parsed_timestamp(&self) -> Option<DateTime<Local>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|ts| ts.with_timezone(&Local))
    }

    /// `HH:MM:SS` in local time, or the raw timestamp when it does not parse.
    pub fn display_time(&self) -> String {
        match self.parsed_timestamp() {
            Some(ts) => ts.format("%H:%M:%S").to_string(),
            None => self.timestamp.clone(),
        }
    }

    /// `[timestamp] [LEVEL] message`, the export line format.
    pub fn export_line(&self) -> String {
        format!(
            "[{}] [{}] {}",
            self.timestamp,
            self.level.as_str().to_ascii_uppercase(),
            self.message
        )
    }
}

/// Incremental server-sent events decoder.
///
/// Feed it response chunks as they arrive; chunk boundaries may fall
/// anywhere, including inside a UTF-8 sequence. Events whose data is not a
/// log entry are skipped with a warning.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogEntry> {
        self.pending.extend_from_slice(chunk);
        let mut entries = Vec::new();

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

            if line.is_empty() {
                if let Some(entry) = self.dispatch() {
                    entries.push(entry);
                }
            } else if let Some(rest) = line.strip_prefix("data:") {
                self.data
                    .push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
            // Comments (`:`) and the event/id/retry fields carry nothing we use.
        }

        entries
    }

    /// Flush a final event that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<LogEntry> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&tail);
            if let Some(rest) = line.trim_end_matches('\r').strip_prefix("data:") {
                self.data
                    .push(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            }
        }
        self.dispatch()
    }

    fn dispatch(&mut self) -> Option<LogEntry> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        match serde_json::from_str::<LogEntry>(&payload) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Failed to parse console event: {}", e);
                None
            }
        }
    }
}

/// Bounded console history; the oldest entries fall off first.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    max_messages: usize,
}

impl Default for LogBuffer {
    fn default() -> Self {
        LogBuffer::new(DEFAULT_MAX_MESSAGES)
    }
}

impl LogBuffer {
    pub fn new(max_messages: usize) -> Self {
        let max_messages = max_messages.max(1);
        LogBuffer {
            entries: VecDeque::with_capacity(max_messages.min(DEFAULT_MAX_MESSAGES)),
            max_messages,
        }
    }

    pub fn push(&mut self, entry: LogEntry) {
        if self.entries.len() == self.max_messages {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Entries at exactly `level`, or all of them for `None`.
    pub fn filtered(&self, level: Option<LogLevel>) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(move |entry| level.map_or(true, |l| entry.level == l))
    }

    /// Every buffered entry as export lines joined by newlines.
    pub fn export(&self) -> String {
        self.entries
            .iter()
            .map(LogEntry::export_line)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Extend<LogEntry> for LogBuffer {
    fn extend<T: IntoIterator<Item = LogEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.push(entry);
        }
    }
}

/// Default export file name for a given day.
pub fn export_file_name(day: NaiveDate) -> String {
    format!("chatipelago-logs-{}.txt", day.format("%Y-%m-%d"))
}
