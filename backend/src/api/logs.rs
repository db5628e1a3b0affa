//! Live log stream via Server-Sent Events (SSE).
//!
//! Loader, cache and page pipeline log through the helpers below; every entry
//! is printed to stdout and fanned out to `/api/logs` subscribers.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Entries buffered per subscriber before the oldest are dropped
const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level for sub-steps
    #[serde(default)]
    pub indent: u8,
    pub at: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            at: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Single console line for this entry.
    pub fn render(&self) -> String {
        let marker = match self.level {
            LogLevel::Info => "  ",
            LogLevel::Success => " ✓",
            LogLevel::Warning => " !",
            LogLevel::Error => " ✗",
        };
        format!("{}{} {}", "   ".repeat(self.indent as usize), marker, self.message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn log(&self, entry: LogEntry) {
        match entry.level {
            LogLevel::Error => eprintln!("{}", entry.render()),
            _ => println!("{}", entry.render()),
        }
        // No subscribers is fine.
        let _ = self.sender.send(entry);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

pub fn log_success_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Warning, "3 rows excluded").with_indent(1));

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, LogLevel::Warning);
        assert_eq!(entry.message, "3 rows excluded");
        assert_eq!(entry.indent, 1);
    }

    #[test]
    fn test_log_without_subscribers() {
        LogBroadcaster::new().log(LogEntry::new(LogLevel::Info, "nobody listening"));
    }

    #[test]
    fn test_entry_json_shape() {
        let entry = LogEntry::new(LogLevel::Success, "loaded");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "loaded");
        assert_eq!(json["indent"], 0);
        assert!(json["at"].is_string());
    }

    #[test]
    fn test_helpers_reach_global_subscribers() {
        let mut rx = LOG_BROADCASTER.subscribe();
        log_success_indent("helper reached subscribers", 2);

        let found = std::iter::from_fn(|| rx.try_recv().ok()).any(|e| {
            e.message == "helper reached subscribers" && e.level == LogLevel::Success && e.indent == 2
        });
        assert!(found);
    }

    #[test]
    fn test_render_indents() {
        let line = LogEntry::new(LogLevel::Info, "step").with_indent(2).render();
        assert!(line.starts_with("      "));
        assert!(line.ends_with("step"));
    }
}
