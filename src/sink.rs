//! Append-only diagnostic output shared by every stage of a run.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl From<Level> for log::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => log::Level::Debug,
            Level::Info => log::Level::Info,
            Level::Warn => log::Level::Warn,
            Level::Error => log::Level::Error,
        }
    }
}

/// Receives human-readable progress and error lines.
///
/// Implementations must tolerate concurrent writers; the numstat workers
/// report through the same sink as the orchestrator.
pub trait DiagnosticSink: Send + Sync {
    fn line(&self, level: Level, message: &str);

    fn debug(&self, message: &str) {
        self.line(Level::Debug, message);
    }

    fn info(&self, message: &str) {
        self.line(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.line(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.line(Level::Error, message);
    }
}

/// Forwards diagnostics to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn line(&self, level: Level, message: &str) {
        log::log!(target: "gitweek", level.into(), "{message}");
    }
}

/// Keeps every line in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Level, String)> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn messages_at(&self, level: Level) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn line(&self, level: Level, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((level, message.to_string()));
    }
}
