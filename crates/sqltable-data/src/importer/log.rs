//! Import event sink.
//!
//! Every importer owns an [`ImportLog`]. Events are kept when the caller's
//! verbosity admits them and are always forwarded to `tracing`, so a binary
//! can watch them through its subscriber while a library caller inspects
//! the collected events after the import.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// How much the log keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    /// Warnings only
    Quiet,
    /// Warnings and per-sheet progress
    #[default]
    Normal,
    /// Everything, including generated statements
    Verbose,
}

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
}

/// One recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEvent {
    pub level: EventLevel,
    /// Sheet the event relates to, if any
    pub sheet: Option<String>,
    pub message: String,
}

/// Collects import events subject to a verbosity threshold
#[derive(Debug, Clone, Default)]
pub struct ImportLog {
    verbosity: Verbosity,
    events: Vec<ImportEvent>,
}

impl ImportLog {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            events: Vec::new(),
        }
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Whether events of `level` are kept
    pub fn accepts(&self, level: EventLevel) -> bool {
        match self.verbosity {
            Verbosity::Quiet => level >= EventLevel::Warn,
            Verbosity::Normal => level >= EventLevel::Info,
            Verbosity::Verbose => true,
        }
    }

    /// Record an event
    pub fn record(&mut self, level: EventLevel, sheet: Option<&str>, message: impl Into<String>) {
        let message = message.into();
        let sheet_name = sheet.unwrap_or("");

        match level {
            EventLevel::Debug => debug!(sheet = sheet_name, "{}", message),
            EventLevel::Info => info!(sheet = sheet_name, "{}", message),
            EventLevel::Warn => warn!(sheet = sheet_name, "{}", message),
        }

        if self.accepts(level) {
            self.events.push(ImportEvent {
                level,
                sheet: sheet.map(str::to_string),
                message,
            });
        }
    }

    pub fn debug(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        self.record(EventLevel::Debug, sheet, message);
    }

    pub fn info(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        self.record(EventLevel::Info, sheet, message);
    }

    pub fn warn(&mut self, sheet: Option<&str>, message: impl Into<String>) {
        self.record(EventLevel::Warn, sheet, message);
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[ImportEvent] {
        &self.events
    }

    /// Remove and return the recorded events
    pub fn take_events(&mut self) -> Vec<ImportEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_keeps_only_warnings() {
        let mut log = ImportLog::new(Verbosity::Quiet);
        log.debug(None, "statement");
        log.info(Some("S"), "created");
        log.warn(Some("S"), "rolled back");

        assert_eq!(log.events().len(), 1);
        assert_eq!(log.events()[0].level, EventLevel::Warn);
        assert_eq!(log.events()[0].sheet.as_deref(), Some("S"));
    }

    #[test]
    fn test_normal_skips_debug() {
        let mut log = ImportLog::default();
        log.debug(None, "statement");
        log.info(None, "created");

        assert_eq!(log.verbosity(), Verbosity::Normal);
        assert_eq!(log.events().len(), 1);
    }

    #[test]
    fn test_verbose_keeps_everything() {
        let mut log = ImportLog::new(Verbosity::Verbose);
        log.debug(None, "a");
        log.info(None, "b");
        log.warn(None, "c");
        assert_eq!(log.events().len(), 3);

        let taken = log.take_events();
        assert_eq!(taken.len(), 3);
        assert!(log.is_empty());
    }
}
