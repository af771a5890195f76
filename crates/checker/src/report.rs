// SPDX-FileCopyrightText: 2026 Aaron Dewes <aaron@nirvati.org>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Findings reporting.
//!
//! Every check writes through a [`Scope`], which forwards to the shared
//! [`RunContext`]. The context serializes output through one mutex and owns the
//! fatal latch: once a fatal condition has been observed, nothing else is
//! printed for the rest of the run, although errors keep being counted.

use std::fmt;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use colored::{Color, Colorize};

use crate::error::CheckerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Fail,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Fail => "FAIL",
        }
    }

    fn color(self) -> Color {
        match self {
            Severity::Info => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Fail => Color::Red,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone)]
pub struct LogRecord {
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    /// Name of the thread that produced the record
    pub worker: String,
    /// What was being validated, e.g. `task sqli-error`
    pub subject: String,
    pub message: String,
}

pub trait LogSink: Send {
    fn emit(&mut self, record: &LogRecord);
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    #[default]
    Stdout,
    /// Keeps stdout free for machine-readable output
    Stderr,
}

/// Coloured, timestamped lines on the console.
#[derive(Debug, Default)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub fn new(stream: ConsoleStream) -> Self {
        Self { stream }
    }
}

impl LogSink for ConsoleSink {
    fn emit(&mut self, record: &LogRecord) {
        let prefix = format!(
            "{} [{} {}]",
            record.severity,
            record.worker,
            record.timestamp.format("%Y-%m-%d %H:%M:%S%.3f")
        );
        let line = if record.subject.is_empty() {
            format!("{} {}", prefix.color(record.severity.color()), record.message)
        } else {
            format!(
                "{} {}: {}",
                prefix.color(record.severity.color()),
                record.subject,
                record.message
            )
        };
        // a closed console has nowhere to report to
        let _ = match self.stream {
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
    }
}

/// Keeps every record in memory, for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.severity == severity)
            .map(|r| r.message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&mut self, record: &LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

/// Shared state of a single validation run.
pub struct RunContext {
    sink: Mutex<Box<dyn LogSink>>,
    halted: AtomicBool,
    errors: AtomicUsize,
}

impl RunContext {
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
            halted: AtomicBool::new(false),
            errors: AtomicUsize::new(0),
        }
    }

    pub fn console() -> Self {
        Self::new(ConsoleSink::default())
    }

    pub fn scope(&self, subject: impl Into<String>) -> Scope<'_> {
        Scope {
            ctx: self,
            subject: subject.into(),
            was_error: false,
        }
    }

    /// True once a fatal condition has been recorded.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Number of hard errors observed so far, including suppressed ones.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn log(&self, severity: Severity, subject: &str, message: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            return;
        };
        if self.is_halted() {
            return;
        }
        sink.emit(&record(severity, subject, message));
    }

    fn count_error(&self) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }

    /// Records a fatal condition. Only the first one is printed.
    fn halt(&self, subject: &str, message: &str) {
        let Ok(mut sink) = self.sink.lock() else {
            self.halted.store(true, Ordering::SeqCst);
            return;
        };
        if !self.halted.swap(true, Ordering::SeqCst) {
            sink.emit(&record(Severity::Fail, subject, message));
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::console()
    }
}

fn record(severity: Severity, subject: &str, message: &str) -> LogRecord {
    let current = std::thread::current();
    LogRecord {
        severity,
        timestamp: Utc::now(),
        worker: current.name().unwrap_or("unnamed").to_string(),
        subject: subject.to_string(),
        message: message.to_string(),
    }
}

/// Reporting handle of one validator.
///
/// `warn` and `error` return `true` when the condition did *not* hold, so call
/// sites can write `if scope.error(cond, ..) { return; }`.
pub struct Scope<'a> {
    ctx: &'a RunContext,
    subject: String,
    was_error: bool,
}

impl<'a> Scope<'a> {
    pub fn context(&self) -> &'a RunContext {
        self.ctx
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn was_error(&self) -> bool {
        self.was_error
    }

    pub fn info(&self, message: impl AsRef<str>) {
        self.ctx.log(Severity::Info, &self.subject, message.as_ref());
    }

    pub fn warn(&self, cond: bool, message: impl AsRef<str>) -> bool {
        if !cond {
            self.ctx.log(Severity::Warning, &self.subject, message.as_ref());
        }
        !cond
    }

    pub fn error(&mut self, cond: bool, message: impl AsRef<str>) -> bool {
        if !cond {
            self.was_error = true;
            self.ctx.count_error();
            self.ctx.log(Severity::Fail, &self.subject, message.as_ref());
        }
        !cond
    }

    /// Stops the run when `cond` does not hold.
    pub fn fatal(&mut self, cond: bool, message: impl AsRef<str>) -> Result<(), CheckerError> {
        if cond {
            return Ok(());
        }
        self.was_error = true;
        self.ctx.count_error();
        self.ctx.halt(&self.subject, message.as_ref());
        Err(CheckerError::Fatal(message.as_ref().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_and_error_report_failed_condition() {
        let sink = MemorySink::new();
        let ctx = RunContext::new(sink.clone());
        let mut scope = ctx.scope("task demo");

        assert!(!scope.warn(true, "fine"));
        assert!(scope.warn(false, "suspicious"));
        assert!(!scope.was_error());
        assert!(!scope.error(true, "fine"));
        assert!(scope.error(false, "broken"));
        assert!(scope.was_error());

        assert_eq!(sink.messages(Severity::Warning), vec!["suspicious"]);
        assert_eq!(sink.messages(Severity::Fail), vec!["broken"]);
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(sink.records()[0].subject, "task demo");
    }

    #[test]
    fn test_fatal_latches_and_suppresses_output() {
        let sink = MemorySink::new();
        let ctx = RunContext::new(sink.clone());
        let mut scope = ctx.scope("discovery");

        assert!(scope.fatal(true, "not fatal").is_ok());
        assert!(!ctx.is_halted());
        assert!(matches!(
            scope.fatal(false, "selector broken"),
            Err(CheckerError::Fatal(_))
        ));
        assert!(ctx.is_halted());

        let mut other = ctx.scope("task demo");
        assert!(other.error(false, "after the latch"));
        other.info("also hidden");
        assert!(scope.fatal(false, "second fatal").is_err());

        assert_eq!(sink.messages(Severity::Fail), vec!["selector broken"]);
        assert_eq!(sink.records().len(), 1);
        // suppressed errors still count
        assert_eq!(ctx.error_count(), 3);
    }

    #[test]
    fn test_records_carry_worker_name() {
        let sink = MemorySink::new();
        let ctx = RunContext::new(sink.clone());
        std::thread::scope(|s| {
            std::thread::Builder::new()
                .name("worker-7".to_string())
                .spawn_scoped(s, || ctx.scope("task demo").info("hello"))
                .unwrap();
        });
        assert_eq!(sink.records()[0].worker, "worker-7");
    }
}
