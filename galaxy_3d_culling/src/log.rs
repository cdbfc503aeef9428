//! Internal logging system for the Galaxy3D culling engine
//!
//! This module provides:
//! - Customizable logger via Logger trait
//! - Severity levels (Trace, Debug, Info, Warn, Error)
//! - Colored console output by default
//! - An in-memory logger for callers that want to inspect diagnostics
//! - File and line information for detailed ERROR logs
//!
//! The active logger is process-global and guarded by a RwLock.

use colored::*;
use std::sync::{Arc, Mutex, OnceLock, RwLock};
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// # Example
///
/// ```no_run
/// use galaxy_3d_culling::galaxy3d::log::{Logger, LogEntry};
///
/// struct FileLogger;
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
///
/// galaxy_3d_culling::galaxy3d::log::set_logger(FileLogger);
/// ```
pub trait Logger: Send + Sync {
    /// Log an entry
    fn log(&self, entry: &LogEntry);
}

/// Log entry containing all information about a log message
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Severity level
    pub severity: LogSeverity,

    /// Timestamp when the log was created
    pub timestamp: SystemTime,

    /// Source module (e.g., "galaxy3d::culling::Bridge")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Very verbose per-object tracing
    Trace,

    /// Development/debugging information
    Debug,

    /// Important informational messages
    Info,

    /// Warnings (recovered configuration problems)
    Warn,

    /// Errors (contract or lifetime violations, with file:line details)
    Error,
}

impl LogSeverity {
    /// Fixed-width label used by the console logger
    pub fn label(&self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }
}

/// Default logger implementation using colored console output
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl DefaultLogger {
    /// Render an entry as a single console line (without trailing newline)
    pub fn format_entry(entry: &LogEntry) -> String {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => entry.severity.label().bright_black(),
            LogSeverity::Debug => entry.severity.label().cyan(),
            LogSeverity::Info => entry.severity.label().green(),
            LogSeverity::Warn => entry.severity.label().yellow(),
            LogSeverity::Error => entry.severity.label().red().bold(),
        };
        let source = entry.source.bright_blue();

        match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp, severity_str, source, entry.message, file, line
            ),
            _ => format!(
                "[{}] [{}] [{}] {}",
                timestamp, severity_str, source, entry.message
            ),
        }
    }
}

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        println!("{}", Self::format_entry(entry));
    }
}

/// Logger that keeps every entry in memory.
///
/// Clones share the same storage, so a clone can be installed with
/// `set_logger` while the original is kept to read entries back.
#[derive(Clone, Default)]
pub struct MemoryLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured entries, oldest first
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Captured entries at or above `severity`
    pub fn entries_at_least(&self, severity: LogSeverity) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity >= severity)
            .collect()
    }

    /// Drop all captured entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl Logger for MemoryLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

// ===== GLOBAL LOGGER =====

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Replace the active logger
pub fn set_logger<L: Logger + 'static>(new_logger: L) {
    if let Ok(mut lock) = logger().write() {
        *lock = Box::new(new_logger);
    }
}

/// Reset the active logger to `DefaultLogger`
pub fn reset_logger() {
    set_logger(DefaultLogger);
}

/// Internal logging entry point (no file:line).
///
/// Used by `engine_trace!`, `engine_debug!`, `engine_info!`, `engine_warn!`.
pub fn log(severity: LogSeverity, source: &str, message: String) {
    dispatch(severity, source, message, None, None);
}

/// Internal logging entry point with file:line (used by `engine_error!`)
pub fn log_detailed(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: &'static str,
    line: u32,
) {
    dispatch(severity, source, message, Some(file), Some(line));
}

fn dispatch(
    severity: LogSeverity,
    source: &str,
    message: String,
    file: Option<&'static str>,
    line: Option<u32>,
) {
    if let Ok(lock) = logger().read() {
        lock.log(&LogEntry {
            severity,
            timestamp: SystemTime::now(),
            source: source.to_string(),
            message,
            file,
            line,
        });
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message
#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a DEBUG message
#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::log::LogSeverity::Debug,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
///
/// # Example
///
/// ```ignore
/// engine_warn!("galaxy3d::culling::Manager", "Unknown culling mode '{}'", name);
/// ```
#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log(
            $crate::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::log::log_detailed(
            $crate::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
