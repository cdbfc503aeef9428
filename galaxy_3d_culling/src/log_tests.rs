//! Unit tests for log.rs
//!
//! Tests LogSeverity, DefaultLogger formatting, MemoryLogger and the
//! global logger entry points used by the engine_* macros.

use crate::log::{self, Logger, LogEntry, LogSeverity, DefaultLogger, MemoryLogger};
use serial_test::serial;
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "galaxy3d::culling::Test".to_string(),
        message: message.to_string(),
        file: None,
        line: None,
    }
}

// ============================================================================
// LOG SEVERITY TESTS
// ============================================================================

#[test]
fn test_log_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels_have_fixed_width() {
    for severity in [
        LogSeverity::Trace,
        LogSeverity::Debug,
        LogSeverity::Info,
        LogSeverity::Warn,
        LogSeverity::Error,
    ] {
        assert_eq!(severity.label().len(), 5);
    }
    assert_eq!(LogSeverity::Warn.label().trim(), "WARN");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_format_without_location() {
    let line = DefaultLogger::format_entry(&entry(LogSeverity::Info, "group created"));
    assert!(line.contains("galaxy3d::culling::Test"));
    assert!(line.contains("group created"));
    assert!(!line.contains(".rs:"));
}

#[test]
fn test_default_logger_format_with_location() {
    let mut e = entry(LogSeverity::Error, "duplicate object");
    e.file = Some("culling_bridge.rs");
    e.line = Some(42);

    let line = DefaultLogger::format_entry(&e);
    assert!(line.contains("duplicate object"));
    assert!(line.contains("(culling_bridge.rs:42)"));
}

#[test]
fn test_default_logger_does_not_panic() {
    let logger = DefaultLogger;
    logger.log(&entry(LogSeverity::Trace, "trace"));
    logger.log(&entry(LogSeverity::Warn, "warn"));
}

// ============================================================================
// MEMORY LOGGER TESTS
// ============================================================================

#[test]
fn test_memory_logger_captures_in_order() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Debug, "first"));
    logger.log(&entry(LogSeverity::Warn, "second"));

    let entries = logger.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].message, "first");
    assert_eq!(entries[1].message, "second");
}

#[test]
fn test_memory_logger_clones_share_storage() {
    let logger = MemoryLogger::new();
    let clone = logger.clone();
    clone.log(&entry(LogSeverity::Info, "shared"));

    assert_eq!(logger.entries().len(), 1);
    logger.clear();
    assert!(clone.entries().is_empty());
}

#[test]
fn test_memory_logger_severity_filter() {
    let logger = MemoryLogger::new();
    logger.log(&entry(LogSeverity::Trace, "a"));
    logger.log(&entry(LogSeverity::Warn, "b"));
    logger.log(&entry(LogSeverity::Error, "c"));

    let warnings = logger.entries_at_least(LogSeverity::Warn);
    assert_eq!(warnings.len(), 2);
    assert_eq!(warnings[0].message, "b");
}

#[test]
fn test_logger_types_are_send_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<DefaultLogger>();
    assert_send_sync::<MemoryLogger>();
}

// ============================================================================
// GLOBAL LOGGER TESTS
// ============================================================================

// Tests outside this file may log concurrently; keep only our own entries
fn own_entries(logger: &MemoryLogger) -> Vec<LogEntry> {
    logger.entries()
        .into_iter()
        .filter(|e| e.source == "galaxy3d::culling::GlobalLogTest")
        .collect()
}

#[test]
#[serial]
fn test_macros_route_to_installed_logger() {
    let logger = MemoryLogger::new();
    log::set_logger(logger.clone());

    crate::engine_trace!("galaxy3d::culling::GlobalLogTest", "t {}", 1);
    crate::engine_debug!("galaxy3d::culling::GlobalLogTest", "d {}", 2);
    crate::engine_info!("galaxy3d::culling::GlobalLogTest", "i {}", 3);
    crate::engine_warn!("galaxy3d::culling::GlobalLogTest", "w {}", 4);
    crate::engine_error!("galaxy3d::culling::GlobalLogTest", "e {}", 5);
    log::reset_logger();

    let entries = own_entries(&logger);
    let messages: Vec<&str> = entries.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["t 1", "d 2", "i 3", "w 4", "e 5"]);

    // Only ERROR carries file:line
    assert!(entries[..4].iter().all(|e| e.file.is_none() && e.line.is_none()));
    assert_eq!(entries[4].file, Some(file!()));
    assert!(entries[4].line.is_some());
}

#[test]
#[serial]
fn test_reset_logger_stops_capturing() {
    let logger = MemoryLogger::new();
    log::set_logger(logger.clone());
    log::log(LogSeverity::Info, "galaxy3d::culling::GlobalLogTest", "captured".to_string());
    log::reset_logger();
    log::log(LogSeverity::Info, "galaxy3d::culling::GlobalLogTest", "not captured".to_string());

    let entries = own_entries(&logger);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].message, "captured");
}
