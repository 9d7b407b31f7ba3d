//! Unit tests for log.rs
//!
//! Tests LogSeverity, LogEntry, CallbackLogger and DefaultLogger.

use crate::log::{CallbackLogger, DefaultLogger, LogEntry, LogSeverity, Logger, MessageCallback};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

fn entry(severity: LogSeverity, message: &str) -> LogEntry {
    LogEntry {
        severity,
        timestamp: SystemTime::now(),
        source: "prism::test".to_string(),
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
    assert!(LogSeverity::Trace < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

#[test]
fn test_log_severity_labels() {
    assert_eq!(LogSeverity::Trace.to_string(), "TRACE");
    assert_eq!(LogSeverity::Info.to_string(), "INFO");
    assert_eq!(LogSeverity::Warn.to_string(), "WARN");
    assert_eq!(LogSeverity::Error.to_string(), "ERROR");
}

// ============================================================================
// CALLBACK LOGGER TESTS
// ============================================================================

#[test]
fn test_callback_logger_forwards_message_and_severity() {
    let seen: Arc<Mutex<Vec<(String, LogSeverity)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: MessageCallback = Arc::new(move |message: &str, severity: LogSeverity| {
        sink.lock().unwrap().push((message.to_string(), severity));
    });

    let logger = CallbackLogger::new(callback);
    logger.log(&entry(LogSeverity::Warn, "framebuffer resize rejected"));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "framebuffer resize rejected");
    assert_eq!(seen[0].1, LogSeverity::Warn);
}

#[test]
fn test_callback_logger_appends_location_for_detailed_entries() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let logger = CallbackLogger::new(Arc::new(move |message: &str, _: LogSeverity| {
        sink.lock().unwrap().push(message.to_string());
    }));

    let mut detailed = entry(LogSeverity::Error, "link failed");
    detailed.file = Some("shader.rs");
    detailed.line = Some(42);
    logger.log(&detailed);

    assert_eq!(seen.lock().unwrap()[0], "link failed (shader.rs:42)");
}

// ============================================================================
// DEFAULT LOGGER TESTS
// ============================================================================

#[test]
fn test_default_logger_handles_every_severity() {
    let logger = DefaultLogger;
    for severity in [LogSeverity::Trace, LogSeverity::Info, LogSeverity::Warn, LogSeverity::Error] {
        logger.log(&entry(severity, "console output"));
    }
}

#[test]
fn test_default_logger_with_location() {
    let mut detailed = entry(LogSeverity::Error, "with location");
    detailed.file = Some("context.rs");
    detailed.line = Some(7);
    DefaultLogger.log(&detailed);
}
