//! Unit tests for the process-wide log sink
//!
//! IMPORTANT: LOGGER is a global OnceLock shared across all tests.
//! All tests are marked with #[serial] and restore the default logger.

use crate::prism::Gpu;
use crate::prism::log::{LogEntry, LogSeverity, Logger};
use crate::{gpu_bail, gpu_err, gpu_error, gpu_info, gpu_raise, gpu_trace, gpu_warn};
use crate::error::{Error, Result};
use serial_test::serial;
use std::sync::{Arc, Mutex};

// ============================================================================
// TEST HELPERS
// ============================================================================

/// Test logger that captures log entries for verification
struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn capture() -> Arc<Mutex<Vec<LogEntry>>> {
    Gpu::reset_logger();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Gpu::set_logger(TestLogger { entries: Arc::clone(&entries) });
    entries
}

// ============================================================================
// MACRO ROUTING TESTS
// ============================================================================

#[test]
#[serial]
fn test_macros_reach_custom_logger_with_severity() {
    let entries = capture();

    gpu_trace!("prism::test", "trace {}", 1);
    gpu_info!("prism::test", "info {}", 2);
    gpu_warn!("prism::test", "warn {}", 3);
    gpu_error!("prism::test", "error {}", 4);

    let entries = entries.lock().unwrap();
    let severities: Vec<LogSeverity> = entries.iter().map(|e| e.severity).collect();
    assert_eq!(
        severities,
        vec![LogSeverity::Trace, LogSeverity::Info, LogSeverity::Warn, LogSeverity::Error]
    );
    assert_eq!(entries[1].message, "info 2");
    assert_eq!(entries[0].source, "prism::test");
    drop(entries);
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_error_macros_carry_location() {
    let entries = capture();

    gpu_error!("prism::test", "with location");

    let entries = entries.lock().unwrap();
    assert!(entries[0].file.is_some());
    assert!(entries[0].line.is_some());
    drop(entries);
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_gpu_err_logs_and_builds_backend_error() {
    let entries = capture();

    let err = gpu_err!("prism::test", "glCreateTexture returned {}", "nothing");
    assert!(matches!(err, Error::Backend(ref msg) if msg == "glCreateTexture returned nothing"));
    assert_eq!(entries.lock().unwrap().len(), 1);
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_gpu_bail_returns_early() {
    let entries = capture();

    fn fails() -> Result<u32> {
        gpu_bail!("prism::test", "bail out");
    }

    assert!(fails().is_err());
    assert_eq!(entries.lock().unwrap()[0].severity, LogSeverity::Error);
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_gpu_raise_logs_typed_error() {
    let entries = capture();

    let err = gpu_raise!("prism::test", Error::InvalidResource("empty layout".to_string()));
    assert!(matches!(err, Error::InvalidResource(_)));
    assert!(entries.lock().unwrap()[0].message.contains("empty layout"));
    Gpu::reset_logger();
}

// ============================================================================
// MESSAGE CALLBACK INSTALLATION TESTS
// ============================================================================

#[test]
#[serial]
fn test_first_message_callback_wins() {
    Gpu::reset_logger();
    assert!(!Gpu::has_client_sink());

    let first: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let second: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let sink = Arc::clone(&first);
    assert!(Gpu::install_message_callback(Arc::new(move |msg: &str, _: LogSeverity| {
        sink.lock().unwrap().push(msg.to_string());
    })));
    let sink = Arc::clone(&second);
    assert!(!Gpu::install_message_callback(Arc::new(move |msg: &str, _: LogSeverity| {
        sink.lock().unwrap().push(msg.to_string());
    })));

    gpu_info!("prism::test", "hello");

    assert_eq!(first.lock().unwrap().as_slice(), ["hello".to_string()]);
    assert!(second.lock().unwrap().is_empty());
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_returns_to_console_fallback() {
    let _entries = capture();
    assert!(Gpu::has_client_sink());

    Gpu::reset_logger();
    assert!(!Gpu::has_client_sink());
    gpu_info!("prism::test", "printed to the console");
}
