/// Prism GPU - process-wide diagnostics channel
///
/// Contexts are passed around explicitly; the only process-wide state is the
/// log sink, so that every backend, every context and every thread reports
/// through the same channel. It uses thread-safe static storage with RwLock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;

use crate::log::{CallbackLogger, DefaultLogger, LogEntry, LogSeverity, Logger, MessageCallback};

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Whether a client sink replaced the console fallback
static CLIENT_SINK: AtomicBool = AtomicBool::new(false);

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

/// Entry point for the process-wide log sink
///
/// # Example
///
/// ```no_run
/// use prism_gpu::prism::{Gpu, log::{Logger, LogEntry}};
///
/// struct FileLogger;
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
///
/// Gpu::set_logger(FileLogger);
/// ```
pub struct Gpu;

impl Gpu {
    /// Replace the current logger with a custom implementation
    pub fn set_logger<L: Logger + 'static>(logger_impl: L) {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(logger_impl);
            CLIENT_SINK.store(true, Ordering::Release);
        }
    }

    /// Install a message callback unless a client sink is already in place
    ///
    /// Every context created from `Settings` with a `message_func` calls this,
    /// so the first one wins and later contexts reuse it. Returns `true` when
    /// the callback was installed.
    pub fn install_message_callback(callback: MessageCallback) -> bool {
        let Ok(mut lock) = logger().write() else {
            return false;
        };
        if CLIENT_SINK.load(Ordering::Acquire) {
            return false;
        }
        *lock = Box::new(CallbackLogger::new(callback));
        CLIENT_SINK.store(true, Ordering::Release);
        true
    }

    /// Whether diagnostics currently reach a client sink instead of the console
    pub fn has_client_sink() -> bool {
        CLIENT_SINK.load(Ordering::Acquire)
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        if let Ok(mut lock) = logger().write() {
            *lock = Box::new(DefaultLogger);
            CLIENT_SINK.store(false, Ordering::Release);
        }
    }

    /// Logging method for simple logs without file:line
    ///
    /// Used by gpu_trace!, gpu_info! and gpu_warn!.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Logging method with file:line information
    ///
    /// Used by gpu_error!, gpu_err!, gpu_bail! and gpu_raise!.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if let Ok(lock) = logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "gpu_tests.rs"]
mod tests;
