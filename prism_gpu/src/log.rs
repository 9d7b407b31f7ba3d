//! Logging system for Prism GPU
//!
//! This module provides the single diagnostics channel shared by every backend:
//! - Customizable logger via the Logger trait
//! - Severity levels (Trace, Info, Warn, Error)
//! - Colored console output until a client sink is installed
//! - A closure-based sink (`MessageCallback`) for applications that only want
//!   the message text and its severity
//! - File and line information for ERROR logs

use colored::*;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Logger trait for custom logging implementations
///
/// Implement this trait to route diagnostics somewhere else than the console
/// (a file, an in-game console, a test capture buffer...).
///
/// # Example
///
/// ```no_run
/// use prism_gpu::prism::log::{Logger, LogEntry};
///
/// struct FileLogger {
///     file: std::fs::File,
/// }
///
/// impl Logger for FileLogger {
///     fn log(&self, entry: &LogEntry) {
///         // Write to file...
///     }
/// }
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

    /// Source module (e.g., "prism::opengl", "prism::vulkan::Swapchain")
    pub source: String,

    /// Log message
    pub message: String,

    /// Source file (only for detailed ERROR logs)
    pub file: Option<&'static str>,

    /// Source line (only for detailed ERROR logs)
    pub line: Option<u32>,
}

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogSeverity {
    /// Very verbose information (Vulkan verbose validation output lands here)
    Trace,

    /// Important informational messages
    Info,

    /// Warning messages (recoverable issues)
    Warn,

    /// Error messages (fatal or unusable-state conditions, with file:line details)
    Error,
}

impl LogSeverity {
    /// Upper-case label used by console output
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Info => "INFO",
            LogSeverity::Warn => "WARN",
            LogSeverity::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Client message sink: receives the formatted message and its severity
pub type MessageCallback = Arc<dyn Fn(&str, LogSeverity) + Send + Sync>;

/// Adapts a [`MessageCallback`] to the [`Logger`] trait
///
/// Errors carry their source location appended to the message so that a
/// callback which only sees text still gets the `file:line` detail.
pub struct CallbackLogger {
    callback: MessageCallback,
}

impl CallbackLogger {
    pub fn new(callback: MessageCallback) -> Self {
        Self { callback }
    }
}

impl Logger for CallbackLogger {
    fn log(&self, entry: &LogEntry) {
        match (entry.file, entry.line) {
            (Some(file), Some(line)) => {
                let message = format!("{} ({}:{})", entry.message, file, line);
                (self.callback)(&message, entry.severity);
            }
            _ => (self.callback)(&entry.message, entry.severity),
        }
    }
}

/// Default logger implementation using colored console output
///
/// Colors:
/// - Trace: bright_black
/// - Info: green
/// - Warn: yellow
/// - Error: red + bold
///
/// Format:
/// - Normal: `[timestamp] [SEVERITY] [source] message`
/// - Error: `[timestamp] [ERROR] [source] message (file:line)`
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let datetime: DateTime<Local> = entry.timestamp.into();
        let timestamp = datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string();

        let severity_str = match entry.severity {
            LogSeverity::Trace => "TRACE".bright_black(),
            LogSeverity::Info => "INFO ".green(),
            LogSeverity::Warn => "WARN ".yellow(),
            LogSeverity::Error => "ERROR".red().bold(),
        };

        let source = entry.source.bright_blue();

        if let (Some(file), Some(line)) = (entry.file, entry.line) {
            println!(
                "[{}] [{}] [{}] {} ({}:{})",
                timestamp,
                severity_str,
                source,
                entry.message,
                file,
                line
            );
        } else {
            println!(
                "[{}] [{}] [{}] {}",
                timestamp,
                severity_str,
                source,
                entry.message
            );
        }
    }
}

// ===== LOGGING MACROS =====

/// Log a TRACE message (very verbose)
///
/// ```no_run
/// prism_gpu::gpu_trace!("prism::vulkan", "Acquired image {}", 2);
/// ```
#[macro_export]
macro_rules! gpu_trace {
    ($source:expr, $($arg:tt)*) => {
        $crate::prism::Gpu::log(
            $crate::prism::log::LogSeverity::Trace,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an INFO message
#[macro_export]
macro_rules! gpu_info {
    ($source:expr, $($arg:tt)*) => {
        $crate::prism::Gpu::log(
            $crate::prism::log::LogSeverity::Info,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log a WARN message
#[macro_export]
macro_rules! gpu_warn {
    ($source:expr, $($arg:tt)*) => {
        $crate::prism::Gpu::log(
            $crate::prism::log::LogSeverity::Warn,
            $source,
            format!($($arg)*)
        )
    };
}

/// Log an ERROR message with file:line information
#[macro_export]
macro_rules! gpu_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::prism::Gpu::log_detailed(
            $crate::prism::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Log an ERROR message and evaluate to `Error::Backend` with the same text
///
/// ```no_run
/// use prism_gpu::prism::Result;
///
/// fn load() -> Result<()> {
///     Err(prism_gpu::gpu_err!("prism::opengl", "glCreateBuffer failed: {}", "oom"))
/// }
/// ```
#[macro_export]
macro_rules! gpu_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::prism::Gpu::log_detailed(
            $crate::prism::log::LogSeverity::Error,
            $source,
            message.clone(),
            file!(),
            line!()
        );
        $crate::prism::Error::Backend(message)
    }};
}

/// Log an ERROR message and return `Err(Error::Backend(..))` from the current function
#[macro_export]
macro_rules! gpu_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::gpu_err!($source, $($arg)*))
    };
}

/// Log an already-built `Error` at ERROR severity and evaluate to it
///
/// Used for the typed variants (`InvalidResource`, `ShaderCompilation`...)
/// so that every fatal condition reaches the sink before it is returned.
#[macro_export]
macro_rules! gpu_raise {
    ($source:expr, $error:expr) => {{
        let error = $error;
        $crate::prism::Gpu::log_detailed(
            $crate::prism::log::LogSeverity::Error,
            $source,
            format!("{}", error),
            file!(),
            line!()
        );
        error
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
