//! Unit tests for framebuffer.rs
//!
//! apply_resize tests touch the global logger and are #[serial].

use crate::prism::Gpu;
use crate::prism::log::{LogEntry, LogSeverity, Logger};
use crate::render::framebuffer::{
    apply_resize, resize_action, resize_with, FramebufferSpecification, FramebufferTextureFormat,
    ResizeAction, MAX_FRAMEBUFFER_SIZE,
};
use crate::error::Error;
use serial_test::serial;
use std::sync::{Arc, Mutex};

struct TestLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}

fn spec(width: u32, height: u32) -> FramebufferSpecification {
    FramebufferSpecification {
        width,
        height,
        attachments: vec![FramebufferTextureFormat::Rgba8, FramebufferTextureFormat::RedInteger],
    }
}

#[test]
fn test_resize_action_table() {
    let current = spec(800, 600);
    assert_eq!(resize_action(&current, 800, 600), ResizeAction::Unchanged);
    assert_eq!(resize_action(&current, 1024, 600), ResizeAction::Rebuild);
    assert_eq!(resize_action(&current, 0, 600), ResizeAction::Rejected);
    assert_eq!(resize_action(&current, 800, 0), ResizeAction::Rejected);
    assert_eq!(resize_action(&current, MAX_FRAMEBUFFER_SIZE, 1), ResizeAction::Rebuild);
    assert_eq!(resize_action(&current, MAX_FRAMEBUFFER_SIZE + 1, 600), ResizeAction::Rejected);
}

#[test]
#[serial]
fn test_apply_resize_rejects_with_warning() {
    Gpu::reset_logger();
    let entries = Arc::new(Mutex::new(Vec::new()));
    Gpu::set_logger(TestLogger { entries: Arc::clone(&entries) });

    let mut current = spec(800, 600);
    assert!(!apply_resize(&mut current, 0, 0));
    assert_eq!((current.width, current.height), (800, 600));

    let entries_guard = entries.lock().unwrap();
    assert_eq!(entries_guard.len(), 1);
    assert_eq!(entries_guard[0].severity, LogSeverity::Warn);
    assert!(entries_guard[0].message.contains("0, 0"));
    drop(entries_guard);
    Gpu::reset_logger();
}

#[test]
#[serial]
fn test_apply_resize_updates_spec() {
    let mut current = spec(800, 600);
    assert!(apply_resize(&mut current, 1920, 1080));
    assert_eq!((current.width, current.height), (1920, 1080));
    assert!(!apply_resize(&mut current, 1920, 1080));
}

#[test]
#[serial]
fn test_resize_with_commits_after_rebuild() {
    let mut current = spec(800, 600);
    let built = resize_with(&mut current, 1024, 768, |resized| Ok((resized.width, resized.height)));
    assert_eq!(built.unwrap().unwrap(), (1024, 768));
    assert_eq!((current.width, current.height), (1024, 768));
}

#[test]
#[serial]
fn test_resize_with_failed_rebuild_keeps_spec() {
    let mut current = spec(800, 600);
    let built: Option<crate::error::Result<()>> = resize_with(&mut current, 1024, 768, |_| Err(Error::OutOfMemory));
    assert!(matches!(built, Some(Err(Error::OutOfMemory))));
    assert_eq!((current.width, current.height), (800, 600));
}

#[test]
#[serial]
fn test_resize_with_skips_rebuild_when_unchanged_or_rejected() {
    let mut current = spec(800, 600);
    let mut rebuilds = 0;
    assert!(resize_with(&mut current, 800, 600, |_| { rebuilds += 1; Ok(()) }).is_none());
    assert!(resize_with(&mut current, 0, 600, |_| { rebuilds += 1; Ok(()) }).is_none());
    assert_eq!(rebuilds, 0);
    assert_eq!((current.width, current.height), (800, 600));
}

#[test]
fn test_validate() {
    assert!(spec(800, 600).validate().is_ok());
    assert!(FramebufferSpecification::default().validate().is_ok());

    let empty = FramebufferSpecification { attachments: Vec::new(), ..spec(800, 600) };
    assert!(empty.validate().is_err());
    assert!(spec(0, 600).validate().is_err());
}

#[test]
fn test_attachment_lookup() {
    let current = spec(16, 16);
    assert_eq!(current.attachment(1).unwrap(), FramebufferTextureFormat::RedInteger);
    assert!(current.attachment(2).is_err());
    assert!(FramebufferTextureFormat::RedInteger.is_integer());
    assert!(!FramebufferTextureFormat::RedFloat.is_integer());
}
