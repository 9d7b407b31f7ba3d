//! Unit tests for context.rs

use crate::error::Error;
use crate::render::context::init_window_with;
use crate::window::{HeadlessWindow, Window};

#[test]
fn test_init_window_with_keeps_window_on_success() {
    let mut window = HeadlessWindow::default();
    let value = init_window_with(&mut window, |window| Ok(window.title().len())).unwrap();
    assert_eq!(value, HeadlessWindow::default().title().len());
    assert!(window.is_initialised());
}

#[test]
fn test_init_window_with_shuts_window_down_on_failure() {
    let mut window = HeadlessWindow::default();
    let result: crate::error::Result<()> = init_window_with(&mut window, |window| {
        window.swap_buffers();
        Err(Error::InitializationFailed("Failed to init OpenGL".to_string()))
    });

    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(!window.is_initialised());
    assert_eq!(window.swap_count(), 1);
}
