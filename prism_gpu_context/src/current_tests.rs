//! Unit tests for the thread-local current context

use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{HeadlessWindow, WindowProps};
use prism_gpu::prism::Error;

use crate::current::*;
use crate::render_context::RenderContext;

fn headless_context(title: &str) -> RenderContext<HeadlessWindow> {
    let settings = Settings { preferred_api: ApiType::Headless, ..Settings::default() };
    let window = HeadlessWindow::new(WindowProps::new(title, 64, 64));
    let mut context = RenderContext::create(settings, window).unwrap();
    context.init().unwrap();
    context
}

#[test]
fn test_no_current_context_by_default() {
    assert!(!has_current());
    assert!(current_api().is_none());
    assert!(take_current::<HeadlessWindow>().is_none());
    let result = with_current(|_context: &mut RenderContext<HeadlessWindow>| ());
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}

#[test]
fn test_make_with_take_current() {
    assert!(make_current(headless_context("first")).is_none());
    assert_eq!(current_api(), Some(ApiType::Headless));

    let title = with_current(|context: &mut RenderContext<HeadlessWindow>| {
        context.begin_frame().unwrap();
        context.end_frame().unwrap();
        context.window().title().to_string()
    })
    .unwrap();
    assert_eq!(title, "first");

    let previous = make_current(headless_context("second")).unwrap();
    assert_eq!(previous.window().title(), "first");
    assert_eq!(previous.window().swap_count(), 1);

    let current = take_current::<HeadlessWindow>().unwrap();
    assert_eq!(current.window().title(), "second");
    assert!(!has_current());
}

#[test]
fn test_nested_with_current_fails_instead_of_panicking() {
    make_current(headless_context("outer"));
    let nested = with_current(|_outer: &mut RenderContext<HeadlessWindow>| {
        with_current(|_inner: &mut RenderContext<HeadlessWindow>| ()).is_err()
    })
    .unwrap();
    assert!(nested);
    assert!(take_current::<HeadlessWindow>().is_some());
}

#[test]
fn test_slots_are_per_thread() {
    make_current(headless_context("main"));
    let seen_elsewhere = std::thread::spawn(has_current).join().unwrap();
    assert!(!seen_elsewhere);
    assert!(take_current::<HeadlessWindow>().is_some());
}
