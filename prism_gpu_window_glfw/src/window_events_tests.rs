//! Unit tests for the window event table

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use glam::{DVec2, IVec2, UVec2};
use glfw::{Action, Key, Modifiers, MouseButton, WindowEvent};

use crate::window_events::WindowEvents;

#[test]
fn test_unregistered_event_is_dropped() {
    let mut events = WindowEvents::new();
    assert_eq!(events.registered(), 0);
    assert!(!events.dispatch(WindowEvent::Close));
    assert!(!events.dispatch(WindowEvent::Size(10, 10)));
}

#[test]
fn test_size_handler_receives_extent() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut events = WindowEvents::new();
    let sink = seen.clone();
    events.on_size(move |size| sink.borrow_mut().push(size));

    assert!(events.dispatch(WindowEvent::Size(800, 600)));
    assert!(events.dispatch(WindowEvent::Size(-1, 20)));
    assert_eq!(*seen.borrow(), vec![UVec2::new(800, 600), UVec2::new(0, 20)]);
}

#[test]
fn test_reregistering_replaces_handler() {
    let first = Rc::new(RefCell::new(0));
    let second = Rc::new(RefCell::new(0));
    let mut events = WindowEvents::new();

    let counter = first.clone();
    events.on_close(move || *counter.borrow_mut() += 1);
    events.dispatch(WindowEvent::Close);

    let counter = second.clone();
    events.on_close(move || *counter.borrow_mut() += 1);
    events.dispatch(WindowEvent::Close);
    events.dispatch(WindowEvent::Close);

    assert_eq!(*first.borrow(), 1);
    assert_eq!(*second.borrow(), 2);
    assert_eq!(events.registered(), 1);
}

#[test]
fn test_input_handlers() {
    let log = Rc::new(RefCell::new(Vec::<String>::new()));
    let mut events = WindowEvents::new();

    let sink = log.clone();
    events.on_key(move |key, _scancode, action, _mods| {
        sink.borrow_mut().push(format!("key {:?} {:?}", key, action));
    });
    let sink = log.clone();
    events.on_mouse_button(move |button, action, _mods| {
        sink.borrow_mut().push(format!("button {:?} {:?}", button, action));
    });
    let sink = log.clone();
    events.on_char(move |character| sink.borrow_mut().push(format!("char {}", character)));

    events.dispatch(WindowEvent::Key(Key::Escape, 9, Action::Press, Modifiers::empty()));
    events.dispatch(WindowEvent::MouseButton(MouseButton::Button1, Action::Release, Modifiers::empty()));
    events.dispatch(WindowEvent::Char('q'));

    assert_eq!(
        *log.borrow(),
        vec![
            "key Escape Press".to_string(),
            "button Button1 Release".to_string(),
            "char q".to_string(),
        ]
    );
}

#[test]
fn test_pointer_and_window_state_handlers() {
    let position = Rc::new(RefCell::new(IVec2::ZERO));
    let scroll = Rc::new(RefCell::new(DVec2::ZERO));
    let dropped = Rc::new(RefCell::new(Vec::new()));
    let mut events = WindowEvents::new();

    let sink = position.clone();
    events.on_position(move |pos| *sink.borrow_mut() = pos);
    let sink = scroll.clone();
    events.on_scroll(move |offset| *sink.borrow_mut() += offset);
    let sink = dropped.clone();
    events.on_file_drop(move |paths| sink.borrow_mut().extend(paths));

    events.dispatch(WindowEvent::Pos(40, -12));
    events.dispatch(WindowEvent::Scroll(0.0, 1.0));
    events.dispatch(WindowEvent::Scroll(0.5, 1.0));
    events.dispatch(WindowEvent::FileDrop(vec![PathBuf::from("a.png")]));

    assert_eq!(*position.borrow(), IVec2::new(40, -12));
    assert_eq!(*scroll.borrow(), DVec2::new(0.5, 2.0));
    assert_eq!(*dropped.borrow(), vec![PathBuf::from("a.png")]);
    assert_eq!(events.registered(), 3);

    events.clear();
    assert_eq!(events.registered(), 0);
}
