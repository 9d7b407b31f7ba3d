//! Unit tests for opengl_device.rs
//!
//! Liveness is plain shared state, no GL context required.

use std::cell::Cell;

use crate::opengl_device::ContextLiveness;

#[test]
fn test_new_liveness_is_alive() {
    assert!(ContextLiveness::new().is_alive());
    assert!(ContextLiveness::default().is_alive());
}

#[test]
fn test_release_runs_while_alive() {
    let liveness = ContextLiveness::new();
    let deletes = Cell::new(0);
    assert!(liveness.release(|| deletes.set(deletes.get() + 1)));
    assert_eq!(deletes.get(), 1);
}

#[test]
fn test_release_after_context_lost_makes_no_call() {
    let context_side = ContextLiveness::new();
    let buffer_side = context_side.clone();
    let deletes = Cell::new(0);

    context_side.mark_lost();
    assert!(!buffer_side.is_alive());
    assert!(!buffer_side.release(|| deletes.set(deletes.get() + 1)));
    assert_eq!(deletes.get(), 0);
}

#[test]
fn test_separate_contexts_do_not_share_liveness() {
    let first = ContextLiveness::new();
    let second = ContextLiveness::new();
    first.mark_lost();
    assert!(second.is_alive());
}
