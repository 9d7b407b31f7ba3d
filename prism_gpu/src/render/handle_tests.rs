//! Unit tests for the resource handle layer
//!
//! Uses an instrumented resource that counts constructions and destructions.

use crate::render::handle::{Handle, Resource};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// ============================================================================
// INSTRUMENTED RESOURCE
// ============================================================================

trait Counted: Resource {
    fn id(&self) -> u32;
}

#[derive(Default)]
struct Counters {
    constructed: AtomicUsize,
    destroyed: AtomicUsize,
}

struct CountedResource {
    id: u32,
    counters: Arc<Counters>,
}

impl CountedResource {
    fn create(id: u32, counters: &Arc<Counters>) -> Handle<dyn Counted> {
        counters.constructed.fetch_add(1, Ordering::SeqCst);
        let resource: Arc<dyn Counted> = Arc::new(CountedResource { id, counters: Arc::clone(counters) });
        Handle::from_arc(resource)
    }
}

impl Counted for CountedResource {
    fn id(&self) -> u32 {
        self.id
    }
}

impl Drop for CountedResource {
    fn drop(&mut self) {
        self.counters.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

struct OtherResource;

// ============================================================================
// REFERENCE COUNTING TESTS
// ============================================================================

#[test]
fn test_clone_increments_shared_count() {
    let counters = Arc::new(Counters::default());
    let a = CountedResource::create(7, &counters);
    assert_eq!(Handle::ref_count(&a), 1);

    let b = a.clone();
    assert_eq!(Handle::ref_count(&a), 2);
    assert_eq!(Handle::ref_count(&b), 2);
    assert!(Handle::ptr_eq(&a, &b));
    assert_eq!(b.id(), 7);
}

#[test]
fn test_dropping_a_copy_keeps_resource_alive() {
    let counters = Arc::new(Counters::default());
    let a = CountedResource::create(1, &counters);
    let b = a.clone();

    drop(b);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 0);
    assert_eq!(Handle::ref_count(&a), 1);
}

#[test]
fn test_last_reference_destroys_exactly_once() {
    let counters = Arc::new(Counters::default());
    let a = CountedResource::create(1, &counters);
    let copies: Vec<_> = (0..5).map(|_| a.clone()).collect();

    drop(a);
    drop(copies);

    assert_eq!(counters.constructed.load(Ordering::SeqCst), 1);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_handles_cloned_across_threads() {
    let counters = Arc::new(Counters::default());
    let handle = CountedResource::create(3, &counters);

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let local = handle.clone();
            thread::spawn(move || {
                let more = local.clone();
                more.id()
            })
        })
        .collect();

    for worker in workers {
        assert_eq!(worker.join().unwrap(), 3);
    }

    assert_eq!(Handle::ref_count(&handle), 1);
    drop(handle);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_distinct_resources_are_not_ptr_eq() {
    let counters = Arc::new(Counters::default());
    let a = CountedResource::create(1, &counters);
    let b = CountedResource::create(1, &counters);
    assert!(!Handle::ptr_eq(&a, &b));
}

// ============================================================================
// DOWNCAST TESTS
// ============================================================================

#[test]
fn test_downcast_shares_reference_count() {
    let counters = Arc::new(Counters::default());
    let erased = CountedResource::create(9, &counters);

    let concrete: Handle<CountedResource> = erased.downcast::<CountedResource>().unwrap();
    assert_eq!(concrete.id, 9);
    assert_eq!(Handle::ref_count(&erased), 2);

    drop(erased);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 0);
    drop(concrete);
    assert_eq!(counters.destroyed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_downcast_to_wrong_type_fails() {
    let counters = Arc::new(Counters::default());
    let erased = CountedResource::create(2, &counters);

    assert!(erased.downcast::<OtherResource>().is_none());
    assert!(erased.downcast_ref::<OtherResource>().is_none());
    assert_eq!(Handle::ref_count(&erased), 1);
}

#[test]
fn test_downcast_ref_borrows_concrete_type() {
    let counters = Arc::new(Counters::default());
    let erased = CountedResource::create(5, &counters);
    let concrete = erased.downcast_ref::<CountedResource>().unwrap();
    assert_eq!(concrete.id, 5);
}
