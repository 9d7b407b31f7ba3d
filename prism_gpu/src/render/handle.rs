/// Shared-ownership handle over backend GPU resources
///
/// Every `create_*` call returns a `Handle<dyn Trait>`. Cloning a handle bumps an
/// atomic reference count; the backend object (and its GL/Vulkan teardown in
/// `Drop`) is destroyed exactly once, when the last handle goes away.
///
/// Handles may be cloned and sent across threads. The GPU object behind them is
/// not synchronized: using it from two threads at once needs external locking or
/// one context per thread.

use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Base trait of every GPU resource trait
///
/// Implemented automatically for every `Send + Sync + 'static` type. It gives
/// trait objects a way back to their concrete backend type.
pub trait Resource: Any + Send + Sync {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> Resource for T {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reference-counted resource handle
pub struct Handle<T: ?Sized> {
    inner: Arc<T>,
}

impl<T> Handle<T> {
    pub fn new(value: T) -> Self {
        Self { inner: Arc::new(value) }
    }
}

impl<T: ?Sized> Handle<T> {
    /// Wrap an existing `Arc`, typically a backend object already coerced
    /// to its resource trait (`Arc<GlTexture>` as `Arc<dyn Texture>`)
    pub fn from_arc(inner: Arc<T>) -> Self {
        Self { inner }
    }

    /// Number of live handles to this resource
    pub fn ref_count(this: &Self) -> usize {
        Arc::strong_count(&this.inner)
    }

    /// Whether both handles point at the same resource
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn as_arc(&self) -> &Arc<T> {
        &self.inner
    }
}

impl<T: ?Sized + Resource> Handle<T> {
    /// Convert into a handle of the concrete backend type
    ///
    /// The new handle shares the reference count; no backend call is made.
    pub fn downcast<U: Resource>(&self) -> Option<Handle<U>> {
        let any = Resource::into_any(Arc::clone(&self.inner));
        any.downcast::<U>().ok().map(Handle::from_arc)
    }

    /// Borrow the concrete backend type
    pub fn downcast_ref<U: Resource>(&self) -> Option<&U> {
        Resource::as_any(&*self.inner).downcast_ref::<U>()
    }
}

impl<T: ?Sized> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T: ?Sized> Deref for Handle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: ?Sized> From<Arc<T>> for Handle<T> {
    fn from(inner: Arc<T>) -> Self {
        Self::from_arc(inner)
    }
}

impl<T: ?Sized> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .field("ref_count", &Arc::strong_count(&self.inner))
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
