/// GL function table shared by a context and its resources
///
/// `OpenGlContext::shutdown` marks the device lost before the window and its
/// GL context go away. Resources dropped after that skip their `glDelete*`
/// calls: the names died with the context, and issuing the call anyway would
/// hit whichever context is current on the thread.

use std::ops::Deref;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether the GL context a device was loaded for still exists
#[derive(Debug, Clone)]
pub struct ContextLiveness(Arc<AtomicBool>);

impl ContextLiveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn mark_lost(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Run `delete` while the context is alive; returns whether it ran
    pub fn release(&self, delete: impl FnOnce()) -> bool {
        if !self.is_alive() {
            return false;
        }
        delete();
        true
    }
}

impl Default for ContextLiveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Loaded GL functions plus the liveness of their context
#[derive(Clone)]
pub struct GlDevice {
    gl: Arc<glow::Context>,
    liveness: ContextLiveness,
}

impl GlDevice {
    pub fn new(gl: glow::Context) -> Self {
        Self { gl: Arc::new(gl), liveness: ContextLiveness::new() }
    }

    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    pub fn liveness(&self) -> &ContextLiveness {
        &self.liveness
    }

    /// Delete GL objects through `delete`, unless the context is gone
    pub fn delete_with(&self, delete: impl FnOnce(&glow::Context)) {
        let gl: &glow::Context = &self.gl;
        self.liveness.release(|| delete(gl));
    }
}

impl Deref for GlDevice {
    type Target = glow::Context;

    fn deref(&self) -> &glow::Context {
        &self.gl
    }
}

#[cfg(test)]
#[path = "opengl_device_tests.rs"]
mod tests;
