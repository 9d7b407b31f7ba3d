//! Window collaborator interface
//!
//! The GPU contexts never create or own native windows. They consume a window
//! through this trait: the native handles (for Vulkan surfaces), the size,
//! GL context currency and proc loading, buffer swaps and event pumping.

use std::ffi::c_void;

use glam::UVec2;
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::error::Result;
use crate::settings::ApiType;

/// Window creation parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowProps {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub resizable: bool,
    pub visible: bool,
    pub decorated: bool,
    pub maximised: bool,
}

impl Default for WindowProps {
    fn default() -> Self {
        Self {
            title: "Prism Window".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            resizable: true,
            visible: true,
            decorated: true,
            maximised: false,
        }
    }
}

impl WindowProps {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self { title: title.into(), width, height, ..Self::default() }
    }
}

/// What a GPU context needs from a window
pub trait Window: HasWindowHandle + HasDisplayHandle {
    fn title(&self) -> &str;

    /// Size in screen coordinates
    fn size(&self) -> UVec2;

    /// Size of the drawable surface in pixels
    fn framebuffer_size(&self) -> UVec2;

    /// Whether the native window was created for `api`
    ///
    /// An OpenGL context needs a window that owns a GL context; a Vulkan
    /// surface needs a window created without a client API.
    fn is_ready(&self, api: ApiType) -> bool;

    fn init(&mut self) -> Result<()>;
    fn shutdown(&mut self);

    /// Make this window's GL context current on the calling thread
    fn make_current(&mut self);

    /// GL function loader; null when the symbol is unknown
    fn get_proc_address(&mut self, symbol: &str) -> *const c_void;

    fn swap_buffers(&mut self);
    fn poll_events(&mut self);

    /// Whether the window was asked to close; `force_close` requests it
    fn should_close(&mut self, force_close: bool) -> bool;

    /// Seconds elapsed between the two most recent `poll_events` calls
    fn delta(&self) -> f32;

    /// Per-frame tick: present, then pump events
    fn on_update(&mut self) {
        self.swap_buffers();
        self.poll_events();
    }
}

// ============================================================================
// Headless window
// ============================================================================

/// Window with no native surface
///
/// Pairs with the headless context for tests and offscreen tools. Calls are
/// counted so that frame pacing can be asserted on.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    props: WindowProps,
    initialised: bool,
    close_requested: bool,
    swap_count: u64,
    poll_count: u64,
    delta: f32,
}

impl HeadlessWindow {
    pub fn new(props: WindowProps) -> Self {
        Self {
            props,
            initialised: false,
            close_requested: false,
            swap_count: 0,
            poll_count: 0,
            delta: 0.0,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn swap_count(&self) -> u64 {
        self.swap_count
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.props.width = width;
        self.props.height = height;
    }

    /// Timestep reported by `delta()`
    pub fn set_delta(&mut self, delta: f32) {
        self.delta = delta;
    }
}

impl Default for HeadlessWindow {
    fn default() -> Self {
        Self::new(WindowProps::default())
    }
}

impl HasWindowHandle for HeadlessWindow {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl HasDisplayHandle for HeadlessWindow {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        Err(HandleError::Unavailable)
    }
}

impl Window for HeadlessWindow {
    fn title(&self) -> &str {
        &self.props.title
    }

    fn size(&self) -> UVec2 {
        UVec2::new(self.props.width, self.props.height)
    }

    fn framebuffer_size(&self) -> UVec2 {
        self.size()
    }

    fn is_ready(&self, api: ApiType) -> bool {
        api == ApiType::Headless
    }

    fn init(&mut self) -> Result<()> {
        self.initialised = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialised = false;
    }

    fn make_current(&mut self) {}

    fn get_proc_address(&mut self, _symbol: &str) -> *const c_void {
        std::ptr::null()
    }

    fn swap_buffers(&mut self) {
        self.swap_count += 1;
    }

    fn poll_events(&mut self) {
        self.poll_count += 1;
    }

    fn should_close(&mut self, force_close: bool) -> bool {
        if force_close {
            self.close_requested = true;
        }
        self.close_requested
    }

    fn delta(&self) -> f32 {
        self.delta
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
