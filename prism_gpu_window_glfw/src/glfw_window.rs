/// GLFW-backed native window
///
/// The native window is created in `new` with the client API the context will
/// need: a GL context for OpenGL, none for Vulkan and headless. GLFW itself is
/// reference counted: the first window initialises the library and it is
/// terminated when the last window (and its `Glfw` clone) is dropped.

use std::ffi::c_void;

use glam::{DVec2, IVec2, UVec2};
use glfw::{
    Action, ClientApiHint, Context, Glfw, GlfwReceiver, Key, MouseButton, OpenGlProfileHint,
    PWindow, SwapInterval, WindowEvent, WindowHint, WindowMode,
};
use prism_gpu::prism::settings::ApiType;
use prism_gpu::prism::window::{Window, WindowProps};
use prism_gpu::prism::{Error, Result};
use prism_gpu::{gpu_error, gpu_info, gpu_raise, gpu_trace};
use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::window_events::WindowEvents;

const SOURCE: &str = "prism::window::glfw";

/// GL version requested for OpenGL windows
pub const GL_VERSION: (u32, u32) = (4, 1);

fn report_glfw_error(error: glfw::Error, description: String) {
    gpu_error!(SOURCE, "GLFW error {:?}: {}", error, description);
}

/// Creation hints for a window that will back a context of `api`
pub fn window_hints(props: &WindowProps, api: ApiType) -> Vec<WindowHint> {
    let mut hints = vec![
        WindowHint::Resizable(props.resizable),
        WindowHint::Visible(props.visible),
        WindowHint::Decorated(props.decorated),
        WindowHint::Maximized(props.maximised),
    ];

    match api.resolve() {
        ApiType::OpenGl => {
            hints.push(WindowHint::ClientApi(ClientApiHint::OpenGl));
            hints.push(WindowHint::ContextVersion(GL_VERSION.0, GL_VERSION.1));
            hints.push(WindowHint::OpenGlProfile(OpenGlProfileHint::Core));
            hints.push(WindowHint::OpenGlForwardCompat(cfg!(target_os = "macos")));
        }
        _ => hints.push(WindowHint::ClientApi(ClientApiHint::NoApi)),
    }

    hints
}

/// Swap interval for a vsync setting
pub fn swap_interval(vsync: bool) -> SwapInterval {
    if vsync {
        SwapInterval::Sync(1)
    } else {
        SwapInterval::None
    }
}

// ============================================================================
// FrameClock
// ============================================================================

/// Time between consecutive ticks, in seconds
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_tick: Option<f64>,
    delta: f32,
}

impl FrameClock {
    /// Start counting from `now`
    pub fn start(&mut self, now: f64) {
        self.last_tick = Some(now);
        self.delta = 0.0;
    }

    /// Record a tick at `now` and return the time since the previous one
    ///
    /// The first tick without `start` yields 0. A clock that went backwards
    /// also yields 0.
    pub fn tick(&mut self, now: f64) -> f32 {
        self.delta = match self.last_tick {
            Some(last) => (now - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }
}

// ============================================================================
// GlfwWindow
// ============================================================================

pub struct GlfwWindow {
    props: WindowProps,
    api: ApiType,
    glfw: Glfw,
    window: Option<PWindow>,
    receiver: GlfwReceiver<(f64, WindowEvent)>,
    events: WindowEvents,
    initialised: bool,
    clock: FrameClock,
}

impl GlfwWindow {
    /// Open a native window for a context of `api`
    pub fn new(props: WindowProps, api: ApiType) -> Result<Self> {
        let api = api.resolve();

        let mut glfw = glfw::init(report_glfw_error).map_err(|error| {
            gpu_raise!(
                SOURCE,
                Error::InitializationFailed(format!("Failed to initialise GLFW: {:?}", error))
            )
        })?;

        for hint in window_hints(&props, api) {
            glfw.window_hint(hint);
        }

        let (mut window, receiver) = glfw
            .create_window(props.width, props.height, &props.title, WindowMode::Windowed)
            .ok_or_else(|| {
                gpu_raise!(
                    SOURCE,
                    Error::InitializationFailed(format!("Failed to create window '{}'", props.title))
                )
            })?;

        window.set_all_polling(true);

        gpu_info!(
            SOURCE,
            "Creating window {} ({}, {}) for {}",
            props.title,
            props.width,
            props.height,
            api.name()
        );

        Ok(Self {
            props,
            api,
            glfw,
            window: Some(window),
            receiver,
            events: WindowEvents::new(),
            initialised: false,
            clock: FrameClock::default(),
        })
    }

    pub fn api(&self) -> ApiType {
        self.api
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Handlers invoked from `poll_events`
    pub fn events_mut(&mut self) -> &mut WindowEvents {
        &mut self.events
    }

    /// Underlying GLFW window, `None` after shutdown
    pub fn native(&self) -> Option<&PWindow> {
        self.window.as_ref()
    }

    pub fn native_mut(&mut self) -> Option<&mut PWindow> {
        self.window.as_mut()
    }

    pub fn position(&self) -> IVec2 {
        self.window
            .as_ref()
            .map(|window| {
                let (x, y) = window.get_pos();
                IVec2::new(x, y)
            })
            .unwrap_or(IVec2::ZERO)
    }

    pub fn set_position(&mut self, position: IVec2) {
        if let Some(window) = self.window.as_mut() {
            window.set_pos(position.x, position.y);
        }
    }

    pub fn set_title(&mut self, title: &str) {
        if let Some(window) = self.window.as_mut() {
            window.set_title(title);
        }
        self.props.title = title.to_string();
    }

    pub fn set_visible(&mut self, visible: bool) {
        if let Some(window) = self.window.as_mut() {
            if visible {
                window.show();
            } else {
                window.hide();
            }
        }
        self.props.visible = visible;
    }

    pub fn is_vsync(&self) -> bool {
        self.props.vsync
    }

    /// Change the swap interval; no-op when the setting is unchanged
    pub fn set_vsync(&mut self, vsync: bool) {
        if self.props.vsync == vsync {
            return;
        }
        self.props.vsync = vsync;
        if self.initialised {
            self.apply_vsync();
        }
    }

    pub fn is_key_pressed(&self, key: Key) -> bool {
        self.window
            .as_ref()
            .map(|window| window.get_key(key) == Action::Press)
            .unwrap_or(false)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.window
            .as_ref()
            .map(|window| window.get_mouse_button(button) == Action::Press)
            .unwrap_or(false)
    }

    pub fn cursor_position(&self) -> DVec2 {
        self.window
            .as_ref()
            .map(|window| {
                let (x, y) = window.get_cursor_pos();
                DVec2::new(x, y)
            })
            .unwrap_or(DVec2::ZERO)
    }

    /// Seconds since GLFW was initialised
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn apply_vsync(&mut self) {
        if self.api != ApiType::OpenGl {
            return;
        }
        if let Some(window) = self.window.as_mut() {
            window.make_current();
        }
        self.glfw.set_swap_interval(swap_interval(self.props.vsync));
    }
}

impl std::fmt::Debug for GlfwWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlfwWindow")
            .field("props", &self.props)
            .field("api", &self.api)
            .field("open", &self.window.is_some())
            .field("initialised", &self.initialised)
            .finish()
    }
}

impl HasWindowHandle for GlfwWindow {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        self.window.as_ref().ok_or(HandleError::Unavailable)?.window_handle()
    }
}

impl HasDisplayHandle for GlfwWindow {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        self.window.as_ref().ok_or(HandleError::Unavailable)?.display_handle()
    }
}

impl Window for GlfwWindow {
    fn title(&self) -> &str {
        &self.props.title
    }

    fn size(&self) -> UVec2 {
        match self.window.as_ref() {
            Some(window) => {
                let (width, height) = window.get_size();
                UVec2::new(width.max(0) as u32, height.max(0) as u32)
            }
            None => UVec2::new(self.props.width, self.props.height),
        }
    }

    fn framebuffer_size(&self) -> UVec2 {
        match self.window.as_ref() {
            Some(window) => {
                let (width, height) = window.get_framebuffer_size();
                UVec2::new(width.max(0) as u32, height.max(0) as u32)
            }
            None => UVec2::ZERO,
        }
    }

    fn is_ready(&self, api: ApiType) -> bool {
        self.window.is_some() && self.api == api
    }

    fn init(&mut self) -> Result<()> {
        if self.initialised {
            return Ok(());
        }
        if self.window.is_none() {
            return Err(gpu_raise!(
                SOURCE,
                Error::InitializationFailed(format!("Window '{}' was shut down", self.props.title))
            ));
        }

        self.initialised = true;
        self.apply_vsync();
        self.clock.start(self.glfw.get_time());
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.window.take().is_some() {
            gpu_trace!(SOURCE, "Destroyed window {}", self.props.title);
        }
        self.initialised = false;
    }

    fn make_current(&mut self) {
        if self.api != ApiType::OpenGl {
            return;
        }
        if let Some(window) = self.window.as_mut() {
            window.make_current();
        }
    }

    fn get_proc_address(&mut self, symbol: &str) -> *const c_void {
        match self.window.as_mut() {
            Some(window) => window.get_proc_address(symbol) as *const c_void,
            None => std::ptr::null(),
        }
    }

    fn swap_buffers(&mut self) {
        if self.api != ApiType::OpenGl {
            return;
        }
        if let Some(window) = self.window.as_mut() {
            window.swap_buffers();
        }
    }

    fn poll_events(&mut self) {
        self.clock.tick(self.glfw.get_time());
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.receiver) {
            self.events.dispatch(event);
        }
    }

    fn should_close(&mut self, force_close: bool) -> bool {
        match self.window.as_mut() {
            Some(window) => {
                if force_close {
                    window.set_should_close(true);
                }
                window.should_close()
            }
            None => true,
        }
    }

    fn delta(&self) -> f32 {
        self.clock.delta()
    }
}

#[cfg(test)]
#[path = "glfw_window_tests.rs"]
mod tests;
