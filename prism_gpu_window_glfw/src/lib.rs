/*!
# Prism GPU GLFW window

Native window for Prism GPU contexts, backed by GLFW.

`GlfwWindow` implements `prism_gpu::prism::window::Window`: it exposes raw
window and display handles for Vulkan surfaces, owns the GL context for
OpenGL, and pumps GLFW events into a typed handler table (`WindowEvents`).
*/

mod glfw_window;
mod window_events;

pub use glfw_window::{swap_interval, window_hints, FrameClock, GlfwWindow, GL_VERSION};
pub use window_events::WindowEvents;

// Re-exported so callers can name keys, buttons and actions
pub use glfw;

pub mod prism {
    pub mod window {
        pub mod glfw {
            pub use crate::glfw_window::GlfwWindow;
            pub use crate::window_events::WindowEvents;
        }
    }
}
