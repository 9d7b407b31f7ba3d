/*!
# Prism GPU

Core traits and types for the Prism GPU abstraction layer.

This crate holds everything that is not tied to a specific GPU API: the
resource interfaces every backend implements, the reference-counted handles
they are returned through, vertex layouts, shader source splitting, context
settings, the window collaborator interface and the process-wide log sink.
Backends (OpenGL, Vulkan) live in their own crates and are selected at runtime
by `prism_gpu_context`.

## Architecture

- **RenderBackend**: Frame, state and resource-factory interface of a context
- **VertexBuffer / IndexBuffer / VertexArray**: Vertex input resources
- **Shader**: Linked program with uniform setters and reflected vertex layout
- **Texture / Framebuffer**: Sampled images and offscreen render targets
- **Handle**: Shared-ownership handle, the resource dies with its last clone
- **Window**: What a context needs from a native window
- **Gpu**: Process-wide diagnostics channel

A `headless` backend with no GPU behind it is included for tests and tools.
*/

// Internal modules
mod error;
mod gpu;
pub mod headless;
pub mod log;
pub mod render;
pub mod settings;
pub mod window;

// Main prism namespace module
pub mod prism {
    // Error types
    pub use crate::error::{Error, Result};

    // Diagnostics channel
    pub use crate::gpu::Gpu;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{
            CallbackLogger, DefaultLogger, LogEntry, LogSeverity, Logger, MessageCallback,
        };
    }

    // Render sub-module with all resource interfaces
    pub mod render {
        pub use crate::render::*;
    }

    pub mod settings {
        pub use crate::settings::{best_api, ApiType, Settings};
    }

    pub mod window {
        pub use crate::window::{HeadlessWindow, Window, WindowProps};
    }

    pub mod headless {
        pub use crate::headless::*;
    }
}

// Re-export math library at crate root
pub use glam;
