/*!
# Prism GPU - Context

Runtime backend selection for Prism GPU.

`RenderContext` owns a window and the backend drawing into it. The backend is
chosen when the context is created, from `Settings::preferred_api` (`Guess`
resolves to OpenGL), and every frame, state and resource-creation call is
forwarded to it.

```no_run
use prism_gpu::prism::settings::Settings;
use prism_gpu::prism::window::WindowProps;
use prism_gpu_context::prism::context::RenderContext;

let mut context = RenderContext::open(Settings::default(), WindowProps::new("Prism", 1280, 720))?;
context.init()?;
while !context.poll() {
    context.begin_frame()?;
    context.end_frame()?;
}
# Ok::<(), prism_gpu::prism::Error>(())
```
*/

mod render_context;
pub mod current;

pub use render_context::{Backend, RenderContext};

// Main prism namespace module
pub mod prism {
    pub mod context {
        pub use crate::current;
        pub use crate::render_context::{Backend, RenderContext};
    }
}
