//! Two windows, each with its own OpenGL context
//!
//! GLFW windows belong to the main thread, so both are driven from it. Each
//! context is made current before its frame.
//!
//! Run with: cargo run -p prism_gpu_context --example multiple_windows

use prism_gpu::glam::Vec4;
use prism_gpu::prism::settings::{best_api, Settings};
use prism_gpu::prism::window::WindowProps;
use prism_gpu::prism::Result;
use prism_gpu_context::prism::context::RenderContext;

fn main() -> Result<()> {
    let settings = Settings { preferred_api: best_api(), blending: true, ..Settings::default() };

    let mut contexts = Vec::new();
    for (title, colour) in [
        ("window1", Vec4::new(0.1, 0.1, 0.1, 1.0)),
        ("window2", Vec4::new(0.2, 0.1, 0.3, 1.0)),
    ] {
        let mut context = RenderContext::open(settings.clone(), WindowProps::new(title, 400, 300))?;
        context.init()?;
        context.set_clear_colour(colour);
        contexts.push(context);
    }

    while !contexts.is_empty() {
        for context in &mut contexts {
            context.make_current();
            context.begin_frame()?;
            context.end_frame()?;
        }
        // A closed window takes its context down with it
        contexts.retain_mut(|context| !context.poll());
    }

    Ok(())
}
