//! Opens a Vulkan window and clears it every frame
//!
//! Run with: cargo run -p prism_gpu_context --example vulkan_clear

use prism_gpu::glam::Vec4;
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{Window, WindowProps};
use prism_gpu::prism::Result;
use prism_gpu_context::prism::context::RenderContext;

fn main() -> Result<()> {
    let settings = Settings { preferred_api: ApiType::Vulkan, ..Settings::default() };
    let mut context = RenderContext::open(settings, WindowProps::new("Vulkan Clear", 720, 720))?;
    context.init()?;

    let mut time = 0.0f32;
    while !context.poll() {
        time += context.window().delta();
        let pulse = 0.5 + 0.5 * time.sin();
        context.set_clear_colour(Vec4::new(0.1, 0.1 * pulse, 0.3 * pulse, 1.0));

        context.begin_frame()?;
        context.end_frame()?;
    }

    context.shutdown();
    Ok(())
}
