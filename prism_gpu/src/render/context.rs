/// RenderBackend trait - the interface every GPU backend implements
///
/// The dispatcher in `prism_gpu_context` holds one backend per context and
/// forwards every frame, state and factory call to it.

use glam::Vec4;

use crate::error::Result;
use crate::render::buffer::{BufferLayout, IndexBufferHandle, VertexBufferHandle};
use crate::render::framebuffer::{FramebufferHandle, FramebufferSpecification};
use crate::render::shader::{ShaderHandle, ShaderSources};
use crate::render::texture::{TextureHandle, TextureSpecification};
use crate::render::vertex_array::VertexArrayHandle;
use crate::settings::{ApiType, Settings};
use crate::window::Window;
use crate::gpu_info;

/// Driver identification recorded at init
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextProperties {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
}

/// Log which driver a context ended up on
pub fn print_properties(api: ApiType, properties: &ContextProperties) {
    gpu_info!(
        "prism::context",
        "Using {} {} - {}",
        api,
        properties.version,
        properties.renderer
    );
}

/// Initialise `window`, then run `bring_up` on it
///
/// The window is shut down again when `bring_up` fails, so a failed backend
/// init leaves it as it found it.
pub fn init_window_with<T>(
    window: &mut dyn Window,
    bring_up: impl FnOnce(&mut dyn Window) -> Result<T>,
) -> Result<T> {
    window.init()?;
    match bring_up(window) {
        Ok(value) => Ok(value),
        Err(error) => {
            window.shutdown();
            Err(error)
        }
    }
}

/// A GPU backend bound to one window
///
/// `init` must succeed before any other call. `shutdown` releases what `init`
/// created, in reverse order, and is idempotent.
pub trait RenderBackend {
    fn api(&self) -> ApiType;
    fn settings(&self) -> &Settings;

    /// Vendor/renderer/version, empty before `init`
    fn properties(&self) -> &ContextProperties;

    fn init(&mut self, window: &mut dyn Window) -> Result<()>;
    fn shutdown(&mut self, window: &mut dyn Window);

    fn begin_frame(&mut self, window: &mut dyn Window) -> Result<()>;
    fn end_frame(&mut self, window: &mut dyn Window) -> Result<()>;

    /// Clear the colour buffer with the clear colour
    fn clear(&mut self);

    /// Bind `vertex_array` and draw `index_count` indices (0: the whole index buffer)
    fn draw_indexed(&mut self, vertex_array: &VertexArrayHandle, index_count: u32) -> Result<()>;

    fn set_clear_colour(&mut self, colour: Vec4);
    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    // ===== RESOURCE FACTORIES =====

    /// Dynamic vertex buffer with room for `vertices` vertices of `layout`
    fn create_vertex_buffer(&self, vertices: u32, layout: &BufferLayout) -> Result<VertexBufferHandle>;

    /// Static vertex buffer initialised from `data`
    fn create_vertex_buffer_with_data(&self, data: &[u8], layout: &BufferLayout) -> Result<VertexBufferHandle>;

    fn create_index_buffer(&self, indices: &[u32]) -> Result<IndexBufferHandle>;
    fn create_shader(&self, sources: &ShaderSources) -> Result<ShaderHandle>;
    fn create_texture(&self, specification: &TextureSpecification) -> Result<TextureHandle>;
    fn create_framebuffer(&self, specification: &FramebufferSpecification) -> Result<FramebufferHandle>;
    fn create_vertex_array(&self) -> Result<VertexArrayHandle>;
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
