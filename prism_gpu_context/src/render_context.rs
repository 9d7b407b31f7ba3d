/// RenderContext - the backend dispatcher
///
/// A context pairs one window with one backend. The backend is picked once,
/// in `create`, from the resolved `Settings::preferred_api`; every later call
/// is forwarded to it. Resources are created through the context that will
/// draw them, there is no implicit global context (see `current` for the
/// single-context convenience).

use glam::Vec4;
use prism_gpu::prism::headless::HeadlessContext;
use prism_gpu::prism::render::{
    BufferLayout, ContextProperties, FramebufferHandle, FramebufferSpecification,
    IndexBufferHandle, RenderBackend, ShaderHandle, ShaderSources, TextureHandle,
    TextureSpecification, VertexArrayHandle, VertexBufferHandle,
};
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{Window, WindowProps};
use prism_gpu::prism::{Error, Gpu, Result};
use prism_gpu::{gpu_info, gpu_raise, gpu_trace};
use prism_gpu_renderer_opengl::prism::opengl::OpenGlContext;
use prism_gpu_renderer_vulkan::prism::vulkan::VulkanContext;
use prism_gpu_window_glfw::GlfwWindow;

const SOURCE: &str = "prism::context";

// ============================================================================
// Backend
// ============================================================================

/// Closed set of backends a context can dispatch to
pub enum Backend {
    Headless(HeadlessContext),
    OpenGl(OpenGlContext),
    Vulkan(VulkanContext),
}

impl Backend {
    /// Backend for already resolved settings
    ///
    /// `Guess` must have been resolved; it is rejected here because no backend
    /// exists for it.
    pub fn for_settings(settings: Settings) -> Result<Self> {
        match settings.preferred_api {
            ApiType::Headless => Ok(Backend::Headless(HeadlessContext::new(settings))),
            ApiType::OpenGl => Ok(Backend::OpenGl(OpenGlContext::new(settings))),
            ApiType::Vulkan => Ok(Backend::Vulkan(VulkanContext::new(settings))),
            ApiType::Guess => Err(gpu_raise!(
                SOURCE,
                Error::InitializationFailed("no backend is registered for Guess".to_string())
            )),
        }
    }

    pub fn api(&self) -> ApiType {
        self.as_dyn().api()
    }

    pub fn as_dyn(&self) -> &dyn RenderBackend {
        match self {
            Backend::Headless(backend) => backend,
            Backend::OpenGl(backend) => backend,
            Backend::Vulkan(backend) => backend,
        }
    }

    pub fn as_dyn_mut(&mut self) -> &mut dyn RenderBackend {
        match self {
            Backend::Headless(backend) => backend,
            Backend::OpenGl(backend) => backend,
            Backend::Vulkan(backend) => backend,
        }
    }
}

// ============================================================================
// RenderContext
// ============================================================================

/// A window and the backend rendering into it
pub struct RenderContext<W: Window> {
    backend: Backend,
    window: W,
    initialised: bool,
}

impl<W: Window> RenderContext<W> {
    /// Resolve `settings`, install its message sink and pick the backend
    ///
    /// The window must have been created for the resolved API; this is
    /// checked by `init`.
    pub fn create(settings: Settings, window: W) -> Result<Self> {
        let settings = settings.resolved();
        if let Some(callback) = &settings.message_func {
            if Gpu::install_message_callback(callback.clone()) {
                gpu_trace!(SOURCE, "Client message sink installed");
            }
        }

        let backend = Backend::for_settings(settings)?;
        gpu_info!(SOURCE, "Created {} context for '{}'", backend.api(), window.title());
        Ok(Self { backend, window, initialised: false })
    }

    pub fn init(&mut self) -> Result<()> {
        if self.initialised {
            return Ok(());
        }
        self.backend.as_dyn_mut().init(&mut self.window)?;
        self.initialised = true;
        Ok(())
    }

    /// Tear the backend down, then the window; no-op when not initialised
    pub fn shutdown(&mut self) {
        if !self.initialised {
            return;
        }
        self.backend.as_dyn_mut().shutdown(&mut self.window);
        self.initialised = false;
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn api(&self) -> ApiType {
        self.backend.api()
    }

    pub fn settings(&self) -> &Settings {
        self.backend.as_dyn().settings()
    }

    pub fn properties(&self) -> &ContextProperties {
        self.backend.as_dyn().properties()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut Backend {
        &mut self.backend
    }

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    /// Make this context's window current on the calling thread (OpenGL)
    pub fn make_current(&mut self) {
        if self.api() == ApiType::OpenGl {
            self.window.make_current();
        }
    }

    // ===== FRAME =====

    pub fn begin_frame(&mut self) -> Result<()> {
        self.backend.as_dyn_mut().begin_frame(&mut self.window)
    }

    pub fn end_frame(&mut self) -> Result<()> {
        self.backend.as_dyn_mut().end_frame(&mut self.window)
    }

    pub fn clear(&mut self) {
        self.backend.as_dyn_mut().clear();
    }

    /// Draw `index_count` indices of `vertex_array` (0: the whole index buffer)
    pub fn draw_indexed(&mut self, vertex_array: &VertexArrayHandle, index_count: u32) -> Result<()> {
        self.backend.as_dyn_mut().draw_indexed(vertex_array, index_count)
    }

    pub fn set_clear_colour(&mut self, colour: Vec4) {
        self.backend.as_dyn_mut().set_clear_colour(colour);
    }

    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.backend.as_dyn_mut().set_viewport(x, y, width, height);
    }

    /// Poll window events; `true` once the window asked to close
    pub fn poll(&mut self) -> bool {
        self.window.poll_events();
        self.window.should_close(false)
    }

    // ===== RESOURCE FACTORIES =====

    pub fn create_vertex_buffer(&self, vertices: u32, layout: &BufferLayout) -> Result<VertexBufferHandle> {
        self.backend.as_dyn().create_vertex_buffer(vertices, layout)
    }

    pub fn create_vertex_buffer_with_data(&self, data: &[u8], layout: &BufferLayout) -> Result<VertexBufferHandle> {
        self.backend.as_dyn().create_vertex_buffer_with_data(data, layout)
    }

    /// Static vertex buffer from typed vertex data
    pub fn create_vertex_buffer_from<T: bytemuck::Pod>(
        &self,
        vertices: &[T],
        layout: &BufferLayout,
    ) -> Result<VertexBufferHandle> {
        self.create_vertex_buffer_with_data(bytemuck::cast_slice(vertices), layout)
    }

    pub fn create_index_buffer(&self, indices: &[u32]) -> Result<IndexBufferHandle> {
        self.backend.as_dyn().create_index_buffer(indices)
    }

    pub fn create_shader(&self, sources: &ShaderSources) -> Result<ShaderHandle> {
        self.backend.as_dyn().create_shader(sources)
    }

    /// Split a `#type`-marked source and build a shader from it
    pub fn create_shader_from_source(&self, source: &str) -> Result<ShaderHandle> {
        let sources = prism_gpu::prism::render::process_source(source)
            .map_err(|error| gpu_raise!(SOURCE, error))?;
        self.create_shader(&sources)
    }

    pub fn create_texture(&self, specification: &TextureSpecification) -> Result<TextureHandle> {
        self.backend.as_dyn().create_texture(specification)
    }

    pub fn create_framebuffer(&self, specification: &FramebufferSpecification) -> Result<FramebufferHandle> {
        self.backend.as_dyn().create_framebuffer(specification)
    }

    pub fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        self.backend.as_dyn().create_vertex_array()
    }
}

impl RenderContext<GlfwWindow> {
    /// Open a GLFW window for the resolved API and create a context on it
    ///
    /// Headless has no native window; pair a `HeadlessWindow` with `create`.
    pub fn open(settings: Settings, props: WindowProps) -> Result<Self> {
        let settings = settings.resolved();
        if settings.preferred_api == ApiType::Headless {
            return Err(gpu_raise!(
                SOURCE,
                Error::InitializationFailed("a headless context has no native window".to_string())
            ));
        }
        let window = GlfwWindow::new(props, settings.preferred_api)?;
        Self::create(settings, window)
    }
}

impl<W: Window> Drop for RenderContext<W> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
#[path = "render_context_tests.rs"]
mod tests;
