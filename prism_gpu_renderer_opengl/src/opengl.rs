/// OpenGL backend context
///
/// Owns the `glow` function table for one window's GL context. Every resource
/// created here shares it through a `GlDevice` and deletes its GL object when
/// the last handle to it is dropped. Resources that outlive `shutdown` leak
/// their GL names instead of deleting them through a dead context.

use std::sync::{Arc, Mutex, MutexGuard};

use glam::Vec4;
use glow::HasContext;
use prism_gpu::prism::{
    Error, Result,
    render::{
        init_window_with, print_properties, BufferLayout, ContextProperties, FramebufferHandle,
        FramebufferSpecification, Handle, IndexBufferHandle, RenderBackend, ShaderHandle,
        ShaderSources, TextureHandle, TextureSpecification, VertexArrayHandle, VertexBufferHandle,
        resolve_index_count,
    },
    settings::{ApiType, Settings},
    window::Window,
};
use prism_gpu::{gpu_info, gpu_raise};

use crate::opengl_buffer::{GlIndexBuffer, GlVertexBuffer};
use crate::opengl_device::GlDevice;
use crate::opengl_format::gl_sizei;
use crate::opengl_framebuffer::GlFramebuffer;
use crate::opengl_shader::GlShader;
use crate::opengl_texture::GlTexture;
use crate::opengl_vertex_array::GlVertexArray;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// OpenGL implementation of RenderBackend
pub struct OpenGlContext {
    settings: Settings,
    properties: ContextProperties,
    /// Loaded at init
    gl: Option<GlDevice>,
}

impl OpenGlContext {
    pub fn new(settings: Settings) -> Self {
        Self { settings, properties: ContextProperties::default(), gl: None }
    }

    /// The loaded GL function table, for code that issues raw GL calls
    pub fn gl(&self) -> Result<&Arc<glow::Context>> {
        self.device().map(GlDevice::context)
    }

    /// The function table together with the liveness shared by every resource
    pub fn device(&self) -> Result<&GlDevice> {
        self.gl.as_ref().ok_or_else(|| {
            gpu_raise!(
                "prism::opengl",
                Error::InitializationFailed("OpenGL context used before init".to_string())
            )
        })
    }

    fn gl_handle(&self) -> Result<GlDevice> {
        self.device().cloned()
    }
}

impl RenderBackend for OpenGlContext {
    fn api(&self) -> ApiType {
        ApiType::OpenGl
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn properties(&self) -> &ContextProperties {
        &self.properties
    }

    fn init(&mut self, window: &mut dyn Window) -> Result<()> {
        if !window.is_ready(ApiType::OpenGl) {
            return Err(gpu_raise!(
                "prism::opengl",
                Error::InitializationFailed(format!(
                    "window '{}' was not created with an OpenGL context",
                    window.title()
                ))
            ));
        }
        let blending = self.settings.blending;
        let (gl, properties) = init_window_with(window, |window| {
            window.make_current();

            let gl = unsafe {
                glow::Context::from_loader_function(|symbol| window.get_proc_address(symbol))
            };

            let properties = unsafe {
                ContextProperties {
                    vendor: gl.get_parameter_string(glow::VENDOR),
                    renderer: gl.get_parameter_string(glow::RENDERER),
                    version: gl.get_parameter_string(glow::VERSION),
                }
            };
            if properties.version.is_empty() {
                return Err(gpu_raise!(
                    "prism::opengl",
                    Error::InitializationFailed("Failed to init OpenGL".to_string())
                ));
            }

            if blending {
                unsafe {
                    gl.enable(glow::BLEND);
                    gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                }
            }
            Ok((gl, properties))
        })?;

        self.properties = properties;
        self.gl = Some(GlDevice::new(gl));
        print_properties(self.api(), &self.properties);
        Ok(())
    }

    fn shutdown(&mut self, window: &mut dyn Window) {
        if let Some(device) = self.gl.take() {
            device.liveness().mark_lost();
            window.shutdown();
            gpu_info!("prism::opengl", "OpenGL context shut down");
        }
    }

    fn begin_frame(&mut self, _window: &mut dyn Window) -> Result<()> {
        self.gl()?;
        self.clear();
        Ok(())
    }

    fn end_frame(&mut self, window: &mut dyn Window) -> Result<()> {
        self.gl()?;
        window.swap_buffers();
        Ok(())
    }

    fn clear(&mut self) {
        if let Some(gl) = &self.gl {
            unsafe { gl.clear(glow::COLOR_BUFFER_BIT) }
        }
    }

    fn draw_indexed(&mut self, vertex_array: &VertexArrayHandle, index_count: u32) -> Result<()> {
        let gl = self.gl()?;
        vertex_array.bind();
        let count = resolve_index_count(index_count, vertex_array.index_buffer().as_ref())
            .map_err(|e| gpu_raise!("prism::opengl", e))?;
        let count = gl_sizei(count as usize).map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe { gl.draw_elements(glow::TRIANGLES, count, glow::UNSIGNED_INT, 0) }
        Ok(())
    }

    fn set_clear_colour(&mut self, colour: Vec4) {
        if let Some(gl) = &self.gl {
            unsafe { gl.clear_color(colour.x, colour.y, colour.z, colour.w) }
        }
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        if let Some(gl) = &self.gl {
            unsafe { gl.viewport(x as i32, y as i32, width as i32, height as i32) }
        }
    }

    fn create_vertex_buffer(&self, vertices: u32, layout: &BufferLayout) -> Result<VertexBufferHandle> {
        let size = vertices
            .checked_mul(layout.stride())
            .ok_or_else(|| gpu_raise!("prism::opengl", Error::OutOfMemory))?;
        let buffer = GlVertexBuffer::with_capacity(self.gl_handle()?, size, layout.clone())?;
        Ok(Handle::from_arc(Arc::new(buffer)))
    }

    fn create_vertex_buffer_with_data(&self, data: &[u8], layout: &BufferLayout) -> Result<VertexBufferHandle> {
        let buffer = GlVertexBuffer::with_data(self.gl_handle()?, data, layout.clone())?;
        Ok(Handle::from_arc(Arc::new(buffer)))
    }

    fn create_index_buffer(&self, indices: &[u32]) -> Result<IndexBufferHandle> {
        let buffer = GlIndexBuffer::new(self.gl_handle()?, indices)?;
        Ok(Handle::from_arc(Arc::new(buffer)))
    }

    fn create_shader(&self, sources: &ShaderSources) -> Result<ShaderHandle> {
        let shader = GlShader::new(self.gl_handle()?, sources)?;
        Ok(Handle::from_arc(Arc::new(shader)))
    }

    fn create_texture(&self, specification: &TextureSpecification) -> Result<TextureHandle> {
        let texture = GlTexture::new(self.gl_handle()?, specification)?;
        Ok(Handle::from_arc(Arc::new(texture)))
    }

    fn create_framebuffer(&self, specification: &FramebufferSpecification) -> Result<FramebufferHandle> {
        let framebuffer = GlFramebuffer::new(self.gl_handle()?, specification)?;
        Ok(Handle::from_arc(Arc::new(framebuffer)))
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        let vertex_array = GlVertexArray::new(self.gl_handle()?)?;
        Ok(Handle::from_arc(Arc::new(vertex_array)))
    }
}
