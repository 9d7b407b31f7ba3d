/// Buffers - OpenGL implementation of VertexBuffer and IndexBuffer

use std::sync::Mutex;

use glow::HasContext;
use prism_gpu::prism::{
    Result,
    render::{check_upload_size, BufferLayout, IndexBuffer, VertexBuffer},
};
use prism_gpu::{gpu_err, gpu_raise};

use crate::opengl::lock;
use crate::opengl_device::GlDevice;
use crate::opengl_format::gl_sizei;

/// OpenGL vertex buffer
pub struct GlVertexBuffer {
    gl: GlDevice,
    pub(crate) buffer: glow::Buffer,
    /// Allocated size in bytes
    size: u32,
    layout: Mutex<BufferLayout>,
}

impl GlVertexBuffer {
    /// Dynamic buffer of `size` bytes, contents undefined until `set_data`
    pub fn with_capacity(gl: GlDevice, size: u32, layout: BufferLayout) -> Result<Self> {
        let gl_size = gl_sizei(size as usize).map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe {
            let buffer = gl
                .create_buffer()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create vertex buffer: {}", e))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_size(glow::ARRAY_BUFFER, gl_size, glow::DYNAMIC_DRAW);
            Ok(Self { gl, buffer, size, layout: Mutex::new(layout) })
        }
    }

    /// Static buffer initialised from `data`
    pub fn with_data(gl: GlDevice, data: &[u8], layout: BufferLayout) -> Result<Self> {
        let size = gl_sizei(data.len()).map_err(|e| gpu_raise!("prism::opengl", e))? as u32;
        unsafe {
            let buffer = gl
                .create_buffer()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create vertex buffer: {}", e))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW);
            Ok(Self { gl, buffer, size, layout: Mutex::new(layout) })
        }
    }
}

impl VertexBuffer for GlVertexBuffer {
    fn bind(&self) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer)) }
    }

    fn unbind(&self) {
        unsafe { self.gl.bind_buffer(glow::ARRAY_BUFFER, None) }
    }

    fn set_data(&self, data: &[u8]) -> Result<()> {
        check_upload_size(self.size, data.len()).map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.buffer));
            self.gl.buffer_sub_data_u8_slice(glow::ARRAY_BUFFER, 0, data);
        }
        Ok(())
    }

    fn layout(&self) -> BufferLayout {
        lock(&self.layout).clone()
    }

    fn set_layout(&self, layout: BufferLayout) {
        *lock(&self.layout) = layout;
    }

    fn size(&self) -> u32 {
        self.size
    }
}

impl Drop for GlVertexBuffer {
    fn drop(&mut self) {
        let buffer = self.buffer;
        self.gl.delete_with(|gl| unsafe { gl.delete_buffer(buffer) });
    }
}

/// OpenGL index buffer of `u32` indices
pub struct GlIndexBuffer {
    gl: GlDevice,
    pub(crate) buffer: glow::Buffer,
    count: u32,
}

impl GlIndexBuffer {
    pub fn new(gl: GlDevice, indices: &[u32]) -> Result<Self> {
        gl_sizei(std::mem::size_of_val(indices)).map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe {
            let buffer = gl
                .create_buffer()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create index buffer: {}", e))?;
            // Uploaded through ARRAY_BUFFER so the bound vertex array is untouched
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(buffer));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );
            Ok(Self { gl, buffer, count: indices.len() as u32 })
        }
    }
}

impl IndexBuffer for GlIndexBuffer {
    fn bind(&self) {
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(self.buffer)) }
    }

    fn unbind(&self) {
        unsafe { self.gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None) }
    }

    fn count(&self) -> u32 {
        self.count
    }
}

impl Drop for GlIndexBuffer {
    fn drop(&mut self) {
        let buffer = self.buffer;
        self.gl.delete_with(|gl| unsafe { gl.delete_buffer(buffer) });
    }
}
