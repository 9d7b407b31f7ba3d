/// Vertex array - OpenGL implementation of the VertexArray trait

use std::sync::Mutex;

use glow::HasContext;
use prism_gpu::prism::{
    Error, Result,
    render::{attribute_slots, IndexBufferHandle, VertexArray, VertexBufferHandle},
};
use prism_gpu::{gpu_err, gpu_raise};

use crate::opengl::lock;
use crate::opengl_device::GlDevice;
use crate::opengl_format::shader_data_type_to_gl;

#[derive(Default)]
struct VertexArrayState {
    vertex_buffers: Vec<VertexBufferHandle>,
    index_buffer: Option<IndexBufferHandle>,
    /// First attribute index free for the next vertex buffer
    next_attribute: u32,
}

/// OpenGL vertex array object
pub struct GlVertexArray {
    gl: GlDevice,
    pub(crate) vertex_array: glow::VertexArray,
    state: Mutex<VertexArrayState>,
}

impl GlVertexArray {
    pub fn new(gl: GlDevice) -> Result<Self> {
        let vertex_array = unsafe {
            gl.create_vertex_array()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create vertex array: {}", e))?
        };
        Ok(Self { gl, vertex_array, state: Mutex::new(VertexArrayState::default()) })
    }
}

impl VertexArray for GlVertexArray {
    fn bind(&self) {
        unsafe { self.gl.bind_vertex_array(Some(self.vertex_array)) }
    }

    fn unbind(&self) {
        unsafe { self.gl.bind_vertex_array(None) }
    }

    fn add_vertex_buffer(&self, buffer: VertexBufferHandle) -> Result<()> {
        let layout = buffer.layout();
        if layout.is_empty() {
            return Err(gpu_raise!(
                "prism::opengl",
                Error::InvalidResource("vertex buffer has no layout".to_string())
            ));
        }

        let mut state = lock(&self.state);
        self.bind();
        buffer.bind();

        let slots = attribute_slots(&layout, state.next_attribute);
        unsafe {
            for slot in &slots {
                self.gl.enable_vertex_attrib_array(slot.index);
                let component_type = shader_data_type_to_gl(slot.ty);
                if slot.ty.is_integer() {
                    self.gl.vertex_attrib_pointer_i32(
                        slot.index,
                        slot.components,
                        component_type,
                        slot.stride,
                        slot.offset,
                    );
                } else {
                    self.gl.vertex_attrib_pointer_f32(
                        slot.index,
                        slot.components,
                        component_type,
                        slot.normalized,
                        slot.stride,
                        slot.offset,
                    );
                }
            }
        }

        state.next_attribute += slots.len() as u32;
        state.vertex_buffers.push(buffer);
        Ok(())
    }

    fn set_index_buffer(&self, buffer: IndexBufferHandle) {
        self.bind();
        buffer.bind();
        lock(&self.state).index_buffer = Some(buffer);
    }

    fn vertex_buffers(&self) -> Vec<VertexBufferHandle> {
        lock(&self.state).vertex_buffers.clone()
    }

    fn index_buffer(&self) -> Option<IndexBufferHandle> {
        lock(&self.state).index_buffer.clone()
    }
}

impl Drop for GlVertexArray {
    fn drop(&mut self) {
        let vertex_array = self.vertex_array;
        self.gl.delete_with(|gl| unsafe { gl.delete_vertex_array(vertex_array) });
    }
}
