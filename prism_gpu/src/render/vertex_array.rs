/// Vertex array interface: vertex buffers plus an optional index buffer

use crate::error::{Error, Result};
use crate::render::buffer::{BufferLayout, IndexBufferHandle, ShaderDataType, VertexBufferHandle};
use crate::render::handle::{Handle, Resource};

/// Vertex input state for indexed draws
///
/// The vertex array keeps its buffers alive: adding a buffer clones its handle.
pub trait VertexArray: Resource {
    fn bind(&self);
    fn unbind(&self);

    /// Attach a vertex buffer; its layout must be set first
    fn add_vertex_buffer(&self, buffer: VertexBufferHandle) -> Result<()>;

    /// Replace the index buffer
    fn set_index_buffer(&self, buffer: IndexBufferHandle);

    fn vertex_buffers(&self) -> Vec<VertexBufferHandle>;
    fn index_buffer(&self) -> Option<IndexBufferHandle>;
}

pub type VertexArrayHandle = Handle<dyn VertexArray>;

/// One vertex attribute slot as programmed into the vertex input state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSlot {
    pub index: u32,
    pub ty: ShaderDataType,
    /// Components fed to this slot (matrix columns get one slot each)
    pub components: i32,
    pub normalized: bool,
    pub stride: i32,
    pub offset: i32,
}

/// Expand a layout into attribute slots starting at `first_index`
///
/// Matrices occupy one slot per column.
pub fn attribute_slots(layout: &BufferLayout, first_index: u32) -> Vec<AttributeSlot> {
    let stride = layout.stride() as i32;
    let mut slots = Vec::with_capacity(layout.len());
    let mut index = first_index;

    for element in layout.iter() {
        let components = element.ty.component_count() as i32;
        if element.ty.is_matrix() {
            let column_size = components * std::mem::size_of::<f32>() as i32;
            for column in 0..components {
                slots.push(AttributeSlot {
                    index,
                    ty: element.ty,
                    components,
                    normalized: element.normalized,
                    stride,
                    offset: element.offset as i32 + column_size * column,
                });
                index += 1;
            }
        } else {
            slots.push(AttributeSlot {
                index,
                ty: element.ty,
                components,
                normalized: element.normalized,
                stride,
                offset: element.offset as i32,
            });
            index += 1;
        }
    }
    slots
}

/// Index count an indexed draw submits
///
/// `requested == 0` draws the whole index buffer.
pub fn resolve_index_count(requested: u32, index_buffer: Option<&IndexBufferHandle>) -> Result<u32> {
    let available = match index_buffer {
        Some(buffer) => buffer.count(),
        None => {
            return Err(Error::InvalidResource(
                "vertex array has no index buffer".to_string(),
            ))
        }
    };
    if requested == 0 {
        Ok(available)
    } else if requested > available {
        Err(Error::InvalidResource(format!(
            "draw of {} indices exceeds index buffer of {}",
            requested, available
        )))
    } else {
        Ok(requested)
    }
}

#[cfg(test)]
#[path = "vertex_array_tests.rs"]
mod tests;
