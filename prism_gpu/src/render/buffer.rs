/// Vertex and index buffer interfaces, plus the vertex layout description

use std::ops::Index;

use crate::error::{Error, Result};
use crate::render::handle::{Handle, Resource};

/// Type of a single vertex attribute as seen by a shader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size in bytes
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 4 * 2,
            ShaderDataType::Float3 => 4 * 3,
            ShaderDataType::Float4 => 4 * 4,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Int => 4,
            ShaderDataType::Int2 => 4 * 2,
            ShaderDataType::Int3 => 4 * 3,
            ShaderDataType::Int4 => 4 * 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Number of components; matrices count their columns
    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float => 1,
            ShaderDataType::Float2 => 2,
            ShaderDataType::Float3 => 3,
            ShaderDataType::Float4 => 4,
            ShaderDataType::Mat3 => 3,
            ShaderDataType::Mat4 => 4,
            ShaderDataType::Int => 1,
            ShaderDataType::Int2 => 2,
            ShaderDataType::Int3 => 3,
            ShaderDataType::Int4 => 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// Integer attributes bypass float conversion when bound
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            ShaderDataType::Int
                | ShaderDataType::Int2
                | ShaderDataType::Int3
                | ShaderDataType::Int4
                | ShaderDataType::Bool
        )
    }

    pub const fn is_matrix(self) -> bool {
        matches!(self, ShaderDataType::Mat3 | ShaderDataType::Mat4)
    }
}

/// One named, typed attribute inside a vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferElement {
    pub name: String,
    pub ty: ShaderDataType,
    /// Byte size, always `ty.size()`
    pub size: u32,
    /// Byte offset inside the vertex, assigned by `BufferLayout`
    pub offset: u32,
    pub normalized: bool,
}

impl BufferElement {
    pub fn new(ty: ShaderDataType, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty,
            size: ty.size(),
            offset: 0,
            normalized: false,
        }
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }
}

/// Ordered list of vertex attributes
///
/// Offsets and stride are recomputed from scratch every time the element list
/// changes, so an element's `offset` is always valid once it is in a layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(elements: Vec<BufferElement>) -> Self {
        let mut layout = Self { elements, stride: 0 };
        layout.calculate_offsets_and_stride();
        layout
    }

    pub fn push(&mut self, element: BufferElement) {
        self.elements.push(element);
        self.calculate_offsets_and_stride();
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// Bytes per vertex
    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&BufferElement> {
        self.elements.iter().find(|element| element.name == name)
    }

    pub fn has_element(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, BufferElement> {
        self.elements.iter()
    }

    fn calculate_offsets_and_stride(&mut self) {
        let mut offset = 0;
        for element in &mut self.elements {
            element.size = element.ty.size();
            element.offset = offset;
            offset += element.size;
        }
        self.stride = offset;
    }
}

impl From<Vec<BufferElement>> for BufferLayout {
    fn from(elements: Vec<BufferElement>) -> Self {
        Self::new(elements)
    }
}

impl FromIterator<BufferElement> for BufferLayout {
    fn from_iter<I: IntoIterator<Item = BufferElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Index<usize> for BufferLayout {
    type Output = BufferElement;

    fn index(&self, index: usize) -> &BufferElement {
        &self.elements[index]
    }
}

impl<'a> IntoIterator for &'a BufferLayout {
    type Item = &'a BufferElement;
    type IntoIter = std::slice::Iter<'a, BufferElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Reject uploads that do not fit in a buffer allocated with `capacity` bytes
pub fn check_upload_size(capacity: u32, len: usize) -> Result<()> {
    if len > capacity as usize {
        return Err(Error::InvalidResource(format!(
            "upload of {} bytes does not fit in a {} byte buffer",
            len, capacity
        )));
    }
    Ok(())
}

/// GPU vertex buffer
pub trait VertexBuffer: Resource {
    fn bind(&self);
    fn unbind(&self);

    /// Overwrite the buffer contents starting at offset 0
    fn set_data(&self, data: &[u8]) -> Result<()>;

    fn layout(&self) -> BufferLayout;
    fn set_layout(&self, layout: BufferLayout);

    /// Allocated size in bytes
    fn size(&self) -> u32;
}

impl dyn VertexBuffer {
    /// Upload plain-old-data vertices (`&[f32]`, `&[glam::Vec3]`...)
    pub fn set_data_from<T: bytemuck::Pod>(&self, data: &[T]) -> Result<()> {
        self.set_data(bytemuck::cast_slice(data))
    }
}

/// GPU index buffer of `u32` indices
pub trait IndexBuffer: Resource {
    fn bind(&self);
    fn unbind(&self);

    /// Number of indices
    fn count(&self) -> u32;
}

pub type VertexBufferHandle = Handle<dyn VertexBuffer>;
pub type IndexBufferHandle = Handle<dyn IndexBuffer>;

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;
