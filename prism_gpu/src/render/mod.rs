/// Render module - backend-agnostic resource interfaces

pub mod buffer;
pub mod context;
pub mod framebuffer;
pub mod handle;
pub mod shader;
pub mod texture;
pub mod vertex_array;

pub use buffer::{
    check_upload_size, BufferElement, BufferLayout, IndexBuffer, IndexBufferHandle,
    ShaderDataType, VertexBuffer, VertexBufferHandle,
};
pub use context::{init_window_with, print_properties, ContextProperties, RenderBackend};
pub use framebuffer::{
    apply_resize, resize_action, resize_with, Framebuffer, FramebufferHandle, FramebufferSpecification,
    FramebufferTextureFormat, ResizeAction, MAX_FRAMEBUFFER_SIZE,
};
pub use handle::{Handle, Resource};
pub use shader::{
    layout_from_attributes, process_source, Shader, ShaderAttribute, ShaderHandle,
    ShaderSources, ShaderStage, TYPE_TOKEN,
};
pub use texture::{
    check_texture_data, unpack_alignment, ImageFormat, Texture, TextureHandle,
    TextureSpecification, WrappingType,
};
pub use vertex_array::{
    attribute_slots, resolve_index_count, AttributeSlot, VertexArray, VertexArrayHandle,
};
