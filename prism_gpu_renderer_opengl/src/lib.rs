/*!
# Prism GPU - OpenGL Backend

OpenGL implementation of the Prism GPU resource interfaces.

This crate provides an OpenGL backend that implements the prism_gpu traits
using the glow bindings. The GL function table is loaded through the window's
proc-address loader when the context is initialised.
*/

// OpenGL implementation modules
mod opengl;
mod opengl_buffer;
mod opengl_device;
mod opengl_framebuffer;
mod opengl_shader;
mod opengl_texture;
mod opengl_vertex_array;
pub mod opengl_format;

pub use opengl::OpenGlContext;
pub use opengl_buffer::{GlIndexBuffer, GlVertexBuffer};
pub use opengl_device::{ContextLiveness, GlDevice};
pub use opengl_framebuffer::GlFramebuffer;
pub use opengl_shader::GlShader;
pub use opengl_texture::GlTexture;
pub use opengl_vertex_array::GlVertexArray;

// Main prism namespace module
pub mod prism {
    pub mod opengl {
        pub use crate::opengl::OpenGlContext;
        pub use crate::opengl_buffer::{GlIndexBuffer, GlVertexBuffer};
        pub use crate::opengl_device::{ContextLiveness, GlDevice};
        pub use crate::opengl_framebuffer::GlFramebuffer;
        pub use crate::opengl_shader::GlShader;
        pub use crate::opengl_texture::GlTexture;
        pub use crate::opengl_vertex_array::GlVertexArray;
    }
}
