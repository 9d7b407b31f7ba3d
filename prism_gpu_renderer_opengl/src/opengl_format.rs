/// Translation tables between Prism enums and GL enums
///
/// Every table is an exhaustive match, so a new enum variant without a GL
/// mapping does not compile.

use prism_gpu::prism::{
    Error, Result,
    render::{
        FramebufferTextureFormat, ImageFormat, ShaderDataType, ShaderStage, WrappingType,
    },
};

/// Byte size or element count as the `GLsizei` a GL call takes
pub fn gl_sizei(value: usize) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        Error::InvalidResource(format!("{} exceeds the GL size limit of {}", value, i32::MAX))
    })
}

/// Component type used by `glVertexAttribPointer`
pub fn shader_data_type_to_gl(ty: ShaderDataType) -> u32 {
    match ty {
        ShaderDataType::Float
        | ShaderDataType::Float2
        | ShaderDataType::Float3
        | ShaderDataType::Float4
        | ShaderDataType::Mat3
        | ShaderDataType::Mat4 => glow::FLOAT,
        ShaderDataType::Int
        | ShaderDataType::Int2
        | ShaderDataType::Int3
        | ShaderDataType::Int4 => glow::INT,
        ShaderDataType::Bool => glow::UNSIGNED_BYTE,
    }
}

/// Active attribute type reported by `glGetActiveAttrib`
pub fn gl_attribute_type_to_shader_data_type(gl_type: u32) -> Result<ShaderDataType> {
    match gl_type {
        glow::FLOAT => Ok(ShaderDataType::Float),
        glow::FLOAT_VEC2 => Ok(ShaderDataType::Float2),
        glow::FLOAT_VEC3 => Ok(ShaderDataType::Float3),
        glow::FLOAT_VEC4 => Ok(ShaderDataType::Float4),
        glow::FLOAT_MAT3 => Ok(ShaderDataType::Mat3),
        glow::FLOAT_MAT4 => Ok(ShaderDataType::Mat4),
        glow::INT => Ok(ShaderDataType::Int),
        glow::INT_VEC2 => Ok(ShaderDataType::Int2),
        glow::INT_VEC3 => Ok(ShaderDataType::Int3),
        glow::INT_VEC4 => Ok(ShaderDataType::Int4),
        glow::BOOL => Ok(ShaderDataType::Bool),
        other => Err(Error::ShaderSource(format!(
            "unsupported vertex attribute type 0x{:04X}",
            other
        ))),
    }
}

pub fn shader_stage_to_gl(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

/// Pixel transfer format of an image
pub fn image_format_to_gl(format: ImageFormat) -> u32 {
    match format {
        ImageFormat::Red => glow::RED,
        ImageFormat::Rg => glow::RG,
        ImageFormat::Rgb => glow::RGB,
        ImageFormat::Rgba => glow::RGBA,
    }
}

/// Pixel transfer component type for `bytes_per_channel`
pub fn texture_data_type(bytes_per_channel: u32) -> Result<u32> {
    match bytes_per_channel {
        1 => Ok(glow::UNSIGNED_BYTE),
        2 => Ok(glow::HALF_FLOAT),
        4 => Ok(glow::FLOAT),
        other => Err(Error::InvalidResource(format!(
            "unsupported bytes per channel: {}",
            other
        ))),
    }
}

/// Sized internal storage format
pub fn texture_internal_format(format: ImageFormat, bytes_per_channel: u32) -> Result<u32> {
    let internal = match (format, bytes_per_channel) {
        (ImageFormat::Red, 1) => glow::R8,
        (ImageFormat::Red, 2) => glow::R16F,
        (ImageFormat::Red, 4) => glow::R32F,
        (ImageFormat::Rg, 1) => glow::RG8,
        (ImageFormat::Rg, 2) => glow::RG16F,
        (ImageFormat::Rg, 4) => glow::RG32F,
        (ImageFormat::Rgb, 1) => glow::RGB8,
        (ImageFormat::Rgb, 2) => glow::RGB16F,
        (ImageFormat::Rgb, 4) => glow::RGB32F,
        (ImageFormat::Rgba, 1) => glow::RGBA8,
        (ImageFormat::Rgba, 2) => glow::RGBA16F,
        (ImageFormat::Rgba, 4) => glow::RGBA32F,
        (format, bytes) => {
            return Err(Error::InvalidResource(format!(
                "no internal format for {:?} with {} bytes per channel",
                format, bytes
            )))
        }
    };
    Ok(internal)
}

pub fn wrapping_to_gl(wrapping: WrappingType) -> u32 {
    match wrapping {
        WrappingType::ClampBorder => glow::CLAMP_TO_BORDER,
        WrappingType::ClampEdge => glow::CLAMP_TO_EDGE,
        WrappingType::Repeat => glow::REPEAT,
        WrappingType::MirrorRepeat => glow::MIRRORED_REPEAT,
    }
}

pub fn filter_to_gl(linear: bool) -> u32 {
    if linear {
        glow::LINEAR
    } else {
        glow::NEAREST
    }
}

/// Storage of one framebuffer attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentFormat {
    pub internal_format: u32,
    pub format: u32,
    pub data_type: u32,
}

pub fn framebuffer_format_to_gl(format: FramebufferTextureFormat) -> AttachmentFormat {
    match format {
        FramebufferTextureFormat::Rgba8 => AttachmentFormat {
            internal_format: glow::RGBA8,
            format: glow::RGBA,
            data_type: glow::UNSIGNED_BYTE,
        },
        FramebufferTextureFormat::RedInteger => AttachmentFormat {
            internal_format: glow::R32I,
            format: glow::RED_INTEGER,
            data_type: glow::INT,
        },
        FramebufferTextureFormat::RedFloat => AttachmentFormat {
            internal_format: glow::R32F,
            format: glow::RED,
            data_type: glow::FLOAT,
        },
    }
}

#[cfg(test)]
#[path = "opengl_format_tests.rs"]
mod tests;
