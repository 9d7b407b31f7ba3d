/// Texture - OpenGL implementation of the Texture trait

use glow::{HasContext, PixelUnpackData};
use prism_gpu::prism::{
    Result,
    render::{check_texture_data, unpack_alignment, Texture, TextureSpecification},
};
use prism_gpu::{gpu_err, gpu_raise};

use crate::opengl_device::GlDevice;
use crate::opengl_format::{
    filter_to_gl, image_format_to_gl, texture_data_type, texture_internal_format, wrapping_to_gl,
};

/// OpenGL 2D texture
pub struct GlTexture {
    gl: GlDevice,
    pub(crate) texture: glow::Texture,
    /// Copy of the creation parameters, without the initial pixels
    specification: TextureSpecification,
    format: u32,
    data_type: u32,
}

impl GlTexture {
    pub fn new(gl: GlDevice, specification: &TextureSpecification) -> Result<Self> {
        specification.validate().map_err(|e| gpu_raise!("prism::opengl", e))?;

        let internal_format = texture_internal_format(specification.format, specification.bytes_per_channel)
            .map_err(|e| gpu_raise!("prism::opengl", e))?;
        let data_type = texture_data_type(specification.bytes_per_channel)
            .map_err(|e| gpu_raise!("prism::opengl", e))?;
        let format = image_format_to_gl(specification.format);
        let wrapping = wrapping_to_gl(specification.wrapping) as i32;
        let filter = filter_to_gl(specification.linear_filtering) as i32;

        let texture = unsafe {
            gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, unpack_alignment(specification.bytes_per_pixel()));

            let texture = gl
                .create_texture()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create texture: {}", e))?;
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                internal_format as i32,
                specification.width as i32,
                specification.height as i32,
                0,
                format,
                data_type,
                specification.data.as_deref(),
            );

            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, filter);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, filter);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, wrapping);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, wrapping);

            gl.bind_texture(glow::TEXTURE_2D, None);
            texture
        };

        let mut specification = specification.clone();
        specification.data = None;
        Ok(Self { gl, texture, specification, format, data_type })
    }
}

impl Texture for GlTexture {
    fn width(&self) -> u32 {
        self.specification.width
    }

    fn height(&self) -> u32 {
        self.specification.height
    }

    fn renderer_id(&self) -> u32 {
        self.texture.0.get()
    }

    fn specification(&self) -> &TextureSpecification {
        &self.specification
    }

    fn set_data(&self, data: &[u8]) -> Result<()> {
        check_texture_data(&self.specification, data.len())
            .map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe {
            self.gl.pixel_store_i32(
                glow::UNPACK_ALIGNMENT,
                unpack_alignment(self.specification.bytes_per_pixel()),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            self.gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                self.specification.width as i32,
                self.specification.height as i32,
                self.format,
                self.data_type,
                PixelUnpackData::Slice(data),
            );
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
        Ok(())
    }

    fn bind(&self, slot: u32) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + slot);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
        }
    }
}

impl Drop for GlTexture {
    fn drop(&mut self) {
        let texture = self.texture;
        self.gl.delete_with(|gl| unsafe { gl.delete_texture(texture) });
    }
}
