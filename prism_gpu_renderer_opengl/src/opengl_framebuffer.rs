/// Framebuffer - OpenGL implementation of the Framebuffer trait
///
/// Attachments are plain 2D textures. A size change builds a new framebuffer
/// with fresh attachments and only then deletes the old ones, so a failed
/// rebuild keeps the framebuffer usable at its previous size.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use glow::{HasContext, PixelPackData};
use prism_gpu::prism::{
    Error, Result,
    render::{resize_with, Framebuffer, FramebufferSpecification},
};
use prism_gpu::{gpu_err, gpu_error, gpu_raise, gpu_warn};

use crate::opengl::lock;
use crate::opengl_device::GlDevice;
use crate::opengl_format::framebuffer_format_to_gl;

struct FramebufferState {
    specification: FramebufferSpecification,
    framebuffer: Option<glow::Framebuffer>,
    attachments: Vec<glow::Texture>,
}

/// OpenGL framebuffer object with colour attachments
pub struct GlFramebuffer {
    gl: GlDevice,
    state: Mutex<FramebufferState>,
    generation: AtomicU64,
    bound: AtomicBool,
}

impl GlFramebuffer {
    pub fn new(gl: GlDevice, specification: &FramebufferSpecification) -> Result<Self> {
        specification.validate().map_err(|e| gpu_raise!("prism::opengl", e))?;

        let mut state = FramebufferState {
            specification: specification.clone(),
            framebuffer: None,
            attachments: Vec::new(),
        };
        state.install(build(&gl, specification)?);

        Ok(Self {
            gl,
            state: Mutex::new(state),
            generation: AtomicU64::new(1),
            bound: AtomicBool::new(false),
        })
    }

    /// Validate `attachment` as an integer attachment and texel (x, y) as inside it
    fn check_integer_texel(state: &FramebufferState, attachment: u32, x: i32, y: i32) -> Result<()> {
        let format = state.specification.attachment(attachment)?;
        if !format.is_integer() {
            return Err(Error::InvalidResource(format!(
                "attachment {} is {:?}, not an integer attachment",
                attachment, format
            )));
        }
        let (width, height) = (state.specification.width as i32, state.specification.height as i32);
        if x < 0 || y < 0 || x >= width || y >= height {
            return Err(Error::InvalidResource(format!(
                "pixel ({}, {}) outside {}x{}",
                x, y, width, height
            )));
        }
        Ok(())
    }

    fn restore_binding(&self) {
        if !self.bound.load(Ordering::Relaxed) {
            unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) }
        }
    }
}

/// Framebuffer object and its attachments from one build
struct Built {
    framebuffer: glow::Framebuffer,
    attachments: Vec<glow::Texture>,
}

impl FramebufferState {
    fn install(&mut self, built: Built) {
        self.framebuffer = Some(built.framebuffer);
        self.attachments = built.attachments;
    }
}

unsafe fn release(gl: &glow::Context, state: &mut FramebufferState) {
    if let Some(framebuffer) = state.framebuffer.take() {
        gl.delete_framebuffer(framebuffer);
    }
    for texture in state.attachments.drain(..) {
        gl.delete_texture(texture);
    }
}

/// Create a framebuffer and its attachments at the specification size
///
/// Nothing is left behind on failure. An incomplete framebuffer is reported
/// and kept.
fn build(gl: &glow::Context, specification: &FramebufferSpecification) -> Result<Built> {
    unsafe {
        let framebuffer = gl
            .create_framebuffer()
            .map_err(|e| gpu_err!("prism::opengl", "Failed to create framebuffer: {}", e))?;
        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(framebuffer));

        let width = specification.width as i32;
        let height = specification.height as i32;
        let mut attachments = Vec::with_capacity(specification.attachments.len());
        let mut draw_buffers = Vec::with_capacity(specification.attachments.len());

        for (index, format) in specification.attachments.iter().enumerate() {
            let storage = framebuffer_format_to_gl(*format);
            let texture = match gl.create_texture() {
                Ok(texture) => texture,
                Err(e) => {
                    gl.bind_framebuffer(glow::FRAMEBUFFER, None);
                    for texture in attachments {
                        gl.delete_texture(texture);
                    }
                    gl.delete_framebuffer(framebuffer);
                    return Err(gpu_err!("prism::opengl", "Failed to create attachment {}: {}", index, e));
                }
            };
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                storage.internal_format as i32,
                width,
                height,
                0,
                storage.format,
                storage.data_type,
                None,
            );
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::NEAREST as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);

            let attachment = glow::COLOR_ATTACHMENT0 + index as u32;
            gl.framebuffer_texture_2d(glow::FRAMEBUFFER, attachment, glow::TEXTURE_2D, Some(texture), 0);
            attachments.push(texture);
            draw_buffers.push(attachment);
        }
        gl.bind_texture(glow::TEXTURE_2D, None);
        gl.draw_buffers(&draw_buffers);

        let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
        if status != glow::FRAMEBUFFER_COMPLETE {
            gpu_error!("prism::opengl", "Framebuffer is incomplete (status 0x{:04X})", status);
        }

        gl.bind_framebuffer(glow::FRAMEBUFFER, None);
        Ok(Built { framebuffer, attachments })
    }
}

impl Framebuffer for GlFramebuffer {
    fn bind(&self) {
        let state = lock(&self.state);
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, state.framebuffer);
            self.gl.viewport(
                0,
                0,
                state.specification.width as i32,
                state.specification.height as i32,
            );
        }
        self.bound.store(true, Ordering::Relaxed);
    }

    fn unbind(&self) {
        unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, None) }
        self.bound.store(false, Ordering::Relaxed);
    }

    fn resize(&self, width: u32, height: u32) {
        let mut state = lock(&self.state);
        match resize_with(&mut state.specification, width, height, |resized| build(&self.gl, resized)) {
            None => return,
            Some(Ok(built)) => {
                unsafe { release(&self.gl, &mut state) };
                state.install(built);
                self.generation.fetch_add(1, Ordering::Relaxed);
            }
            Some(Err(_)) => {
                gpu_warn!(
                    "prism::opengl",
                    "Keeping {}x{} attachments after failed resize",
                    state.specification.width,
                    state.specification.height
                );
            }
        }
        if self.bound.load(Ordering::Relaxed) {
            unsafe { self.gl.bind_framebuffer(glow::FRAMEBUFFER, state.framebuffer) }
        }
    }

    fn read_pixel(&self, attachment: u32, x: i32, y: i32) -> Result<i32> {
        let state = lock(&self.state);
        Self::check_integer_texel(&state, attachment, x, y)
            .map_err(|e| gpu_raise!("prism::opengl", e))?;

        let mut texel = [0u8; 4];
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, state.framebuffer);
            self.gl.read_buffer(glow::COLOR_ATTACHMENT0 + attachment);
            self.gl.read_pixels(
                x,
                y,
                1,
                1,
                glow::RED_INTEGER,
                glow::INT,
                PixelPackData::Slice(&mut texel),
            );
        }
        self.restore_binding();
        Ok(i32::from_ne_bytes(texel))
    }

    fn clear_attachment(&self, attachment: u32, value: i32) -> Result<()> {
        let state = lock(&self.state);
        Self::check_integer_texel(&state, attachment, 0, 0)
            .map_err(|e| gpu_raise!("prism::opengl", e))?;
        unsafe {
            self.gl.bind_framebuffer(glow::FRAMEBUFFER, state.framebuffer);
            self.gl.clear_buffer_i32_slice(glow::COLOR, attachment, &[value, 0, 0, 0]);
        }
        self.restore_binding();
        Ok(())
    }

    fn color_attachment_id(&self, index: u32) -> Option<u32> {
        lock(&self.state)
            .attachments
            .get(index as usize)
            .map(|texture| texture.0.get())
    }

    fn specification(&self) -> FramebufferSpecification {
        lock(&self.state).specification.clone()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

impl Drop for GlFramebuffer {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        self.gl.delete_with(|gl| unsafe { release(gl, &mut state) });
    }
}
