/// Framebuffer interface: offscreen colour attachments with pixel readback

use crate::error::{Error, Result};
use crate::render::handle::{Handle, Resource};
use crate::gpu_warn;

/// Largest width or height a framebuffer may be resized to
pub const MAX_FRAMEBUFFER_SIZE: u32 = 8192;

/// Attachment storage formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FramebufferTextureFormat {
    /// 8-bit RGBA colour
    Rgba8,
    /// Single 32-bit signed integer channel (entity ids, picking)
    RedInteger,
    /// Single 32-bit float channel
    RedFloat,
}

impl FramebufferTextureFormat {
    pub const fn is_integer(self) -> bool {
        matches!(self, FramebufferTextureFormat::RedInteger)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramebufferSpecification {
    pub width: u32,
    pub height: u32,
    /// Colour attachments, in attachment-index order
    pub attachments: Vec<FramebufferTextureFormat>,
}

impl Default for FramebufferSpecification {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            attachments: vec![FramebufferTextureFormat::Rgba8],
        }
    }
}

impl FramebufferSpecification {
    pub fn validate(&self) -> Result<()> {
        if self.attachments.is_empty() {
            return Err(Error::InvalidResource(
                "framebuffer has no colour attachments".to_string(),
            ));
        }
        if self.width == 0 || self.height == 0
            || self.width > MAX_FRAMEBUFFER_SIZE || self.height > MAX_FRAMEBUFFER_SIZE
        {
            return Err(Error::InvalidResource(format!(
                "framebuffer size {}x{} is outside 1..={}",
                self.width, self.height, MAX_FRAMEBUFFER_SIZE
            )));
        }
        Ok(())
    }

    pub fn attachment(&self, index: u32) -> Result<FramebufferTextureFormat> {
        self.attachments.get(index as usize).copied().ok_or_else(|| {
            Error::InvalidResource(format!(
                "attachment {} out of range ({} attachments)",
                index,
                self.attachments.len()
            ))
        })
    }
}

/// What a resize request does to a framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAction {
    /// Same size, keep the current attachments
    Unchanged,
    /// Zero or larger than [`MAX_FRAMEBUFFER_SIZE`]; the framebuffer keeps its size
    Rejected,
    /// Attachments must be recreated at the new size
    Rebuild,
}

pub fn resize_action(spec: &FramebufferSpecification, width: u32, height: u32) -> ResizeAction {
    if width == 0 || height == 0 || width > MAX_FRAMEBUFFER_SIZE || height > MAX_FRAMEBUFFER_SIZE {
        ResizeAction::Rejected
    } else if spec.width == width && spec.height == height {
        ResizeAction::Unchanged
    } else {
        ResizeAction::Rebuild
    }
}

/// Apply a resize request to `spec`; returns true when the backend must rebuild
///
/// Rejected sizes are reported as a warning and leave `spec` untouched.
pub fn apply_resize(spec: &mut FramebufferSpecification, width: u32, height: u32) -> bool {
    match resize_action(spec, width, height) {
        ResizeAction::Unchanged => false,
        ResizeAction::Rejected => {
            gpu_warn!("prism::framebuffer", "Attempted to resize framebuffer to {}, {}", width, height);
            false
        }
        ResizeAction::Rebuild => {
            spec.width = width;
            spec.height = height;
            true
        }
    }
}

/// Resize through `rebuild`, committing the new size only when it succeeds
///
/// `None` when no rebuild is needed. A failed rebuild leaves `spec` as it
/// was, so the backend can keep the attachments it already has.
pub fn resize_with<T>(
    spec: &mut FramebufferSpecification,
    width: u32,
    height: u32,
    rebuild: impl FnOnce(&FramebufferSpecification) -> Result<T>,
) -> Option<Result<T>> {
    let mut resized = spec.clone();
    if !apply_resize(&mut resized, width, height) {
        return None;
    }
    let result = rebuild(&resized);
    if result.is_ok() {
        *spec = resized;
    }
    Some(result)
}

/// Offscreen render target
///
/// Methods take `&self`: handles are shared, so the attachment state lives
/// behind interior mutability in each backend.
pub trait Framebuffer: Resource {
    /// Redirect rendering into this framebuffer and set the viewport to its size
    fn bind(&self);
    fn unbind(&self);

    /// Recreate the attachments at the new size (see [`apply_resize`])
    fn resize(&self, width: u32, height: u32);

    /// Read one texel of an integer attachment
    fn read_pixel(&self, attachment: u32, x: i32, y: i32) -> Result<i32>;

    /// Fill an integer attachment with `value`
    fn clear_attachment(&self, attachment: u32, value: i32) -> Result<()>;

    /// Backend name of the colour texture behind `index`
    fn color_attachment_id(&self, index: u32) -> Option<u32>;

    fn specification(&self) -> FramebufferSpecification;

    /// Number of times the attachments were (re)created
    fn generation(&self) -> u64;
}

pub type FramebufferHandle = Handle<dyn Framebuffer>;

#[cfg(test)]
#[path = "framebuffer_tests.rs"]
mod tests;
