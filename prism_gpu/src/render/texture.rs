/// Texture interface and specification

use glam::UVec2;

use crate::error::{Error, Result};
use crate::render::handle::{Handle, Resource};

/// Channel layout of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl ImageFormat {
    pub const fn channels(self) -> u32 {
        match self {
            ImageFormat::Red => 1,
            ImageFormat::Rg => 2,
            ImageFormat::Rgb => 3,
            ImageFormat::Rgba => 4,
        }
    }

    /// Format for an image decoded with `channels` channels
    pub fn from_channels(channels: u32) -> Option<ImageFormat> {
        match channels {
            1 => Some(ImageFormat::Red),
            2 => Some(ImageFormat::Rg),
            3 => Some(ImageFormat::Rgb),
            4 => Some(ImageFormat::Rgba),
            _ => None,
        }
    }
}

/// Behaviour of texture coordinates outside [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappingType {
    ClampBorder,
    ClampEdge,
    Repeat,
    MirrorRepeat,
}

/// Texture creation parameters, copied into the texture
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSpecification {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub wrapping: WrappingType,
    /// 1 (8-bit unorm), 2 (half float) or 4 (float)
    pub bytes_per_channel: u32,
    pub linear_filtering: bool,
    /// Initial pixels, tightly packed rows
    pub data: Option<Vec<u8>>,
}

impl Default for TextureSpecification {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
            format: ImageFormat::Rgba,
            wrapping: WrappingType::Repeat,
            bytes_per_channel: 1,
            linear_filtering: true,
            data: None,
        }
    }
}

impl TextureSpecification {
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.channels() * self.bytes_per_channel
    }

    /// Exact byte count of a full upload
    pub fn data_size(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel() as usize
    }

    /// Check the specification before any GPU object is created
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResource(format!(
                "texture size {}x{} has a zero dimension",
                self.width, self.height
            )));
        }
        if !matches!(self.bytes_per_channel, 1 | 2 | 4) {
            return Err(Error::InvalidResource(format!(
                "unsupported bytes per channel: {}",
                self.bytes_per_channel
            )));
        }
        if let Some(data) = &self.data {
            check_texture_data(self, data.len())?;
        }
        Ok(())
    }
}

/// Row unpack alignment for tightly packed pixels of `bytes_per_pixel` bytes
///
/// The largest of 8, 4, 2, 1 dividing the pixel size, so rows of odd widths
/// are never read with padding.
pub fn unpack_alignment(bytes_per_pixel: u32) -> i32 {
    if bytes_per_pixel % 8 == 0 {
        8
    } else if bytes_per_pixel % 4 == 0 {
        4
    } else if bytes_per_pixel % 2 == 0 {
        2
    } else {
        1
    }
}

/// A `set_data` upload must cover the whole texture exactly
pub fn check_texture_data(spec: &TextureSpecification, len: usize) -> Result<()> {
    let expected = spec.data_size();
    if len != expected {
        return Err(Error::InvalidResource(format!(
            "texture data is {} bytes, a {}x{} {:?} texture needs {}",
            len, spec.width, spec.height, spec.format, expected
        )));
    }
    Ok(())
}

/// Sampled 2D texture
pub trait Texture: Resource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn size(&self) -> UVec2 {
        UVec2::new(self.width(), self.height())
    }

    /// Backend object name (GL texture name, 0 when there is none)
    fn renderer_id(&self) -> u32;

    fn specification(&self) -> &TextureSpecification;

    /// Replace every pixel; `data` must be exactly `specification().data_size()` bytes
    fn set_data(&self, data: &[u8]) -> Result<()>;

    /// Bind to texture unit `slot`
    fn bind(&self, slot: u32);
}

pub type TextureHandle = Handle<dyn Texture>;

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
