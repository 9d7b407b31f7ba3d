/// Shader interface, `#type` source splitting and reflection helpers

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::render::buffer::{BufferElement, BufferLayout, ShaderDataType};
use crate::render::handle::{Handle, Resource};

/// Marker that starts a new stage inside a combined shader source
pub const TYPE_TOKEN: &str = "#type";

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Parse the word following a `#type` marker ("pixel" is an alias of "fragment")
    pub fn from_token(token: &str) -> Option<ShaderStage> {
        match token {
            "vertex" => Some(ShaderStage::Vertex),
            "fragment" | "pixel" => Some(ShaderStage::Fragment),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

/// Per-stage shader source text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSources {
    stages: FxHashMap<ShaderStage, String>,
}

impl ShaderSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`
    pub fn with(mut self, stage: ShaderStage, source: impl Into<String>) -> Self {
        self.insert(stage, source);
        self
    }

    /// Set the source of a stage, replacing any previous one
    pub fn insert(&mut self, stage: ShaderStage, source: impl Into<String>) {
        self.stages.insert(stage, source.into());
    }

    pub fn get(&self, stage: ShaderStage) -> Option<&str> {
        self.stages.get(&stage).map(String::as_str)
    }

    /// Stages in pipeline order
    pub fn iter(&self) -> impl Iterator<Item = (ShaderStage, &str)> + '_ {
        let mut stages: Vec<_> = self.stages.iter().map(|(stage, src)| (*stage, src.as_str())).collect();
        stages.sort_by_key(|(stage, _)| *stage);
        stages.into_iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Split a combined source into stages on `#type <stage>` markers
///
/// The text after the marker up to the end of the line names the stage; the
/// stage body starts on the next non-empty line and runs up to the next marker
/// or the end of the string. Everything else (`#version`, `#include`...) is
/// passed through untouched. A repeated stage replaces the earlier body.
///
/// # Errors
///
/// `Error::ShaderSource` when a marker has no line ending after it, when it is
/// followed by nothing but line endings, or when the stage name is unknown.
pub fn process_source(source: &str) -> Result<ShaderSources> {
    let mut sources = ShaderSources::new();
    let is_eol = |c: char| c == '\r' || c == '\n';

    let mut marker = source.find(TYPE_TOKEN);
    while let Some(pos) = marker {
        let eol = source[pos..]
            .find(is_eol)
            .map(|offset| pos + offset)
            .ok_or_else(|| Error::ShaderSource(format!("no line ending after '{}' at byte {}", TYPE_TOKEN, pos)))?;

        let token = source[pos + TYPE_TOKEN.len()..eol].trim();
        let stage = ShaderStage::from_token(token)
            .ok_or_else(|| Error::ShaderSource(format!("unknown shader type '{}'", token)))?;

        let body_start = source[eol..]
            .find(|c: char| !is_eol(c))
            .map(|offset| eol + offset)
            .ok_or_else(|| Error::ShaderSource(format!("'{} {}' has no body", TYPE_TOKEN, token)))?;

        marker = source[body_start..].find(TYPE_TOKEN).map(|offset| body_start + offset);
        let body = match marker {
            Some(next) => &source[body_start..next],
            None => &source[body_start..],
        };
        sources.insert(stage, body);
    }

    Ok(sources)
}

/// Vertex input consumed by a linked program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderAttribute {
    pub location: u32,
    pub name: String,
    pub ty: ShaderDataType,
}

/// Build the vertex layout a program expects, ordered by attribute location
pub fn layout_from_attributes(attributes: &mut [ShaderAttribute]) -> BufferLayout {
    attributes.sort_by_key(|attribute| attribute.location);
    attributes
        .iter()
        .map(|attribute| BufferElement::new(attribute.ty, attribute.name.clone()))
        .collect()
}

/// Linked GPU program
pub trait Shader: Resource {
    fn bind(&self);
    fn unbind(&self);

    /// Whether the linked program has an active uniform with this name
    fn uniform_exists(&self, name: &str) -> bool;

    fn set_int(&self, name: &str, value: i32);
    fn set_int_array(&self, name: &str, values: &[i32]);
    fn set_float(&self, name: &str, value: f32);
    fn set_float2(&self, name: &str, value: Vec2);
    fn set_float3(&self, name: &str, value: Vec3);
    fn set_float4(&self, name: &str, value: Vec4);
    fn set_mat3(&self, name: &str, value: &Mat3);
    fn set_mat4(&self, name: &str, value: &Mat4);

    /// Vertex layout reflected from the program's active attributes
    fn layout(&self) -> &BufferLayout;

    /// Active attributes, ordered by location
    fn attributes(&self) -> &[ShaderAttribute];
}

pub type ShaderHandle = Handle<dyn Shader>;

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
