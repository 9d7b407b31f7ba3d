//! Headless backend
//!
//! A `RenderBackend` with no GPU behind it. Every resource is real (buffers
//! hold their bytes, framebuffers hold their integer attachments, vertex
//! arrays program attribute slots) and registered in a slot map for as long
//! as a handle to it is alive. Frames, clears and draw calls are recorded so
//! that the dispatch path can be exercised and asserted on without a driver.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};

use crate::error::{Error, Result};
use crate::render::buffer::{
    check_upload_size, BufferLayout, IndexBuffer, IndexBufferHandle, VertexBuffer,
    VertexBufferHandle,
};
use crate::render::context::{print_properties, ContextProperties, RenderBackend};
use crate::render::framebuffer::{
    apply_resize, Framebuffer, FramebufferHandle, FramebufferSpecification,
};
use crate::render::handle::Handle;
use crate::render::shader::{
    Shader, ShaderAttribute, ShaderHandle, ShaderSources, ShaderStage,
};
use crate::render::texture::{check_texture_data, Texture, TextureHandle, TextureSpecification};
use crate::render::vertex_array::{
    attribute_slots, resolve_index_count, AttributeSlot, VertexArray, VertexArrayHandle,
};
use crate::settings::{ApiType, Settings};
use crate::window::Window;
use crate::{gpu_raise, gpu_trace};

new_key_type! {
    /// Key of a live headless object
    pub struct ObjectKey;
}

/// Kind of a registered headless object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    VertexBuffer,
    IndexBuffer,
    Shader,
    Texture,
    Framebuffer,
    /// Colour attachment owned by a framebuffer
    Attachment,
    VertexArray,
}

type Registry = Arc<Mutex<SlotMap<ObjectKey, ObjectKind>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registry entry owned by a resource; unregisters on drop
#[derive(Debug)]
struct Registration {
    key: ObjectKey,
    registry: Registry,
}

impl Registration {
    fn new(registry: &Registry, kind: ObjectKind) -> Self {
        let key = lock(registry).insert(kind);
        Self { key, registry: Arc::clone(registry) }
    }

    fn id(&self) -> u32 {
        // Low half of the ffi form is the slot index
        self.key.data().as_ffi() as u32
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        lock(&self.registry).remove(self.key);
    }
}

// ============================================================================
// Recorded state
// ============================================================================

/// One recorded `draw_indexed`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    pub index_count: u32,
    pub vertex_buffers: usize,
}

/// Everything the headless context was asked to do
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessStats {
    pub frames_begun: u64,
    pub frames_ended: u64,
    pub clears: u64,
    pub clear_colour: Vec4,
    /// (x, y, width, height) of the last `set_viewport`
    pub viewport: Option<(u32, u32, u32, u32)>,
    pub draw_calls: Vec<DrawCall>,
}

// ============================================================================
// Context
// ============================================================================

pub struct HeadlessContext {
    settings: Settings,
    properties: ContextProperties,
    registry: Registry,
    initialised: bool,
    stats: HeadlessStats,
}

impl HeadlessContext {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            properties: ContextProperties::default(),
            registry: Arc::new(Mutex::new(SlotMap::with_key())),
            initialised: false,
            stats: HeadlessStats::default(),
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }

    pub fn stats(&self) -> &HeadlessStats {
        &self.stats
    }

    /// Number of resources with at least one live handle
    pub fn live_objects(&self) -> usize {
        lock(&self.registry).len()
    }

    pub fn live_objects_of(&self, kind: ObjectKind) -> usize {
        lock(&self.registry).values().filter(|registered| **registered == kind).count()
    }

    fn ensure_initialised(&self, operation: &str) -> Result<()> {
        if !self.initialised {
            return Err(gpu_raise!(
                "prism::headless",
                Error::InitializationFailed(format!("{} called before init", operation))
            ));
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessContext {
    fn api(&self) -> ApiType {
        ApiType::Headless
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn properties(&self) -> &ContextProperties {
        &self.properties
    }

    fn init(&mut self, window: &mut dyn Window) -> Result<()> {
        window.init()?;
        self.properties = ContextProperties {
            vendor: "Prism".to_string(),
            renderer: "Headless".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };
        self.initialised = true;
        print_properties(self.api(), &self.properties);
        Ok(())
    }

    fn shutdown(&mut self, window: &mut dyn Window) {
        if !self.initialised {
            return;
        }
        self.initialised = false;
        window.shutdown();
        gpu_trace!("prism::headless", "Context shut down ({} live objects)", self.live_objects());
    }

    fn begin_frame(&mut self, _window: &mut dyn Window) -> Result<()> {
        self.ensure_initialised("begin_frame")?;
        self.stats.frames_begun += 1;
        self.clear();
        Ok(())
    }

    fn end_frame(&mut self, window: &mut dyn Window) -> Result<()> {
        self.ensure_initialised("end_frame")?;
        self.stats.frames_ended += 1;
        window.swap_buffers();
        Ok(())
    }

    fn clear(&mut self) {
        self.stats.clears += 1;
    }

    fn draw_indexed(&mut self, vertex_array: &VertexArrayHandle, index_count: u32) -> Result<()> {
        self.ensure_initialised("draw_indexed")?;
        vertex_array.bind();
        let index_buffer = vertex_array.index_buffer();
        let count = resolve_index_count(index_count, index_buffer.as_ref())
            .map_err(|error| gpu_raise!("prism::headless", error))?;
        self.stats.draw_calls.push(DrawCall {
            index_count: count,
            vertex_buffers: vertex_array.vertex_buffers().len(),
        });
        Ok(())
    }

    fn set_clear_colour(&mut self, colour: Vec4) {
        self.stats.clear_colour = colour;
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.stats.viewport = Some((x, y, width, height));
    }

    fn create_vertex_buffer(&self, vertices: u32, layout: &BufferLayout) -> Result<VertexBufferHandle> {
        let size = vertices
            .checked_mul(layout.stride())
            .ok_or_else(|| gpu_raise!("prism::headless", Error::OutOfMemory))?;
        Ok(Handle::from_arc(Arc::new(HeadlessVertexBuffer {
            registration: Registration::new(&self.registry, ObjectKind::VertexBuffer),
            size,
            data: Mutex::new(vec![0; size as usize]),
            layout: Mutex::new(layout.clone()),
        })))
    }

    fn create_vertex_buffer_with_data(&self, data: &[u8], layout: &BufferLayout) -> Result<VertexBufferHandle> {
        let size = u32::try_from(data.len()).map_err(|_| {
            gpu_raise!("prism::headless", Error::OutOfMemory)
        })?;
        Ok(Handle::from_arc(Arc::new(HeadlessVertexBuffer {
            registration: Registration::new(&self.registry, ObjectKind::VertexBuffer),
            size,
            data: Mutex::new(data.to_vec()),
            layout: Mutex::new(layout.clone()),
        })))
    }

    fn create_index_buffer(&self, indices: &[u32]) -> Result<IndexBufferHandle> {
        Ok(Handle::from_arc(Arc::new(HeadlessIndexBuffer {
            registration: Registration::new(&self.registry, ObjectKind::IndexBuffer),
            indices: indices.to_vec(),
        })))
    }

    fn create_shader(&self, sources: &ShaderSources) -> Result<ShaderHandle> {
        if sources.is_empty() {
            return Err(gpu_raise!(
                "prism::headless",
                Error::ShaderSource("no shader stages to compile".to_string())
            ));
        }
        Ok(Handle::from_arc(Arc::new(HeadlessShader {
            registration: Registration::new(&self.registry, ObjectKind::Shader),
            stages: sources.iter().map(|(stage, _)| stage).collect(),
            layout: BufferLayout::default(),
            attributes: Vec::new(),
            uniforms: Mutex::new(FxHashMap::default()),
            bound: AtomicBool::new(false),
        })))
    }

    fn create_texture(&self, specification: &TextureSpecification) -> Result<TextureHandle> {
        specification.validate().map_err(|error| gpu_raise!("prism::headless", error))?;
        let pixels = specification
            .data
            .clone()
            .unwrap_or_else(|| vec![0; specification.data_size()]);
        let mut specification = specification.clone();
        specification.data = None;
        Ok(Handle::from_arc(Arc::new(HeadlessTexture {
            registration: Registration::new(&self.registry, ObjectKind::Texture),
            specification,
            pixels: Mutex::new(pixels),
            bound_slot: Mutex::new(None),
        })))
    }

    fn create_framebuffer(&self, specification: &FramebufferSpecification) -> Result<FramebufferHandle> {
        specification.validate().map_err(|error| gpu_raise!("prism::headless", error))?;
        let attachments = allocate_attachments(&self.registry, specification);
        Ok(Handle::from_arc(Arc::new(HeadlessFramebuffer {
            registration: Registration::new(&self.registry, ObjectKind::Framebuffer),
            state: Mutex::new(FramebufferState {
                specification: specification.clone(),
                attachments,
            }),
            generation: AtomicU64::new(1),
            bound: AtomicBool::new(false),
        })))
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        Ok(Handle::from_arc(Arc::new(HeadlessVertexArray {
            registration: Registration::new(&self.registry, ObjectKind::VertexArray),
            state: Mutex::new(VertexArrayState::default()),
        })))
    }
}

// ============================================================================
// Buffers
// ============================================================================

#[derive(Debug)]
pub struct HeadlessVertexBuffer {
    registration: Registration,
    size: u32,
    data: Mutex<Vec<u8>>,
    layout: Mutex<BufferLayout>,
}

impl HeadlessVertexBuffer {
    /// Copy of the buffer contents
    pub fn contents(&self) -> Vec<u8> {
        lock(&self.data).clone()
    }

    pub fn id(&self) -> u32 {
        self.registration.id()
    }
}

impl VertexBuffer for HeadlessVertexBuffer {
    fn bind(&self) {}
    fn unbind(&self) {}

    fn set_data(&self, data: &[u8]) -> Result<()> {
        check_upload_size(self.size, data.len())
            .map_err(|error| gpu_raise!("prism::headless", error))?;
        lock(&self.data)[..data.len()].copy_from_slice(data);
        Ok(())
    }

    fn layout(&self) -> BufferLayout {
        lock(&self.layout).clone()
    }

    fn set_layout(&self, layout: BufferLayout) {
        *lock(&self.layout) = layout;
    }

    fn size(&self) -> u32 {
        self.size
    }
}

#[derive(Debug)]
pub struct HeadlessIndexBuffer {
    registration: Registration,
    indices: Vec<u32>,
}

impl HeadlessIndexBuffer {
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn id(&self) -> u32 {
        self.registration.id()
    }
}

impl IndexBuffer for HeadlessIndexBuffer {
    fn bind(&self) {}
    fn unbind(&self) {}

    fn count(&self) -> u32 {
        self.indices.len() as u32
    }
}

// ============================================================================
// Shader
// ============================================================================

/// Value last assigned to a uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    IntArray(Vec<i32>),
    Float(f32),
    Float2(Vec2),
    Float3(Vec3),
    Float4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// Shader that stores uniform assignments
///
/// There is no compiler behind it, so nothing is reflected: the layout and
/// attribute list are empty and a uniform exists once it has been set.
#[derive(Debug)]
pub struct HeadlessShader {
    registration: Registration,
    stages: Vec<ShaderStage>,
    layout: BufferLayout,
    attributes: Vec<ShaderAttribute>,
    uniforms: Mutex<FxHashMap<String, UniformValue>>,
    bound: AtomicBool,
}

impl HeadlessShader {
    pub fn stages(&self) -> &[ShaderStage] {
        &self.stages
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        lock(&self.uniforms).get(name).cloned()
    }

    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Relaxed)
    }

    pub fn id(&self) -> u32 {
        self.registration.id()
    }

    fn store(&self, name: &str, value: UniformValue) {
        lock(&self.uniforms).insert(name.to_string(), value);
    }
}

impl Shader for HeadlessShader {
    fn bind(&self) {
        self.bound.store(true, Ordering::Relaxed);
    }

    fn unbind(&self) {
        self.bound.store(false, Ordering::Relaxed);
    }

    fn uniform_exists(&self, name: &str) -> bool {
        lock(&self.uniforms).contains_key(name)
    }

    fn set_int(&self, name: &str, value: i32) {
        self.store(name, UniformValue::Int(value));
    }

    fn set_int_array(&self, name: &str, values: &[i32]) {
        self.store(name, UniformValue::IntArray(values.to_vec()));
    }

    fn set_float(&self, name: &str, value: f32) {
        self.store(name, UniformValue::Float(value));
    }

    fn set_float2(&self, name: &str, value: Vec2) {
        self.store(name, UniformValue::Float2(value));
    }

    fn set_float3(&self, name: &str, value: Vec3) {
        self.store(name, UniformValue::Float3(value));
    }

    fn set_float4(&self, name: &str, value: Vec4) {
        self.store(name, UniformValue::Float4(value));
    }

    fn set_mat3(&self, name: &str, value: &Mat3) {
        self.store(name, UniformValue::Mat3(*value));
    }

    fn set_mat4(&self, name: &str, value: &Mat4) {
        self.store(name, UniformValue::Mat4(*value));
    }

    fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn attributes(&self) -> &[ShaderAttribute] {
        &self.attributes
    }
}

// ============================================================================
// Texture
// ============================================================================

#[derive(Debug)]
pub struct HeadlessTexture {
    registration: Registration,
    specification: TextureSpecification,
    pixels: Mutex<Vec<u8>>,
    bound_slot: Mutex<Option<u32>>,
}

impl HeadlessTexture {
    pub fn pixels(&self) -> Vec<u8> {
        lock(&self.pixels).clone()
    }

    pub fn bound_slot(&self) -> Option<u32> {
        *lock(&self.bound_slot)
    }
}

impl Texture for HeadlessTexture {
    fn width(&self) -> u32 {
        self.specification.width
    }

    fn height(&self) -> u32 {
        self.specification.height
    }

    fn renderer_id(&self) -> u32 {
        self.registration.id()
    }

    fn specification(&self) -> &TextureSpecification {
        &self.specification
    }

    fn set_data(&self, data: &[u8]) -> Result<()> {
        check_texture_data(&self.specification, data.len())
            .map_err(|error| gpu_raise!("prism::headless", error))?;
        lock(&self.pixels).copy_from_slice(data);
        Ok(())
    }

    fn bind(&self, slot: u32) {
        *lock(&self.bound_slot) = Some(slot);
    }
}

// ============================================================================
// Framebuffer
// ============================================================================

#[derive(Debug)]
struct FramebufferState {
    specification: FramebufferSpecification,
    attachments: Vec<Attachment>,
}

/// Registered colour attachment and its texel grid, row-major
#[derive(Debug)]
struct Attachment {
    registration: Registration,
    texels: Vec<i32>,
}

fn allocate_attachments(registry: &Registry, specification: &FramebufferSpecification) -> Vec<Attachment> {
    let texels = specification.width as usize * specification.height as usize;
    specification
        .attachments
        .iter()
        .map(|_| Attachment {
            registration: Registration::new(registry, ObjectKind::Attachment),
            texels: vec![0; texels],
        })
        .collect()
}

#[derive(Debug)]
pub struct HeadlessFramebuffer {
    registration: Registration,
    state: Mutex<FramebufferState>,
    generation: AtomicU64,
    bound: AtomicBool,
}

impl HeadlessFramebuffer {
    pub fn is_bound(&self) -> bool {
        self.bound.load(Ordering::Relaxed)
    }

    fn integer_attachment(state: &FramebufferState, attachment: u32) -> Result<()> {
        let format = state.specification.attachment(attachment)?;
        if !format.is_integer() {
            return Err(Error::InvalidResource(format!(
                "attachment {} is {:?}, not an integer attachment",
                attachment, format
            )));
        }
        Ok(())
    }
}

impl Framebuffer for HeadlessFramebuffer {
    fn bind(&self) {
        self.bound.store(true, Ordering::Relaxed);
    }

    fn unbind(&self) {
        self.bound.store(false, Ordering::Relaxed);
    }

    fn resize(&self, width: u32, height: u32) {
        let mut state = lock(&self.state);
        if apply_resize(&mut state.specification, width, height) {
            state.attachments = allocate_attachments(&self.registration.registry, &state.specification);
            self.generation.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn read_pixel(&self, attachment: u32, x: i32, y: i32) -> Result<i32> {
        let state = lock(&self.state);
        Self::integer_attachment(&state, attachment)
            .map_err(|error| gpu_raise!("prism::headless", error))?;
        let (width, height) = (state.specification.width as i32, state.specification.height as i32);
        if x < 0 || y < 0 || x >= width || y >= height {
            return Err(gpu_raise!(
                "prism::headless",
                Error::InvalidResource(format!("pixel ({}, {}) outside {}x{}", x, y, width, height))
            ));
        }
        Ok(state.attachments[attachment as usize].texels[(y * width + x) as usize])
    }

    fn clear_attachment(&self, attachment: u32, value: i32) -> Result<()> {
        let mut state = lock(&self.state);
        Self::integer_attachment(&state, attachment)
            .map_err(|error| gpu_raise!("prism::headless", error))?;
        state.attachments[attachment as usize].texels.fill(value);
        Ok(())
    }

    fn color_attachment_id(&self, index: u32) -> Option<u32> {
        lock(&self.state)
            .attachments
            .get(index as usize)
            .map(|attachment| attachment.registration.id())
    }

    fn specification(&self) -> FramebufferSpecification {
        lock(&self.state).specification.clone()
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }
}

// ============================================================================
// Vertex array
// ============================================================================

#[derive(Debug, Default)]
struct VertexArrayState {
    vertex_buffers: Vec<VertexBufferHandle>,
    index_buffer: Option<IndexBufferHandle>,
    slots: Vec<AttributeSlot>,
    next_attribute: u32,
}

#[derive(Debug)]
pub struct HeadlessVertexArray {
    registration: Registration,
    state: Mutex<VertexArrayState>,
}

impl HeadlessVertexArray {
    /// Attribute slots programmed so far, across all vertex buffers
    pub fn attribute_slots(&self) -> Vec<AttributeSlot> {
        lock(&self.state).slots.clone()
    }

    pub fn id(&self) -> u32 {
        self.registration.id()
    }
}

impl VertexArray for HeadlessVertexArray {
    fn bind(&self) {}
    fn unbind(&self) {}

    fn add_vertex_buffer(&self, buffer: VertexBufferHandle) -> Result<()> {
        let layout = buffer.layout();
        if layout.is_empty() {
            return Err(gpu_raise!(
                "prism::headless",
                Error::InvalidResource("vertex buffer has no layout".to_string())
            ));
        }
        let mut state = lock(&self.state);
        let slots = attribute_slots(&layout, state.next_attribute);
        state.next_attribute += slots.len() as u32;
        state.slots.extend(slots);
        state.vertex_buffers.push(buffer);
        Ok(())
    }

    fn set_index_buffer(&self, buffer: IndexBufferHandle) {
        lock(&self.state).index_buffer = Some(buffer);
    }

    fn vertex_buffers(&self) -> Vec<VertexBufferHandle> {
        lock(&self.state).vertex_buffers.clone()
    }

    fn index_buffer(&self) -> Option<IndexBufferHandle> {
        lock(&self.state).index_buffer.clone()
    }
}

#[cfg(test)]
#[path = "headless_tests.rs"]
mod tests;
