/// VulkanContext - Vulkan implementation of RenderBackend
///
/// Covers context bring-up, the swapchain and the frame loop: clear to the
/// clear colour and present. Resource factories are not implemented for this
/// backend and return `Error::Unsupported`.

use std::ffi::CString;

use ash::vk;
use glam::Vec4;
use prism_gpu::prism::render::{
    init_window_with, print_properties, BufferLayout, ContextProperties, FramebufferHandle,
    FramebufferSpecification, IndexBufferHandle, RenderBackend, ShaderHandle, ShaderSources,
    TextureHandle, TextureSpecification, VertexArrayHandle, VertexBufferHandle,
};
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::Window;
use prism_gpu::prism::{Error, Result};
use prism_gpu::{gpu_err, gpu_info, gpu_raise, gpu_trace, gpu_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::vulkan_device::Device;
use crate::vulkan_frame::FrameSync;
use crate::vulkan_render_pass::{
    begin_render_pass, create_framebuffers, create_render_pass, destroy_framebuffers,
};
use crate::vulkan_selection::{
    device_type_name, flipped_viewport, format_api_version, next_frame, DeviceRequirements,
};
use crate::vulkan_swapchain::Swapchain;

const SOURCE: &str = "prism::vulkan";

const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

fn init_error(message: String) -> Error {
    gpu_raise!(SOURCE, Error::InitializationFailed(message))
}

fn unsupported(operation: &'static str) -> Error {
    gpu_raise!(SOURCE, Error::Unsupported { api: ApiType::Vulkan, operation })
}

// ============================================================================
// Instance and surface
// ============================================================================

/// Entry, instance, debug messenger and window surface
struct InstanceState {
    /// Keeps the Vulkan loader alive
    entry: ash::Entry,
    instance: ash::Instance,
    debug_utils: Option<ash::ext::debug_utils::Instance>,
    debug_messenger: vk::DebugUtilsMessengerEXT,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
}

impl InstanceState {
    fn create(window: &dyn Window, enable_validation: bool) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load()
                .map_err(|e| init_error(format!("Failed to load Vulkan library: {:?}", e)))?;

            let validation = validation_enabled(&entry, enable_validation)?;

            let app_name = CString::new(window.title()).unwrap_or_default();
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Prism")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_2);

            let display_handle = window
                .display_handle()
                .map_err(|e| init_error(format!("Failed to get display handle: {}", e)))?;
            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| init_error(format!("Failed to get required extensions: {:?}", e)))?
                    .to_vec();

            let mut layer_names = Vec::new();
            if validation {
                extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
                layer_names.push(VALIDATION_LAYER.as_ptr());
            }

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry
                .create_instance(&create_info, None)
                .map_err(|e| init_error(format!("Failed to create Vulkan instance: {:?}", e)))?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
            let mut state = Self {
                entry,
                instance,
                debug_utils: None,
                debug_messenger: vk::DebugUtilsMessengerEXT::null(),
                surface_loader,
                surface: vk::SurfaceKHR::null(),
            };

            if validation {
                if let Err(error) = state.create_debug_messenger() {
                    state.destroy();
                    return Err(error);
                }
            }

            let window_handle = match window.window_handle() {
                Ok(handle) => handle,
                Err(e) => {
                    state.destroy();
                    return Err(init_error(format!("Failed to get window handle: {}", e)));
                }
            };

            match ash_window::create_surface(
                &state.entry,
                &state.instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            ) {
                Ok(surface) => state.surface = surface,
                Err(e) => {
                    state.destroy();
                    return Err(init_error(format!("Failed to create Vulkan surface: {:?}", e)));
                }
            }

            Ok(state)
        }
    }

    #[cfg(feature = "vulkan-validation")]
    fn create_debug_messenger(&mut self) -> Result<()> {
        crate::debug::reset_validation_stats();
        let debug_utils = ash::ext::debug_utils::Instance::new(&self.entry, &self.instance);
        let messenger = unsafe {
            debug_utils
                .create_debug_utils_messenger(&crate::debug::messenger_create_info(), None)
                .map_err(|e| init_error(format!("Failed to create debug messenger: {:?}", e)))?
        };
        self.debug_utils = Some(debug_utils);
        self.debug_messenger = messenger;
        Ok(())
    }

    #[cfg(not(feature = "vulkan-validation"))]
    fn create_debug_messenger(&mut self) -> Result<()> {
        Ok(())
    }

    /// Surface, then debug messenger, then instance
    fn destroy(&mut self) {
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
            self.surface = vk::SurfaceKHR::null();
            if let Some(debug_utils) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(self.debug_messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

/// Whether validation will actually be enabled
///
/// A requested but missing validation layer is an initialisation error.
fn validation_enabled(entry: &ash::Entry, requested: bool) -> Result<bool> {
    if !requested {
        return Ok(false);
    }
    if !cfg!(feature = "vulkan-validation") {
        gpu_warn!(
            SOURCE,
            "Validation requested but the vulkan-validation feature is disabled, ignoring"
        );
        return Ok(false);
    }

    let layers = unsafe { entry.enumerate_instance_layer_properties() }
        .map_err(|e| init_error(format!("Failed to enumerate instance layers: {:?}", e)))?;
    let found = layers
        .iter()
        .any(|layer| layer.layer_name_as_c_str().map(|name| name == VALIDATION_LAYER).unwrap_or(false));
    if !found {
        return Err(init_error(format!(
            "Required validation layer is missing: {}",
            VALIDATION_LAYER.to_string_lossy()
        )));
    }
    Ok(true)
}

// ============================================================================
// Presentation
// ============================================================================

/// Swapchain, render pass, per-image framebuffers and per-frame sync
struct Presentation {
    swapchain: Swapchain,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    frames: FrameSync,
}

impl Presentation {
    fn create(
        instance: &InstanceState,
        device: &Device,
        window: &dyn Window,
        frames_in_flight: usize,
    ) -> Result<Self> {
        let mut swapchain = Swapchain::create(
            &instance.instance,
            device,
            &instance.surface_loader,
            instance.surface,
            window.framebuffer_size(),
        )?;
        warn_on_image_count(swapchain.image_count(), frames_in_flight);

        let render_pass = match create_render_pass(&device.logical, swapchain.format.format) {
            Ok(render_pass) => render_pass,
            Err(error) => {
                swapchain.destroy(device);
                return Err(error);
            }
        };

        let mut presentation = Self {
            swapchain,
            render_pass,
            framebuffers: Vec::new(),
            frames: FrameSync::default(),
        };

        let framebuffers = create_framebuffers(
            &device.logical,
            render_pass,
            &presentation.swapchain.image_views,
            presentation.swapchain.extent,
        );
        match framebuffers {
            Ok(framebuffers) => presentation.framebuffers = framebuffers,
            Err(error) => {
                presentation.destroy(device);
                return Err(error);
            }
        }

        let frames = FrameSync::create(
            &device.logical,
            device.graphics_pool,
            frames_in_flight,
            presentation.swapchain.image_count(),
        );
        match frames {
            Ok(frames) => presentation.frames = frames,
            Err(error) => {
                presentation.destroy(device);
                return Err(error);
            }
        }

        Ok(presentation)
    }

    /// Recreate the swapchain and its framebuffers; the render pass is kept
    fn rebuild(&mut self, instance: &InstanceState, device: &Device, window: &dyn Window) -> Result<()> {
        unsafe {
            device
                .logical
                .device_wait_idle()
                .map_err(|e| gpu_err!(SOURCE, "Failed to wait idle: {:?}", e))?;
        }

        destroy_framebuffers(&device.logical, &mut self.framebuffers);
        self.swapchain.destroy(device);

        self.swapchain = Swapchain::create(
            &instance.instance,
            device,
            &instance.surface_loader,
            instance.surface,
            window.framebuffer_size(),
        )?;
        warn_on_image_count(self.swapchain.image_count(), self.frames.frames_in_flight());

        self.framebuffers = create_framebuffers(
            &device.logical,
            self.render_pass,
            &self.swapchain.image_views,
            self.swapchain.extent,
        )?;
        self.frames.reset_images(self.swapchain.image_count());

        gpu_trace!(
            SOURCE,
            "Swapchain rebuilt at {}x{}",
            self.swapchain.extent.width,
            self.swapchain.extent.height
        );
        Ok(())
    }

    /// Sync objects and command buffers, framebuffers, render pass, swapchain
    fn destroy(&mut self, device: &Device) {
        self.frames.destroy(&device.logical, device.graphics_pool);
        destroy_framebuffers(&device.logical, &mut self.framebuffers);
        unsafe { device.logical.destroy_render_pass(self.render_pass, None) };
        self.render_pass = vk::RenderPass::null();
        self.swapchain.destroy(device);
    }
}

fn warn_on_image_count(image_count: usize, frames_in_flight: usize) {
    if image_count != frames_in_flight {
        gpu_warn!(
            SOURCE,
            "Swapchain has {} images for {} frames in flight",
            image_count,
            frames_in_flight
        );
    }
}

// ============================================================================
// VulkanContext
// ============================================================================

/// Everything `init` creates, torn down in reverse by `shutdown`
struct VulkanState {
    instance: InstanceState,
    device: Device,
    presentation: Presentation,
    current_frame: usize,
    /// Image being recorded between begin_frame and end_frame
    image_index: Option<u32>,
    needs_rebuild: bool,
}

/// Vulkan implementation of RenderBackend
pub struct VulkanContext {
    settings: Settings,
    requirements: DeviceRequirements,
    properties: ContextProperties,
    clear_colour: Vec4,
    state: Option<VulkanState>,
}

impl VulkanContext {
    pub fn new(settings: Settings) -> Self {
        Self::with_requirements(settings, DeviceRequirements::default())
    }

    /// Context that accepts devices matching `requirements`
    pub fn with_requirements(settings: Settings, requirements: DeviceRequirements) -> Self {
        Self {
            settings,
            requirements,
            properties: ContextProperties::default(),
            clear_colour: Vec4::new(0.0, 0.0, 0.0, 1.0),
            state: None,
        }
    }

    pub fn is_initialised(&self) -> bool {
        self.state.is_some()
    }

    /// Frame slot the next `begin_frame` will use
    pub fn current_frame(&self) -> usize {
        self.state.as_ref().map(|state| state.current_frame).unwrap_or(0)
    }

    pub fn clear_colour(&self) -> Vec4 {
        self.clear_colour
    }

    fn state_mut(&mut self) -> Result<&mut VulkanState> {
        self.state.as_mut().ok_or_else(|| {
            init_error("Vulkan context used before init".to_string())
        })
    }
}

impl RenderBackend for VulkanContext {
    fn api(&self) -> ApiType {
        ApiType::Vulkan
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn properties(&self) -> &ContextProperties {
        &self.properties
    }

    fn init(&mut self, window: &mut dyn Window) -> Result<()> {
        if self.state.is_some() {
            return Ok(());
        }
        if !window.is_ready(ApiType::Vulkan) {
            return Err(init_error(format!(
                "window '{}' was not created for Vulkan",
                window.title()
            )));
        }
        let enable_validation = self.settings.enable_validation;
        let frames_in_flight = self.settings.frames_in_flight.max(1) as usize;
        let requirements = &self.requirements;

        let (instance, device, presentation) = init_window_with(window, |window| {
            let mut instance = InstanceState::create(window, enable_validation)?;

            let device = match Device::create(
                &instance.instance,
                &instance.surface_loader,
                instance.surface,
                requirements,
            ) {
                Ok(device) => device,
                Err(error) => {
                    instance.destroy();
                    return Err(error);
                }
            };

            match Presentation::create(&instance, &device, window, frames_in_flight) {
                Ok(presentation) => Ok((instance, device, presentation)),
                Err(error) => {
                    device.destroy();
                    instance.destroy();
                    Err(error)
                }
            }
        })?;

        self.properties = ContextProperties {
            vendor: format!("0x{:04X}", device.properties.vendor_id),
            renderer: format!("{} ({})", device.name(), device_type_name(device.properties.device_type)),
            version: format_api_version(device.properties.api_version),
        };

        self.state = Some(VulkanState {
            instance,
            device,
            presentation,
            current_frame: 0,
            image_index: None,
            needs_rebuild: false,
        });

        print_properties(self.api(), &self.properties);
        Ok(())
    }

    fn shutdown(&mut self, window: &mut dyn Window) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        unsafe {
            if let Err(e) = state.device.logical.device_wait_idle() {
                gpu_warn!(SOURCE, "Device wait idle failed during shutdown: {:?}", e);
            }
        }
        state.presentation.destroy(&state.device);
        state.device.destroy();
        state.instance.destroy();

        #[cfg(feature = "vulkan-validation")]
        {
            if self.settings.enable_validation {
                crate::debug::print_validation_stats_report();
                crate::debug::release_message_tracker();
            }
        }

        window.shutdown();
        gpu_info!(SOURCE, "Vulkan context shut down");
    }

    fn begin_frame(&mut self, window: &mut dyn Window) -> Result<()> {
        let clear_colour = self.clear_colour;
        let state = self.state_mut()?;
        if state.image_index.is_some() {
            return Err(gpu_err!(SOURCE, "begin_frame called twice without end_frame"));
        }

        if state.needs_rebuild {
            let size = window.framebuffer_size();
            if size.x == 0 || size.y == 0 {
                // Minimised: nothing to present until the surface has an area again
                return Ok(());
            }
            state.presentation.rebuild(&state.instance, &state.device, window)?;
            state.needs_rebuild = false;
        }

        let device = &state.device.logical;
        let presentation = &mut state.presentation;
        let frame = state.current_frame;
        let fence = presentation.frames.in_flight[frame];

        unsafe {
            device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| gpu_err!(SOURCE, "Failed to wait for in-flight fence: {:?}", e))?;

            let image_index = match presentation
                .swapchain
                .acquire(presentation.frames.image_available[frame])
            {
                Ok((image_index, suboptimal)) => {
                    state.needs_rebuild |= suboptimal;
                    image_index
                }
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => {
                    state.needs_rebuild = true;
                    return Ok(());
                }
                Err(e) => {
                    return Err(gpu_err!(SOURCE, "Failed to acquire swapchain image: {:?}", e));
                }
            };

            let image_fence = presentation.frames.images_in_flight[image_index as usize];
            if image_fence != vk::Fence::null() && image_fence != fence {
                device
                    .wait_for_fences(&[image_fence], true, u64::MAX)
                    .map_err(|e| gpu_err!(SOURCE, "Failed to wait for image fence: {:?}", e))?;
            }
            presentation.frames.images_in_flight[image_index as usize] = fence;

            let command_buffer = presentation.frames.command_buffers[frame];
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| gpu_err!(SOURCE, "Failed to reset command buffer: {:?}", e))?;
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| gpu_err!(SOURCE, "Failed to begin command buffer: {:?}", e))?;

            let extent = presentation.swapchain.extent;
            let scissor = vk::Rect2D { offset: vk::Offset2D { x: 0, y: 0 }, extent };
            device.cmd_set_viewport(command_buffer, 0, &[flipped_viewport(extent)]);
            device.cmd_set_scissor(command_buffer, 0, &[scissor]);

            begin_render_pass(
                device,
                command_buffer,
                presentation.render_pass,
                presentation.framebuffers[image_index as usize],
                extent,
                clear_colour,
            );

            state.image_index = Some(image_index);
        }
        Ok(())
    }

    fn end_frame(&mut self, _window: &mut dyn Window) -> Result<()> {
        let state = self.state_mut()?;
        let Some(image_index) = state.image_index.take() else {
            // The frame was skipped at acquire
            return Ok(());
        };

        let device = &state.device.logical;
        let presentation = &state.presentation;
        let frame = state.current_frame;
        let command_buffer = presentation.frames.command_buffers[frame];

        unsafe {
            device.cmd_end_render_pass(command_buffer);
            device
                .end_command_buffer(command_buffer)
                .map_err(|e| gpu_err!(SOURCE, "Failed to end command buffer: {:?}", e))?;

            let wait_semaphores = [presentation.frames.image_available[frame]];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let command_buffers = [command_buffer];
            let signal_semaphores = [presentation.frames.queue_complete[frame]];
            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            // Reset only once the submit that signals it again is next
            let fence = presentation.frames.in_flight[frame];
            device
                .reset_fences(&[fence])
                .map_err(|e| gpu_err!(SOURCE, "Failed to reset in-flight fence: {:?}", e))?;
            device
                .queue_submit(
                    state.device.graphics_queue,
                    &[submit_info],
                    fence,
                )
                .map_err(|e| gpu_err!(SOURCE, "Failed to submit commands to GPU queue: {:?}", e))?;
        }

        match presentation.swapchain.present(
            state.device.present_queue,
            presentation.frames.queue_complete[frame],
            image_index,
        ) {
            Ok(suboptimal) => state.needs_rebuild |= suboptimal,
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => state.needs_rebuild = true,
            Err(e) => return Err(gpu_err!(SOURCE, "Failed to present swapchain image: {:?}", e)),
        }

        state.current_frame = next_frame(frame, presentation.frames.frames_in_flight());
        Ok(())
    }

    fn clear(&mut self) {
        // The render pass clears on load
    }

    fn draw_indexed(&mut self, _vertex_array: &VertexArrayHandle, _index_count: u32) -> Result<()> {
        Err(unsupported("draw_indexed"))
    }

    fn set_clear_colour(&mut self, colour: Vec4) {
        self.clear_colour = colour;
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        gpu_warn!(
            SOURCE,
            "set_viewport({}, {}, {}, {}) ignored, the viewport follows the swapchain",
            x,
            y,
            width,
            height
        );
    }

    // ===== RESOURCE FACTORIES =====

    fn create_vertex_buffer(&self, _vertices: u32, _layout: &BufferLayout) -> Result<VertexBufferHandle> {
        Err(unsupported("create_vertex_buffer"))
    }

    fn create_vertex_buffer_with_data(&self, _data: &[u8], _layout: &BufferLayout) -> Result<VertexBufferHandle> {
        Err(unsupported("create_vertex_buffer_with_data"))
    }

    fn create_index_buffer(&self, _indices: &[u32]) -> Result<IndexBufferHandle> {
        Err(unsupported("create_index_buffer"))
    }

    fn create_shader(&self, _sources: &ShaderSources) -> Result<ShaderHandle> {
        Err(unsupported("create_shader"))
    }

    fn create_texture(&self, _specification: &TextureSpecification) -> Result<TextureHandle> {
        Err(unsupported("create_texture"))
    }

    fn create_framebuffer(&self, _specification: &FramebufferSpecification) -> Result<FramebufferHandle> {
        Err(unsupported("create_framebuffer"))
    }

    fn create_vertex_array(&self) -> Result<VertexArrayHandle> {
        Err(unsupported("create_vertex_array"))
    }
}

impl Drop for VulkanContext {
    fn drop(&mut self) {
        if let Some(mut state) = self.state.take() {
            unsafe {
                state.device.logical.device_wait_idle().ok();
            }
            state.presentation.destroy(&state.device);
            state.device.destroy();
            state.instance.destroy();
        }
    }
}

#[cfg(test)]
#[path = "vulkan_tests.rs"]
mod tests;
