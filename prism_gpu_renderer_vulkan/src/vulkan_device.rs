/// Physical device selection and logical device creation

use std::ffi::CStr;

use ash::vk;
use prism_gpu::prism::{Error, Result};
use prism_gpu::{gpu_raise, gpu_trace};

use crate::vulkan_selection::{
    device_type_name, format_api_version, pick_device, DeviceCandidate, DeviceRequirements,
    QueueFamilyCandidate, QueueIndices,
};

const SOURCE: &str = "prism::vulkan";

fn init_error(message: String) -> Error {
    gpu_raise!(SOURCE, Error::InitializationFailed(message))
}

/// Surface capabilities, formats and present modes of one device
#[derive(Debug, Clone, Default)]
pub(crate) struct SwapchainSupport {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

pub(crate) fn query_swapchain_support(
    surface_loader: &ash::khr::surface::Instance,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> Result<SwapchainSupport> {
    unsafe {
        let capabilities = surface_loader
            .get_physical_device_surface_capabilities(physical_device, surface)
            .map_err(|e| init_error(format!("Failed to get surface capabilities: {:?}", e)))?;
        let formats = surface_loader
            .get_physical_device_surface_formats(physical_device, surface)
            .map_err(|e| init_error(format!("Failed to get surface formats: {:?}", e)))?;
        let present_modes = surface_loader
            .get_physical_device_surface_present_modes(physical_device, surface)
            .map_err(|e| init_error(format!("Failed to get present modes: {:?}", e)))?;
        Ok(SwapchainSupport { capabilities, formats, present_modes })
    }
}

/// Chosen physical device, its logical device and queues
pub(crate) struct Device {
    pub physical: vk::PhysicalDevice,
    pub logical: ash::Device,
    pub queues: QueueIndices,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    #[allow(dead_code)]
    pub transfer_queue: vk::Queue,
    /// Command pool on the graphics family, buffers resettable one by one
    pub graphics_pool: vk::CommandPool,
    pub properties: vk::PhysicalDeviceProperties,
}

impl Device {
    /// Pick the first device meeting `requirements` and create its logical device
    pub fn create(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        requirements: &DeviceRequirements,
    ) -> Result<Self> {
        unsafe {
            let physical_devices = instance
                .enumerate_physical_devices()
                .map_err(|e| init_error(format!("Failed to enumerate physical devices: {:?}", e)))?;
            if physical_devices.is_empty() {
                return Err(init_error("No devices which support Vulkan were found.".to_string()));
            }

            let mut candidates = Vec::with_capacity(physical_devices.len());
            for &physical_device in &physical_devices {
                candidates.push(describe_device(instance, surface_loader, surface, physical_device)?);
            }

            let (chosen, queues) = pick_device(&candidates, requirements).ok_or_else(|| {
                init_error("No devices which matched requirements were found.".to_string())
            })?;
            let physical = physical_devices[chosen];
            let properties = instance.get_physical_device_properties(physical);

            gpu_trace!(
                SOURCE,
                "Using device: \"{}\" ({})",
                candidates[chosen].name,
                device_type_name(properties.device_type)
            );
            gpu_trace!(SOURCE, "Vulkan API version: {}", format_api_version(properties.api_version));

            let queue_priorities = [1.0];
            let queue_create_infos: Vec<vk::DeviceQueueCreateInfo> = queues
                .unique_families()
                .into_iter()
                .map(|family| {
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(family)
                        .queue_priorities(&queue_priorities)
                })
                .collect();

            let extension_names: Vec<*const std::os::raw::c_char> =
                requirements.extensions.iter().map(|name| name.as_ptr()).collect();
            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&extension_names)
                .enabled_features(&device_features);

            let logical = instance
                .create_device(physical, &device_create_info, None)
                .map_err(|e| init_error(format!("Failed to create logical device: {:?}", e)))?;

            let graphics_family = queues.graphics.unwrap_or(0);
            let present_family = queues.present.unwrap_or(graphics_family);
            let transfer_family = queues.transfer.unwrap_or(graphics_family);
            let graphics_queue = logical.get_device_queue(graphics_family, 0);
            let present_queue = logical.get_device_queue(present_family, 0);
            let transfer_queue = logical.get_device_queue(transfer_family, 0);

            let pool_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let graphics_pool = match logical.create_command_pool(&pool_info, None) {
                Ok(pool) => pool,
                Err(e) => {
                    logical.destroy_device(None);
                    return Err(init_error(format!("Failed to create command pool: {:?}", e)));
                }
            };

            Ok(Self {
                physical,
                logical,
                queues,
                graphics_queue,
                present_queue,
                transfer_queue,
                graphics_pool,
                properties,
            })
        }
    }

    pub fn name(&self) -> String {
        self.properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn destroy(&self) {
        unsafe {
            self.logical.destroy_command_pool(self.graphics_pool, None);
            self.logical.destroy_device(None);
        }
    }
}

/// Gather what the selection rules need from one physical device
unsafe fn describe_device(
    instance: &ash::Instance,
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
) -> Result<DeviceCandidate> {
    let properties = instance.get_physical_device_properties(physical_device);
    let name = properties
        .device_name_as_c_str()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let queue_families = instance
        .get_physical_device_queue_family_properties(physical_device)
        .iter()
        .enumerate()
        .map(|(index, family)| {
            let present = surface_loader
                .get_physical_device_surface_support(physical_device, index as u32, surface)
                .unwrap_or(false);
            QueueFamilyCandidate::new(family.queue_flags, present)
        })
        .collect();

    let extensions = instance
        .enumerate_device_extension_properties(physical_device)
        .map_err(|e| init_error(format!("Failed to enumerate device extensions: {:?}", e)))?
        .iter()
        .filter_map(|extension| extension.extension_name_as_c_str().ok().map(CStr::to_owned))
        .collect();

    let support = query_swapchain_support(surface_loader, physical_device, surface)?;

    Ok(DeviceCandidate {
        name,
        device_type: properties.device_type,
        queue_families,
        extensions,
        surface_formats: support.formats,
        present_modes: support.present_modes,
    })
}
