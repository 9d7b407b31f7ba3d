/// Swapchain - presentable images of the window surface

use ash::vk;
use glam::UVec2;
use prism_gpu::prism::{Error, Result};
use prism_gpu::gpu_raise;

use crate::vulkan_device::{query_swapchain_support, Device};
use crate::vulkan_selection::{
    choose_extent, choose_image_count, choose_surface_format, image_sharing, PRESENT_MODE,
};

const SOURCE: &str = "prism::vulkan";

/// Vulkan swapchain with one view per image
pub(crate) struct Swapchain {
    loader: ash::khr::swapchain::Device,
    handle: vk::SwapchainKHR,
    pub format: vk::SurfaceFormatKHR,
    pub extent: vk::Extent2D,
    pub images: Vec<vk::Image>,
    pub image_views: Vec<vk::ImageView>,
}

impl Swapchain {
    pub fn create(
        instance: &ash::Instance,
        device: &Device,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        framebuffer_size: UVec2,
    ) -> Result<Self> {
        let support = query_swapchain_support(surface_loader, device.physical, surface)?;
        let format = choose_surface_format(&support.formats).ok_or_else(|| {
            gpu_raise!(SOURCE, Error::InitializationFailed("Surface reports no formats".to_string()))
        })?;
        let extent = choose_extent(framebuffer_size, &support.capabilities);
        let (sharing_mode, queue_families) = image_sharing(&device.queues);

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(choose_image_count(&support.capabilities))
            .image_format(format.format)
            .image_color_space(format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode)
            .queue_family_indices(&queue_families)
            .pre_transform(support.capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(PRESENT_MODE)
            .clipped(true);

        let loader = ash::khr::swapchain::Device::new(instance, &device.logical);

        unsafe {
            let handle = loader.create_swapchain(&create_info, None).map_err(|e| {
                gpu_raise!(
                    SOURCE,
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                )
            })?;

            let mut swapchain = Self {
                loader,
                handle,
                format,
                extent,
                images: Vec::new(),
                image_views: Vec::new(),
            };

            swapchain.images = match swapchain.loader.get_swapchain_images(handle) {
                Ok(images) => images,
                Err(e) => {
                    swapchain.destroy(device);
                    return Err(gpu_raise!(
                        SOURCE,
                        Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                    ));
                }
            };

            for index in 0..swapchain.images.len() {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(swapchain.images[index])
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                match device.logical.create_image_view(&view_info, None) {
                    Ok(view) => swapchain.image_views.push(view),
                    Err(e) => {
                        swapchain.destroy(device);
                        return Err(gpu_raise!(
                            SOURCE,
                            Error::InitializationFailed(format!("Failed to create image views: {:?}", e))
                        ));
                    }
                }
            }

            Ok(swapchain)
        }
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Next presentable image; `Ok((index, suboptimal))`
    pub fn acquire(&self, signal: vk::Semaphore) -> ash::prelude::VkResult<(u32, bool)> {
        unsafe { self.loader.acquire_next_image(self.handle, u64::MAX, signal, vk::Fence::null()) }
    }

    /// Queue `image_index` for presentation; `Ok(true)` when suboptimal
    pub fn present(
        &self,
        queue: vk::Queue,
        wait: vk::Semaphore,
        image_index: u32,
    ) -> ash::prelude::VkResult<bool> {
        let wait_semaphores = [wait];
        let swapchains = [self.handle];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);
        unsafe { self.loader.queue_present(queue, &present_info) }
    }

    pub fn destroy(&mut self, device: &Device) {
        unsafe {
            for view in self.image_views.drain(..) {
                device.logical.destroy_image_view(view, None);
            }
            self.images.clear();
            self.loader.destroy_swapchain(self.handle, None);
            self.handle = vk::SwapchainKHR::null();
        }
    }
}
