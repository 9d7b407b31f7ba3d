/// Per-frame-in-flight command buffers and synchronization
///
/// Slot `i` owns one command buffer, an "image available" semaphore signalled
/// by acquire, a "queue complete" semaphore waited on by present and a fence
/// signalled when the GPU finishes the slot's submission. `images_in_flight`
/// remembers which fence last rendered to each swapchain image.

use ash::vk;
use prism_gpu::prism::{Error, Result};
use prism_gpu::gpu_raise;

const SOURCE: &str = "prism::vulkan";

#[derive(Default)]
pub(crate) struct FrameSync {
    pub command_buffers: Vec<vk::CommandBuffer>,
    pub image_available: Vec<vk::Semaphore>,
    pub queue_complete: Vec<vk::Semaphore>,
    pub in_flight: Vec<vk::Fence>,
    pub images_in_flight: Vec<vk::Fence>,
}

impl FrameSync {
    pub fn create(
        device: &ash::Device,
        pool: vk::CommandPool,
        frames_in_flight: usize,
        image_count: usize,
    ) -> Result<Self> {
        let mut frames = Self::default();
        if let Err(e) = frames.allocate(device, pool, frames_in_flight) {
            frames.destroy(device, pool);
            return Err(gpu_raise!(
                SOURCE,
                Error::InitializationFailed(format!("Failed to create frame sync objects: {:?}", e))
            ));
        }
        frames.reset_images(image_count);
        Ok(frames)
    }

    fn allocate(
        &mut self,
        device: &ash::Device,
        pool: vk::CommandPool,
        frames_in_flight: usize,
    ) -> std::result::Result<(), vk::Result> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(frames_in_flight as u32);

        let semaphore_info = vk::SemaphoreCreateInfo::default();
        let fence_info = vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        unsafe {
            self.command_buffers = device.allocate_command_buffers(&allocate_info)?;
            for _ in 0..frames_in_flight {
                self.image_available.push(device.create_semaphore(&semaphore_info, None)?);
                self.queue_complete.push(device.create_semaphore(&semaphore_info, None)?);
                self.in_flight.push(device.create_fence(&fence_info, None)?);
            }
        }
        Ok(())
    }

    pub fn frames_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Forget image ownership, e.g. after the swapchain was rebuilt
    pub fn reset_images(&mut self, image_count: usize) {
        self.images_in_flight = vec![vk::Fence::null(); image_count];
    }

    pub fn destroy(&mut self, device: &ash::Device, pool: vk::CommandPool) {
        unsafe {
            for semaphore in self.image_available.drain(..).chain(self.queue_complete.drain(..)) {
                device.destroy_semaphore(semaphore, None);
            }
            for fence in self.in_flight.drain(..) {
                device.destroy_fence(fence, None);
            }
            if !self.command_buffers.is_empty() {
                device.free_command_buffers(pool, &self.command_buffers);
                self.command_buffers.clear();
            }
        }
        self.images_in_flight.clear();
    }
}
