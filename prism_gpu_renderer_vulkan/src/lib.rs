/*!
# Prism GPU - Vulkan Backend

Vulkan implementation of the Prism GPU context.

This crate brings up a Vulkan instance, picks a physical device, owns the
window surface and its swapchain, and drives a clear-and-present frame loop
with several frames in flight. Resource creation is not implemented for this
backend; the factories report `Error::Unsupported`.

Validation layer support is compiled in by the `vulkan-validation` feature.
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_device;
mod vulkan_frame;
mod vulkan_render_pass;
mod vulkan_swapchain;
pub mod vulkan_selection;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan::VulkanContext;
pub use vulkan_selection::{DeviceRequirements, QueueIndices};

// Re-export debug utilities
#[cfg(feature = "vulkan-validation")]
pub use debug::{get_validation_stats, print_validation_stats_report, ValidationStats};

// Main prism namespace module
pub mod prism {
    pub mod vulkan {
        pub use crate::vulkan::VulkanContext;
        pub use crate::vulkan_selection::{DeviceRequirements, QueueIndices};

        #[cfg(feature = "vulkan-validation")]
        pub use crate::debug::{get_validation_stats, print_validation_stats_report, ValidationStats};
    }
}
