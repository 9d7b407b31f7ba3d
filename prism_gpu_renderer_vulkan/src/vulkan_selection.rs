/// Device and swapchain selection rules
///
/// Everything here works on plain data gathered from the driver, so the
/// selection logic can be exercised without a GPU. `vulkan.rs` collects the
/// candidates and applies these rules.

use std::ffi::{CStr, CString};

use ash::vk;
use glam::UVec2;

// ============================================================================
// Queue families
// ============================================================================

/// One queue family as reported by a physical device
#[derive(Debug, Clone, Copy)]
pub struct QueueFamilyCandidate {
    pub flags: vk::QueueFlags,
    /// Whether the family can present to the window surface
    pub present: bool,
}

impl QueueFamilyCandidate {
    pub fn new(flags: vk::QueueFlags, present: bool) -> Self {
        Self { flags, present }
    }
}

/// Chosen family index per role, `None` when no family offers the role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueIndices {
    pub graphics: Option<u32>,
    pub present: Option<u32>,
    pub compute: Option<u32>,
    pub transfer: Option<u32>,
}

impl QueueIndices {
    /// Distinct families in graphics, present, transfer order
    pub fn unique_families(&self) -> Vec<u32> {
        let mut families = Vec::with_capacity(3);
        for index in [self.graphics, self.present, self.transfer].into_iter().flatten() {
            if !families.contains(&index) {
                families.push(index);
            }
        }
        families
    }

    pub fn graphics_shares_present(&self) -> bool {
        self.graphics == self.present
    }
}

/// Pick a family for each queue role
///
/// Graphics, compute and present take the last family offering them.
/// Transfer goes to the family with the lowest score, where a family scores
/// one point each for graphics and compute, so a dedicated transfer family
/// wins over a general-purpose one. Ties go to the later family.
pub fn select_queue_families(families: &[QueueFamilyCandidate]) -> QueueIndices {
    let mut indices = QueueIndices::default();
    let mut min_score = u32::MAX;

    for (index, family) in families.iter().enumerate() {
        let index = index as u32;
        let mut score = 0;

        if family.flags.contains(vk::QueueFlags::GRAPHICS) {
            indices.graphics = Some(index);
            score += 1;
        }

        if family.flags.contains(vk::QueueFlags::COMPUTE) {
            indices.compute = Some(index);
            score += 1;
        }

        if family.flags.contains(vk::QueueFlags::TRANSFER) && score <= min_score {
            min_score = score;
            indices.transfer = Some(index);
        }

        if family.present {
            indices.present = Some(index);
        }
    }

    indices
}

// ============================================================================
// Device requirements
// ============================================================================

/// What a physical device must offer to be accepted
#[derive(Debug, Clone)]
pub struct DeviceRequirements {
    pub graphics: bool,
    pub present: bool,
    pub compute: bool,
    pub transfer: bool,
    /// Required device type, any type when `None`
    pub device_type: Option<vk::PhysicalDeviceType>,
    pub extensions: Vec<&'static CStr>,
}

impl Default for DeviceRequirements {
    fn default() -> Self {
        Self {
            graphics: true,
            present: true,
            compute: false,
            transfer: true,
            device_type: Some(vk::PhysicalDeviceType::DISCRETE_GPU),
            extensions: vec![ash::khr::swapchain::NAME],
        }
    }
}

/// Everything the selection rules need to know about one physical device
#[derive(Debug, Clone)]
pub struct DeviceCandidate {
    pub name: String,
    pub device_type: vk::PhysicalDeviceType,
    pub queue_families: Vec<QueueFamilyCandidate>,
    pub extensions: Vec<CString>,
    pub surface_formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

/// Queue assignment for `candidate`, or `None` when it misses any requirement
pub fn device_meets_requirements(
    candidate: &DeviceCandidate,
    requirements: &DeviceRequirements,
) -> Option<QueueIndices> {
    if requirements.device_type.is_some_and(|required| required != candidate.device_type) {
        return None;
    }

    let indices = select_queue_families(&candidate.queue_families);
    let roles = [
        (requirements.graphics, indices.graphics),
        (requirements.present, indices.present),
        (requirements.compute, indices.compute),
        (requirements.transfer, indices.transfer),
    ];
    if roles.iter().any(|(required, index)| *required && index.is_none()) {
        return None;
    }

    if candidate.surface_formats.is_empty() || candidate.present_modes.is_empty() {
        return None;
    }

    let has_extensions = requirements.extensions.iter().all(|required| {
        candidate
            .extensions
            .iter()
            .any(|available| available.as_c_str() == *required)
    });
    if !has_extensions {
        return None;
    }

    Some(indices)
}

/// First candidate accepted by `requirements`, with its queue assignment
pub fn pick_device(
    candidates: &[DeviceCandidate],
    requirements: &DeviceRequirements,
) -> Option<(usize, QueueIndices)> {
    candidates
        .iter()
        .enumerate()
        .find_map(|(index, candidate)| {
            device_meets_requirements(candidate, requirements).map(|indices| (index, indices))
        })
}

// ============================================================================
// Swapchain parameters
// ============================================================================

/// B8G8R8A8_UNORM with sRGB non-linear colour space, else the first format
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
    formats
        .iter()
        .find(|format| {
            format.format == vk::Format::B8G8R8A8_UNORM
                && format.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .or_else(|| formats.first())
        .copied()
}

/// FIFO is the only mode every driver must support
pub const PRESENT_MODE: vk::PresentModeKHR = vk::PresentModeKHR::FIFO;

/// One image more than the minimum, within the maximum (0 means unbounded)
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 && count > capabilities.max_image_count {
        capabilities.max_image_count
    } else {
        count
    }
}

/// Surface extent; the window size is used only when the surface leaves it open
pub fn choose_extent(framebuffer_size: UVec2, capabilities: &vk::SurfaceCapabilitiesKHR) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        return capabilities.current_extent;
    }

    let min = capabilities.min_image_extent;
    let max = capabilities.max_image_extent;
    vk::Extent2D {
        width: framebuffer_size.x.clamp(min.width, max.width),
        height: framebuffer_size.y.clamp(min.height, max.height),
    }
}

/// Sharing mode and the families to list for swapchain images
pub fn image_sharing(indices: &QueueIndices) -> (vk::SharingMode, Vec<u32>) {
    match (indices.graphics, indices.present) {
        (Some(graphics), Some(present)) if graphics != present => {
            (vk::SharingMode::CONCURRENT, vec![graphics, present])
        }
        _ => (vk::SharingMode::EXCLUSIVE, Vec::new()),
    }
}

// ============================================================================
// Frame helpers
// ============================================================================

/// Frame slot after `current`, wrapping at `frames_in_flight`
pub fn next_frame(current: usize, frames_in_flight: usize) -> usize {
    (current + 1) % frames_in_flight.max(1)
}

/// Viewport with Y pointing up, matching the OpenGL convention
pub fn flipped_viewport(extent: vk::Extent2D) -> vk::Viewport {
    vk::Viewport {
        x: 0.0,
        y: extent.height as f32,
        width: extent.width as f32,
        height: -(extent.height as f32),
        min_depth: 0.0,
        max_depth: 1.0,
    }
}

// ============================================================================
// Properties
// ============================================================================

pub fn device_type_name(device_type: vk::PhysicalDeviceType) -> &'static str {
    match device_type {
        vk::PhysicalDeviceType::INTEGRATED_GPU => "Integrated GPU",
        vk::PhysicalDeviceType::DISCRETE_GPU => "Discrete GPU",
        vk::PhysicalDeviceType::VIRTUAL_GPU => "Virtual GPU",
        vk::PhysicalDeviceType::CPU => "CPU",
        _ => "Other",
    }
}

/// "major.minor.patch" of a packed Vulkan version
pub fn format_api_version(version: u32) -> String {
    format!(
        "{}.{}.{}",
        vk::api_version_major(version),
        vk::api_version_minor(version),
        vk::api_version_patch(version)
    )
}

#[cfg(test)]
#[path = "vulkan_selection_tests.rs"]
mod tests;
