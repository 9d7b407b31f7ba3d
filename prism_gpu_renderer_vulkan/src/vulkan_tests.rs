//! Unit tests for VulkanContext paths that never reach the driver

use glam::Vec4;
use prism_gpu::prism::render::{BufferElement, BufferLayout, RenderBackend, ShaderDataType, TextureSpecification};
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{HeadlessWindow, Window};
use prism_gpu::prism::Error;

use crate::vulkan::VulkanContext;

fn vulkan_settings() -> Settings {
    Settings { preferred_api: ApiType::Vulkan, enable_validation: false, ..Settings::default() }
}

#[test]
fn test_new_context_is_not_initialised() {
    let context = VulkanContext::new(vulkan_settings());
    assert_eq!(context.api(), ApiType::Vulkan);
    assert!(!context.is_initialised());
    assert_eq!(context.current_frame(), 0);
    assert_eq!(context.settings().frames_in_flight, 2);
}

#[test]
fn test_init_rejects_window_not_created_for_vulkan() {
    let mut window = HeadlessWindow::default();
    let mut context = VulkanContext::new(vulkan_settings());

    let result = context.init(&mut window);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
    assert!(!context.is_initialised());
    assert!(!window.is_initialised());
}

#[test]
fn test_frame_calls_before_init_fail() {
    let mut window = HeadlessWindow::default();
    let mut context = VulkanContext::new(vulkan_settings());

    assert!(context.begin_frame(&mut window).is_err());
    assert!(context.end_frame(&mut window).is_err());
}

#[test]
fn test_shutdown_before_init_leaves_window_alone() {
    let mut window = HeadlessWindow::default();
    window.init().unwrap();
    let mut context = VulkanContext::new(vulkan_settings());
    context.shutdown(&mut window);
    assert!(window.is_initialised());
}

#[test]
fn test_clear_colour_is_stored() {
    let mut context = VulkanContext::new(vulkan_settings());
    context.set_clear_colour(Vec4::new(0.1, 0.2, 0.3, 1.0));
    context.set_viewport(0, 0, 640, 480);
    context.clear();
    assert_eq!(context.clear_colour(), Vec4::new(0.1, 0.2, 0.3, 1.0));
}

#[test]
fn test_factories_are_unsupported() {
    let context = VulkanContext::new(vulkan_settings());
    let layout = BufferLayout::new(vec![BufferElement::new(ShaderDataType::Float3, "a_Position")]);

    let is_unsupported = |error: Error, expected: &str| match error {
        Error::Unsupported { api, operation } => api == ApiType::Vulkan && operation == expected,
        _ => false,
    };

    assert!(is_unsupported(context.create_vertex_buffer(3, &layout).err().unwrap(), "create_vertex_buffer"));
    assert!(is_unsupported(context.create_index_buffer(&[0, 1, 2]).err().unwrap(), "create_index_buffer"));
    assert!(is_unsupported(context.create_vertex_array().err().unwrap(), "create_vertex_array"));
    assert!(is_unsupported(
        context.create_texture(&TextureSpecification::default()).err().unwrap(),
        "create_texture"
    ));
}

#[test]
#[ignore] // Requires GPU
#[serial_test::serial]
fn test_in_flight_fence_stays_signalled_until_submit() {
    use prism_gpu::prism::window::WindowProps;
    use prism_gpu_window_glfw::GlfwWindow;

    use crate::vulkan_selection::DeviceRequirements;

    let props = WindowProps { visible: false, ..WindowProps::new("Fence", 320, 240) };
    let mut window = GlfwWindow::new(props, ApiType::Vulkan).unwrap();
    let requirements = DeviceRequirements { device_type: None, ..DeviceRequirements::default() };
    let mut context = VulkanContext::with_requirements(vulkan_settings(), requirements);
    context.init(&mut window).unwrap();

    let fence_signalled = |context: &VulkanContext| {
        let state = context.state.as_ref().unwrap();
        let fence = state.presentation.frames.in_flight[state.current_frame];
        unsafe { state.device.logical.get_fence_status(fence).unwrap() }
    };

    context.begin_frame(&mut window).unwrap();
    // A frame abandoned here must not leave the next wait on this slot hanging
    assert!(fence_signalled(&context));
    context.end_frame(&mut window).unwrap();

    context.shutdown(&mut window);
}
