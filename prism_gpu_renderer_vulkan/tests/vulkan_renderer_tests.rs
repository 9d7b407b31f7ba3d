//! Integration tests for the Vulkan backend
//!
//! Every test opens a hidden GLFW window without a GL context and brings up a
//! full Vulkan context on it, so they all need a GPU and a display and are
//! marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_renderer_tests -- --ignored --test-threads=1

use prism_gpu::glam::Vec4;
use prism_gpu::prism::render::RenderBackend;
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{Window, WindowProps};
use prism_gpu::prism::Error;
use prism_gpu_renderer_vulkan::prism::vulkan::{DeviceRequirements, VulkanContext};
use prism_gpu_window_glfw::GlfwWindow;
use serial_test::serial;

fn create_test_window(api: ApiType) -> GlfwWindow {
    let props = WindowProps { visible: false, ..WindowProps::new("Vulkan Backend Test", 320, 240) };
    GlfwWindow::new(props, api).unwrap()
}

/// Accept integrated GPUs and software rasterisers as well
fn any_device() -> DeviceRequirements {
    DeviceRequirements { device_type: None, ..DeviceRequirements::default() }
}

fn create_test_context() -> (VulkanContext, GlfwWindow) {
    let mut window = create_test_window(ApiType::Vulkan);
    let settings = Settings {
        preferred_api: ApiType::Vulkan,
        enable_validation: false,
        ..Settings::default()
    };
    let mut context = VulkanContext::with_requirements(settings, any_device());
    context.init(&mut window).unwrap();
    (context, window)
}

// ============================================================================
// CONTEXT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_init_reads_properties() {
    let (mut context, mut window) = create_test_context();
    assert!(context.is_initialised());
    assert!(context.properties().vendor.starts_with("0x"));
    assert!(context.properties().renderer.contains('('));
    assert_eq!(context.properties().version.split('.').count(), 3);

    context.shutdown(&mut window);
    assert!(!context.is_initialised());
    assert!(!window.is_ready(ApiType::Vulkan));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_init_rejects_gl_window() {
    let mut window = create_test_window(ApiType::OpenGl);
    let mut context = VulkanContext::with_requirements(Settings::default(), any_device());
    assert!(matches!(context.init(&mut window), Err(Error::InitializationFailed(_))));
}

// ============================================================================
// FRAME LOOP TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_frame_loop_cycles_frame_slots() {
    let (mut context, mut window) = create_test_context();
    context.set_clear_colour(Vec4::new(0.2, 0.3, 0.8, 1.0));

    let frames_in_flight = context.settings().frames_in_flight as usize;
    for frame in 0..6 {
        context.begin_frame(&mut window).unwrap();
        context.clear();
        context.end_frame(&mut window).unwrap();
        window.poll_events();
        assert_eq!(context.current_frame(), (frame + 1) % frames_in_flight);
    }

    context.shutdown(&mut window);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_begin_frame_twice_fails() {
    let (mut context, mut window) = create_test_context();
    context.begin_frame(&mut window).unwrap();
    assert!(context.begin_frame(&mut window).is_err());
    context.end_frame(&mut window).unwrap();
    context.shutdown(&mut window);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_survives_resize() {
    let (mut context, mut window) = create_test_context();
    context.begin_frame(&mut window).unwrap();
    context.end_frame(&mut window).unwrap();

    window.native_mut().unwrap().set_size(480, 360);
    window.poll_events();
    for _ in 0..4 {
        context.begin_frame(&mut window).unwrap();
        context.end_frame(&mut window).unwrap();
        window.poll_events();
    }

    context.shutdown(&mut window);
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_draw_is_unsupported_after_init() {
    let (mut context, mut window) = create_test_context();
    assert!(matches!(
        context.create_vertex_array(),
        Err(Error::Unsupported { api: ApiType::Vulkan, .. })
    ));
    context.shutdown(&mut window);
}
