//! Integration tests for the OpenGL backend
//!
//! Every test opens a hidden GLFW window with a GL context, so they all need a
//! GPU and a display and are marked with #[ignore].
//!
//! Run with: cargo test --test opengl_renderer_tests -- --ignored --test-threads=1

use prism_gpu::glam::{Mat4, Vec4};
use prism_gpu::prism::render::{
    process_source, BufferElement, BufferLayout, FramebufferSpecification,
    FramebufferTextureFormat, RenderBackend, ShaderDataType, TextureSpecification,
};
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::{Window, WindowProps};
use prism_gpu::prism::Error;
use prism_gpu_renderer_opengl::prism::opengl::OpenGlContext;
use prism_gpu_window_glfw::GlfwWindow;
use serial_test::serial;

const VERTEX_SHADER: &str = "#version 410 core
layout(location = 0) in vec3 a_Position;
layout(location = 1) in vec4 a_Color;
uniform mat4 u_ViewProjection;
out vec4 v_Color;
void main() {
    v_Color = a_Color;
    gl_Position = u_ViewProjection * vec4(a_Position, 1.0);
}
";

const FRAGMENT_SHADER: &str = "#version 410 core
in vec4 v_Color;
out vec4 color;
void main() {
    color = v_Color;
}
";

/// Helper to create a context on a hidden window
fn create_test_context() -> (OpenGlContext, GlfwWindow) {
    let props = WindowProps { visible: false, ..WindowProps::new("OpenGL Backend Test", 320, 240) };
    let mut window = GlfwWindow::new(props, ApiType::OpenGl).unwrap();
    let settings = Settings { preferred_api: ApiType::OpenGl, ..Settings::default() };
    let mut context = OpenGlContext::new(settings);
    context.init(&mut window).unwrap();
    (context, window)
}

fn combined_source() -> String {
    format!("#type vertex\n{}#type fragment\n{}", VERTEX_SHADER, FRAGMENT_SHADER)
}

// ============================================================================
// CONTEXT TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_init_reads_properties() {
    let (mut context, mut window) = create_test_context();
    assert!(!context.properties().version.is_empty());
    assert!(!context.properties().renderer.is_empty());

    context.shutdown(&mut window);
    assert!(context.gl().is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_init_rejects_window_without_gl_context() {
    let props = WindowProps { visible: false, ..WindowProps::default() };
    let mut window = GlfwWindow::new(props, ApiType::Vulkan).unwrap();
    let mut context = OpenGlContext::new(Settings::default().resolved());
    assert!(matches!(context.init(&mut window), Err(Error::InitializationFailed(_))));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_frame_loop() {
    let (mut context, mut window) = create_test_context();
    context.set_clear_colour(Vec4::new(0.1, 0.1, 0.1, 1.0));
    context.set_viewport(0, 0, 320, 240);
    for _ in 0..3 {
        context.begin_frame(&mut window).unwrap();
        context.end_frame(&mut window).unwrap();
        window.poll_events();
    }
}

// ============================================================================
// RESOURCE TESTS
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_draw_square() {
    let (mut context, mut window) = create_test_context();

    let shader = context.create_shader(&process_source(&combined_source()).unwrap()).unwrap();
    let layout = shader.layout();
    assert_eq!(layout.elements().len(), 2);
    assert_eq!(layout.stride(), 28);

    let vertices: [f32; 28] = [
        -0.5, -0.5, 0.0, 1.0, 0.0, 0.0, 1.0,
         0.5, -0.5, 0.0, 0.0, 1.0, 0.0, 1.0,
         0.5,  0.5, 0.0, 0.0, 0.0, 1.0, 1.0,
        -0.5,  0.5, 0.0, 1.0, 1.0, 1.0, 1.0,
    ];
    let vertex_buffer = context.create_vertex_buffer(4, &layout).unwrap();
    vertex_buffer.set_data_from(&vertices[..]).unwrap();
    let index_buffer = context.create_index_buffer(&[0, 1, 2, 2, 3, 0]).unwrap();

    let vertex_array = context.create_vertex_array().unwrap();
    vertex_array.add_vertex_buffer(vertex_buffer).unwrap();
    vertex_array.set_index_buffer(index_buffer);

    context.begin_frame(&mut window).unwrap();
    shader.bind();
    shader.set_mat4("u_ViewProjection", &Mat4::IDENTITY);
    assert!(shader.uniform_exists("u_ViewProjection"));
    assert!(!shader.uniform_exists("u_Missing"));
    context.draw_indexed(&vertex_array, 0).unwrap();
    context.end_frame(&mut window).unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_resources_dropped_after_shutdown_skip_delete() {
    let (mut context, mut window) = create_test_context();
    let index_buffer = context.create_index_buffer(&[0, 1, 2]).unwrap();
    let texture = context.create_texture(&TextureSpecification::default()).unwrap();
    let liveness = context.device().unwrap().liveness().clone();
    assert!(liveness.is_alive());

    context.shutdown(&mut window);
    assert!(!liveness.is_alive());

    // Dropped after shutdown: no glDelete* through the lost context
    drop(index_buffer);
    drop(texture);
    assert!(!liveness.release(|| panic!("GL call after the context was lost")));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_shader_compile_error() {
    let (context, _window) = create_test_context();
    let sources = process_source("#type vertex\nthis is not glsl\n#type fragment\nvoid main() {}\n").unwrap();
    assert!(matches!(context.create_shader(&sources), Err(Error::ShaderCompilation { .. })));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_vertex_buffer_with_explicit_layout() {
    let (context, _window) = create_test_context();
    let layout = BufferLayout::new(vec![
        BufferElement::new(ShaderDataType::Float2, "a_Position"),
        BufferElement::new(ShaderDataType::Int, "a_EntityId"),
    ]);
    let vertex_buffer = context.create_vertex_buffer_with_data(&[0; 24], &layout).unwrap();
    assert_eq!(vertex_buffer.size(), 24);
    assert!(vertex_buffer.set_data(&[0; 25]).is_err());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_texture_upload() {
    let (context, _window) = create_test_context();
    let texture = context
        .create_texture(&TextureSpecification { width: 4, height: 4, ..TextureSpecification::default() })
        .unwrap();
    assert!(texture.renderer_id() != 0);
    assert!(texture.set_data(&[255; 64]).is_ok());
    assert!(texture.set_data(&[255; 63]).is_err());
    texture.bind(0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_opengl_framebuffer_picking() {
    let (context, _window) = create_test_context();
    let framebuffer = context
        .create_framebuffer(&FramebufferSpecification {
            width: 64,
            height: 64,
            attachments: vec![FramebufferTextureFormat::Rgba8, FramebufferTextureFormat::RedInteger],
        })
        .unwrap();

    framebuffer.clear_attachment(1, 42).unwrap();
    assert_eq!(framebuffer.read_pixel(1, 10, 10).unwrap(), 42);
    assert!(framebuffer.read_pixel(0, 10, 10).is_err());

    let before = framebuffer.color_attachment_id(0);
    framebuffer.resize(128, 32);
    assert_eq!(framebuffer.generation(), 2);
    assert_eq!(framebuffer.specification().width, 128);
    // The new attachments exist before the old ones are deleted
    assert!(before.is_some());
    assert_ne!(framebuffer.color_attachment_id(0), before);
}
