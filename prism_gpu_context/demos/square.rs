//! Draws a colour-interpolated square with an explicit vertex layout
//!
//! Run with: cargo run -p prism_gpu_context --example square

use prism_gpu::glam::Vec4;
use prism_gpu::prism::render::{BufferElement, BufferLayout, ShaderDataType};
use prism_gpu::prism::settings::{ApiType, Settings};
use prism_gpu::prism::window::WindowProps;
use prism_gpu::prism::Result;
use prism_gpu_context::prism::context::RenderContext;
use prism_gpu_window_glfw::glfw::Key;

const SHADER: &str = "#type vertex
#version 410 core
layout(location = 0) in vec3 a_Position;
out vec3 v_Position;
void main() {
    v_Position = a_Position;
    gl_Position = vec4(a_Position, 1.0);
}

#type fragment
#version 410 core
layout(location = 0) out vec4 color;
in vec3 v_Position;
void main() {
    color = vec4(v_Position * 0.5 + 0.5, 1.0);
}
";

const VERTICES: [f32; 12] = [
    -0.5, -0.5, 0.0,
    0.5, -0.5, 0.0,
    0.5, 0.5, 0.0,
    -0.5, 0.5, 0.0,
];

const INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

fn main() -> Result<()> {
    let settings = Settings { preferred_api: ApiType::Guess, blending: true, ..Settings::default() };
    let mut context = RenderContext::open(settings, WindowProps::new("Square", 1280, 720))?;
    context.init()?;

    let layout = BufferLayout::new(vec![BufferElement::new(ShaderDataType::Float3, "a_Position")]);
    let vertex_buffer = context.create_vertex_buffer_from(&VERTICES, &layout)?;
    let vertex_array = context.create_vertex_array()?;
    vertex_array.add_vertex_buffer(vertex_buffer)?;
    vertex_array.set_index_buffer(context.create_index_buffer(&INDICES)?);

    let shader = context.create_shader_from_source(SHADER)?;

    context.set_clear_colour(Vec4::new(0.1, 0.1, 0.1, 1.0));
    while !context.poll() && !context.window().is_key_pressed(Key::Escape) {
        context.begin_frame()?;
        shader.bind();
        context.draw_indexed(&vertex_array, 0)?;
        context.end_frame()?;
    }

    // GL objects go before their context
    drop(shader);
    drop(vertex_array);
    context.shutdown();
    Ok(())
}
