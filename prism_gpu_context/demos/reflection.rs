//! Compiles a shader and prints the vertex layout reflected from it
//!
//! Run with: cargo run -p prism_gpu_context --example reflection

use prism_gpu::prism::settings::Settings;
use prism_gpu::prism::window::WindowProps;
use prism_gpu::prism::Result;
use prism_gpu::gpu_info;
use prism_gpu_context::prism::context::RenderContext;

const SHADER: &str = "#type vertex
#version 410 core
layout(location = 0) in vec3 a_Position;
layout(location = 1) in vec4 a_Color;
layout(location = 2) in vec2 a_TexCoord;
layout(location = 3) in mat4 a_Transform;
out vec4 v_Color;
out vec2 v_TexCoord;
void main() {
    v_Color = a_Color;
    v_TexCoord = a_TexCoord;
    gl_Position = a_Transform * vec4(a_Position, 1.0);
}

#type fragment
#version 410 core
layout(location = 0) out vec4 color;
in vec4 v_Color;
in vec2 v_TexCoord;
void main() {
    color = v_Color * vec4(v_TexCoord, 1.0, 1.0);
}
";

fn main() -> Result<()> {
    let props = WindowProps { visible: false, ..WindowProps::new("Reflection", 320, 240) };
    let mut context = RenderContext::open(Settings::default(), props)?;
    context.init()?;

    let shader = context.create_shader_from_source(SHADER)?;
    let layout = shader.layout();
    for (index, element) in layout.iter().enumerate() {
        gpu_info!(
            "reflection",
            "Attribute #{} \"{}\" {:?} (Size: {}, Offset: {})",
            index,
            element.name,
            element.ty,
            element.size,
            element.offset
        );
    }
    gpu_info!("reflection", "Stride: {}", layout.stride());

    drop(shader);
    context.shutdown();
    Ok(())
}
