/// Shader - OpenGL implementation of the Shader trait
///
/// Every stage in the sources is compiled, attached and linked into one
/// program. Active vertex attributes are reflected once after link.

use std::sync::Mutex;

use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;
use prism_gpu::prism::{
    Error, Result,
    render::{
        layout_from_attributes, BufferLayout, Shader, ShaderAttribute, ShaderSources, ShaderStage,
    },
};
use prism_gpu::{gpu_err, gpu_raise, gpu_trace};
use rustc_hash::FxHashMap;

use crate::opengl::lock;
use crate::opengl_device::GlDevice;
use crate::opengl_format::{gl_attribute_type_to_shader_data_type, shader_stage_to_gl};

/// OpenGL program
pub struct GlShader {
    gl: GlDevice,
    pub(crate) program: glow::Program,
    layout: BufferLayout,
    attributes: Vec<ShaderAttribute>,
    /// Uniform name -> location (`None`: not an active uniform)
    locations: Mutex<FxHashMap<String, Option<glow::UniformLocation>>>,
}

impl GlShader {
    pub fn new(gl: GlDevice, sources: &ShaderSources) -> Result<Self> {
        if sources.is_empty() {
            return Err(gpu_raise!(
                "prism::opengl",
                Error::ShaderSource("no shader stages to compile".to_string())
            ));
        }

        unsafe {
            let program = gl
                .create_program()
                .map_err(|e| gpu_err!("prism::opengl", "Failed to create program: {}", e))?;

            let mut shaders = Vec::with_capacity(sources.len());
            for (stage, source) in sources.iter() {
                match compile(&gl, stage, source) {
                    Ok(shader) => {
                        gl.attach_shader(program, shader);
                        shaders.push(shader);
                    }
                    Err(error) => {
                        for shader in shaders {
                            gl.delete_shader(shader);
                        }
                        gl.delete_program(program);
                        return Err(error);
                    }
                }
            }

            gl.link_program(program);
            let linked = gl.get_program_link_status(program);
            for shader in shaders {
                gl.detach_shader(program, shader);
                gl.delete_shader(shader);
            }

            if !linked {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                return Err(gpu_raise!("prism::opengl", Error::ShaderLink(log)));
            }

            let mut attributes = match reflect_attributes(&gl, program) {
                Ok(attributes) => attributes,
                Err(error) => {
                    gl.delete_program(program);
                    return Err(gpu_raise!("prism::opengl", error));
                }
            };
            let layout = layout_from_attributes(&mut attributes);
            gpu_trace!(
                "prism::opengl",
                "Linked program with {} vertex attributes (stride {})",
                attributes.len(),
                layout.stride()
            );

            Ok(Self {
                gl,
                program,
                layout,
                attributes,
                locations: Mutex::new(FxHashMap::default()),
            })
        }
    }

    fn location(&self, name: &str) -> Option<glow::UniformLocation> {
        let mut locations = lock(&self.locations);
        if let Some(location) = locations.get(name) {
            return location.clone();
        }
        let location = unsafe { self.gl.get_uniform_location(self.program, name) };
        locations.insert(name.to_string(), location.clone());
        location
    }
}

unsafe fn compile(gl: &glow::Context, stage: ShaderStage, source: &str) -> Result<glow::Shader> {
    let shader = gl
        .create_shader(shader_stage_to_gl(stage))
        .map_err(|e| gpu_err!("prism::opengl", "Failed to create {} shader: {}", stage.name(), e))?;
    gl.shader_source(shader, source);
    gl.compile_shader(shader);

    if !gl.get_shader_compile_status(shader) {
        let log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        return Err(gpu_raise!("prism::opengl", Error::ShaderCompilation { stage, log }));
    }
    Ok(shader)
}

/// Active attributes with a location; built-ins like `gl_VertexID` have none
unsafe fn reflect_attributes(gl: &glow::Context, program: glow::Program) -> Result<Vec<ShaderAttribute>> {
    let count = gl.get_active_attributes(program);
    let mut attributes = Vec::with_capacity(count as usize);
    for index in 0..count {
        let Some(active) = gl.get_active_attribute(program, index) else {
            continue;
        };
        let Some(location) = gl.get_attrib_location(program, &active.name) else {
            continue;
        };
        attributes.push(ShaderAttribute {
            location,
            ty: gl_attribute_type_to_shader_data_type(active.atype)?,
            name: active.name,
        });
    }
    Ok(attributes)
}

impl Shader for GlShader {
    fn bind(&self) {
        unsafe { self.gl.use_program(Some(self.program)) }
    }

    fn unbind(&self) {
        unsafe { self.gl.use_program(None) }
    }

    fn uniform_exists(&self, name: &str) -> bool {
        self.location(name).is_some()
    }

    fn set_int(&self, name: &str, value: i32) {
        self.bind();
        unsafe { self.gl.uniform_1_i32(self.location(name).as_ref(), value) }
    }

    fn set_int_array(&self, name: &str, values: &[i32]) {
        self.bind();
        unsafe { self.gl.uniform_1_i32_slice(self.location(name).as_ref(), values) }
    }

    fn set_float(&self, name: &str, value: f32) {
        self.bind();
        unsafe { self.gl.uniform_1_f32(self.location(name).as_ref(), value) }
    }

    fn set_float2(&self, name: &str, value: Vec2) {
        self.bind();
        unsafe { self.gl.uniform_2_f32(self.location(name).as_ref(), value.x, value.y) }
    }

    fn set_float3(&self, name: &str, value: Vec3) {
        self.bind();
        unsafe { self.gl.uniform_3_f32(self.location(name).as_ref(), value.x, value.y, value.z) }
    }

    fn set_float4(&self, name: &str, value: Vec4) {
        self.bind();
        unsafe {
            self.gl
                .uniform_4_f32(self.location(name).as_ref(), value.x, value.y, value.z, value.w)
        }
    }

    fn set_mat3(&self, name: &str, value: &Mat3) {
        self.bind();
        unsafe {
            self.gl.uniform_matrix_3_f32_slice(
                self.location(name).as_ref(),
                false,
                &value.to_cols_array(),
            )
        }
    }

    fn set_mat4(&self, name: &str, value: &Mat4) {
        self.bind();
        unsafe {
            self.gl.uniform_matrix_4_f32_slice(
                self.location(name).as_ref(),
                false,
                &value.to_cols_array(),
            )
        }
    }

    fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    fn attributes(&self) -> &[ShaderAttribute] {
        &self.attributes
    }
}

impl Drop for GlShader {
    fn drop(&mut self) {
        let program = self.program;
        self.gl.delete_with(|gl| unsafe { gl.delete_program(program) });
    }
}
