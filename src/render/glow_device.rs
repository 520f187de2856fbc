use glow::HasContext;
use log::warn;

use super::capability::{CapabilityContext, Extension, Profile, Version};
use super::device::{GraphicsDevice, UniformValue};
use super::source::ShaderStage;

/// [`GraphicsDevice`] backed by a `glow` context.
pub struct GlowDevice {
    gl: glow::Context,
}

impl GlowDevice {
    /// # Safety
    /// `gl` must be current on the calling thread for the lifetime of the
    /// device, and every use of the device must happen on that thread.
    pub unsafe fn new(gl: glow::Context) -> Self {
        Self { gl }
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

impl CapabilityContext for GlowDevice {
    fn is_version_supported(&self, version: Version) -> bool {
        let current = self.gl.version();
        current.is_embedded == version.is_embedded()
            && (current.major, current.minor) >= version.major_minor()
    }

    fn is_extension_advertised(&self, extension: Extension) -> bool {
        self.gl.supported_extensions().contains(extension.name())
    }

    fn profile(&self) -> Profile {
        if self.gl.version().is_embedded {
            Profile::Embedded
        } else {
            Profile::Desktop
        }
    }
}

impl GraphicsDevice for GlowDevice {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;
    type Texture = glow::NativeTexture;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let shader_type = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };
        unsafe { self.gl.create_shader(shader_type) }
    }

    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String> {
        unsafe {
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);
            if self.gl.get_shader_compile_status(shader) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader))
            }
        }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.gl.delete_shader(shader) };
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        unsafe { self.gl.create_program() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.gl.attach_shader(program, shader) };
    }

    fn bind_attribute_location(&self, program: Self::Program, location: u32, name: &str) {
        unsafe { self.gl.bind_attrib_location(program, location, name) };
    }

    fn link_program(&self, program: Self::Program) -> Result<(), String> {
        unsafe {
            self.gl.link_program(program);
            if self.gl.get_program_link_status(program) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program))
            }
        }
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<i32> {
        let location = unsafe { self.gl.get_uniform_location(program, name) };
        match location {
            Some(location) => i32::try_from(location.0).ok(),
            None => {
                warn!("Uniform '{}' not found in program {:?}", name, program);
                None
            }
        }
    }

    fn set_uniform(&self, program: Self::Program, location: i32, value: &UniformValue) {
        let Ok(raw) = u32::try_from(location) else {
            warn!("Ignoring upload to invalid uniform location {}", location);
            return;
        };
        let location = glow::NativeUniformLocation(raw);
        unsafe {
            self.gl.use_program(Some(program));
            match value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(Some(&location), *v),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32_slice(Some(&location), &v.to_array()),
                UniformValue::Mat3(m) => {
                    self.gl
                        .uniform_matrix_3_f32_slice(Some(&location), false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(Some(&location), false, &m.to_cols_array())
                }
            }
        }
    }

    fn bind_texture(&self, unit: u32, texture: &Self::Texture) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(*texture));
        }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.gl.delete_program(program) };
    }
}
