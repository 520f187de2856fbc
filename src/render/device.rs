use glam::{Mat3, Mat4, Vec4};
use std::fmt::Debug;

use super::capability::CapabilityContext;
use super::source::ShaderStage;

/// Value uploaded to a uniform location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Vec4(Vec4),
    Mat3(Mat3),
    Mat4(Mat4),
}

/// GL object operations the program pipeline is built from.
///
/// Implementations talk to one rendering context and must only be used from
/// the thread that holds it current. Constructing several programs against
/// the same context from different threads needs external locking.
pub trait GraphicsDevice: CapabilityContext {
    type Shader: Copy + Debug;
    type Program: Copy + Debug;
    type Texture;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;

    /// Uploads `source` and compiles it. `Err` carries the driver info log.
    fn compile_shader(&self, shader: Self::Shader, source: &str) -> Result<(), String>;

    fn delete_shader(&self, shader: Self::Shader);

    fn create_program(&self) -> Result<Self::Program, String>;

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    fn bind_attribute_location(&self, program: Self::Program, location: u32, name: &str);

    /// Links the program. `Err` carries the driver info log.
    fn link_program(&self, program: Self::Program) -> Result<(), String>;

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<i32>;

    fn set_uniform(&self, program: Self::Program, location: i32, value: &UniformValue);

    fn bind_texture(&self, unit: u32, texture: &Self::Texture);

    fn delete_program(&self, program: Self::Program);
}
