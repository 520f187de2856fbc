//! Recording device for pipeline tests.

use parking_lot::Mutex;
use std::collections::HashMap;

use super::capability::{CapabilityContext, Extension, Profile, StaticContext, Version};
use super::device::{GraphicsDevice, UniformValue};
use super::source::ShaderStage;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateShader(ShaderStage),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    BindAttributeLocation { location: u32, name: String },
    LinkProgram(u32),
    UniformLocation(String),
    SetUniform { location: i32, value: UniformValue },
    BindTexture { unit: u32, texture: u32 },
    DeleteProgram(u32),
}

#[derive(Default)]
struct MockState {
    next_id: u32,
    calls: Vec<Call>,
    sources: HashMap<u32, String>,
    compiled: Vec<(ShaderStage, String)>,
    stages: HashMap<u32, ShaderStage>,
    uniform_locations: HashMap<String, i32>,
}

pub struct MockDevice {
    context: StaticContext,
    state: Mutex<MockState>,
    fail_compile: Option<(ShaderStage, String)>,
    fail_link: Option<String>,
    hidden_uniforms: Vec<String>,
}

impl MockDevice {
    pub fn new(context: StaticContext) -> Self {
        Self {
            context,
            state: Mutex::new(MockState {
                next_id: 1,
                ..Default::default()
            }),
            fail_compile: None,
            fail_link: None,
            hidden_uniforms: Vec::new(),
        }
    }

    pub fn failing_compile(mut self, stage: ShaderStage, log: &str) -> Self {
        self.fail_compile = Some((stage, log.to_string()));
        self
    }

    pub fn failing_link(mut self, log: &str) -> Self {
        self.fail_link = Some(log.to_string());
        self
    }

    /// Makes the linked program report `name` as inactive.
    pub fn hiding_uniform(mut self, name: &str) -> Self {
        self.hidden_uniforms.push(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn source_of(&self, shader: u32) -> Option<String> {
        self.state.lock().sources.get(&shader).cloned()
    }

    /// Sources in compile order.
    pub fn compiled_sources(&self) -> Vec<(ShaderStage, String)> {
        self.state.lock().compiled.clone()
    }

    pub fn position(&self, predicate: impl Fn(&Call) -> bool) -> Option<usize> {
        self.state.lock().calls.iter().position(predicate)
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }

    fn next_id(&self) -> u32 {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        id
    }
}

impl CapabilityContext for MockDevice {
    fn is_version_supported(&self, version: Version) -> bool {
        self.context.is_version_supported(version)
    }

    fn is_extension_advertised(&self, extension: Extension) -> bool {
        self.context.is_extension_advertised(extension)
    }

    fn profile(&self) -> Profile {
        self.context.profile()
    }
}

impl GraphicsDevice for MockDevice {
    type Shader = u32;
    type Program = u32;
    type Texture = u32;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, String> {
        self.record(Call::CreateShader(stage));
        let id = self.next_id();
        self.state.lock().stages.insert(id, stage);
        Ok(id)
    }

    fn compile_shader(&self, shader: u32, source: &str) -> Result<(), String> {
        self.record(Call::CompileShader(shader));
        let mut state = self.state.lock();
        state.sources.insert(shader, source.to_string());
        let stage = state.stages[&shader];
        state.compiled.push((stage, source.to_string()));
        match &self.fail_compile {
            Some((failing, log)) if *failing == stage => Err(log.clone()),
            _ => Ok(()),
        }
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let id = self.next_id();
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader { program, shader });
    }

    fn bind_attribute_location(&self, _program: u32, location: u32, name: &str) {
        self.record(Call::BindAttributeLocation {
            location,
            name: name.to_string(),
        });
    }

    fn link_program(&self, program: u32) -> Result<(), String> {
        self.record(Call::LinkProgram(program));
        match &self.fail_link {
            Some(log) => Err(log.clone()),
            None => Ok(()),
        }
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<i32> {
        self.record(Call::UniformLocation(name.to_string()));
        if self.hidden_uniforms.iter().any(|hidden| hidden == name) {
            return None;
        }
        let mut state = self.state.lock();
        if !state.sources.values().any(|source| source.contains(name)) {
            return None;
        }
        let next = 10 + state.uniform_locations.len() as i32;
        Some(*state.uniform_locations.entry(name.to_string()).or_insert(next))
    }

    fn set_uniform(&self, _program: u32, location: i32, value: &UniformValue) {
        self.record(Call::SetUniform {
            location,
            value: *value,
        });
    }

    fn bind_texture(&self, unit: u32, texture: &u32) {
        self.record(Call::BindTexture {
            unit,
            texture: *texture,
        });
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }
}
