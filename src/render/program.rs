//! Program linking, location resolution and the linked program object.

use log::{debug, trace};
use std::collections::HashMap;
use std::sync::Arc;

use super::capability::CapabilitySnapshot;
use super::compat::CompiledStage;
use super::device::{GraphicsDevice, UniformValue};
use super::source::FeatureFlags;
use crate::utils::error::{Result, ShaderError};

/// Cached location of a uniform that has not been resolved yet.
pub const UNRESOLVED_LOCATION: i32 = -1;

/// Construction progress of a program. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstructionState {
    Uninitialized,
    SourcesAssembled,
    StagesCompiled,
    AttributesBound,
    Linked,
    UniformsResolved,
    Ready,
    Failed,
}

impl ConstructionState {
    pub fn can_advance_to(self, next: ConstructionState) -> bool {
        use ConstructionState::*;
        match (self, next) {
            (Ready, _) | (Failed, _) => false,
            (_, Failed) => true,
            // Attribute binding is skipped with explicit locations
            (StagesCompiled, Linked) => true,
            _ => next as u8 == self as u8 + 1,
        }
    }
}

#[derive(Debug)]
pub struct ConstructionTracker {
    state: ConstructionState,
}

impl ConstructionTracker {
    pub fn new() -> Self {
        Self {
            state: ConstructionState::Uninitialized,
        }
    }

    pub fn state(&self) -> ConstructionState {
        self.state
    }

    /// Panics on a backwards or out-of-order transition; those are bugs in
    /// the construction sequence, not runtime conditions.
    pub fn advance(&mut self, next: ConstructionState) {
        assert!(
            self.state.can_advance_to(next),
            "internal invariant violated: construction transition {:?} -> {:?}",
            self.state,
            next
        );
        trace!("Program construction {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

impl Default for ConstructionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertex attribute with its fixed location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub location: u32,
}

/// Uniform with the location it carries in explicit-location builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformSlot {
    pub name: &'static str,
    pub location: i32,
}

/// Uniform resolved after link, with the value to upload right away if any.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    pub name: &'static str,
    pub location: i32,
    pub default: Option<UniformValue>,
}

/// Program object with its stages attached, not linked yet.
pub struct PendingProgram<'d, D: GraphicsDevice> {
    device: &'d D,
    handle: D::Program,
    linked: bool,
    _stages: Vec<CompiledStage<'d, D>>,
}

impl<'d, D: GraphicsDevice> PendingProgram<'d, D> {
    pub fn handle(&self) -> D::Program {
        self.handle
    }

    pub fn bind_attribute_location(&self, location: u32, name: &str) {
        self.device.bind_attribute_location(self.handle, location, name);
    }

    /// Links and hands the program handle to the caller. Stage objects are
    /// released either way.
    pub fn link(mut self) -> Result<D::Program> {
        self.device
            .link_program(self.handle)
            .map_err(ShaderError::Linking)?;
        self.linked = true;
        Ok(self.handle)
    }
}

impl<D: GraphicsDevice> Drop for PendingProgram<'_, D> {
    fn drop(&mut self) {
        if !self.linked {
            self.device.delete_program(self.handle);
        }
    }
}

pub struct ProgramLinker<'d, D: GraphicsDevice> {
    device: &'d D,
}

impl<'d, D: GraphicsDevice> ProgramLinker<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self { device }
    }

    /// Creates the program object and attaches every stage to it.
    pub fn attach(&self, stages: Vec<CompiledStage<'d, D>>) -> Result<PendingProgram<'d, D>> {
        let handle = self.device.create_program().map_err(ShaderError::Linking)?;
        for stage in &stages {
            self.device.attach_shader(handle, stage.handle());
        }
        Ok(PendingProgram {
            device: self.device,
            handle,
            linked: false,
            _stages: stages,
        })
    }

    pub fn link(&self, stages: Vec<CompiledStage<'d, D>>) -> Result<D::Program> {
        self.attach(stages)?.link()
    }
}

/// Decides how attribute and uniform locations are obtained for one program.
pub struct LocationResolver<'a> {
    snapshot: &'a CapabilitySnapshot,
    attributes: Vec<AttributeSlot>,
    uniforms: Vec<UniformSlot>,
    samplers: Vec<(UniformSlot, u32)>,
    initial_values: HashMap<&'static str, UniformValue>,
}

impl<'a> LocationResolver<'a> {
    pub fn new(snapshot: &'a CapabilitySnapshot) -> Self {
        Self {
            snapshot,
            attributes: Vec::new(),
            uniforms: Vec::new(),
            samplers: Vec::new(),
            initial_values: HashMap::new(),
        }
    }

    pub fn attribute(mut self, slot: AttributeSlot) -> Self {
        self.attributes.push(slot);
        self
    }

    pub fn uniform(mut self, slot: UniformSlot) -> Self {
        self.uniforms.push(slot);
        self
    }

    /// Sampler uniform bound to a fixed texture unit.
    pub fn sampler(mut self, slot: UniformSlot, unit: u32) -> Self {
        self.samplers.push((slot, unit));
        self
    }

    /// Value a uniform starts with when source cannot initialize it.
    pub fn initial_value(mut self, name: &'static str, value: UniformValue) -> Self {
        self.initial_values.insert(name, value);
        self
    }

    pub fn uniform_names(&self) -> Vec<&'static str> {
        self.uniforms
            .iter()
            .chain(self.samplers.iter().map(|(slot, _)| slot))
            .map(|slot| slot.name)
            .collect()
    }

    /// Pre-link phase. Returns false when source annotations make it unnecessary.
    pub fn bind_attributes<D: GraphicsDevice>(&self, program: &PendingProgram<'_, D>) -> bool {
        if self.snapshot.explicit_attrib_location {
            trace!("Attribute locations come from source, skipping binding");
            return false;
        }
        for attribute in &self.attributes {
            program.bind_attribute_location(attribute.location, attribute.name);
        }
        true
    }

    /// Post-link phase. Every declared uniform ends up with a valid location.
    pub fn resolve_uniforms<D: GraphicsDevice>(
        &self,
        device: &D,
        program: D::Program,
    ) -> Result<Vec<UniformBinding>> {
        let mut bindings = Vec::with_capacity(self.uniforms.len() + self.samplers.len());

        for slot in &self.uniforms {
            let location = self.locate(device, program, slot)?;
            let default = if self.snapshot.uniform_initializers {
                None
            } else {
                self.initial_values.get(slot.name).copied()
            };
            bindings.push(UniformBinding {
                name: slot.name,
                location,
                default,
            });
        }

        for (slot, unit) in &self.samplers {
            let location = self.locate(device, program, slot)?;
            let default = if self.snapshot.explicit_texture_layer {
                None
            } else {
                Some(UniformValue::Int(*unit as i32))
            };
            bindings.push(UniformBinding {
                name: slot.name,
                location,
                default,
            });
        }

        Ok(bindings)
    }

    fn locate<D: GraphicsDevice>(
        &self,
        device: &D,
        program: D::Program,
        slot: &UniformSlot,
    ) -> Result<i32> {
        if self.snapshot.explicit_uniform_location {
            return Ok(slot.location);
        }
        match device.uniform_location(program, slot.name) {
            Some(location) if location >= 0 => Ok(location),
            _ => Err(ShaderError::UniformNotFound(slot.name.to_string())),
        }
    }
}

/// Linked program. Owns the GL program object and deletes it on drop.
pub struct ShaderProgram<D: GraphicsDevice> {
    device: Arc<D>,
    handle: D::Program,
    flags: FeatureFlags,
    uniforms: HashMap<&'static str, i32>,
}

impl<D: GraphicsDevice> ShaderProgram<D> {
    pub(crate) fn new(
        device: Arc<D>,
        handle: D::Program,
        flags: FeatureFlags,
        declared: &[&'static str],
    ) -> Self {
        let uniforms = declared
            .iter()
            .map(|name| (*name, UNRESOLVED_LOCATION))
            .collect();
        Self {
            device,
            handle,
            flags,
            uniforms,
        }
    }

    /// Stores resolved locations and uploads their default values.
    pub(crate) fn apply_bindings(&mut self, bindings: &[UniformBinding]) {
        for binding in bindings {
            self.uniforms.insert(binding.name, binding.location);
            if let Some(value) = &binding.default {
                debug!("Defaulting uniform '{}' to {:?}", binding.name, value);
                self.device.set_uniform(self.handle, binding.location, value);
            }
        }
    }

    pub fn handle(&self) -> D::Program {
        self.handle
    }

    pub fn device(&self) -> &Arc<D> {
        &self.device
    }

    pub fn flags(&self) -> FeatureFlags {
        self.flags
    }

    /// Cached location, `UNRESOLVED_LOCATION` before resolution, `None` if undeclared.
    pub fn uniform_location(&self, name: &str) -> Option<i32> {
        self.uniforms.get(name).copied()
    }

    pub fn is_resolved(&self) -> bool {
        self.uniforms.values().all(|location| *location >= 0)
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.uniforms.iter().map(|(name, location)| (*name, *location))
    }

    pub fn set_uniform(&self, location: i32, value: &UniformValue) {
        self.device.set_uniform(self.handle, location, value);
    }
}

impl<D: GraphicsDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.device.delete_program(self.handle);
    }
}
