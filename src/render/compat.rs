//! Version-specific prologue and stage compilation.

use log::debug;
use std::fmt::Write;

use super::capability::CapabilitySnapshot;
use super::device::GraphicsDevice;
use super::resources::ResourceBundle;
use super::source::{ShaderStage, ShaderStageSource};
use crate::utils::error::{Result, ShaderError};

pub const COMPATIBILITY_RESOURCE: &str = "compatibility.glsl";

/// Text placed ahead of every assembled stage for the negotiated version.
pub fn compatibility_prologue(
    bundle: &ResourceBundle,
    snapshot: &CapabilitySnapshot,
    stage: ShaderStage,
) -> Result<String> {
    let compatibility = bundle.get(COMPATIBILITY_RESOURCE)?;

    let mut prologue = String::with_capacity(compatibility.len() + 256);
    // Writing into a String cannot fail
    let _ = writeln!(prologue, "#version {}", snapshot.version.glsl_directive());
    match stage {
        ShaderStage::Vertex => prologue.push_str("#define VERTEX_STAGE\n"),
        ShaderStage::Fragment => prologue.push_str("#define FRAGMENT_STAGE\n"),
    }
    for extension in &snapshot.disabled_extensions {
        let _ = writeln!(prologue, "#define DISABLE_{}", extension.name());
    }
    prologue.push_str(compatibility);
    Ok(prologue)
}

/// Exact text submitted to the driver for `source`.
pub fn final_source(
    bundle: &ResourceBundle,
    snapshot: &CapabilitySnapshot,
    source: &ShaderStageSource,
) -> Result<String> {
    let mut text = compatibility_prologue(bundle, snapshot, source.stage)?;
    text.push_str(&source.text);
    Ok(text)
}

/// Compiled stage owned by the program under construction.
pub struct CompiledStage<'d, D: GraphicsDevice> {
    device: &'d D,
    handle: D::Shader,
    stage: ShaderStage,
}

impl<'d, D: GraphicsDevice> CompiledStage<'d, D> {
    pub fn handle(&self) -> D::Shader {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl<D: GraphicsDevice> Drop for CompiledStage<'_, D> {
    fn drop(&mut self) {
        self.device.delete_shader(self.handle);
    }
}

pub struct CompatibilityShaderFactory<'a, D: GraphicsDevice> {
    device: &'a D,
    bundle: &'a ResourceBundle,
    snapshot: &'a CapabilitySnapshot,
}

impl<'a, D: GraphicsDevice> CompatibilityShaderFactory<'a, D> {
    pub fn new(device: &'a D, bundle: &'a ResourceBundle, snapshot: &'a CapabilitySnapshot) -> Self {
        Self {
            device,
            bundle,
            snapshot,
        }
    }

    pub fn create(&self, source: ShaderStageSource) -> Result<CompiledStage<'a, D>> {
        let stage = source.stage;
        let text = final_source(self.bundle, self.snapshot, &source)?;

        let handle = self
            .device
            .create_shader(stage)
            .map_err(|log| ShaderError::Compilation { stage, log })?;
        let compiled = CompiledStage {
            device: self.device,
            handle,
            stage,
        };

        self.device
            .compile_shader(handle, &text)
            .map_err(|log| ShaderError::Compilation { stage, log })?;

        debug!(
            "Compiled {} stage for {} ({} bytes)",
            stage,
            self.snapshot.version,
            text.len()
        );
        Ok(compiled)
    }
}
