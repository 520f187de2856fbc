pub mod capability;
pub mod compat;
pub mod device;
pub mod flat;
pub mod glow_device;
pub mod program;
pub mod resources;
pub mod shaders;
pub mod source;

#[cfg(test)]
pub(crate) mod mock;

pub use capability::{CapabilityContext, CapabilitySnapshot, Extension, Profile, StaticContext, Version};
pub use device::{GraphicsDevice, UniformValue};
pub use flat::{FlatShader, TransformationProjection};
pub use glow_device::GlowDevice;
pub use program::{ShaderProgram, UNRESOLVED_LOCATION};
pub use resources::ResourceBundle;
pub use source::{Dimension, Feature, FeatureFlags, ShaderStage};
