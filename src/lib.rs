pub mod config;
pub mod render;
pub mod utils;

// Re-export commonly used types
pub use config::core::ShaderConfig;
pub use config::rendering::ProfileSelection;
pub use render::capability::{CapabilityContext, CapabilitySnapshot, Profile, StaticContext, Version};
pub use render::device::{GraphicsDevice, UniformValue};
pub use render::flat::FlatShader;
pub use render::glow_device::GlowDevice;
pub use render::program::ShaderProgram;
pub use render::source::{Dimension, Feature, FeatureFlags, ShaderStage};
pub use utils::error::{Result, ShaderError};
