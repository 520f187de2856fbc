pub mod core;
pub mod rendering;

pub use self::core::{ConfigError, ShaderConfig};
pub use rendering::ProfileSelection;
