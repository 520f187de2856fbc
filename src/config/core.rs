use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::rendering::ProfileSelection;
use crate::render::capability::StaticContext;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    pub profile: ProfileSelection,
    pub log_level: String,
    /// Capability description used when no live context is available
    pub context: Option<StaticContext>,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            profile: ProfileSelection::Auto,
            log_level: "info".to_string(),
            context: None,
        }
    }
}

impl ShaderConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ShaderConfig = toml::from_str(content)?;
        config.level_filter()?;
        Ok(config)
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// Configured context, or the GL 2.1 baseline.
    pub fn static_context(&self) -> StaticContext {
        self.context.clone().unwrap_or_default()
    }
}
