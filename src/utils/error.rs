use thiserror::Error;

use crate::render::capability::Version;
use crate::render::source::{Dimension, ShaderStage};

#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("No supported shading language version among {candidates:?}")]
    Configuration { candidates: Vec<Version> },

    #[error("{stage} shader compilation failed: {log}")]
    Compilation { stage: ShaderStage, log: String },

    #[error("Program linking failed: {0}")]
    Linking(String),

    #[error("Uniform not found: {0}")]
    UniformNotFound(String),

    #[error("Resource group not registered: {0}")]
    MissingGroup(String),

    #[error("Resource {key} not found in group {group}")]
    MissingResource { group: String, key: String },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Transformation for a {actual} program used on a {expected} program")]
    DimensionMismatch {
        expected: Dimension,
        actual: Dimension,
    },
}

impl ShaderError {
    /// True for the kinds that abort program construction.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ShaderError::UnknownFeature(_) | ShaderError::DimensionMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ShaderError>;
