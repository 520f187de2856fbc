//! Per-stage source assembly.
//!
//! The text for a stage is always feature macros, then the shared fragment,
//! then the stage/dimension fragment. Nothing else goes in, so identical
//! inputs give byte-identical output.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::str::FromStr;

use super::resources::ResourceBundle;
use crate::utils::error::{Result, ShaderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Dim2,
    Dim3,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Dim2 => f.write_str("2D"),
            Dimension::Dim3 => f.write_str("3D"),
        }
    }
}

/// Optional capabilities a caller can request for a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    Textured,
}

impl Feature {
    pub const ALL: [Feature; 1] = [Feature::Textured];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

impl FromStr for Feature {
    type Err = ShaderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "textured" => Ok(Feature::Textured),
            _ => Err(ShaderError::UnknownFeature(s.to_string())),
        }
    }
}

/// Feature → macro translation, with the stages that read each macro.
const FEATURE_MACROS: &[(Feature, &str, &[ShaderStage])] = &[(
    Feature::Textured,
    "TEXTURED",
    &[ShaderStage::Vertex, ShaderStage::Fragment],
)];

/// Immutable set of requested features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FeatureFlags {
    bits: u8,
}

impl FeatureFlags {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(self, feature: Feature) -> Self {
        Self {
            bits: self.bits | feature.bit(),
        }
    }

    pub fn has_feature(&self, feature: Feature) -> bool {
        self.bits & feature.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Feature> + '_ {
        Feature::ALL
            .into_iter()
            .filter(move |feature| self.has_feature(*feature))
    }

    /// Macro names this stage receives for the active features.
    pub fn macros_for(&self, stage: ShaderStage) -> Vec<&'static str> {
        FEATURE_MACROS
            .iter()
            .filter(|(feature, _, stages)| self.has_feature(*feature) && stages.contains(&stage))
            .map(|(_, name, _)| *name)
            .collect()
    }
}

impl FromIterator<Feature> for FeatureFlags {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        iter.into_iter()
            .fold(FeatureFlags::empty(), |flags, feature| flags.with(feature))
    }
}

impl From<Feature> for FeatureFlags {
    fn from(feature: Feature) -> Self {
        FeatureFlags::empty().with(feature)
    }
}

/// Key of the fragment every stage starts from.
pub const SHARED_RESOURCE: &str = "generic.glsl";

pub fn stage_resource(dimension: Dimension, stage: ShaderStage) -> &'static str {
    match (dimension, stage) {
        (Dimension::Dim2, ShaderStage::Vertex) => "Flat2D.vert",
        (Dimension::Dim3, ShaderStage::Vertex) => "Flat3D.vert",
        (Dimension::Dim2, ShaderStage::Fragment) => "Flat.frag",
        (Dimension::Dim3, ShaderStage::Fragment) => "Flat.frag",
    }
}

/// Assembled text for one stage, before the compatibility prologue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderStageSource {
    pub stage: ShaderStage,
    pub text: String,
}

pub fn assemble(
    stage: ShaderStage,
    dimension: Dimension,
    flags: &FeatureFlags,
    bundle: &ResourceBundle,
) -> Result<ShaderStageSource> {
    let shared = bundle.get(SHARED_RESOURCE)?;
    let specific = bundle.get(stage_resource(dimension, stage))?;

    let mut text = String::with_capacity(shared.len() + specific.len() + 32);
    for name in flags.macros_for(stage) {
        // Writing into a String cannot fail
        let _ = writeln!(text, "#define {}", name);
    }
    text.push_str(shared);
    text.push_str(specific);

    Ok(ShaderStageSource { stage, text })
}
