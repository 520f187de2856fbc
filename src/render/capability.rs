//! Context capability queries and the once-per-construction snapshot.
//!
//! Everything the pipeline needs to know about the running context is
//! collected into a [`CapabilitySnapshot`] before any source is assembled, so
//! a single construction never observes two different answers.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::error::{Result, ShaderError};

/// Context versions that carry a shading language revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Version {
    GL210,
    GL300,
    GL310,
    GL320,
    GL330,
    GL400,
    GL410,
    GL420,
    GL430,
    GL440,
    GL450,
    GLES200,
    GLES300,
    GLES310,
}

impl Version {
    pub fn major_minor(self) -> (u32, u32) {
        match self {
            Version::GL210 => (2, 1),
            Version::GL300 => (3, 0),
            Version::GL310 => (3, 1),
            Version::GL320 => (3, 2),
            Version::GL330 => (3, 3),
            Version::GL400 => (4, 0),
            Version::GL410 => (4, 1),
            Version::GL420 => (4, 2),
            Version::GL430 => (4, 3),
            Version::GL440 => (4, 4),
            Version::GL450 => (4, 5),
            Version::GLES200 => (2, 0),
            Version::GLES300 => (3, 0),
            Version::GLES310 => (3, 1),
        }
    }

    pub fn is_embedded(self) -> bool {
        matches!(self, Version::GLES200 | Version::GLES300 | Version::GLES310)
    }

    /// Text following `#version` for this revision.
    pub fn glsl_directive(self) -> &'static str {
        match self {
            Version::GL210 => "120",
            Version::GL300 => "130",
            Version::GL310 => "140",
            Version::GL320 => "150",
            Version::GL330 => "330",
            Version::GL400 => "400",
            Version::GL410 => "410",
            Version::GL420 => "420",
            Version::GL430 => "430",
            Version::GL440 => "440",
            Version::GL450 => "450",
            Version::GLES200 => "100",
            Version::GLES300 => "300 es",
            Version::GLES310 => "310 es",
        }
    }

    /// Ordering only holds within one family; desktop and embedded never compare.
    pub fn at_least(self, other: Version) -> bool {
        self.is_embedded() == other.is_embedded() && self.major_minor() >= other.major_minor()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor) = self.major_minor();
        if self.is_embedded() {
            write!(f, "OpenGL ES {}.{}", major, minor)
        } else {
            write!(f, "OpenGL {}.{}", major, minor)
        }
    }
}

/// Optional context features the flat shaders adapt to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extension {
    #[serde(rename = "GL_ARB_explicit_attrib_location")]
    ExplicitAttribLocation,
    #[serde(rename = "GL_ARB_shading_language_420pack")]
    ShadingLanguage420Pack,
    #[serde(rename = "GL_ARB_explicit_uniform_location")]
    ExplicitUniformLocation,
}

impl Extension {
    pub const TRACKED: [Extension; 3] = [
        Extension::ExplicitAttribLocation,
        Extension::ShadingLanguage420Pack,
        Extension::ExplicitUniformLocation,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Extension::ExplicitAttribLocation => "GL_ARB_explicit_attrib_location",
            Extension::ShadingLanguage420Pack => "GL_ARB_shading_language_420pack",
            Extension::ExplicitUniformLocation => "GL_ARB_explicit_uniform_location",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::TRACKED.into_iter().find(|ext| ext.name() == name)
    }

    /// Lowest shading language revision the extension can be enabled in.
    pub fn minimal_version(self) -> Version {
        match self {
            Extension::ExplicitAttribLocation => Version::GL210,
            Extension::ShadingLanguage420Pack => Version::GL300,
            Extension::ExplicitUniformLocation => Version::GL210,
        }
    }

    /// First context version that ships the extension as core functionality.
    pub fn core_version(self) -> Version {
        match self {
            Extension::ExplicitAttribLocation => Version::GL330,
            Extension::ShadingLanguage420Pack => Version::GL420,
            Extension::ExplicitUniformLocation => Version::GL430,
        }
    }
}

/// Query surface of a rendering context.
pub trait CapabilityContext {
    fn is_version_supported(&self, version: Version) -> bool;

    /// Whether the context lists the extension, regardless of version.
    fn is_extension_advertised(&self, extension: Extension) -> bool;

    fn profile(&self) -> Profile;

    fn is_extension_supported(&self, extension: Extension, version: Version) -> bool {
        version.at_least(extension.minimal_version())
            && (self.is_version_supported(extension.core_version())
                || self.is_extension_advertised(extension))
    }

    fn supported_version(&self, candidates: &[Version]) -> Option<Version> {
        candidates
            .iter()
            .copied()
            .find(|version| self.is_version_supported(*version))
    }
}

/// Picks the first entry of `preferences` the context supports.
pub fn select_version<C>(preferences: &[Version], context: &C) -> Result<Version>
where
    C: CapabilityContext + ?Sized,
{
    context
        .supported_version(preferences)
        .ok_or_else(|| ShaderError::Configuration {
            candidates: preferences.to_vec(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Desktop,
    Embedded,
}

const DESKTOP_PREFERENCES: [Version; 4] =
    [Version::GL320, Version::GL310, Version::GL300, Version::GL210];
const EMBEDDED_PREFERENCES: [Version; 2] = [Version::GLES300, Version::GLES200];

impl Profile {
    /// Acceptable versions, most capable first. The last entry is the baseline
    /// every context of the family provides.
    pub fn preference_list(self) -> &'static [Version] {
        match self {
            Profile::Desktop => &DESKTOP_PREFERENCES,
            Profile::Embedded => &EMBEDDED_PREFERENCES,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Desktop => f.write_str("desktop"),
            Profile::Embedded => f.write_str("embedded"),
        }
    }
}

/// Answers captured from the context once per construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    pub profile: Profile,
    pub version: Version,
    /// Attribute locations come from `layout(location)` in source.
    pub explicit_attrib_location: bool,
    /// Uniform locations come from `layout(location)` in source.
    pub explicit_uniform_location: bool,
    /// Sampler units come from `layout(binding)` in source.
    pub explicit_texture_layer: bool,
    /// Uniforms may carry `= value` initializers in source.
    pub uniform_initializers: bool,
    /// Tracked extensions the compiled source must not enable.
    pub disabled_extensions: Vec<Extension>,
}

impl CapabilitySnapshot {
    pub fn capture<C>(context: &C, profile: Profile) -> Result<Self>
    where
        C: CapabilityContext + ?Sized,
    {
        let version = select_version(profile.preference_list(), context)?;

        let snapshot = match profile {
            Profile::Desktop => {
                let usable = |extension| context.is_extension_supported(extension, version);
                Self {
                    profile,
                    version,
                    explicit_attrib_location: usable(Extension::ExplicitAttribLocation),
                    explicit_uniform_location: usable(Extension::ExplicitUniformLocation),
                    explicit_texture_layer: usable(Extension::ShadingLanguage420Pack),
                    uniform_initializers: true,
                    disabled_extensions: Extension::TRACKED
                        .into_iter()
                        .filter(|extension| !usable(*extension))
                        .collect(),
                }
            }
            Profile::Embedded => Self {
                profile,
                version,
                explicit_attrib_location: version.at_least(Version::GLES300),
                explicit_uniform_location: false,
                explicit_texture_layer: false,
                uniform_initializers: false,
                disabled_extensions: Vec::new(),
            },
        };

        debug!(
            "Negotiated {} ({} profile): attrib locations {}, uniform locations {}, texture binding {}",
            snapshot.version,
            snapshot.profile,
            snapshot.explicit_attrib_location,
            snapshot.explicit_uniform_location,
            snapshot.explicit_texture_layer,
        );
        Ok(snapshot)
    }
}

/// Fixed capability description, usable without a live context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticContext {
    pub version: Version,
    #[serde(default)]
    pub extensions: Vec<Extension>,
}

impl StaticContext {
    pub fn new(version: Version) -> Self {
        Self {
            version,
            extensions: Vec::new(),
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Self {
        if !self.extensions.contains(&extension) {
            self.extensions.push(extension);
        }
        self
    }
}

impl Default for StaticContext {
    fn default() -> Self {
        Self::new(Version::GL210)
    }
}

impl CapabilityContext for StaticContext {
    fn is_version_supported(&self, version: Version) -> bool {
        self.version.at_least(version)
    }

    fn is_extension_advertised(&self, extension: Extension) -> bool {
        self.extensions.contains(&extension)
    }

    fn profile(&self) -> Profile {
        if self.version.is_embedded() {
            Profile::Embedded
        } else {
            Profile::Desktop
        }
    }
}
