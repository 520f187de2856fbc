//! Flat-shaded program family: a single color, optionally multiplied by a
//! texture, in 2D or 3D.

use glam::{Mat3, Mat4, Vec4};
use log::{debug, error, info};
use std::sync::Arc;

use super::capability::{CapabilitySnapshot, Profile};
use super::compat::CompatibilityShaderFactory;
use super::device::{GraphicsDevice, UniformValue};
use super::program::{
    AttributeSlot, ConstructionState, ConstructionTracker, LocationResolver, ProgramLinker,
    ShaderProgram, UniformSlot, UNRESOLVED_LOCATION,
};
use super::resources::{ensure_shader_resources, ResourceBundle, FLAT_SHADERS_GROUP};
use super::source::{assemble, Dimension, Feature, FeatureFlags, ShaderStage};
use crate::utils::error::{Result, ShaderError};

pub const POSITION_ATTRIBUTE: AttributeSlot = AttributeSlot {
    name: "position",
    location: 0,
};

pub const TEXTURE_COORDINATES_ATTRIBUTE: AttributeSlot = AttributeSlot {
    name: "textureCoordinates",
    location: 1,
};

pub const TRANSFORMATION_PROJECTION_MATRIX_UNIFORM: UniformSlot = UniformSlot {
    name: "transformationProjectionMatrix",
    location: 0,
};

pub const COLOR_UNIFORM: UniformSlot = UniformSlot {
    name: "color",
    location: 1,
};

pub const TEXTURE_DATA_UNIFORM: UniformSlot = UniformSlot {
    name: "textureData",
    location: 2,
};

/// Texture unit the `textureData` sampler reads from.
pub const TEXTURE_LAYER: u32 = 0;

/// Transformation and projection matrix, 3x3 for 2D and 4x4 for 3D.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformationProjection {
    Dim2(Mat3),
    Dim3(Mat4),
}

impl TransformationProjection {
    pub fn dimension(&self) -> Dimension {
        match self {
            TransformationProjection::Dim2(_) => Dimension::Dim2,
            TransformationProjection::Dim3(_) => Dimension::Dim3,
        }
    }
}

impl From<Mat3> for TransformationProjection {
    fn from(matrix: Mat3) -> Self {
        TransformationProjection::Dim2(matrix)
    }
}

impl From<Mat4> for TransformationProjection {
    fn from(matrix: Mat4) -> Self {
        TransformationProjection::Dim3(matrix)
    }
}

pub struct FlatShader<D: GraphicsDevice> {
    program: ShaderProgram<D>,
    dimension: Dimension,
    snapshot: CapabilitySnapshot,
    transformation_projection_matrix_uniform: i32,
    color_uniform: i32,
}

impl<D: GraphicsDevice> FlatShader<D> {
    /// Builds the program for the profile the device reports.
    pub fn new(device: Arc<D>, dimension: Dimension, flags: FeatureFlags) -> Result<Self> {
        let profile = device.profile();
        Self::with_profile(device, profile, dimension, flags)
    }

    pub fn with_profile(
        device: Arc<D>,
        profile: Profile,
        dimension: Dimension,
        flags: FeatureFlags,
    ) -> Result<Self> {
        let mut tracker = ConstructionTracker::new();
        match Self::construct(device, profile, dimension, flags, &mut tracker) {
            Ok(shader) => {
                info!(
                    "Flat {} shader ready ({}, features {:?})",
                    dimension,
                    shader.snapshot.version,
                    flags.iter().collect::<Vec<_>>()
                );
                Ok(shader)
            }
            Err(err) => {
                let reached = tracker.state();
                tracker.advance(ConstructionState::Failed);
                error!(
                    "Flat {} shader construction aborted after {:?}: {}",
                    dimension, reached, err
                );
                Err(err)
            }
        }
    }

    fn construct(
        device: Arc<D>,
        profile: Profile,
        dimension: Dimension,
        flags: FeatureFlags,
        tracker: &mut ConstructionTracker,
    ) -> Result<Self> {
        ensure_shader_resources();
        let bundle = ResourceBundle::open(FLAT_SHADERS_GROUP)?;
        let snapshot = CapabilitySnapshot::capture(device.as_ref(), profile)?;

        let vertex = assemble(ShaderStage::Vertex, dimension, &flags, &bundle)?;
        let fragment = assemble(ShaderStage::Fragment, dimension, &flags, &bundle)?;
        tracker.advance(ConstructionState::SourcesAssembled);

        let factory = CompatibilityShaderFactory::new(device.as_ref(), &bundle, &snapshot);
        let stages = vec![factory.create(vertex)?, factory.create(fragment)?];
        tracker.advance(ConstructionState::StagesCompiled);

        let resolver = location_resolver(&snapshot, &flags);
        let pending = ProgramLinker::new(device.as_ref()).attach(stages)?;
        if resolver.bind_attributes(&pending) {
            tracker.advance(ConstructionState::AttributesBound);
        }
        let handle = pending.link()?;
        tracker.advance(ConstructionState::Linked);

        let mut program =
            ShaderProgram::new(device.clone(), handle, flags, &resolver.uniform_names());
        let bindings = resolver.resolve_uniforms(device.as_ref(), handle)?;
        program.apply_bindings(&bindings);
        tracker.advance(ConstructionState::UniformsResolved);

        debug_assert!(program.is_resolved());
        let transformation_projection_matrix_uniform = program
            .uniform_location(TRANSFORMATION_PROJECTION_MATRIX_UNIFORM.name)
            .unwrap_or(UNRESOLVED_LOCATION);
        let color_uniform = program
            .uniform_location(COLOR_UNIFORM.name)
            .unwrap_or(UNRESOLVED_LOCATION);
        tracker.advance(ConstructionState::Ready);

        Ok(Self {
            program,
            dimension,
            snapshot,
            transformation_projection_matrix_uniform,
            color_uniform,
        })
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    pub fn flags(&self) -> FeatureFlags {
        self.program.flags()
    }

    pub fn snapshot(&self) -> &CapabilitySnapshot {
        &self.snapshot
    }

    pub fn program(&self) -> &ShaderProgram<D> {
        &self.program
    }

    pub fn set_transformation_projection_matrix(
        &mut self,
        matrix: impl Into<TransformationProjection>,
    ) -> Result<&mut Self> {
        let matrix = matrix.into();
        let value = match (self.dimension, matrix) {
            (Dimension::Dim2, TransformationProjection::Dim2(m)) => UniformValue::Mat3(m),
            (Dimension::Dim3, TransformationProjection::Dim3(m)) => UniformValue::Mat4(m),
            _ => {
                return Err(ShaderError::DimensionMismatch {
                    expected: self.dimension,
                    actual: matrix.dimension(),
                })
            }
        };
        self.program
            .set_uniform(self.transformation_projection_matrix_uniform, &value);
        Ok(self)
    }

    /// Color, or the texture multiplier for textured programs.
    pub fn set_color(&mut self, color: Vec4) -> &mut Self {
        self.program
            .set_uniform(self.color_uniform, &UniformValue::Vec4(color));
        self
    }

    /// Binds `texture` to the sampler's unit. Does nothing unless the program
    /// was built with [`Feature::Textured`].
    pub fn set_texture(&mut self, texture: &D::Texture) -> &mut Self {
        if self.program.flags().has_feature(Feature::Textured) {
            self.program.device().bind_texture(TEXTURE_LAYER, texture);
        } else {
            debug!("Ignoring texture on untextured flat {} shader", self.dimension);
        }
        self
    }
}

fn location_resolver<'a>(snapshot: &'a CapabilitySnapshot, flags: &FeatureFlags) -> LocationResolver<'a> {
    let resolver = LocationResolver::new(snapshot)
        .attribute(POSITION_ATTRIBUTE)
        .uniform(TRANSFORMATION_PROJECTION_MATRIX_UNIFORM)
        .uniform(COLOR_UNIFORM);

    if flags.has_feature(Feature::Textured) {
        resolver
            .attribute(TEXTURE_COORDINATES_ATTRIBUTE)
            .sampler(TEXTURE_DATA_UNIFORM, TEXTURE_LAYER)
            // Opaque white so an unconfigured program shows the texture
            .initial_value(COLOR_UNIFORM.name, UniformValue::Vec4(Vec4::ONE))
    } else {
        resolver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::capability::{Extension, StaticContext, Version};
    use crate::render::mock::{Call, MockDevice};

    fn device(version: Version) -> Arc<MockDevice> {
        Arc::new(MockDevice::new(StaticContext::new(version)))
    }

    fn textured() -> FeatureFlags {
        FeatureFlags::from(Feature::Textured)
    }

    fn uniforms(shader: &FlatShader<MockDevice>) -> Vec<(&'static str, i32)> {
        let mut uniforms: Vec<_> = shader.program().uniforms().collect();
        uniforms.sort();
        uniforms
    }

    #[test]
    fn test_scenario_legacy_textured_2d() {
        let device = device(Version::GL320);
        let shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured())
            .unwrap();

        let position = device
            .position(|call| {
                *call
                    == Call::BindAttributeLocation {
                        location: 0,
                        name: "position".into(),
                    }
            })
            .expect("position bound");
        let coordinates = device
            .position(|call| {
                *call
                    == Call::BindAttributeLocation {
                        location: 1,
                        name: "textureCoordinates".into(),
                    }
            })
            .expect("texture coordinates bound");
        let link = device
            .position(|call| matches!(call, Call::LinkProgram(_)))
            .expect("program linked");
        assert!(position < coordinates && coordinates < link);

        let sources = device.compiled_sources();
        assert_eq!(sources.len(), 2);
        for (_, source) in &sources {
            assert!(source.contains("#define TEXTURED\n"));
        }

        let texture_data = shader
            .program()
            .uniform_location(TEXTURE_DATA_UNIFORM.name)
            .unwrap();
        assert!(texture_data >= 0);
        assert!(device.calls().contains(&Call::SetUniform {
            location: texture_data,
            value: UniformValue::Int(TEXTURE_LAYER as i32),
        }));
        assert!(shader.program().is_resolved());
    }

    #[test]
    fn test_scenario_untextured_3d_ignores_texture() {
        let device = device(Version::GL320);
        let mut shader =
            FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim3, FeatureFlags::empty())
                .unwrap();

        for (_, source) in device.compiled_sources() {
            assert!(!source.contains("#define TEXTURED"));
        }
        assert!(device
            .position(|call| matches!(call, Call::BindAttributeLocation { name, .. } if name == "textureCoordinates"))
            .is_none());

        let before = uniforms(&shader);
        device.clear_calls();
        shader.set_texture(&42);
        assert!(device.calls().is_empty());
        assert_eq!(uniforms(&shader), before);
        assert_eq!(shader.program().uniform_location(TEXTURE_DATA_UNIFORM.name), None);
    }

    #[test]
    fn test_scenario_explicit_locations_skip_queries() {
        let device = device(Version::GL450);
        let shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured())
            .unwrap();

        let calls = device.calls();
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::BindAttributeLocation { .. })));
        assert!(!calls.iter().any(|call| matches!(call, Call::UniformLocation(_))));
        assert!(!calls.iter().any(|call| matches!(call, Call::SetUniform { .. })));

        assert_eq!(
            uniforms(&shader),
            vec![
                (COLOR_UNIFORM.name, COLOR_UNIFORM.location),
                (TEXTURE_DATA_UNIFORM.name, TEXTURE_DATA_UNIFORM.location),
                (
                    TRANSFORMATION_PROJECTION_MATRIX_UNIFORM.name,
                    TRANSFORMATION_PROJECTION_MATRIX_UNIFORM.location
                ),
            ]
        );
    }

    #[test]
    fn test_uniform_locations_without_attrib_locations() {
        let device = Arc::new(MockDevice::new(
            StaticContext::new(Version::GL320).with_extension(Extension::ExplicitUniformLocation),
        ));
        let shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured())
            .unwrap();

        let calls = device.calls();
        assert!(!calls.iter().any(|call| matches!(call, Call::UniformLocation(_))));
        assert!(calls.contains(&Call::BindAttributeLocation {
            location: 0,
            name: "position".into(),
        }));
        assert!(calls.contains(&Call::BindAttributeLocation {
            location: 1,
            name: "textureCoordinates".into(),
        }));

        // No explicit texture binding, so the sampler is pointed at its layer
        let sets: Vec<_> = calls
            .iter()
            .filter(|call| matches!(call, Call::SetUniform { .. }))
            .collect();
        assert_eq!(
            sets,
            vec![&Call::SetUniform {
                location: TEXTURE_DATA_UNIFORM.location,
                value: UniformValue::Int(TEXTURE_LAYER as i32),
            }]
        );
        assert_eq!(
            shader.program().uniform_location(TEXTURE_DATA_UNIFORM.name),
            Some(TEXTURE_DATA_UNIFORM.location)
        );

        for (_, source) in device.compiled_sources() {
            assert!(source.contains("#define DISABLE_GL_ARB_explicit_attrib_location\n"));
            assert!(!source.contains("#define DISABLE_GL_ARB_explicit_uniform_location"));
        }
    }

    #[test]
    fn test_texture_binding_without_uniform_locations() {
        let device = Arc::new(MockDevice::new(
            StaticContext::new(Version::GL320).with_extension(Extension::ShadingLanguage420Pack),
        ));
        let shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured())
            .unwrap();

        let calls = device.calls();
        for name in [
            TRANSFORMATION_PROJECTION_MATRIX_UNIFORM.name,
            COLOR_UNIFORM.name,
            TEXTURE_DATA_UNIFORM.name,
        ] {
            assert!(calls.contains(&Call::UniformLocation(name.into())));
        }
        assert!(!calls.iter().any(|call| matches!(call, Call::SetUniform { .. })));
        assert!(shader.program().is_resolved());

        let sources = device.compiled_sources();
        assert_eq!(sources.len(), 2);
        for (_, source) in &sources {
            assert!(!source.contains("#define DISABLE_GL_ARB_shading_language_420pack"));
            assert!(source.contains("#define DISABLE_GL_ARB_explicit_uniform_location\n"));
        }
    }

    #[test]
    fn test_scenario_unsupported_preferences() {
        let device = device(Version::GL450);
        let result = FlatShader::with_profile(device.clone(), Profile::Embedded, Dimension::Dim2, textured());
        assert!(matches!(result, Err(ShaderError::Configuration { .. })));
        assert!(device.calls().is_empty());
    }

    #[test]
    fn test_embedded_profile_defaults() {
        let device = device(Version::GLES300);
        let shader = FlatShader::new(device.clone(), Dimension::Dim2, textured()).unwrap();
        assert_eq!(shader.snapshot().profile, Profile::Embedded);
        assert_eq!(shader.snapshot().version, Version::GLES300);

        let calls = device.calls();
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::BindAttributeLocation { .. })));

        let color = shader.program().uniform_location(COLOR_UNIFORM.name).unwrap();
        let texture_data = shader
            .program()
            .uniform_location(TEXTURE_DATA_UNIFORM.name)
            .unwrap();
        assert!(calls.contains(&Call::SetUniform {
            location: color,
            value: UniformValue::Vec4(Vec4::ONE),
        }));
        assert!(calls.contains(&Call::SetUniform {
            location: texture_data,
            value: UniformValue::Int(0),
        }));
        for (_, source) in device.compiled_sources() {
            assert!(source.starts_with("#version 300 es\n"));
        }
    }

    #[test]
    fn test_embedded_untextured_leaves_color_alone() {
        let device = device(Version::GLES200);
        let shader = FlatShader::new(device.clone(), Dimension::Dim3, FeatureFlags::empty()).unwrap();
        assert_eq!(shader.snapshot().version, Version::GLES200);
        assert!(device.calls().contains(&Call::BindAttributeLocation {
            location: 0,
            name: "position".into(),
        }));
        assert!(!device
            .calls()
            .iter()
            .any(|call| matches!(call, Call::SetUniform { .. })));
    }

    #[test]
    fn test_compile_failure_releases_stages() {
        let device = Arc::new(
            MockDevice::new(StaticContext::new(Version::GL320))
                .failing_compile(ShaderStage::Fragment, "0:7: 'sampler2D' : syntax error"),
        );
        let result = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured());
        assert!(matches!(
            result,
            Err(ShaderError::Compilation { stage: ShaderStage::Fragment, .. })
        ));

        let calls = device.calls();
        let created = calls
            .iter()
            .filter(|call| matches!(call, Call::CreateShader(_)))
            .count();
        let deleted = calls
            .iter()
            .filter(|call| matches!(call, Call::DeleteShader(_)))
            .count();
        assert_eq!(created, 2);
        assert_eq!(deleted, 2);
        assert!(!calls.iter().any(|call| matches!(call, Call::CreateProgram(_))));
    }

    #[test]
    fn test_link_failure_releases_program() {
        let device = Arc::new(
            MockDevice::new(StaticContext::new(Version::GL320)).failing_link("error: varying mismatch"),
        );
        let result = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim3, textured());
        match result {
            Err(ShaderError::Linking(log)) => assert_eq!(log, "error: varying mismatch"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("link should fail"),
        }
        assert!(device
            .calls()
            .iter()
            .any(|call| matches!(call, Call::DeleteProgram(_))));
    }

    #[test]
    fn test_inactive_uniform_aborts_construction() {
        let device = Arc::new(
            MockDevice::new(StaticContext::new(Version::GL210)).hiding_uniform(COLOR_UNIFORM.name),
        );
        let result = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, FeatureFlags::empty());
        assert!(matches!(result, Err(ShaderError::UniformNotFound(name)) if name == "color"));
        assert!(matches!(device.calls().last(), Some(Call::DeleteProgram(_))));
    }

    #[test]
    fn test_uniform_setters() {
        let device = device(Version::GL320);
        let mut shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, textured())
            .unwrap();
        device.clear_calls();

        let color = Vec4::new(0.2, 0.4, 0.6, 1.0);
        shader
            .set_color(color)
            .set_transformation_projection_matrix(Mat3::IDENTITY)
            .unwrap()
            .set_texture(&9);

        let color_location = shader.program().uniform_location(COLOR_UNIFORM.name).unwrap();
        let matrix_location = shader
            .program()
            .uniform_location(TRANSFORMATION_PROJECTION_MATRIX_UNIFORM.name)
            .unwrap();
        assert_eq!(
            device.calls(),
            vec![
                Call::SetUniform {
                    location: color_location,
                    value: UniformValue::Vec4(color),
                },
                Call::SetUniform {
                    location: matrix_location,
                    value: UniformValue::Mat3(Mat3::IDENTITY),
                },
                Call::BindTexture {
                    unit: TEXTURE_LAYER,
                    texture: 9,
                },
            ]
        );

        let err = shader
            .set_transformation_projection_matrix(Mat4::IDENTITY)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ShaderError::DimensionMismatch {
                expected: Dimension::Dim2,
                actual: Dimension::Dim3,
            }
        ));
    }

    #[test]
    fn test_construction_is_reproducible() {
        let first = device(Version::GL300);
        let second = device(Version::GL300);
        let _a = FlatShader::with_profile(first.clone(), Profile::Desktop, Dimension::Dim3, textured()).unwrap();
        let _b = FlatShader::with_profile(second.clone(), Profile::Desktop, Dimension::Dim3, textured()).unwrap();
        assert_eq!(first.compiled_sources(), second.compiled_sources());
        assert_eq!(first.calls(), second.calls());
    }

    #[test]
    fn test_drop_deletes_program() {
        let device = device(Version::GL320);
        let shader = FlatShader::with_profile(device.clone(), Profile::Desktop, Dimension::Dim2, FeatureFlags::empty())
            .unwrap();
        let handle = shader.program().handle();
        drop(shader);
        assert_eq!(device.calls().last(), Some(&Call::DeleteProgram(handle)));
    }
}
