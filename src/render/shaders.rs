// shaders.rs - Shader text shipped with the crate

/// Flat shader sources, registered as the `FlatShaders` resource group
pub mod flat_shaders {
    /// Bridges GLSL 1.20 / ES 1.00 onto the modern vocabulary used below
    pub const COMPATIBILITY_SRC: &str = r#"
#if defined(GL_ES) && __VERSION__ >= 300
#define MODERN_GLSL
#define EXPLICIT_ATTRIB_LOCATION
#elif !defined(GL_ES) && __VERSION__ >= 130
#define MODERN_GLSL
#endif

#if !defined(GL_ES) && defined(GL_ARB_explicit_attrib_location) && !defined(DISABLE_GL_ARB_explicit_attrib_location)
#extension GL_ARB_explicit_attrib_location: enable
#define EXPLICIT_ATTRIB_LOCATION
#endif

#if !defined(GL_ES) && defined(GL_ARB_shading_language_420pack) && !defined(DISABLE_GL_ARB_shading_language_420pack)
#extension GL_ARB_shading_language_420pack: enable
#define EXPLICIT_TEXTURE_LAYER
#endif

#if !defined(GL_ES) && defined(GL_ARB_explicit_uniform_location) && !defined(DISABLE_GL_ARB_explicit_uniform_location)
#extension GL_ARB_explicit_uniform_location: enable
#define EXPLICIT_UNIFORM_LOCATION
#endif

#if !defined(GL_ES) && __VERSION__ < 130
#define lowp
#define mediump
#define highp
#endif

#if defined(GL_ES) && defined(FRAGMENT_STAGE)
precision mediump float;
#endif

#ifndef MODERN_GLSL
#ifdef VERTEX_STAGE
#define in attribute
#define out varying
#else
#define in varying
#define fragmentColor gl_FragColor
#endif
#define texture texture2D
#endif
"#;

    /// Locations shared by every stage
    pub const GENERIC_SRC: &str = r#"
#define POSITION_ATTRIBUTE_LOCATION 0
#define TEXTURECOORDINATES_ATTRIBUTE_LOCATION 1
#define TRANSFORMATION_PROJECTION_MATRIX_UNIFORM_LOCATION 0
#define COLOR_UNIFORM_LOCATION 1
#define TEXTURE_DATA_UNIFORM_LOCATION 2
#define TEXTURE_LAYER 0
"#;

    pub const FLAT_2D_VERTEX_SRC: &str = r#"
#ifdef EXPLICIT_UNIFORM_LOCATION
layout(location = TRANSFORMATION_PROJECTION_MATRIX_UNIFORM_LOCATION)
#endif
uniform highp mat3 transformationProjectionMatrix
#ifndef GL_ES
    = mat3(1.0)
#endif
    ;

#ifdef EXPLICIT_ATTRIB_LOCATION
layout(location = POSITION_ATTRIBUTE_LOCATION)
#endif
in highp vec2 position;

#ifdef TEXTURED
#ifdef EXPLICIT_ATTRIB_LOCATION
layout(location = TEXTURECOORDINATES_ATTRIBUTE_LOCATION)
#endif
in mediump vec2 textureCoordinates;

out mediump vec2 interpolatedTextureCoordinates;
#endif

void main() {
    gl_Position.xywz = vec4(transformationProjectionMatrix*vec3(position, 1.0), 0.0);

    #ifdef TEXTURED
    interpolatedTextureCoordinates = textureCoordinates;
    #endif
}
"#;

    pub const FLAT_3D_VERTEX_SRC: &str = r#"
#ifdef EXPLICIT_UNIFORM_LOCATION
layout(location = TRANSFORMATION_PROJECTION_MATRIX_UNIFORM_LOCATION)
#endif
uniform highp mat4 transformationProjectionMatrix
#ifndef GL_ES
    = mat4(1.0)
#endif
    ;

#ifdef EXPLICIT_ATTRIB_LOCATION
layout(location = POSITION_ATTRIBUTE_LOCATION)
#endif
in highp vec4 position;

#ifdef TEXTURED
#ifdef EXPLICIT_ATTRIB_LOCATION
layout(location = TEXTURECOORDINATES_ATTRIBUTE_LOCATION)
#endif
in mediump vec2 textureCoordinates;

out mediump vec2 interpolatedTextureCoordinates;
#endif

void main() {
    gl_Position = transformationProjectionMatrix*position;

    #ifdef TEXTURED
    interpolatedTextureCoordinates = textureCoordinates;
    #endif
}
"#;

    /// Fragment stage for both dimensions
    pub const FLAT_FRAGMENT_SRC: &str = r#"
#ifdef EXPLICIT_UNIFORM_LOCATION
layout(location = COLOR_UNIFORM_LOCATION)
#endif
uniform lowp vec4 color
#ifndef GL_ES
    = vec4(1.0)
#endif
    ;

#ifdef TEXTURED
#ifdef EXPLICIT_TEXTURE_LAYER
layout(binding = TEXTURE_LAYER)
#endif
#ifdef EXPLICIT_UNIFORM_LOCATION
layout(location = TEXTURE_DATA_UNIFORM_LOCATION)
#endif
uniform lowp sampler2D textureData;

in mediump vec2 interpolatedTextureCoordinates;
#endif

#ifdef MODERN_GLSL
out lowp vec4 fragmentColor;
#endif

void main() {
    #ifdef TEXTURED
    fragmentColor = color*texture(textureData, interpolatedTextureCoordinates);
    #else
    fragmentColor = color;
    #endif
}
"#;

    pub const ENTRIES: [(&str, &str); 5] = [
        ("compatibility.glsl", COMPATIBILITY_SRC),
        ("generic.glsl", GENERIC_SRC),
        ("Flat2D.vert", FLAT_2D_VERTEX_SRC),
        ("Flat3D.vert", FLAT_3D_VERTEX_SRC),
        ("Flat.frag", FLAT_FRAGMENT_SRC),
    ];
}
