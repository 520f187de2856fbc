//! Prints the exact per-stage source a flat shader would be built from,
//! negotiated against a configured capability description.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::info;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

use flatshade::render::capability::CapabilitySnapshot;
use flatshade::render::compat::final_source;
use flatshade::render::resources::{ensure_shader_resources, ResourceBundle, FLAT_SHADERS_GROUP};
use flatshade::render::source::assemble;
use flatshade::{Dimension, Feature, FeatureFlags, ShaderConfig, ShaderError, ShaderStage};

#[derive(Parser, Debug)]
#[command(name = "flatshade", version)]
struct Cli {
    /// TOML config with the profile selection and a `[context]` description.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = DimensionArg::D2)]
    dimension: DimensionArg,

    /// Requested feature; repeat for several.
    #[arg(long = "feature", value_parser = parse_feature)]
    features: Vec<Feature>,

    /// Only print this stage.
    #[arg(long, value_enum)]
    stage: Option<StageArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    #[value(name = "2d")]
    D2,
    #[value(name = "3d")]
    D3,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::D2 => Dimension::Dim2,
            DimensionArg::D3 => Dimension::Dim3,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StageArg {
    Vertex,
    Fragment,
}

impl From<StageArg> for ShaderStage {
    fn from(arg: StageArg) -> Self {
        match arg {
            StageArg::Vertex => ShaderStage::Vertex,
            StageArg::Fragment => ShaderStage::Fragment,
        }
    }
}

fn parse_feature(s: &str) -> Result<Feature, String> {
    s.parse().map_err(|e: ShaderError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ShaderConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ShaderConfig::default(),
    };
    SimpleLogger::new().with_level(config.level_filter()?).init()?;

    let context = config.static_context();
    let profile = config.profile.resolve(&context);
    info!("Negotiating {} profile against {}", profile, context.version);

    let snapshot = CapabilitySnapshot::capture(&context, profile)
        .context("No usable shading language version for the configured context")?;

    ensure_shader_resources();
    let bundle = ResourceBundle::open(FLAT_SHADERS_GROUP)?;

    let dimension = Dimension::from(cli.dimension);
    let flags: FeatureFlags = cli.features.iter().copied().collect();
    let stages = match cli.stage {
        Some(stage) => vec![ShaderStage::from(stage)],
        None => vec![ShaderStage::Vertex, ShaderStage::Fragment],
    };

    println!("// version: {}", snapshot.version);
    println!("// explicit attribute locations: {}", snapshot.explicit_attrib_location);
    println!("// explicit uniform locations: {}", snapshot.explicit_uniform_location);
    println!("// explicit texture binding: {}", snapshot.explicit_texture_layer);
    println!("// uniform initializers: {}", snapshot.uniform_initializers);

    for stage in stages {
        let source = assemble(stage, dimension, &flags, &bundle)?;
        let text = final_source(&bundle, &snapshot, &source)
            .with_context(|| format!("Failed to build {} stage", stage))?;
        println!("// ---- {} {} stage ----", dimension, stage);
        println!("{}", text);
    }

    Ok(())
}
