//! Meshweave - headless Wavefront OBJ/MTL model loader
//!
//! Loads a mesh and its material libraries from disk, assembles
//! renderer-agnostic vertex buffers, and reports a per-part summary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use meshweave_assets::{
    parse_obj, AttributeData, DiskSource, MeshLoader, ModelPart, SoftwareBackend, VertexBuffers,
};

struct Options {
    model: String,
    dump: bool,
    wait: bool,
}

fn parse_args() -> Result<Options> {
    let mut model = None;
    let mut dump = false;
    let mut wait = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dump" => dump = true,
            "--wait" => wait = true,
            other if other.starts_with("--") => bail!("unknown option: {}", other),
            other => model = Some(other.to_string()),
        }
    }
    let model = model.context("usage: meshweave <model.obj> [--dump] [--wait]")?;
    Ok(Options { model, dump, wait })
}

fn describe(attribute: &AttributeData) -> String {
    match attribute {
        AttributeData::PerVertex { data, components } => {
            format!("{}x{}", data.len() / components, components)
        }
        AttributeData::Constant(value) => format!("const {:?}", value),
    }
}

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let options = parse_args()?;

    if options.dump {
        let text = std::fs::read_to_string(&options.model)
            .with_context(|| format!("failed to read {}", options.model))?;
        let model = parse_obj(&text)?;
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    let loader = MeshLoader::new(
        Arc::new(DiskSource::new(".")),
        Arc::new(SoftwareBackend::new(".")),
    );

    let parts: Vec<ModelPart<VertexBuffers>> = runtime
        .block_on(loader.load_model(&options.model))
        .with_context(|| format!("failed to load {}", options.model))?;

    for (index, part) in parts.iter().enumerate() {
        info!(
            "part {}: {} vertices, position {}, texcoord {}, normal {}, color {}, tangent {}, diffuse {:?}",
            index,
            part.buffers.vertex_count(),
            describe(&part.buffers.position),
            describe(&part.buffers.texcoord),
            describe(&part.buffers.normal),
            describe(&part.buffers.color),
            describe(&part.buffers.tangent),
            part.material.diffuse,
        );
    }

    if options.wait {
        runtime.block_on(async {
            for (index, part) in parts.iter().enumerate() {
                let maps = [
                    ("diffuse", &part.material.diffuse_map),
                    ("specular", &part.material.specular_map),
                    ("normal", &part.material.normal_map),
                ];
                for (name, handle) in maps {
                    if let Err(e) = handle.wait_ready().await {
                        warn!("part {}: {} map not available: {}", index, name, e);
                    }
                }
            }
        });
        info!("texture loading settled");
    }

    Ok(())
}
