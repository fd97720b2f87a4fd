//! The generator pipeline: load, fold, validate, finalize, render, write

use anyhow::{bail, Context, Result};
use btmesh_dcd_core::{Chunk, ConfigRecord, Dcd, VmidScheme};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::Config;
use crate::discovery::Inputs;
use crate::render;

/// Build the finalized DCD from the discovered inputs
///
/// Group conflicts are logged one per line; the returned error only
/// carries their count.
pub fn build_dcd(inputs: &Inputs, scheme: VmidScheme) -> Result<Dcd> {
    let config = ConfigRecord::from_file(&inputs.config)
        .with_context(|| format!("Failed to load {}", inputs.config.display()))?;
    let mut dcd = Dcd::from_record(&config.composition_data)
        .with_context(|| format!("Invalid composition data in {}", inputs.config.display()))?
        .with_vmid_scheme(scheme);

    info!(
        path = %inputs.config.display(),
        elements = dcd.total_elements(),
        "Loaded composition data"
    );

    for path in &inputs.fragments {
        let chunk = Chunk::from_file(path)
            .with_context(|| format!("Failed to load fragment {}", path.display()))?;
        dcd.add_chunk(chunk);
    }

    if let Err(err) = dcd.validate() {
        for conflict in &err.conflicts {
            error!("{}", conflict);
        }
        bail!("Validation failed: {} group conflict(s)", err.conflicts.len());
    }

    dcd.finalize();
    Ok(dcd)
}

/// Render the header/source pair into `output`, returning the source path
///
/// Both files are rendered before either is written.
pub fn write_outputs(dcd: &Dcd, config: &Config, output: &Path) -> Result<PathBuf> {
    let generator = &config.generator;
    let header = render::render_header(dcd, &generator.header_name)?;
    let source = render::render_source(dcd, &config.composition, &generator.header_name)?;

    let header_path = output.join(&generator.header_name);
    let source_path = output.join(&generator.source_name);

    std::fs::write(&header_path, header)
        .with_context(|| format!("Failed to write {}", header_path.display()))?;
    std::fs::write(&source_path, source)
        .with_context(|| format!("Failed to write {}", source_path.display()))?;

    Ok(source_path)
}
