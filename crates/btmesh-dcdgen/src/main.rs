//! btmesh-dcdgen - Bluetooth Mesh Device Composition Data generator
//!
//! Merges a `.btmeshconf` file and the `.dcd` fragments next to it into one
//! composition data description and writes the firmware header/source pair.

mod config;
mod discovery;
mod generate;
mod render;

use anyhow::Result;
use btmesh_dcd_core::VmidScheme;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "btmesh-dcdgen")]
#[command(about = "BLE Mesh Device Composition Data code generator")]
#[command(version)]
struct Args {
    /// Input directory or .btmeshconf file
    #[arg(default_value = ".")]
    input: PathBuf,

    /// Output directory for the generated files
    #[arg(default_value = ".")]
    output: PathBuf,

    /// Path to generator configuration file
    #[arg(short, long, default_value = "btmesh-dcdgen.toml")]
    config: PathBuf,

    /// Vendor model key scheme (legacy, packed)
    #[arg(long)]
    vmid_scheme: Option<VmidScheme>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("btmesh-dcdgen v{}", env!("CARGO_PKG_VERSION"));

    let mut config = config::load_config(&args.config)?;

    if let Some(scheme) = args.vmid_scheme {
        config.generator.vmid_scheme = scheme;
    }

    let inputs = discovery::discover(&args.input)?;
    info!(
        config = %inputs.config.display(),
        fragments = inputs.fragments.len(),
        vmid_scheme = %config.generator.vmid_scheme,
        "Inputs discovered"
    );

    let dcd = generate::build_dcd(&inputs, config.generator.vmid_scheme)?;
    let source_path = generate::write_outputs(&dcd, &config, &args.output)?;

    let written = std::fs::canonicalize(&source_path).unwrap_or(source_path);
    info!("DCD written to {}", written.display());

    Ok(())
}
