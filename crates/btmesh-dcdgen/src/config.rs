//! Generator configuration loading

use anyhow::Result;
use btmesh_dcd_core::VmidScheme;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub composition: CompositionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratorConfig {
    /// How vendor model keys are computed when merging
    #[serde(default)]
    pub vmid_scheme: VmidScheme,
    /// File name of the generated header
    #[serde(default = "default_header_name")]
    pub header_name: String,
    /// File name of the generated source
    #[serde(default = "default_source_name")]
    pub source_name: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            vmid_scheme: VmidScheme::default(),
            header_name: default_header_name(),
            source_name: default_source_name(),
        }
    }
}

fn default_header_name() -> String {
    "sl_btmesh_dcd.h".to_string()
}

fn default_source_name() -> String {
    "sl_btmesh_dcd.c".to_string()
}

/// Composition Data Page 0 fields that fragments do not describe
#[derive(Debug, Clone, Deserialize)]
pub struct CompositionConfig {
    /// Minimum number of replay protection list entries
    #[serde(default = "default_crpl")]
    pub crpl: u16,
    /// Relay/proxy/friend/low power feature bits
    #[serde(default)]
    pub features: u16,
}

impl Default for CompositionConfig {
    fn default() -> Self {
        Self {
            crpl: default_crpl(),
            features: 0,
        }
    }
}

fn default_crpl() -> u16 {
    32
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("btmesh-dcdgen.toml")).unwrap();

        assert_eq!(config.generator.vmid_scheme, VmidScheme::Legacy);
        assert_eq!(config.generator.header_name, "sl_btmesh_dcd.h");
        assert_eq!(config.generator.source_name, "sl_btmesh_dcd.c");
        assert_eq!(config.composition.crpl, 32);
        assert_eq!(config.composition.features, 0);
    }

    #[test]
    fn test_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("btmesh-dcdgen.toml");
        std::fs::write(
            &path,
            r#"
[generator]
vmid_scheme = "packed"

[composition]
features = 3
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.generator.vmid_scheme, VmidScheme::Packed);
        assert_eq!(config.generator.header_name, "sl_btmesh_dcd.h");
        assert_eq!(config.composition.crpl, 32);
        assert_eq!(config.composition.features, 3);
    }

    #[test]
    fn test_invalid_scheme_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("btmesh-dcdgen.toml");
        std::fs::write(&path, "[generator]\nvmid_scheme = \"shifted\"\n").unwrap();

        assert!(load_config(&path).is_err());
    }
}
