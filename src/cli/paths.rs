//! Configuration directory and engine configuration lookup

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::args::FileFormat;
use crate::config::EngineConfig;

/// Get the configuration directory for fsakit
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine the configuration directory")?;
    Ok(base.join("fsakit"))
}

/// The engine configuration used when `--config` is not given
pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load the engine configuration.
///
/// An explicit path must exist. Otherwise the file in the configuration
/// directory is used when present, and the defaults when not.
pub fn load_engine_config(custom_path: Option<&Path>) -> Result<EngineConfig> {
    if let Some(path) = custom_path {
        validate_config_path(path)?;
        log::info!("loading engine configuration from {}", path.display());
        return EngineConfig::load(path)
            .with_context(|| format!("Failed to load config file: {}", path.display()));
    }
    match default_config_path() {
        Ok(path) if path.exists() => {
            log::info!("loading engine configuration from {}", path.display());
            EngineConfig::load(&path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))
        }
        _ => Ok(EngineConfig::default()),
    }
}

/// Get file extension for a file format
pub fn file_extension(format: FileFormat) -> &'static str {
    match format {
        FileFormat::Text => "fsa",
        FileFormat::Bincode => "bin",
        FileFormat::Json => "json",
        #[cfg(feature = "compression")]
        FileFormat::BincodeGzip => "bin.gz",
        #[cfg(feature = "compression")]
        FileFormat::JsonGzip => "json.gz",
    }
}

/// Validate that a config file path has .json extension
pub fn validate_config_path(path: &Path) -> Result<()> {
    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => Ok(()),
        Some(ext) => Err(anyhow::anyhow!(
            "Config file must have .json extension, got .{}. Please use a .json file.",
            ext
        )),
        None => Err(anyhow::anyhow!(
            "Config file must have .json extension. Please add .json to the filename."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::StorageFormat;

    #[test]
    fn test_explicit_config_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        std::fs::write(&path, r#"{ "storage": "Sparse", "max_states": 77 }"#).unwrap();
        let config = load_engine_config(Some(&path)).unwrap();
        assert_eq!(config.storage, StorageFormat::Sparse);
        assert_eq!(config.max_states, 77);
        assert_eq!(config.prepass_reduction_divisor, 12);
    }

    #[test]
    fn test_config_path_validation() {
        assert!(validate_config_path(Path::new("a.json")).is_ok());
        assert!(validate_config_path(Path::new("a.toml")).is_err());
        assert!(load_engine_config(Some(Path::new("missing.json"))).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(FileFormat::Text), "fsa");
        assert_eq!(file_extension(FileFormat::Bincode), "bin");
    }
}
