use super::{DxdDataType, DxdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Defaults applied when a file does not describe itself.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoaderConfig {
    pub default_sample_rate_hz: f64,
    pub default_data_type: DxdDataType,
    /// Bytes scanned for a plausible channel count when no configuration block exists.
    pub header_scan_bytes: usize,
    /// Bytes scanned for the index marker.
    pub index_scan_bytes: usize,
    /// Upper bound for the guessed payload offset of unstructured files.
    pub max_fallback_header_bytes: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_sample_rate_hz: 1000.0,
            default_data_type: DxdDataType::Int16,
            header_scan_bytes: 500,
            index_scan_bytes: 1024,
            max_fallback_header_bytes: 4096,
        }
    }
}

impl LoaderConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dxd_reader").join("config.json"))
    }

    /// Read the user config if there is one, otherwise defaults.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                debug!("Ignoring config at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: LoaderConfig = serde_json::from_str(&contents)
            .map_err(|e| DxdError::Config(format!("{:?}: {}", path.as_ref(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.default_sample_rate_hz.is_finite() || self.default_sample_rate_hz <= 0.0 {
            return Err(DxdError::Config(format!(
                "default_sample_rate_hz must be positive, got {}",
                self.default_sample_rate_hz
            )));
        }
        if self.header_scan_bytes < 2 || self.index_scan_bytes == 0 {
            return Err(DxdError::Config("scan windows must be non-empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"default_sample_rate_hz": 2048.0}"#).unwrap();
        assert_eq!(config.default_sample_rate_hz, 2048.0);
        assert_eq!(config.default_data_type, DxdDataType::Int16);
        assert_eq!(config.header_scan_bytes, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_bad_rate() {
        let config = LoaderConfig {
            default_sample_rate_hz: 0.0,
            ..LoaderConfig::default()
        };
        assert!(matches!(config.validate(), Err(DxdError::Config(_))));
    }

    #[test]
    fn data_type_uses_lowercase_names() {
        let config: LoaderConfig =
            serde_json::from_str(r#"{"default_data_type": "float32"}"#).unwrap();
        assert_eq!(config.default_data_type, DxdDataType::Float32);
    }
}
