// SPDX-License-Identifier: MIT OR Apache-2.0
//! Bridge configuration and per-import options.

use crate::version::FileVersion;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Version written to exported documents
pub const FILE_VERSION: FileVersion = FileVersion::new(1, 1);

/// Oldest readable document version
pub const SUPPORTED_FILE_VERSION_MIN: FileVersion = FileVersion::new(1, 0);

/// First document version this build cannot read
pub const UNSUPPORTED_FILE_VERSION_MIN: FileVersion = FileVersion::new(2, 0);

/// Document-level settings shared by export and import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// `Platform` written on export
    pub platform: String,
    /// `FileVersion` written on export
    pub file_version: FileVersion,
    /// Oldest version accepted on import
    pub supported_min: FileVersion,
    /// First version rejected on import
    pub unsupported_min: FileVersion,
    /// `ScaleFactor` written on export
    pub scale_factor: f64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            platform: format!("Linebridge {}", env!("CARGO_PKG_VERSION")),
            file_version: FILE_VERSION,
            supported_min: SUPPORTED_FILE_VERSION_MIN,
            unsupported_min: UNSUPPORTED_FILE_VERSION_MIN,
            scale_factor: 1.0,
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a RON file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        ron::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a RON file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);

        let content = ron::ser::to_string_pretty(self, config).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;

        std::fs::write(path, content)
    }
}

/// Options for one import call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Line records to import, `None` for every line
    pub line_ids: Option<Vec<String>>,
    /// Material records to import, `None` for every pencil material
    pub material_ids: Option<Vec<String>>,
    /// Replace entities named like the imported roots
    pub overwrite: bool,
    /// Scale applied to lengths, `None` to use the document's
    pub scale_factor: Option<f64>,
    /// Import specific brushes even when their feature is switched off
    pub import_disabled_brush_settings: bool,
    /// Import reductions even when switched off
    pub import_disabled_reduction_settings: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            line_ids: None,
            material_ids: None,
            overwrite: false,
            scale_factor: None,
            import_disabled_brush_settings: true,
            import_disabled_reduction_settings: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.file_version.to_string(), "1.1");
        assert!(config.platform.starts_with("Linebridge"));

        let settings = ImportSettings::default();
        assert!(settings.line_ids.is_none());
        assert!(settings.import_disabled_brush_settings);
    }

    #[test]
    fn test_config_ron_uses_version_strings() {
        let config = BridgeConfig::default();
        let ron_str = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        assert!(ron_str.contains("\"1.1\""));
        let loaded: BridgeConfig = ron::from_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let loaded: BridgeConfig = ron::from_str("(platform: \"Host 4\")").unwrap();
        assert_eq!(loaded.platform, "Host 4");
        assert_eq!(loaded.unsupported_min, UNSUPPORTED_FILE_VERSION_MIN);
    }
}
