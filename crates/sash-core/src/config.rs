// ABOUTME: Grid configuration handling.
// ABOUTME: Loads and saves engine settings from TOML config files.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::Orientation;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Split axis of the root branch (0 = vertical, 1 = horizontal)
    pub orientation: Orientation,

    /// Container dimensions used until the first explicit layout
    pub width: u32,
    pub height: u32,

    /// Scale children proportionally when the container is resized.
    /// When off, the last child absorbs the change first.
    pub proportional_layout: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::Vertical,
            width: 800,
            height: 600,
            proportional_layout: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Could not determine config directory")]
    NoConfigPath,
}

impl GridConfig {
    /// Get the default config file path (~/.config/sashgrid/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("sashgrid").join("config.toml"))
    }

    /// Load config from a path
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from default path, or return default config if not found
    pub fn load_or_default() -> Self {
        Self::default_path()
            .and_then(|path| Self::load(&path).ok())
            .unwrap_or_default()
    }

    /// Save config to a path
    pub fn save(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Save config to default path
    pub fn save_to_default(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigPath)?;
        self.save(&path)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let config = GridConfig {
            orientation: Orientation::Horizontal,
            width: 1024,
            height: 768,
            proportional_layout: false,
        };

        let temp_path = std::env::temp_dir().join("sashgrid_test_config.toml");
        config.save(&temp_path).unwrap();

        let loaded = GridConfig::load(&temp_path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&temp_path);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: GridConfig = toml::from_str("orientation = 1\n").unwrap();
        assert_eq!(config.orientation, Orientation::Horizontal);
        assert_eq!(config.width, 800);
        assert!(config.proportional_layout);
    }

    #[test]
    fn test_invalid_orientation_rejected() {
        assert!(toml::from_str::<GridConfig>("orientation = 3\n").is_err());
    }

    #[test]
    fn test_default_path() {
        if let Some(p) = GridConfig::default_path() {
            assert!(p.ends_with("sashgrid/config.toml"));
        }
    }
}
