//! Engine Configuration
//!
//! Manages the tunable parts of the annotation engine:
//! - Toolbar placement relative to the selection
//! - Comment marker and heat-map colors
//! - History depth of the in-memory document
//! - Text geometry used by the in-memory document
//! - Log level

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::color::Rgba;
use crate::error::{EngineError, Result};

/// Toolbar placement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolbarConfig {
    /// Vertical distance between the selection bounds and the toolbar
    pub offset_top: f64,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self { offset_top: 20.0 }
    }
}

/// Background colors applied by the engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighlightConfig {
    /// Marker background for commented text
    pub comment_color: Rgba,
    /// Alpha of the rate heat gradient
    pub heat_alpha: f64,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            comment_color: Rgba::new(255.0, 255.0, 0.0, 0.4),
            heat_alpha: 0.5,
        }
    }
}

/// Undo history settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum undo history size
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_undo: 1000 }
    }
}

/// Monospace text geometry for surfaces without a layout engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MetricsConfig {
    pub line_height: f64,
    pub char_width: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            line_height: 18.0,
            char_width: 8.0,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration version for migrations
    pub version: u32,
    /// Default tracing filter directive
    pub log_level: String,
    pub toolbar: ToolbarConfig,
    pub highlight: HighlightConfig,
    pub history: HistoryConfig,
    pub metrics: MetricsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: 1,
            log_level: "info".to_string(),
            toolbar: ToolbarConfig::default(),
            highlight: HighlightConfig::default(),
            history: HistoryConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "marginalia", "Marginalia")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the configuration file path
    pub fn config_file() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.toml"))
    }

    /// Parse a configuration from TOML text, filling gaps with defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.highlight.heat_alpha) {
            return Err(EngineError::Config(format!(
                "heat_alpha must be within 0..=1, got {}",
                self.highlight.heat_alpha
            )));
        }
        if self.history.max_undo == 0 {
            return Err(EngineError::Config("max_undo must be at least 1".into()));
        }
        Ok(())
    }

    /// Load configuration from the default location
    pub async fn load() -> Result<Self> {
        let config_file = Self::config_file()
            .ok_or_else(|| EngineError::Config("Cannot determine config path".into()))?;
        Self::load_from(&config_file).await
    }

    /// Load configuration from a file, writing defaults if it does not exist
    pub async fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            debug!("Loading config from {:?}", path);
            let contents = tokio::fs::read_to_string(path).await?;
            Self::from_toml_str(&contents)
        } else {
            info!("Config file not found, using defaults");
            let config = AppConfig::default();
            config.save_to(path).await?;
            Ok(config)
        }
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<()> {
        let config_file = Self::config_file()
            .ok_or_else(|| EngineError::Config("Cannot determine config path".into()))?;
        self.save_to(&config_file).await
    }

    /// Save configuration to a file
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = toml::to_string_pretty(self)?;
        tokio::fs::write(path, contents).await?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }
}
