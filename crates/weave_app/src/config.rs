//! Application configuration files
//!
//! A `weave.toml` describes the application and the windows it opens:
//!
//! ```toml
//! [application]
//! name = "notes"
//! startup_timeout_ms = 5000
//!
//! [[window]]
//! title = "Notes"
//! url = "http://localhost:34115"
//! width = 1024
//! height = 768
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use weave_platform::{ApplicationOptions, WindowOptions};

use crate::error::{AppError, Result};

/// Contents of a configuration file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub application: ApplicationOptions,
    /// Windows to open at startup, in order
    #[serde(rename = "window")]
    pub windows: Vec<WindowOptions>,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
            .map_err(|e| AppError::Config(format!("{} in {}", e, path.display())))
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Failed to parse configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {e}")))
    }

    fn validate(&self) -> Result<()> {
        if self.application.name.trim().is_empty() {
            return Err(AppError::Config("application name is empty".to_string()));
        }
        for (index, window) in self.windows.iter().enumerate() {
            if window.width == 0 || window.height == 0 {
                return Err(AppError::Config(format!(
                    "window {index} ({}) has a zero dimension",
                    window.title
                )));
            }
            if let (Some(min), Some(max)) = (window.min_size, window.max_size) {
                if min.width > max.width || min.height > max.height {
                    return Err(AppError::Config(format!(
                        "window {index} ({}) has min_size {min} larger than max_size {max}",
                        window.title
                    )));
                }
            }
        }
        Ok(())
    }
}
