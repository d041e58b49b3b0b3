//! Settings management

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable that overrides [`LoaderSettings::library_path`].
pub const LIBRARY_PATH_ENV: &str = "CRATER_VULKAN_LIBRARY";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Probe settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub loader: LoaderSettings,
    pub instance: InstanceSettings,
    pub selection: SelectionSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderSettings {
    /// Loader library to open. `None` uses the platform default.
    pub library_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstanceSettings {
    pub application_name: String,
    pub engine_name: String,
    /// Requested API version as `(major, minor)`.
    pub api_version: (u32, u32),
    /// Layers to enable when the system has them.
    pub layers: Vec<String>,
    /// Instance extensions to enable when the system has them.
    pub extensions: Vec<String>,
    /// Attach a validation message forwarder (debug builds only).
    pub debug_messenger: bool,
}

impl Default for InstanceSettings {
    fn default() -> Self {
        Self {
            application_name: "test".to_string(),
            engine_name: "test_engine".to_string(),
            api_version: (1, 0),
            layers: vec![
                "VK_LAYER_NV_optimus".to_string(),
                "VK_LAYER_RENDERDOC_Capture".to_string(),
                "VK_LAYER_KHRONOS_validation".to_string(),
            ],
            extensions: vec!["VK_EXT_debug_utils".to_string()],
            debug_messenger: true,
        }
    }
}

/// Queue capability a device must offer to be ranked at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueRequirement {
    Any,
    #[default]
    Graphics,
    Compute,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    pub required_queue: QueueRequirement,
}

impl Settings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                debug!("no settings file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.override_library_path(std::env::var(LIBRARY_PATH_ENV).ok());
    }

    fn override_library_path(&mut self, path: Option<String>) {
        if let Some(path) = path.filter(|path| !path.is_empty()) {
            debug!(%path, "loader path overridden from environment");
            self.loader.library_path = Some(path);
        }
    }
}
