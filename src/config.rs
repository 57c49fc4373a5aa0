//! `layr.toml`: application name, font sources, separation endpoint and upload limits.
//!
//! Every section is optional; missing keys take their defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{LayrError, LayrResult};

/// Default upload ceiling, 32 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Product name; the export file name is derived from it.
    pub name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Layr".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FontsConfig {
    /// Directories scanned for font files, in order.
    pub dirs: Vec<PathBuf>,
    /// Family used for generic and unresolved names. First loaded family when unset.
    pub default_family: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SeparationConfig {
    /// Base URL of the separation service; `{endpoint}/process` is called.
    pub endpoint: Option<String>,
    /// No timeout when unset.
    pub timeout_secs: Option<u64>,
}

impl SeparationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_bytes: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct LayrConfig {
    pub app: AppConfig,
    pub fonts: FontsConfig,
    pub separation: SeparationConfig,
    pub upload: UploadConfig,
}

impl LayrConfig {
    pub fn from_toml_str(contents: &str) -> LayrResult<Self> {
        let config: LayrConfig =
            toml::from_str(contents).map_err(|e| LayrError::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> LayrResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            LayrError::Config(msg) => LayrError::config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    pub fn save_to_file(&self, path: &Path) -> LayrResult<()> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| LayrError::config(e.to_string()))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> LayrResult<()> {
        if self.upload.max_bytes == 0 {
            return Err(LayrError::config("upload.max_bytes must be > 0"));
        }
        if self.separation.timeout_secs == Some(0) {
            return Err(LayrError::config("separation.timeout_secs must be > 0"));
        }
        if let Some(endpoint) = &self.separation.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(LayrError::config(format!(
                "separation.endpoint '{endpoint}' must be an http(s) URL"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
