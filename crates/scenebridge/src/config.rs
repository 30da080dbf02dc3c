//! Server configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{CoreError, CoreResult};

pub const CONFIG_FILENAME: &str = "scenebridge.json";
pub const CONFIG_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub version: String,
    /// Address the HTTP surface binds to.
    pub listen: String,
    pub engine: EngineSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Address of the Blender-side JSON bridge.
    pub address: String,
    /// Per-command timeout in milliseconds.
    pub timeout_ms: u64,
    /// Run against the in-memory stub instead of a bridge.
    pub stub: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION.to_string(),
            listen: "127.0.0.1:4860".to_string(),
            engine: EngineSettings {
                address: "127.0.0.1:4777".to_string(),
                timeout_ms: 15_000,
                stub: false,
            },
        }
    }
}

/// Load the config at `path`, writing the defaults there first if absent.
pub fn load_or_create(path: &Path) -> CoreResult<ServerConfig> {
    if path.exists() {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| CoreError::Internal(format!("failed to read config: {err}")))?;
        serde_json::from_str(&raw)
            .map_err(|err| CoreError::InvalidInput(format!("malformed config: {err}")))
    } else {
        let config = ServerConfig::default();
        save(path, &config)?;
        Ok(config)
    }
}

pub fn save(path: &Path, config: &ServerConfig) -> CoreResult<()> {
    let raw = serde_json::to_string_pretty(config)
        .map_err(|err| CoreError::Internal(format!("failed to serialize config: {err}")))?;
    std::fs::write(path, raw)
        .map_err(|err| CoreError::Internal(format!("failed to write config: {err}")))
}
