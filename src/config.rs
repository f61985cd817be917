//! Configuration module
//!
//! Reads/writes settings from ~/.config/hwmon-query/config.toml

use crate::source::DEFAULT_NAMESPACE;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Shortest allowed watch interval
pub const MIN_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WMI namespace the hardware monitor publishes into
    pub namespace: String,
    /// Refresh interval for `watch`, in milliseconds
    pub interval_ms: u64,
    /// List of disabled MCP tool names (all others are enabled)
    pub disabled: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            interval_ms: 1000,
            disabled: Vec::new(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("hwmon-query").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            tracing::warn!("Could not determine config directory, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!("No config file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    tracing::debug!("Loaded config from {:?}", path);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!("Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to file
    #[cfg(test)]
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Watch interval, clamped to [`MIN_INTERVAL_MS`]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_INTERVAL_MS))
    }

    /// Check if a tool is enabled
    pub fn is_enabled(&self, tool_name: &str) -> bool {
        !self.disabled.iter().any(|t| t == tool_name)
    }

    /// Disable a tool (add to disabled list)
    #[cfg(test)]
    pub fn disable(&mut self, tool_name: &str) {
        if self.is_enabled(tool_name) {
            self.disabled.push(tool_name.to_string());
        }
    }

    /// Server tools this config turns off
    pub fn disabled_tools(&self) -> Vec<&'static str> {
        all_tool_names()
            .into_iter()
            .filter(|name| !self.is_enabled(name))
            .collect()
    }

    /// Entries in `disabled` that name no server tool
    pub fn unknown_disabled(&self) -> Vec<&str> {
        let known = all_tool_names();
        self.disabled
            .iter()
            .map(String::as_str)
            .filter(|name| !known.contains(name))
            .collect()
    }
}

/// Names of all MCP tools the server registers
pub fn all_tool_names() -> Vec<&'static str> {
    vec![
        "list_control_sensors",
        "list_sensors",
        "list_hardware",
        "get_hardware_report",
    ]
}
