use anyhow::{Context, Result};
use crate::core::GeoPoint;
use crate::provider::osrm::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persistent player settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Where fetched routes start
    pub origin: GeoPoint,
    /// Where fetched routes end
    pub destination: GeoPoint,
    /// OSRM service root, without the `/route/v1/...` part
    pub osrm_base_url: String,
    /// Seconds between synthesized timestamps for coordinate-only routes
    pub synthetic_spacing_secs: u32,
    /// `tracing_subscriber` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            // Hyderabad
            origin: GeoPoint::new(17.3850, 78.4867),
            destination: GeoPoint::new(17.4933, 78.4035),
            osrm_base_url: DEFAULT_BASE_URL.to_string(),
            synthetic_spacing_secs: 5,
            log_filter: "info".to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("routeplay").join("config.json"))
    }

    /// Load from the user config dir, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring config {:?}: {:#}", path, e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&contents).context("Failed to parse config")
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("No config directory on this platform")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write config file: {:?}", path))
    }

    pub fn synthetic_spacing(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.synthetic_spacing_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("routeplay-config-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let config = PlayerConfig {
            synthetic_spacing_secs: 1,
            log_filter: "debug".to_string(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        let loaded = PlayerConfig::load_from(&path).unwrap();
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{"synthetic_spacing_secs": 2}"#).unwrap();
        assert_eq!(config.synthetic_spacing(), chrono::Duration::seconds(2));
        assert_eq!(config.osrm_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.origin, GeoPoint::new(17.3850, 78.4867));
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        let path = temp_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let result = PlayerConfig::load_from(&path);
        let _ = fs::remove_dir_all(path.parent().unwrap());

        assert!(result.is_err());
    }
}
