/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Configuration for the topology viewer.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Named tile styles offered by the map view: (style name, provider style id).
pub const TILE_STYLES: [(&str, u32); 3] = [("pure", 101946), ("minimal", 22677), ("default", 997)];

/// Get the config directory for topodesk
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            PathBuf::from(appdata).join("topodesk")
        } else {
            PathBuf::from(".topodesk")
        }
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Some(config_home) = dirs::config_dir() {
            config_home.join("topodesk")
        } else {
            PathBuf::from(".topodesk")
        }
    }
}

/// Ensure the config directory exists
pub fn ensure_config_dir() -> std::io::Result<PathBuf> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Map view configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapConfig {
    /// Initial map center latitude (default: 50.11)
    pub center_lat: f64,

    /// Initial map center longitude (default: 8.68)
    pub center_lng: f64,

    /// Initial zoom level (default: 4)
    pub zoom: u8,

    /// Tile style name, one of `TILE_STYLES` (default: pure)
    pub style: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 50.11,
            center_lng: 8.68,
            zoom: 4,
            style: "pure".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopodeskConfig {
    /// Snapshot channel to subscribe to (default: topodesk_topo)
    pub channel: String,

    pub map: MapConfig,
}

impl Default for TopodeskConfig {
    fn default() -> Self {
        Self {
            channel: "topodesk_topo".to_string(),
            map: MapConfig::default(),
        }
    }
}

impl TopodeskConfig {
    /// Load configuration from the default config file
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if let Ok(contents) = std::fs::read_to_string(path) {
            if let Ok(config) = toml::from_str(&contents) {
                return config;
            }
        }

        Self::default()
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self).map_err(std::io::Error::other)?;

        std::fs::write(path, toml_string)?;
        Ok(())
    }

    fn config_path() -> PathBuf {
        config_dir().join("topodesk.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TopodeskConfig::default();
        assert_eq!(config.channel, "topodesk_topo");
        assert_eq!(config.map.center_lat, 50.11);
        assert_eq!(config.map.center_lng, 8.68);
        assert_eq!(config.map.zoom, 4);
        assert!(TILE_STYLES.iter().any(|(name, _)| *name == config.map.style));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("topodesk.toml");

        let mut config = TopodeskConfig::default();
        config.channel = "other_topo".to_string();
        config.map.zoom = 7;
        config.save_to(&path).unwrap();

        let loaded = TopodeskConfig::load_from(&path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let loaded = TopodeskConfig::load_from(Path::new("/nonexistent/topodesk.toml"));
        assert_eq!(loaded, TopodeskConfig::default());
    }
}
