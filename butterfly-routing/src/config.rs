//! Engine configuration loaded from TOML

use std::path::Path;

use butterfly_common::{Error, Result};
use serde::Deserialize;

/// Limits and defaults applied to every table request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound on sources and destinations; 0 means unlimited
    pub max_locations_distance_table: usize,
    /// Radius in meters for coordinates without an explicit one; unset means unbounded
    pub default_snapping_radius: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_locations_distance_table: 0,
            default_snapping_radius: None,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            max_locations_distance_table = config.max_locations_distance_table,
            "loaded engine config"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(radius) = self.default_snapping_radius {
            if !radius.is_finite() || radius < 0.0 {
                tracing::warn!(radius, "rejecting default snapping radius");
                return Err(Error::ConfigError(format!(
                    "default_snapping_radius must be a non-negative number of meters, got {}",
                    radius
                )));
            }
        }
        Ok(())
    }
}
