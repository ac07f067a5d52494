use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::collect::global_variables::{
    is_geojson_format, DEFAULT_WFS_VERSION, GEOJSON_OUTPUT_FORMAT,
};
use crate::collect::wfs::wfs_collect::LayerSelection;
use crate::commons::error::{Result, WfsError};
use crate::geometric::axis::AxisPolicy;

/// WFS versions the collector knows how to phrase requests for
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0.0", "1.1.0", "2.0.0", "2.0.2"];

/// Settings for a WFS retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WfsConfig {
    /// Version sent with GetCapabilities; the server's answer may differ
    pub version: String,
    /// Output format sent with GetFeature
    pub output_format: String,
    pub axis_policy: AxisPolicy,
    /// Feature type to retrieve; the first advertised one when unset
    pub type_name: Option<String>,
    pub timeout_secs: Option<u64>,
    /// COUNT (2.x) or MAXFEATURES (1.x)
    pub max_features: Option<u32>,
}

impl Default for WfsConfig {
    fn default() -> Self {
        WfsConfig {
            version: DEFAULT_WFS_VERSION.to_string(),
            output_format: GEOJSON_OUTPUT_FORMAT.to_string(),
            axis_policy: AxisPolicy::default(),
            type_name: None,
            timeout_secs: None,
            max_features: None,
        }
    }
}

impl WfsConfig {
    /// Load a JSON configuration file; missing keys take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: WfsConfig = serde_json::from_str(&raw).map_err(|e| WfsError::Config {
            message: format!("{}: {}", path.as_ref().display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from `RSWFS_*` environment variables
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(version) = lookup("RSWFS_VERSION") {
            self.version = version;
        }
        if let Some(format) = lookup("RSWFS_OUTPUT_FORMAT") {
            self.output_format = format;
        }
        if let Some(policy) = lookup("RSWFS_AXIS_POLICY") {
            self.axis_policy = policy.parse()?;
        }
        if let Some(type_name) = lookup("RSWFS_TYPE_NAME") {
            self.type_name = Some(type_name).filter(|name| !name.is_empty());
        }
        if let Some(secs) = lookup("RSWFS_TIMEOUT_SECS") {
            self.timeout_secs = Some(parse_number("RSWFS_TIMEOUT_SECS", &secs)?);
        }
        if let Some(count) = lookup("RSWFS_MAX_FEATURES") {
            self.max_features = Some(parse_number("RSWFS_MAX_FEATURES", &count)?);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(WfsError::Config {
                message: format!(
                    "unsupported WFS version '{}' (expected one of {})",
                    self.version,
                    SUPPORTED_VERSIONS.join(", ")
                ),
            });
        }
        if !is_geojson_format(&self.output_format) {
            return Err(WfsError::Config {
                message: format!(
                    "output format '{}' is not a GeoJSON format",
                    self.output_format
                ),
            });
        }
        if self.timeout_secs == Some(0) {
            return Err(WfsError::Config {
                message: "timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn layer_selection(&self) -> LayerSelection {
        match &self.type_name {
            Some(name) => LayerSelection::Named(name.clone()),
            None => LayerSelection::First,
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| WfsError::Config {
        message: format!("{} must be a positive integer, got '{}'", key, value),
    })
}
