//! Scanner configuration loaded from TOML
//!
//! Every key is optional:
//!
//! ```toml
//! symbol_types = ["qr"]
//! render_size = 200
//! quiet_zone = 4
//! frame_interval_ms = 100
//! log_filter = "info"
//!
//! [normalize]
//! quality = 100
//! format = "png"      # or "jpeg"
//! rotation = "none"   # "cw90", "cw180", "cw270"
//! ```

use crate::error::ScanError;
use crate::models::{NormalizeOptions, SymbolType};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "QRSCAN_CONFIG";

/// Scanner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Symbologies requested from still-image decode
    pub symbol_types: Vec<SymbolType>,
    /// Target side in pixels of a re-rendered QR symbol
    pub render_size: u32,
    /// Quiet zone in modules around a re-rendered symbol
    pub quiet_zone: u32,
    /// Re-encoding applied to picked images
    pub normalize: NormalizeOptions,
    /// Delay between camera frames
    pub frame_interval_ms: u64,
    /// Default `tracing` filter when `QRSCAN_LOG` is unset
    pub log_filter: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            symbol_types: vec![SymbolType::Qr],
            render_size: 200,
            quiet_zone: 4,
            normalize: NormalizeOptions::default(),
            frame_interval_ms: 100,
            log_filter: "info".to_string(),
        }
    }
}

impl ScanConfig {
    /// Parse TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ScanError> {
        let config: Self = toml::from_str(text).map_err(|err| ScanError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScanError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            ScanError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load from `path`, else from `QRSCAN_CONFIG`, else defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self, ScanError> {
        match path.map(Path::to_path_buf).or_else(config_path_from_env) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Camera frame interval
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    fn validate(&self) -> Result<(), ScanError> {
        if self.symbol_types.is_empty() {
            return Err(ScanError::Config("symbol_types must not be empty".into()));
        }
        if self.render_size == 0 {
            return Err(ScanError::Config("render_size must be positive".into()));
        }
        if !(1..=100).contains(&self.normalize.quality) {
            return Err(ScanError::Config("normalize.quality must be 1-100".into()));
        }
        Ok(())
    }
}

/// Config path from `QRSCAN_CONFIG`, ignoring empty values
pub fn config_path_from_env() -> Option<PathBuf> {
    env::var(CONFIG_ENV)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}
