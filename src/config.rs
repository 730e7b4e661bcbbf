//! Startup configuration.
//!
//! Layout geometry and simulation seed can be overridden from a JSON file
//! passed as the first CLI argument; every field has a sensible default so
//! the file is optional.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::viewport::{HEADER_OFFSET_PX, PIXELS_PER_METER};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Virtual pixel height of one roll meter
    pub pixels_per_meter: f64,
    /// Virtual pixels reserved for the print-head header above the roll
    pub start_offset_px: f64,
    /// RNG seed for reproducible demo runs; random when omitted
    pub seed: Option<u64>,
    /// Job name shown in the top bar
    pub job_name: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: PIXELS_PER_METER,
            start_offset_px: HEADER_OFFSET_PX,
            seed: None,
            job_name: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.pixels_per_meter, 150.0);
        assert_eq!(config.start_offset_px, 128.0);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"seed": 42}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.pixels_per_meter, 150.0);
    }

    #[test]
    fn test_full_json() {
        let config: AppConfig = serde_json::from_str(
            r#"{"pixels_per_meter": 120.0, "start_offset_px": 0.0, "job_name": "Proof_Run"}"#,
        )
        .unwrap();
        assert_eq!(config.pixels_per_meter, 120.0);
        assert_eq!(config.start_offset_px, 0.0);
        assert_eq!(config.job_name.as_deref(), Some("Proof_Run"));
    }
}
