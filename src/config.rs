// SPDX-License-Identifier: GPL-3.0-only

//! User configuration
//!
//! Stored as JSON at `<config dir>/orthomosaic-client/config.json`. Missing
//! fields fall back to their defaults, so a partial file is valid.

use crate::constants::{
    APP_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_DOWNLOAD_RESOLUTION, DEFAULT_ENDPOINT,
    DEFAULT_ORTHORECTIFY_ENDPOINT, MAX_SIDE_CROP_PIXELS,
};
use crate::errors::{AppError, AppResult};
use crate::settings::PitchPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Orthomosaic service endpoint
    pub endpoint: String,
    /// Single-image orthorectify endpoint
    pub orthorectify_endpoint: String,
    /// Directory for persisted state (default: platform data dir)
    pub state_dir: Option<PathBuf>,
    /// Default side crop sent with uploads (pixels)
    pub side_crop_pixels: u32,
    /// Default download resolution (metres per pixel)
    pub download_resolution: f64,
    /// Pitch leniency thresholds and replacement
    pub pitch: PitchPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            orthorectify_endpoint: DEFAULT_ORTHORECTIFY_ENDPOINT.to_string(),
            state_dir: None,
            side_crop_pixels: 0,
            download_resolution: DEFAULT_DOWNLOAD_RESOLUTION,
            pitch: PitchPolicy::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is used
    /// if present, otherwise defaults apply.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.is_file() => path,
                _ => {
                    debug!("No config file, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let text = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(text: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| AppError::Config(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        for (name, url) in [
            ("endpoint", &self.endpoint),
            ("orthorectify_endpoint", &self.orthorectify_endpoint),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }
        if self.side_crop_pixels > MAX_SIDE_CROP_PIXELS {
            return Err(AppError::Config(format!(
                "side_crop_pixels must be at most {}",
                MAX_SIDE_CROP_PIXELS
            )));
        }
        if !(self.download_resolution.is_finite() && self.download_resolution > 0.0) {
            return Err(AppError::Config(
                "download_resolution must be a positive number".to_string(),
            ));
        }
        if !(self.pitch.lower_deg < self.pitch.upper_deg) {
            return Err(AppError::Config(
                "pitch.lower_deg must be below pitch.upper_deg".to_string(),
            ));
        }
        Ok(())
    }

    /// Directory for persisted state
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
                .join(APP_DIR_NAME)
        })
    }
}
