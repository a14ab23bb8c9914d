// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/girarm-rs

//! Configuration module

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,

    /// Log level
    pub log_level: String,

    /// Enable demo mode (simulated sensor sources)
    pub demo_mode: bool,

    /// Detector thresholds and hysteresis policies
    pub detectors: DetectorConfig,

    /// Session controller behavior
    pub session: SessionConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "Girarm".to_string(),
            log_level: "info".to_string(),
            demo_mode: false,
            detectors: DetectorConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Load or create default configuration
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            let config = Self::default();

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            config.save(path)?;
            Ok(config)
        }
    }

    /// Get configuration directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("girarm"))
            .unwrap_or_else(|| PathBuf::from("./config"))
    }

    /// Get default configuration path
    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }
}

/// Per-detector thresholds and hysteresis gains
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub posture: PostureConfig,
    pub light: LightConfig,
    pub expression: ExpressionConfig,
    pub voice: VoiceConfig,
}

/// Posture challenge: gravity-vector thresholding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostureConfig {
    /// Maximum tilt from vertical, in degrees, that still counts as upright
    pub max_tilt_deg: f64,

    /// Progress gained per upright sample
    pub gain: f64,

    /// Progress lost per tilted sample
    pub decay: f64,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            max_tilt_deg: 25.0,
            gain: 0.10,
            decay: 0.05,
        }
    }
}

/// Light challenge: frame brightness thresholding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    /// Minimum normalized brightness that counts as lit
    pub min_brightness: f64,

    /// Daytime fallback window when no brightness reading exists
    pub day_start_hour: u32,
    pub day_end_hour: u32,

    /// Progress gained per bright sample
    pub gain: f64,

    /// Progress lost per dark sample
    pub decay: f64,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            min_brightness: 0.5,
            day_start_hour: 7,
            day_end_hour: 19,
            gain: 0.15,
            decay: 0.08,
        }
    }
}

/// Expression challenge: smile geometry heuristic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionConfig {
    /// Minimum landmark-derived confidence behind a reported smile
    pub min_confidence: f64,

    /// Progress gained per smiling frame
    pub gain: f64,

    /// Progress lost per neutral frame
    pub decay: f64,
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.6,
            gain: 0.25,
            decay: 0.08,
        }
    }
}

/// Voice challenge: wake-keyword spotting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceConfig {
    /// Wake keywords, matched case-insensitively on word boundaries
    pub keywords: Vec<String>,

    /// Progress gained per keyword occurrence (no decay)
    pub gain: f64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "wake".to_string(),
                "awake".to_string(),
                "up".to_string(),
                "morning".to_string(),
            ],
            gain: 0.50,
        }
    }
}

/// Session controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds before a session with a dead sensor is reported as stuck
    pub stuck_timeout_secs: u64,

    /// Capacity of the sample channel feeding the controller task
    pub sample_buffer: usize,

    /// Capacity of the UI event broadcast channel
    pub event_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stuck_timeout_secs: 30,
            sample_buffer: 64,
            event_buffer: 256,
        }
    }
}
