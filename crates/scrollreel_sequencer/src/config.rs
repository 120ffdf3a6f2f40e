// SPDX-License-Identifier: MIT OR Apache-2.0
//! Reel configuration.
//!
//! Stored as RON:
//! - Overlap between consecutive scenes
//! - Scroll distance per reel second and scrub smoothing
//! - Label snapping

use crate::overlap::{OverlapAnchor, OverlapPolicy};
use crate::reel::ReelSequencer;
use crate::snap::SnapDirection;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "reel.ron";

/// Error loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read or write the file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File is not valid RON for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Could not serialize
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version found in the file
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// A value is out of range
    #[error("Invalid config value `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Overlap settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    /// Seconds each scene starts before the anchor
    pub amount: f32,
    /// End time the overlap is measured from
    pub anchor: OverlapAnchor,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            amount: 0.0,
            anchor: OverlapAnchor::RunningEnd,
        }
    }
}

impl OverlapConfig {
    /// Sequencer using these settings
    pub fn sequencer(&self) -> ReelSequencer {
        let policy = if self.amount > 0.0 {
            OverlapPolicy::fixed(self.amount)
        } else {
            OverlapPolicy::None
        };
        ReelSequencer::new(policy).with_anchor(self.anchor)
    }
}

/// Scroll settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Scroll distance per second of reel
    pub pixels_per_second: f32,
    /// Stage length in seconds when the reel is empty
    pub fallback_duration: f32,
    /// Scrub catch-up time constant in seconds
    pub scrub_lag: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            pixels_per_second: 520.0,
            fallback_duration: 10.0,
            scrub_lag: 0.6,
        }
    }
}

/// Snapping settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Whether to report snap targets at all
    pub enabled: bool,
    /// Checkpoint preference
    pub direction: SnapDirection,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            direction: SnapDirection::Nearest,
        }
    }
}

/// Full reel configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReelConfig {
    /// Format version
    pub version: u32,
    /// Overlap settings
    pub overlap: OverlapConfig,
    /// Scroll settings
    pub scroll: ScrollConfig,
    /// Snapping settings
    pub snap: SnapConfig,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            overlap: OverlapConfig::default(),
            scroll: ScrollConfig::default(),
            snap: SnapConfig::default(),
        }
    }
}

impl ReelConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::debug!("Loaded reel config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: ReelConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Serialize as pretty RON
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Check version and value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        check_non_negative("overlap.amount", self.overlap.amount)?;
        check_non_negative("scroll.fallback_duration", self.scroll.fallback_duration)?;
        check_non_negative("scroll.scrub_lag", self.scroll.scrub_lag)?;
        if !(self.scroll.pixels_per_second.is_finite() && self.scroll.pixels_per_second > 0.0) {
            return Err(ConfigError::Invalid {
                field: "scroll.pixels_per_second",
                reason: format!("must be positive, got {}", self.scroll.pixels_per_second),
            });
        }
        Ok(())
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a non-negative number, got {value}"),
        })
    }
}
