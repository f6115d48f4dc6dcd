//! Configuration file support for Sipwise.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/sipwise/config.toml`.

use crate::engine::Thresholds;
use crate::{Error, Gender, HeightUnit, Profile, Result, Tolerance, WeightUnit};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileDefaults,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub refresh: RefreshConfig,
}

/// Profile values used when the command line leaves them out
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProfileDefaults {
    #[serde(default = "default_age")]
    pub age: u32,

    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default)]
    pub height_unit: HeightUnit,

    #[serde(default = "default_weight")]
    pub weight: f64,

    #[serde(default)]
    pub weight_unit: WeightUnit,

    #[serde(default)]
    pub gender: Gender,

    #[serde(default)]
    pub tolerance: Tolerance,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            age: default_age(),
            height: default_height(),
            height_unit: HeightUnit::default(),
            weight: default_weight(),
            weight_unit: WeightUnit::default(),
            gender: Gender::default(),
            tolerance: Tolerance::default(),
        }
    }
}

impl ProfileDefaults {
    pub fn to_profile(&self) -> Profile {
        Profile {
            age: self.age,
            height: self.height,
            height_unit: self.height_unit,
            weight: self.weight,
            weight_unit: self.weight_unit,
            gender: self.gender,
            tolerance: self.tolerance,
        }
    }
}

/// How often live views re-evaluate the engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

// Default value functions
fn default_age() -> u32 {
    25
}

fn default_height() -> f64 {
    170.0
}

fn default_weight() -> f64 {
    70.0
}

fn default_interval_secs() -> u64 {
    60
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        if self.refresh.interval_secs == 0 {
            return Err(Error::Config("refresh.interval_secs must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = match dirs::config_dir() {
            Some(dir) => dir,
            None => {
                let home = std::env::var("HOME")
                    .map_err(|_| Error::Config("HOME environment variable not set".into()))?;
                PathBuf::from(home).join(".config")
            }
        };
        Ok(base.join("sipwise").join("config.toml"))
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
