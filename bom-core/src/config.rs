use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{fetch::DEFAULT_USER_AGENT, geohash::Coordinate};

pub const DEFAULT_BASE_URL: &str = "https://api.weather.bom.gov.au/v1/locations/";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// latitude = -34.92866
/// longitude = 138.59863
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// The configured location as a validated coordinate.
    pub fn coordinate(&self) -> Result<Coordinate> {
        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(anyhow!(
                "No location configured.\n\
                 Hint: run `bom configure` or pass --lat and --lon."
            ));
        };

        Coordinate::new(latitude, longitude).context("Configured location is invalid")
    }

    pub fn set_coordinate(&mut self, coordinate: Coordinate) {
        self.latitude = Some(coordinate.latitude);
        self.longitude = Some(coordinate.longitude);
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "bom-render", "bom-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
