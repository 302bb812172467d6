use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::region::Region;

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "CWB_API_KEY";

pub const DEFAULT_BASE_URL: &str = "https://opendata.cwb.gov.tw/api/v1/rest/datastore";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "CWB-..."
/// region = "臺北市"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Authorization key issued by the open-data service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// City name of the tracked region, e.g. "臺北市".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// UTC offset of the region, used to decide which calendar day "today" is.
    #[serde(default = "default_utc_offset")]
    pub utc_offset_hours: i32,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout() -> u64 {
    10
}

const fn default_utc_offset() -> i32 {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            region: None,
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            utc_offset_hours: default_utc_offset(),
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
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
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
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
        let dirs = ProjectDirs::from("tw", "cwb-weather", "cwb-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Store the region after checking it against the supported region table.
    pub fn set_region(&mut self, name: &str) -> Result<Region> {
        let region = Region::parse(name)?;
        self.region = Some(region.city.to_string());
        Ok(region)
    }

    /// The configured region, or the default one when none is set.
    pub fn region(&self) -> Result<Region> {
        match self.region.as_deref() {
            Some(name) => Region::parse(name),
            None => Ok(Region::default()),
        }
    }

    /// Returns the API key, preferring `CWB_API_KEY` over the file.
    pub fn api_key(&self) -> Result<String> {
        pick_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `cwb-weather configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn utc_offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("utc_offset_hours {} is out of range", self.utc_offset_hours))
    }
}

fn pick_api_key(env: Option<String>, file: Option<&str>) -> Option<String> {
    env.filter(|k| !k.trim().is_empty())
        .or_else(|| file.filter(|k| !k.trim().is_empty()).map(str::to_owned))
}
