use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{geo_cache::DEFAULT_CACHE_FILE, message::MessageConfig, secrets::DEFAULT_SECRETS_FILE};

pub const DEFAULT_TEMPLATES_FILE: &str = "templates.json";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "weather-briefing", "briefing")
}

/// `<config dir>/templates.json`, or `templates.json` in the working directory.
pub fn default_templates_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join(DEFAULT_TEMPLATES_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMPLATES_FILE))
}

/// `<cache dir>/qweather_geocode_cache.json`, or `.cache/` under the working directory.
pub fn default_cache_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.cache_dir().join(DEFAULT_CACHE_FILE))
        .unwrap_or_else(|| Path::new(".cache").join(DEFAULT_CACHE_FILE))
}

/// How today's hourly precipitation probabilities are reduced to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PopStrategy {
    #[default]
    Max,
    #[serde(alias = "average")]
    Avg,
}

impl PopStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PopStrategy::Max => "max",
            PopStrategy::Avg => "avg",
        }
    }
}

impl fmt::Display for PopStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PopStrategy {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "max" => Ok(PopStrategy::Max),
            "avg" | "average" => Ok(PopStrategy::Avg),
            _ => Err(anyhow!("Unknown POP strategy '{value}'. Supported strategies: max, avg.")),
        }
    }
}

/// Life-index type codes requested from the indices endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexTypes {
    pub clothing: String,
    pub uv: String,
}

impl Default for IndexTypes {
    fn default() -> Self {
        Self {
            clothing: "3".to_string(),
            uv: "5".to_string(),
        }
    }
}

impl IndexTypes {
    /// Comma-joined non-empty codes, e.g. `"3,5"`.
    pub fn type_param(&self) -> String {
        [self.clothing.trim(), self.uv.trim()]
            .into_iter()
            .filter(|code| !code.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn is_clothing(&self, kind: &str) -> bool {
        !self.clothing.trim().is_empty() && self.clothing.trim() == kind
    }

    pub fn is_uv(&self, kind: &str) -> bool {
        !self.uv.trim().is_empty() && self.uv.trim() == kind
    }
}

/// Upstream lookup and aggregation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    /// Geocoding range filter, e.g. "cn".
    pub city_range: String,
    pub pop_strategy: PopStrategy,
    pub timeout_secs: u64,
    /// Geocode cache file; defaults to the platform cache directory.
    pub cache_file: Option<PathBuf>,
    pub indices: IndexTypes,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            city_range: "cn".to_string(),
            pop_strategy: PopStrategy::default(),
            timeout_secs: crate::http::DEFAULT_TIMEOUT_SECS,
            cache_file: None,
            indices: IndexTypes::default(),
        }
    }
}

impl WeatherSettings {
    pub fn cache_path(&self) -> PathBuf {
        self.cache_file.clone().unwrap_or_else(default_cache_path)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Retry policy handed to the message sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub backoff_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_ms: 1500,
        }
    }
}

impl DeliverySettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// City reported on when none is given on the command line.
    pub city: Option<String>,

    /// Default message recipient.
    pub recipient: Option<String>,

    /// Example TOML:
    /// secrets_file = "secrets.json"
    pub secrets_file: Option<PathBuf>,

    pub weather: WeatherSettings,
    pub message: MessageConfig,
    pub delivery: DeliverySettings,
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs =
            project_dirs().ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn secrets_path(&self) -> PathBuf {
        self.secrets_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SECRETS_FILE))
    }

    /// City to report on: the explicit argument, else the configured default.
    pub fn city_or(&self, explicit: Option<String>) -> Result<String> {
        explicit
            .or_else(|| self.city.clone())
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No city given and no default city configured.\n\
                     Hint: pass a city or run `briefing configure`."
                )
            })
    }
}
