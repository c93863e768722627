//! QWeather credentials.
//!
//! Host and key are bound to each other by the provider, so they are always
//! resolved together: environment first, then a local JSON file.

use std::{fmt, fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BriefingError, Result};

pub const ENV_API_HOST: &str = "QWEATHER_API_HOST";
pub const ENV_API_KEY: &str = "QWEATHER_API_KEY";
pub const DEFAULT_SECRETS_FILE: &str = "secrets.json";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub api_host: String,
    pub api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("api_host", &self.api_host)
            .field("api_key", &"***")
            .finish()
    }
}

/// Trim, force `https://`, and drop any trailing `/`.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    if host.is_empty() {
        return String::new();
    }

    let with_scheme = if let Some(rest) = host.strip_prefix("http://") {
        format!("https://{rest}")
    } else if host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{host}")
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[derive(Debug, Deserialize)]
struct SecretsFile {
    #[serde(default)]
    api_host: String,
    #[serde(default)]
    api_key: String,
}

impl Secrets {
    /// Build from raw values; `None` unless both the host and key are non-empty.
    pub fn new(api_host: &str, api_key: &str) -> Option<Self> {
        let api_host = normalize_host(api_host);
        let api_key = api_key.trim().to_string();

        if api_host.is_empty() || api_key.is_empty() {
            return None;
        }

        Some(Self { api_host, api_key })
    }

    /// Resolve from an environment-like lookup function.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(ENV_API_HOST).unwrap_or_default();
        let key = lookup(ENV_API_KEY).unwrap_or_default();
        Self::new(&host, &key)
    }

    pub fn load_from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read a `{"api_host": .., "api_key": ..}` file. Missing or unreadable files yield `None`.
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(path).ok()?;

        match serde_json::from_str::<SecretsFile>(&contents) {
            Ok(file) => Self::new(&file.api_host, &file.api_key),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "Ignoring unparseable secrets file");
                None
            }
        }
    }

    /// Environment variables first, then the secrets file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with(|name| std::env::var(name).ok(), path)
    }

    pub fn load_with<F>(lookup: F, path: &Path) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secrets) = Self::from_lookup(lookup) {
            debug!("Using QWeather credentials from environment");
            return Ok(secrets);
        }

        if let Some(secrets) = Self::load_from_file(path) {
            debug!(path = %path.display(), "Using QWeather credentials from secrets file");
            return Ok(secrets);
        }

        Err(BriefingError::Configuration(format!(
            "Missing QWeather credentials: set {ENV_API_HOST} / {ENV_API_KEY}, or create {}",
            path.display()
        )))
    }

    /// Write the credentials as pretty JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| BriefingError::Io { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|err| BriefingError::Configuration(err.to_string()))?;
        fs::write(path, json).map_err(io_err)
    }
}
