use crate::{
    Config, Location, WeatherRecord,
    error::Result,
    provider::qweather::QWeatherProvider,
    secrets::Secrets,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod aggregate;
pub mod qweather;
pub mod response;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a free-form city name to a location.
    async fn locate(&self, city: &str) -> Result<Location>;

    /// Today's weather for a free-form city name.
    async fn today(&self, city: &str) -> Result<WeatherRecord>;
}

/// Construct the provider from config, loading credentials from the
/// environment or the configured secrets file.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherProvider>> {
    let secrets = Secrets::load(&config.secrets_path())?;
    provider_from_secrets(&secrets, config)
}

pub fn provider_from_secrets(
    secrets: &Secrets,
    config: &Config,
) -> Result<Box<dyn WeatherProvider>> {
    let provider = QWeatherProvider::new(secrets, config.weather.clone())?;
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn provider_from_config_works_with_secrets_file() {
        let dir = tempfile::tempdir().unwrap();
        let secrets_path = dir.path().join("secrets.json");
        fs::write(&secrets_path, r#"{"api_host": "abc.qweatherapi.com", "api_key": "KEY"}"#).unwrap();

        let mut cfg = Config::default();
        cfg.secrets_file = Some(secrets_path);
        cfg.weather.cache_file = Some(dir.path().join("geo.json"));

        assert!(provider_from_config(&cfg).is_ok());
    }

    #[test]
    fn provider_from_secrets_opens_configured_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache_path = dir.path().join("cache").join("geo.json");

        let mut cfg = Config::default();
        cfg.weather.cache_file = Some(cache_path.clone());

        let secrets = Secrets::new("abc.qweatherapi.com", "KEY").unwrap();
        provider_from_secrets(&secrets, &cfg).unwrap();

        assert!(cache_path.parent().unwrap().is_dir());
    }
}
