use async_trait::async_trait;
use chrono::Local;
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

use crate::{
    config::WeatherSettings,
    error::Result,
    geo_cache::GeoCache,
    http::QWeatherClient,
    model::{Location, WeatherRecord},
    provider::{
        aggregate::{self, Sources},
        response::decode,
    },
    resolver::LocationResolver,
    secrets::Secrets,
};

use super::WeatherProvider;

const NOW_PATH: &str = "/v7/weather/now";
const DAILY_3D_PATH: &str = "/v7/weather/3d";
const HOURLY_24H_PATH: &str = "/v7/weather/24h";
const AIR_NOW_PATH: &str = "/v7/air/now";
const INDICES_1D_PATH: &str = "/v7/indices/1d";

/// City → cached [`Location`] → five QWeather endpoints → [`WeatherRecord`].
///
/// Host and key are bound together by the provider, so every endpoint,
/// geocoding included, goes through the same client.
#[derive(Debug)]
pub struct QWeatherProvider {
    client: QWeatherClient,
    resolver: LocationResolver,
    settings: WeatherSettings,
}

impl QWeatherProvider {
    pub fn new(secrets: &Secrets, settings: WeatherSettings) -> Result<Self> {
        let client = QWeatherClient::new(secrets, settings.timeout())?;
        let cache = GeoCache::open(settings.cache_path());
        let resolver = LocationResolver::new(client.clone(), cache, settings.city_range.clone());

        Ok(Self {
            client,
            resolver,
            settings,
        })
    }

    pub async fn get_today_weather(&self, city: &str) -> Result<WeatherRecord> {
        let location = self.resolver.resolve(city).await?;
        self.fetch_today(city, &location).await
    }

    /// Fetch and merge today's weather for an already resolved location.
    ///
    /// Current conditions and both forecasts are required; air quality and
    /// life indices only fill their fields when available.
    #[instrument(skip(self, location), fields(location_id = %location.id))]
    pub async fn fetch_today(&self, query_city: &str, location: &Location) -> Result<WeatherRecord> {
        let params = [("location", location.id.as_str())];

        let now = self.required(NOW_PATH, &params).await?;
        let daily3d = self.required(DAILY_3D_PATH, &params).await?;
        let hourly24h = self.required(HOURLY_24H_PATH, &params).await?;

        // Not every account has air quality enabled.
        let air = self.optional(AIR_NOW_PATH, &params).await;

        let type_param = self.settings.indices.type_param();
        let indices = if type_param.is_empty() {
            None
        } else {
            let params = [("location", location.id.as_str()), ("type", type_param.as_str())];
            self.optional(INDICES_1D_PATH, &params).await
        };

        let sources = Sources {
            now,
            daily3d,
            hourly24h,
            air,
            indices,
        };

        Ok(aggregate::build_record(
            query_city,
            location,
            &sources,
            self.settings.pop_strategy,
            &self.settings.indices,
            Local::now().date_naive(),
        ))
    }

    async fn required<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned + Default,
    {
        let data = self.client.get_json(path, params).await?;
        Ok(decode(path, data))
    }

    async fn optional<T>(&self, path: &str, params: &[(&str, &str)]) -> Option<T>
    where
        T: DeserializeOwned + Default,
    {
        match self.client.get_json(path, params).await {
            Ok(data) => Some(decode(path, data)),
            Err(err) => {
                warn!(path, error = %err, "Optional endpoint failed, leaving its fields empty");
                None
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for QWeatherProvider {
    async fn locate(&self, city: &str) -> Result<Location> {
        self.resolver.resolve(city).await
    }

    async fn today(&self, city: &str) -> Result<WeatherRecord> {
        self.get_today_weather(city).await
    }
}
