use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A geocoded place, as chosen by the location resolver.
///
/// Identity is `id`; the remaining fields are informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Administrative hierarchy, coarse to fine (province, city, district).
    #[serde(default)]
    pub adm1: Option<String>,
    #[serde(default)]
    pub adm2: Option<String>,
    #[serde(default)]
    pub adm3: Option<String>,
    #[serde(default)]
    pub tz: Option<String>,
}

/// Canonical weather snapshot for one city on one day.
///
/// Every optional field is `None` when the upstream data was missing or
/// unparseable; no zero or empty-string placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub query_city: String,

    pub location_id: String,
    pub location_name: String,
    pub adm1: Option<String>,
    pub adm2: Option<String>,
    pub adm3: Option<String>,

    pub target_date: NaiveDate,

    /// From the first day of the 3-day forecast.
    pub temp_min_c: Option<f64>,
    pub temp_max_c: Option<f64>,
    pub weather_desc: Option<String>,

    /// Today's probability of precipitation in `[0, 1]`, from the 24h forecast.
    pub precipitation_prob: Option<f64>,

    pub wind_desc: Option<String>,
    pub wind_speed_mps: Option<f64>,

    pub aqi: Option<i64>,
    pub aqi_desc: Option<String>,

    pub uv_index: Option<f64>,
    pub uv_desc: Option<String>,

    pub clothing_advice: Option<String>,
}

impl WeatherRecord {
    /// A record carrying only the location identity; every weather field is absent.
    pub fn empty(query_city: &str, location: &Location, target_date: NaiveDate) -> Self {
        Self {
            query_city: query_city.to_string(),
            location_id: location.id.clone(),
            location_name: location.name.clone(),
            adm1: location.adm1.clone(),
            adm2: location.adm2.clone(),
            adm3: location.adm3.clone(),
            target_date,
            temp_min_c: None,
            temp_max_c: None,
            weather_desc: None,
            precipitation_prob: None,
            wind_desc: None,
            wind_speed_mps: None,
            aqi: None,
            aqi_desc: None,
            uv_index: None,
            uv_desc: None,
            clothing_advice: None,
        }
    }
}
