//! QWeather response bodies.
//!
//! Every field is optional: a missing section or an odd value only empties
//! the fields derived from it.

use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;

use crate::fields::Scalar;

/// `/v7/weather/now`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NowResponse {
    pub now: Option<CurrentConditions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentConditions {
    pub wind_dir: Scalar,
    pub wind_scale: Scalar,
    pub wind_speed: Scalar,
}

/// `/v7/weather/3d`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyResponse {
    pub daily: Option<Vec<DailyForecast>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyForecast {
    pub fx_date: Scalar,
    pub temp_min: Scalar,
    pub temp_max: Scalar,
    pub text_day: Scalar,
    pub text_night: Scalar,
    pub uv_index: Scalar,
    pub wind_dir_day: Scalar,
    pub wind_scale_day: Scalar,
}

/// `/v7/weather/24h`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HourlyResponse {
    pub hourly: Option<Vec<HourlyForecast>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HourlyForecast {
    /// e.g. `"2021-02-16T15:00+08:00"`
    pub fx_time: Scalar,
    /// Percent, `"0"`..`"100"`.
    pub pop: Scalar,
}

/// `/v7/air/now`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirResponse {
    pub now: Option<AirNow>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AirNow {
    pub aqi: Scalar,
}

/// `/v7/indices/1d`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IndicesResponse {
    pub daily: Option<Vec<LifeIndex>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LifeIndex {
    #[serde(rename = "type")]
    pub kind: Scalar,
    pub name: Scalar,
    pub text: Scalar,
    pub detail: Scalar,
    pub category: Scalar,
}

/// `/geo/v2/city/lookup`; candidates stay raw so the cache can keep them verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeoLookupResponse {
    pub location: Option<Vec<Value>>,
}

/// One geocoding candidate plus the payload it was read from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeoCandidate {
    pub id: Scalar,
    pub name: Scalar,
    pub lat: Scalar,
    pub lon: Scalar,
    pub adm1: Scalar,
    pub adm2: Scalar,
    pub adm3: Scalar,
    pub tz: Scalar,
    #[serde(skip)]
    pub raw: Value,
}

impl GeoCandidate {
    /// `None` when the entry is not an object.
    pub fn from_raw(raw: Value) -> Option<Self> {
        let mut candidate = GeoCandidate::deserialize(&raw).ok()?;
        candidate.raw = raw;
        Some(candidate)
    }
}

impl GeoLookupResponse {
    pub fn candidates(self) -> Vec<GeoCandidate> {
        self.location
            .unwrap_or_default()
            .into_iter()
            .filter_map(GeoCandidate::from_raw)
            .collect()
    }
}

/// Decode a response body, falling back to an empty response when its shape is off.
pub fn decode<T: DeserializeOwned + Default>(endpoint: &str, data: Value) -> T {
    serde_json::from_value(data).unwrap_or_else(|err| {
        warn!(endpoint, error = %err, "Unexpected response shape, treating as empty");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn daily_forecast_reads_camel_case_fields() {
        let res: DailyResponse = decode(
            "3d",
            json!({ "code": "200", "daily": [{ "fxDate": "2024-05-01", "tempMax": 29, "uvIndex": "9" }] }),
        );

        let today = &res.daily.unwrap()[0];
        assert_eq!(today.fx_date.as_str(), "2024-05-01");
        assert_eq!(today.temp_max.float(), Some(29.0));
        assert!(today.temp_min.is_empty());
    }

    #[test]
    fn null_sections_are_empty() {
        let res: HourlyResponse = decode("24h", json!({ "hourly": null }));
        assert!(res.hourly.is_none());

        let res: NowResponse = decode("now", json!({ "now": null }));
        assert!(res.now.is_none());
    }

    #[test]
    fn malformed_shape_decodes_to_default() {
        let res: IndicesResponse = decode("indices", json!({ "daily": "oops" }));
        assert!(res.daily.is_none());
    }

    #[test]
    fn life_index_type_is_renamed() {
        let res: IndicesResponse = decode(
            "indices",
            json!({ "daily": [{ "type": "3", "name": "穿衣指数", "text": "短袖" }] }),
        );
        assert_eq!(res.daily.unwrap()[0].kind.as_str(), "3");
    }

    #[test]
    fn lookup_keeps_raw_candidates_and_skips_non_objects() {
        let raw = json!({ "id": "101280604", "name": "南山", "rank": "35" });
        let res: GeoLookupResponse = decode("lookup", json!({ "location": [raw.clone(), "junk"] }));

        let candidates = res.candidates();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name.as_str(), "南山");
        assert_eq!(candidates[0].raw, raw);
    }
}
