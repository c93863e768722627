//! Merging of the five QWeather sub-responses into one [`WeatherRecord`].
//!
//! Everything here is pure: the fetching side hands over decoded responses
//! and the fallback date, so each derivation rule can be tested in isolation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::{
    config::{IndexTypes, PopStrategy},
    fields::Scalar,
    model::{Location, WeatherRecord},
    provider::response::{
        AirResponse, DailyForecast, DailyResponse, HourlyForecast, HourlyResponse,
        IndicesResponse, NowResponse,
    },
};

/// Decoded responses of one report request. Optional endpoints are `None` when their call failed.
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub now: NowResponse,
    pub daily3d: DailyResponse,
    pub hourly24h: HourlyResponse,
    pub air: Option<AirResponse>,
    pub indices: Option<IndicesResponse>,
}

/// China AQI category for an index value.
pub fn aqi_desc(aqi: i64) -> &'static str {
    match aqi {
        i64::MIN..=50 => "优",
        51..=100 => "良",
        101..=150 => "轻度污染",
        151..=200 => "中度污染",
        201..=300 => "重度污染",
        _ => "严重污染",
    }
}

/// UV index with its category, e.g. `"7（较高）"`.
pub fn uv_desc(uv: f64) -> String {
    let label = if uv < 3.0 {
        "低"
    } else if uv < 6.0 {
        "中等"
    } else if uv < 8.0 {
        "较高"
    } else if uv < 11.0 {
        "高"
    } else {
        "极高"
    };
    format!("{:.0}（{label}）", uv.round_ties_even())
}

/// `"{day}转{night}"` when both differ, otherwise whichever is present.
pub fn weather_desc(day: &str, night: &str) -> Option<String> {
    match (day.is_empty(), night.is_empty()) {
        (false, false) if day != night => Some(format!("{day}转{night}")),
        (false, _) => Some(day.to_string()),
        (true, false) => Some(night.to_string()),
        (true, true) => None,
    }
}

/// `"{direction} {scale}级"`, leaving out whichever part is empty.
pub fn wind_desc(direction: &str, scale: &str) -> Option<String> {
    let scale = (!scale.is_empty()).then(|| format!("{scale}级"));
    let parts: Vec<&str> = [Some(direction), scale.as_deref()]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    (!parts.is_empty()).then(|| parts.join(" "))
}

fn parse_fx_date(value: &Scalar) -> Option<NaiveDate> {
    let s = value.as_str();
    if s.is_empty() {
        return None;
    }

    // e.g. "2021-02-16T15:00+08:00"; the local calendar date is what matters.
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M%:z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").map(|dt| dt.date()))
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .ok()
}

/// Hourly POP in percent, clamped to `0..=100`.
fn hourly_pop(entry: &HourlyForecast) -> Option<i64> {
    entry.pop.int().map(|pop| pop.clamp(0, 100))
}

/// Today's precipitation probability in percent.
///
/// "Today" is the date of the first hourly entry; the list is assumed to be
/// chronological, so collection stops at the first entry of another date.
/// When that first date is unreadable, the maximum over all entries is used.
pub fn today_pop_pct(hourly: &[HourlyForecast], strategy: PopStrategy) -> i64 {
    let Some(first) = hourly.first() else {
        return 0;
    };

    let Some(first_date) = parse_fx_date(&first.fx_time) else {
        return hourly.iter().filter_map(hourly_pop).max().unwrap_or(0);
    };

    let mut pops = Vec::new();
    for entry in hourly {
        let Some(date) = parse_fx_date(&entry.fx_time) else {
            continue;
        };
        if date != first_date {
            break;
        }
        pops.extend(hourly_pop(entry));
    }

    if pops.is_empty() {
        return 0;
    }

    match strategy {
        PopStrategy::Max => pops.iter().copied().max().unwrap_or(0),
        PopStrategy::Avg => {
            let mean = pops.iter().map(|&p| p as f64).sum::<f64>() / pops.len() as f64;
            mean.round_ties_even() as i64
        }
    }
}

/// Build the canonical record. `fallback_date` is used when the 3-day
/// forecast carries no readable date.
pub fn build_record(
    query_city: &str,
    location: &Location,
    sources: &Sources,
    strategy: PopStrategy,
    index_types: &IndexTypes,
    fallback_date: NaiveDate,
) -> WeatherRecord {
    // The first day of the 3-day forecast is "today".
    let today = sources
        .daily3d
        .daily
        .as_deref()
        .and_then(<[DailyForecast]>::first)
        .cloned()
        .unwrap_or_default();

    let target_date = today
        .fx_date
        .non_empty()
        .and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok())
        .unwrap_or(fallback_date);

    let mut record = WeatherRecord::empty(query_city, location, target_date);

    record.temp_min_c = today.temp_min.float();
    record.temp_max_c = today.temp_max.float();
    record.weather_desc = weather_desc(today.text_day.as_str(), today.text_night.as_str());

    let hourly = sources.hourly24h.hourly.as_deref().unwrap_or_default();
    if hourly.iter().any(|h| hourly_pop(h).is_some()) {
        let pct = today_pop_pct(hourly, strategy);
        record.precipitation_prob = Some((pct as f64 / 100.0).clamp(0.0, 1.0));
    }

    let now = sources.now.now.clone().unwrap_or_default();
    record.wind_desc = wind_desc(now.wind_dir.as_str(), now.wind_scale.as_str())
        .or_else(|| wind_desc(today.wind_dir_day.as_str(), today.wind_scale_day.as_str()));
    record.wind_speed_mps = now.wind_speed.float();

    if let Some(air) = &sources.air {
        record.aqi = air.now.as_ref().and_then(|now| now.aqi.int());
        record.aqi_desc = record.aqi.map(|aqi| aqi_desc(aqi).to_string());
    }

    record.uv_index = today.uv_index.float();
    record.uv_desc = record.uv_index.map(uv_desc);

    let indices = sources
        .indices
        .as_ref()
        .and_then(|res| res.daily.as_deref())
        .unwrap_or_default();

    for item in indices {
        let name = item.name.as_str();
        let kind = item.kind.as_str();
        let text = [&item.text, &item.detail, &item.category]
            .into_iter()
            .find_map(Scalar::non_empty);

        if index_types.is_clothing(kind) || name.contains("穿衣") {
            record.clothing_advice = text.clone();
        }

        // Some accounts only get a textual UV level from the indices endpoint.
        if record.uv_index.is_none() && (index_types.is_uv(kind) || name.contains("紫外线")) {
            if let Some(text) = text {
                record.uv_desc = Some(text);
            }
        }
    }

    record
}
