//! Threshold-based advisories appended to the report.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::WeatherRecord;

pub const TIP_COLD: &str = "今天气温偏低，出门注意保暖，可带个暖宝宝";
pub const TIP_COMFORTABLE: &str = "温度刚刚好，不用穿太厚";
pub const TIP_HOT: &str = "天气较热，注意防晒补水";
pub const TIP_RAIN: &str = "今天有雨，出门记得带伞";
pub const TIP_MAYBE_RAIN: &str = "今天可能有雨，建议备一把折叠伞";
pub const TIP_WIND: &str = "风力较大，注意防风，骑行请注意安全";
pub const TIP_UV_STRONG: &str = "紫外线较强，外出建议做好防晒（帽子/防晒霜）";
pub const TIP_UV_HIGH: &str = "紫外线偏强，外出建议做好防晒";
pub const TIP_AIR: &str = "空气质量较差，建议减少剧烈运动，必要时佩戴口罩";

static WIND_SCALE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"(\d+)\s*级").ok());

/// First wind scale number in a description such as `"东风 6级"` or `"北风 4-5级"`.
pub fn wind_scale(desc: &str) -> Option<u32> {
    let re = WIND_SCALE.as_ref()?;
    re.captures(desc)?.get(1)?.as_str().parse().ok()
}

/// Advisories for a record, in fixed order; each fires independently.
pub fn weather_tips(w: &WeatherRecord) -> Vec<&'static str> {
    let mut tips = Vec::new();

    if w.temp_min_c.is_some_and(|t| t <= 10.0) {
        tips.push(TIP_COLD);
    }

    if w.temp_max_c.is_some_and(|t| t > 15.0 && t < 25.0) {
        tips.push(TIP_COMFORTABLE);
    }

    if w.temp_max_c.is_some_and(|t| t >= 25.0) {
        tips.push(TIP_HOT);
    }

    // The weather text beats the probability.
    if w.weather_desc.as_deref().unwrap_or_default().contains('雨') {
        tips.push(TIP_RAIN);
    } else if w.precipitation_prob.is_some_and(|p| p >= 0.3) {
        tips.push(TIP_MAYBE_RAIN);
    }

    if w.wind_desc.as_deref().and_then(wind_scale).is_some_and(|scale| scale >= 5) {
        tips.push(TIP_WIND);
    }

    if w.uv_index.is_some_and(|uv| uv >= 6.0) {
        tips.push(TIP_UV_STRONG);
    } else if w.uv_desc.as_deref().unwrap_or_default().contains('高') {
        tips.push(TIP_UV_HIGH);
    }

    if w.aqi.is_some_and(|aqi| aqi > 150) {
        tips.push(TIP_AIR);
    }

    tips
}
