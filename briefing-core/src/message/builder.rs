use tracing::debug;

use crate::{
    error::Result,
    message::{
        MessageConfig, ReportField,
        templates::{Pool, Templates},
        tips::weather_tips,
    },
    model::WeatherRecord,
};

const UNAVAILABLE: &str = "暂无";

/// Assembles the report text from a record, the configured sections and the phrase pools.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    config: MessageConfig,
    templates: Templates,
}

impl MessageBuilder {
    /// Load templates from `config.templates_path` once, up front.
    pub fn new(config: MessageConfig) -> Result<Self> {
        let templates = Templates::load(&config.templates_path)?;
        Ok(Self::with_templates(config, templates))
    }

    pub fn with_templates(config: MessageConfig, templates: Templates) -> Self {
        Self { config, templates }
    }

    pub fn build(&self, w: &WeatherRecord) -> String {
        let cfg = &self.config;
        let enabled = |field| cfg.is_enabled(field);

        let mut lines = vec![
            self.templates.pick(Pool::Greeting, cfg.randomize),
            cfg.intro.clone(),
        ];

        if enabled(ReportField::Meta) {
            lines.push(place_line(w));
            lines.push(format!("日期：{}", w.target_date.format("%Y-%m-%d")));
        }

        if enabled(ReportField::Temperature) {
            match (w.temp_min_c, w.temp_max_c) {
                (Some(min), Some(max)) => lines.push(format!(
                    "今日气温：{:.0}°C ~ {:.0}°C",
                    min.round_ties_even(),
                    max.round_ties_even()
                )),
                _ => lines.push(format!("今日气温：{UNAVAILABLE}")),
            }
        }

        if enabled(ReportField::Weather) {
            lines.push(format!("天气：{}", or_unavailable(w.weather_desc.as_deref())));
        }

        if enabled(ReportField::Precipitation) {
            lines.push(format!("降雨概率：{}", format_prob(w.precipitation_prob)));
        }

        lines.extend(weather_tips(w).into_iter().map(str::to_string));

        if enabled(ReportField::Wind) {
            let wind = or_unavailable(w.wind_desc.as_deref());
            match w.wind_speed_mps {
                Some(speed) => lines.push(format!("风力：{wind}（{speed:.1} m/s）")),
                None => lines.push(format!("风力：{wind}")),
            }
        }

        if enabled(ReportField::AirQuality) {
            match w.aqi {
                Some(aqi) => {
                    let suffix = w
                        .aqi_desc
                        .as_deref()
                        .map(|desc| format!("（{desc}）"))
                        .unwrap_or_default();
                    lines.push(format!("空气质量：AQI {aqi}{suffix}"));
                }
                None => lines.push(format!("空气质量：{UNAVAILABLE}")),
            }
        }

        if enabled(ReportField::Uv) {
            let desc = w.uv_desc.as_deref().map(str::trim).unwrap_or_default();
            if !desc.is_empty() && desc != UNAVAILABLE {
                lines.push(format!("紫外线：{desc}"));
            } else if let Some(uv) = w.uv_index {
                lines.push(format!("紫外线：{:.0}", uv.round_ties_even()));
            } else {
                lines.push(format!("紫外线：{UNAVAILABLE}"));
            }
        }

        if enabled(ReportField::Clothing) {
            lines.push(format!("穿衣建议：{}", or_unavailable(w.clothing_advice.as_deref())));
        }

        lines.push(self.templates.pick(Pool::Notice, cfg.randomize));
        lines.push(self.templates.pick(Pool::Tail, cfg.randomize));

        let text = lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        debug!(lines = text.lines().count(), "Built report message");
        text
    }
}

fn or_unavailable(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(UNAVAILABLE)
}

/// `"{query}（定位：adm1/adm2/name）"`, or just the query when nothing resolved.
fn place_line(w: &WeatherRecord) -> String {
    let parts: Vec<&str> = [w.adm1.as_deref(), w.adm2.as_deref(), Some(w.location_name.as_str())]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        w.query_city.clone()
    } else {
        format!("{}（定位：{}）", w.query_city, parts.join("/"))
    }
}

/// Probability as a rounded percentage, e.g. `0.456` → `"46%"`.
fn format_prob(prob: Option<f64>) -> String {
    match prob {
        Some(p) => format!("{:.0}%", (p.clamp(0.0, 1.0) * 100.0).round_ties_even()),
        None => UNAVAILABLE.to_string(),
    }
}
