//! Turning a [`WeatherRecord`](crate::WeatherRecord) into the final report text.

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

pub mod builder;
pub mod templates;
pub mod tips;

pub use builder::MessageBuilder;
pub use templates::{Pool, Templates};

pub const DEFAULT_INTRO: &str = "前方杨记者带来报导——";

/// Report sections that can be switched on or off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportField {
    Meta,
    Temperature,
    Weather,
    Precipitation,
    Wind,
    AirQuality,
    Uv,
    Clothing,
}

impl ReportField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportField::Meta => "meta",
            ReportField::Temperature => "temperature",
            ReportField::Weather => "weather",
            ReportField::Precipitation => "precipitation",
            ReportField::Wind => "wind",
            ReportField::AirQuality => "air_quality",
            ReportField::Uv => "uv",
            ReportField::Clothing => "clothing",
        }
    }

    pub const fn all() -> &'static [ReportField] {
        &[
            ReportField::Meta,
            ReportField::Temperature,
            ReportField::Weather,
            ReportField::Precipitation,
            ReportField::Wind,
            ReportField::AirQuality,
            ReportField::Uv,
            ReportField::Clothing,
        ]
    }

    /// Sections shown when none are configured; air quality is opt-in.
    pub const fn defaults() -> &'static [ReportField] {
        &[
            ReportField::Meta,
            ReportField::Temperature,
            ReportField::Weather,
            ReportField::Precipitation,
            ReportField::Wind,
            ReportField::Uv,
            ReportField::Clothing,
        ]
    }
}

impl fmt::Display for ReportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ReportField {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        ReportField::all()
            .iter()
            .copied()
            .find(|field| field.as_str() == lower)
            .ok_or_else(|| {
                let supported: Vec<_> = ReportField::all().iter().map(ReportField::as_str).collect();
                anyhow::anyhow!(
                    "Unknown report field '{value}'. Supported fields: {}.",
                    supported.join(", ")
                )
            })
    }
}

/// Message composition settings, fixed for the lifetime of a builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Pick template phrases at random instead of always the first.
    pub randomize: bool,
    /// Sections to include; empty means [`ReportField::defaults`].
    pub enabled_fields: Vec<ReportField>,
    pub templates_path: PathBuf,
    /// Line printed right after the greeting.
    pub intro: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            randomize: true,
            enabled_fields: Vec::new(),
            templates_path: crate::config::default_templates_path(),
            intro: DEFAULT_INTRO.to_string(),
        }
    }
}

impl MessageConfig {
    pub fn normalized_enabled(&self) -> &[ReportField] {
        if self.enabled_fields.is_empty() {
            ReportField::defaults()
        } else {
            &self.enabled_fields
        }
    }

    pub fn is_enabled(&self, field: ReportField) -> bool {
        self.normalized_enabled().contains(&field)
    }
}
