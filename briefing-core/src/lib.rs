//! Core library for the `briefing` CLI.
//!
//! This crate defines:
//! - Credentials and configuration handling
//! - The QWeather client, geocode cache and fuzzy location resolver
//! - Aggregation of several weather endpoints into one [`WeatherRecord`]
//! - Template-driven report composition with weather advisories
//! - Sink traits the finished report is delivered through
//!
//! It is used by `briefing-cli`, but can also be reused by other binaries or services.

pub mod briefing;
pub mod config;
pub mod error;
pub mod fields;
pub mod geo_cache;
pub mod http;
pub mod message;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod secrets;
pub mod sink;

pub use briefing::Briefing;
pub use config::{Config, DeliverySettings, IndexTypes, PopStrategy, WeatherSettings};
pub use error::{BriefingError, Result};
pub use geo_cache::GeoCache;
pub use http::QWeatherClient;
pub use message::{MessageBuilder, MessageConfig, ReportField, Templates};
pub use model::{Location, WeatherRecord};
pub use provider::{WeatherProvider, qweather::QWeatherProvider};
pub use resolver::LocationResolver;
pub use secrets::Secrets;
pub use sink::{ConsoleReadiness, ConsoleSink, MessageSink, ReadinessProvider, RetryingSink};
