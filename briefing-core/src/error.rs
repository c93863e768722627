use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the briefing pipeline.
///
/// A corrupted geocode cache entry never surfaces here; it reads as a
/// cache miss and is only logged.
#[derive(Debug, Error)]
pub enum BriefingError {
    /// Credentials could not be resolved from the environment or the secrets file.
    #[error("{0}")]
    Configuration(String),

    /// Transport failure, non-200 status, or a provider error code.
    #[error("{0}")]
    Upstream(String),

    /// Geocoding returned no usable candidate.
    #[error("Geo lookup failed for '{query}': {reason}, data={payload}")]
    Lookup {
        query: String,
        reason: String,
        payload: serde_json::Value,
    },

    /// The template file exists but is not valid JSON of the expected shape.
    #[error("Failed to parse template file {}: {source}", path.display())]
    TemplateParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The message sink gave up after exhausting its retries.
    #[error("Failed to deliver message to '{recipient}' after {attempts} attempt(s): {reason}")]
    Delivery {
        recipient: String,
        attempts: u32,
        reason: String,
    },
}

pub type Result<T, E = BriefingError> = std::result::Result<T, E>;
