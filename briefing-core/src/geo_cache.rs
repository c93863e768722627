//! Persistent query → [`Location`] map that saves repeated geocoding calls.
//!
//! The cache is best-effort: unreadable files and malformed entries read as
//! misses, and failed writes are logged but never abort a resolution.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

use crate::model::Location;

pub const DEFAULT_CACHE_FILE: &str = "qweather_geocode_cache.json";

#[derive(Debug)]
pub struct GeoCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl GeoCache {
    /// Load the cache file at `path`, starting empty if it is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(dir = %parent.display(), error = %err, "Failed to create geocode cache directory");
            }
        }

        let entries = Self::load(&path);
        debug!(path = %path.display(), entries = entries.len(), "Geocode cache loaded");

        Self { path, entries }
    }

    fn load(path: &Path) -> BTreeMap<String, Value> {
        let Ok(contents) = fs::read_to_string(path) else {
            return BTreeMap::new();
        };

        serde_json::from_str(&contents).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "Ignoring unparseable geocode cache");
            BTreeMap::new()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Location> {
        let entry = self.entries.get(key)?;

        match serde_json::from_value::<Location>(entry.clone()) {
            Ok(location) => Some(location),
            Err(err) => {
                warn!(key, error = %err, "Malformed geocode cache entry, treating as miss");
                None
            }
        }
    }

    /// Insert an entry and rewrite the whole file.
    pub fn set(&mut self, key: &str, location: &Location, raw: Option<Value>) {
        let mut payload = match serde_json::to_value(location) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "Failed to serialize location for cache");
                return;
            }
        };

        if let (Some(raw), Value::Object(map)) = (raw, &mut payload) {
            map.insert("raw".to_string(), raw);
        }

        self.entries.insert(key.to_string(), payload);
        self.save();
    }

    fn save(&self) {
        let json = match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "Failed to serialize geocode cache");
                return;
            }
        };

        if let Err(err) = fs::write(&self.path, json) {
            warn!(path = %self.path.display(), error = %err, "Failed to write geocode cache");
        }
    }
}
