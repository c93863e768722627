use std::{fs, io, path::Path};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::{BriefingError, Result};

/// Phrase pools the report is decorated with.
///
/// A pool that is absent or `null` in the file is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Templates {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub greetings: Vec<String>,
    /// Read and kept with the file, but not part of the report layout.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub openings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notices: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tails: Vec<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Greeting,
    Notice,
    Tail,
}

impl Templates {
    /// Minimal phrases used when no template file exists.
    pub fn builtin() -> Self {
        Self {
            greetings: vec!["早上好".to_string()],
            openings: Vec::new(),
            notices: vec!["祝你今天顺利！".to_string()],
            tails: vec!["-默认模板".to_string()],
        }
    }

    /// Load from a JSON file. A missing file yields [`Templates::builtin`];
    /// a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No template file, using built-in templates");
                return Ok(Self::builtin());
            }
            Err(source) => {
                return Err(BriefingError::Io { path: path.to_path_buf(), source });
            }
        };

        serde_json::from_str(&contents).map_err(|source| BriefingError::TemplateParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn pool(&self, pool: Pool) -> &[String] {
        match pool {
            Pool::Greeting => &self.greetings,
            Pool::Notice => &self.notices,
            Pool::Tail => &self.tails,
        }
    }

    pub fn pick(&self, pool: Pool, randomize: bool) -> String {
        self.pick_with(pool, randomize, &mut rand::thread_rng())
    }

    /// Uniform choice when `randomize`, else the first entry; trimmed, empty for an empty pool.
    pub fn pick_with<R: Rng + ?Sized>(&self, pool: Pool, randomize: bool, rng: &mut R) -> String {
        let items = self.pool(pool);
        let chosen = if randomize { items.choose(rng) } else { items.first() };
        chosen.map(|s| s.trim().to_string()).unwrap_or_default()
    }
}
