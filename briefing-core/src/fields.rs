//! Lenient scalar for provider JSON, where numbers usually arrive as strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A response field kept as trimmed text.
///
/// Strings and numbers are accepted; `null`, arrays and objects read as empty,
/// so an odd field never fails the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scalar(String);

impl Scalar {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty text, or `None`.
    pub fn non_empty(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }

    /// A finite float.
    pub fn float(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|f| f.is_finite())
    }

    /// An integer, truncating any fractional part (`"35.8"` → 35); saturates at the `i64` bounds.
    pub fn int(&self) -> Option<i64> {
        self.float().map(|f| f.trunc() as i64)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self(value.trim().to_string())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match Value::deserialize(deserializer)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => String::new(),
        };
        Ok(Self(text))
    }
}
