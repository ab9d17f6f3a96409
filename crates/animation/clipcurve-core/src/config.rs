//! Core configuration for clipcurve-core.

use serde::{Deserialize, Serialize};

/// Configuration for the components that own shared state.
/// Keep this minimal; sampling itself is configured per query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of distinct documents whose index is kept in the cache.
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { cache_capacity: 64 }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
