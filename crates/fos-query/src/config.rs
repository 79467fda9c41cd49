//! Query Configuration

use serde::{Deserialize, Serialize};

/// Document-level configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of documents created by [`crate::Dom::with_config`]
    pub url: String,

    /// Execute converted `<script>` elements once they are connected
    pub enable_scripts: bool,

    /// Parsed selectors kept per document (0 disables the cache)
    pub selector_cache_size: usize,
}

impl Config {
    /// Read a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "about:blank".to_string(),
            enable_scripts: true,
            selector_cache_size: 64,
        }
    }
}
