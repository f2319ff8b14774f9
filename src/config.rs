//! Configuration for compound document resolution
//!
//! Values only - how they are loaded (file, env, flags) is the host's
//! concern. Every field carries a serde default so a partial or empty
//! config section deserializes to the documented defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What to do when a single linkage fails during compound resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ErrorStrategy {
    /// Drop the failing linkage, log, keep resolving
    #[default]
    Ignore,
    /// Abort the whole compound-resolution pass
    Fail,
}

/// Compound-document ("sideloading") settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompoundDocsConfig {
    /// Master switch; disabled documents carry no `included` member
    #[serde(default)]
    pub enabled: bool,

    /// How many relationship hops outward from the primary document
    #[serde(default = "default_max_hops")]
    pub max_hops: u32,

    /// Per-linkage failure handling
    #[serde(default)]
    pub error_strategy: ErrorStrategy,

    /// Resource type name -> operation key responsible for fetching it
    #[serde(default)]
    pub mapping: HashMap<String, String>,
}

fn default_max_hops() -> u32 {
    2
}

impl Default for CompoundDocsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_hops: default_max_hops(),
            error_strategy: ErrorStrategy::default(),
            mapping: HashMap::new(),
        }
    }
}

impl CompoundDocsConfig {
    /// Enabled config with the given type -> operation mapping
    pub fn enabled_with_mapping<I, K, V>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            enabled: true,
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Default::default()
        }
    }

    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn with_error_strategy(mut self, strategy: ErrorStrategy) -> Self {
        self.error_strategy = strategy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_section() {
        let config: CompoundDocsConfig = serde_json::from_str("{}").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.max_hops, 2);
        assert_eq!(config.error_strategy, ErrorStrategy::Ignore);
        assert!(config.mapping.is_empty());
    }

    #[test]
    fn test_full_section() {
        let config: CompoundDocsConfig = serde_json::from_str(
            r#"{
                "enabled": true,
                "max_hops": 3,
                "error_strategy": "FAIL",
                "mapping": { "people": "people.by_id" }
            }"#,
        )
        .unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_hops, 3);
        assert_eq!(config.error_strategy, ErrorStrategy::Fail);
        assert_eq!(config.mapping["people"], "people.by_id");
    }
}
