//! Access tiers - ordered authorization levels
//!
//! A tier is a named integer weight; all comparisons are by weight only,
//! so two registered names may intentionally share a weight as aliases.
//! The registry is built once at startup and read-only afterwards.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Error, Result};

/// An ordered authorization level.
///
/// Ordering and equality compare the weight only; the name is a label
/// for configuration and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTier {
    pub name: String,
    pub weight: i32,
}

impl AccessTier {
    pub fn new(name: impl Into<String>, weight: i32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// Weight 0 - granted nothing
    pub fn no_access() -> Self {
        Self::new("NO_ACCESS", 0)
    }

    /// Weight 10 - unauthenticated read access
    pub fn public() -> Self {
        Self::new("PUBLIC", 10)
    }

    /// Weight 20 - partner integrations
    pub fn partner() -> Self {
        Self::new("PARTNER", 20)
    }

    /// Weight 30 - administrative operations
    pub fn admin() -> Self {
        Self::new("ADMIN", 30)
    }

    /// Weight 50 - unrestricted
    pub fn root_admin() -> Self {
        Self::new("ROOT_ADMIN", 50)
    }
}

impl PartialEq for AccessTier {
    fn eq(&self, other: &Self) -> bool {
        self.weight == other.weight
    }
}

impl Eq for AccessTier {}

impl PartialOrd for AccessTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for AccessTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.weight.cmp(&other.weight)
    }
}

impl fmt::Display for AccessTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.weight)
    }
}

/// Process-wide catalog of known tiers, keyed by name.
///
/// Seeded with the built-in tiers; deployments register aliases or extra
/// tiers during startup, then share the registry read-only via `Arc`.
#[derive(Debug, Clone)]
pub struct AccessTierRegistry {
    tiers: HashMap<String, AccessTier>,
}

impl AccessTierRegistry {
    /// Registry seeded with the five built-in tiers
    pub fn builtin() -> Self {
        let mut registry = Self {
            tiers: HashMap::new(),
        };
        for tier in [
            AccessTier::no_access(),
            AccessTier::public(),
            AccessTier::partner(),
            AccessTier::admin(),
            AccessTier::root_admin(),
        ] {
            registry.tiers.insert(tier.name.clone(), tier);
        }
        registry
    }

    /// Register a tier under `name`. Re-registering a name replaces it;
    /// distinct names may share a weight to act as aliases.
    pub fn register(&mut self, name: impl Into<String>, weight: i32) {
        let name = name.into();
        self.tiers.insert(name.clone(), AccessTier::new(name, weight));
    }

    /// Look up a tier by name. Unknown names are configuration defects.
    pub fn get_access_tier(&self, name: &str) -> Result<AccessTier> {
        self.tiers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Config(format!("Unknown access tier: {}", name)))
    }

    /// Look up a tier by name, falling back to NO_ACCESS. The fallback
    /// fails closed: a typo in declarative config grants nothing.
    pub fn get_access_tier_or_default(&self, name: &str) -> AccessTier {
        self.tiers
            .get(name)
            .cloned()
            .unwrap_or_else(AccessTier::no_access)
    }
}

impl Default for AccessTierRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
