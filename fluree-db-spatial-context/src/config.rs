//! Configuration types.
//!
//! [`ContextArgs`] is the string map a spatial context is resolved from;
//! [`GeoStrategyConfig`] controls field encoding.

use crate::error::{Result, SpatialError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration key selecting the factory implementation.
pub const FACTORY_KEY: &str = "spatialContextFactory";
/// Configuration key for the distance unit name.
pub const UNITS_KEY: &str = "units";
/// Configuration key for the distance calculator name.
pub const CALCULATOR_KEY: &str = "distCalculator";
/// Configuration key for the world bounds rectangle literal.
pub const WORLD_BOUNDS_KEY: &str = "worldBounds";

/// Environment variable consulted by [`factory_override_from_env`].
pub const FACTORY_ENV_VAR: &str = "SPATIAL_CONTEXT_FACTORY";

/// String-keyed spatial context configuration.
///
/// Keys are case-sensitive. Unknown keys are kept but ignored by the
/// built-in factories, so newer configs load on older builds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextArgs(BTreeMap<String, String>);

impl ContextArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON object of string values.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| SpatialError::config(format!("invalid context args: {}", e)))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ContextArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Read the process-wide factory override from the environment.
///
/// Resolution never reads the environment itself; callers that want the
/// ambient fallback pass this value to
/// [`make_spatial_context`](crate::factory::make_spatial_context).
pub fn factory_override_from_env() -> Option<String> {
    std::env::var(FACTORY_ENV_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Configuration for [`GeoStrategy`](crate::strategy::GeoStrategy) field
/// encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoStrategyConfig {
    /// Byte budget for encoded geometries; `<= 0` disables the limit.
    /// Default: 32000
    pub max_encoded_len: i64,

    /// Hard ceiling on simplification rounds per geometry.
    /// Default: 50
    pub max_simplify_rounds: u32,
}

impl GeoStrategyConfig {
    pub const DEFAULT_MAX_ENCODED_LEN: i64 = 32_000;
    pub const DEFAULT_MAX_SIMPLIFY_ROUNDS: u32 = 50;

    /// Set the byte budget.
    pub fn with_max_encoded_len(mut self, max: i64) -> Self {
        self.max_encoded_len = max;
        self
    }

    /// Set the simplification round ceiling.
    pub fn with_max_simplify_rounds(mut self, rounds: u32) -> Self {
        self.max_simplify_rounds = rounds;
        self
    }
}

impl Default for GeoStrategyConfig {
    fn default() -> Self {
        Self {
            max_encoded_len: Self::DEFAULT_MAX_ENCODED_LEN,
            max_simplify_rounds: Self::DEFAULT_MAX_SIMPLIFY_ROUNDS,
        }
    }
}
