//! Router configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::evaluators::DEFAULT_PROPERTY_PREFIX;
use crate::model::Area;
use crate::table::Algorithm;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Shortest path algorithm used for every group.
    pub algorithm: Algorithm,
    /// Ordered cost evaluators. Empty means distance only.
    pub evaluators: Vec<EvaluatorConfig>,
    pub cache: CachePolicy,
    /// Groups whose tables are built up front and after each invalidation.
    pub eager_groups: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Dijkstra,
            evaluators: vec![EvaluatorConfig::Distance],
            cache: CachePolicy::default(),
            eager_groups: Vec::new(),
        }
    }
}

impl RouterConfig {
    /// Parses and validates a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.max_groups == Some(0) {
            return Err(ConfigError::Invalid("cache.max_groups must be at least 1".into()));
        }
        if self.cache.ttl_secs == Some(0) {
            return Err(ConfigError::Invalid("cache.ttl_secs must be at least 1".into()));
        }

        for evaluator in &self.evaluators {
            match evaluator {
                EvaluatorConfig::TravelTime {
                    group_speed_limits,
                    default_speed_limit,
                } => {
                    let limits = group_speed_limits.values().chain(default_speed_limit.iter());
                    if limits.into_iter().any(|limit| !(*limit > 0.0)) {
                        return Err(ConfigError::Invalid("speed limits must be positive".into()));
                    }
                }
                EvaluatorConfig::ExplicitProperties {
                    property_prefix,
                    default_value,
                } => {
                    if property_prefix.is_empty() {
                        return Err(ConfigError::Invalid("property_prefix must not be empty".into()));
                    }
                    if !default_value.is_finite() || *default_value < 0.0 {
                        return Err(ConfigError::Invalid(
                            "explicit property default_value must be finite and non-negative".into(),
                        ));
                    }
                }
                EvaluatorConfig::BoundingBox {
                    areas,
                    default_area,
                    penalty,
                } => {
                    if let Some((group, _)) = areas.iter().find(|(_, area)| !area.is_well_formed()) {
                        return Err(ConfigError::Invalid(format!("inverted area for group '{group}'")));
                    }
                    if default_area.is_some_and(|area| !area.is_well_formed()) {
                        return Err(ConfigError::Invalid("inverted default area".into()));
                    }
                    if penalty.is_some_and(|p| !p.is_finite() || p < 0.0) {
                        return Err(ConfigError::Invalid(
                            "bounding box penalty must be finite and non-negative".into(),
                        ));
                    }
                }
                EvaluatorConfig::Distance | EvaluatorConfig::Hops => {}
            }
        }

        Ok(())
    }
}

/// One configured evaluator with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluatorConfig {
    Distance,
    Hops,
    TravelTime {
        /// Speed limits (mm/s) keyed by routing group.
        #[serde(default)]
        group_speed_limits: BTreeMap<String, f64>,
        #[serde(default)]
        default_speed_limit: Option<f64>,
    },
    ExplicitProperties {
        #[serde(default = "default_property_prefix")]
        property_prefix: String,
        #[serde(default)]
        default_value: f64,
    },
    BoundingBox {
        /// Allowed area keyed by routing group.
        #[serde(default)]
        areas: BTreeMap<String, Area>,
        #[serde(default)]
        default_area: Option<Area>,
        /// Cost added instead of vetoing, if set.
        #[serde(default)]
        penalty: Option<f64>,
    },
}

fn default_property_prefix() -> String {
    DEFAULT_PROPERTY_PREFIX.to_string()
}

/// Retention policy for cached routing tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    /// Maximum number of cached groups; least recently used is evicted.
    pub max_groups: Option<usize>,
    /// Tables older than this are rebuilt on next use.
    pub ttl_secs: Option<u64>,
}
