//! Error types for route computation.
//!
//! "No route" is not an error: it is a normal [`crate::route::RouteOutcome`].
//! The errors here abort a graph or table build.

use thiserror::Error;

/// Failure while building a graph or routing table for a group.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingError {
    /// The plant topology is inconsistent (unknown point, duplicate name).
    #[error("malformed topology: {0}")]
    MalformedTopology(String),

    /// Bellman-Ford or Floyd-Warshall found a negative-cost cycle.
    #[error("negative cost cycle reachable from '{point}' for group '{group}'")]
    NegativeCycle { group: String, point: String },

    /// An evaluator produced a negative finite cost while Dijkstra is selected.
    #[error("negative cost {cost} on edge '{edge}' for group '{group}'")]
    NegativeEdgeCost { group: String, edge: String, cost: f64 },

    /// A routing table failed its consistency check.
    #[error("invalid routing table: {0}")]
    InvalidTable(String),
}

impl RoutingError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        RoutingError::MalformedTopology(msg.into())
    }
}

/// Failure while loading or validating a [`crate::config::RouterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_cycle_names_the_detecting_point() {
        let err = RoutingError::NegativeCycle {
            group: "G2".to_string(),
            point: "P1".to_string(),
        };
        assert_eq!(err.to_string(), "negative cost cycle reachable from 'P1' for group 'G2'");
    }
}
