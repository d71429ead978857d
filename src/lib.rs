//! agv-router: shortest path routing for AGV fleets
//!
//! Builds per-routing-group graphs from a plant topology, weights them with a
//! pluggable cost pipeline and serves cached point-to-point routes.

pub mod error;
pub mod model;
pub mod traits;
pub mod edge;
pub mod cost;
pub mod evaluators;
pub mod graph;
pub mod table;
pub mod dijkstra;
pub mod bellman_ford;
pub mod floyd_warshall;
pub mod group_mapper;
pub mod route;
pub mod config;
pub mod plant;
pub mod router;

pub use config::{CachePolicy, EvaluatorConfig, RouterConfig};
pub use error::{ConfigError, RoutingError};
pub use model::{Area, Path, Point, Position, RoutingGroup, Vehicle};
pub use route::{NoRouteFound, NoRouteReason, Routability, Route, RouteOutcome};
pub use router::{Router, RouterStats};
pub use table::Algorithm;
