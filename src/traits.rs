//! Core seams of the router.
//!
//! These are intentionally minimal. The plant-model store, custom cost
//! evaluators and vehicle classification plug in here.

use crate::cost::Contribution;
use crate::edge::Edge;
use crate::model::{Path, Point, RoutingGroup, Vehicle};

/// Read access to the current plant topology.
///
/// Implementations return a consistent snapshot per call. The router calls
/// both methods once per group build.
pub trait PlantTopology: Send + Sync {
    fn points(&self) -> Vec<Point>;

    fn paths(&self) -> Vec<Path>;
}

/// Computes one independent cost contribution for traversing an edge.
///
/// Evaluators must be pure: the same edge and group always yield the same
/// contribution, and no state may change between calls.
pub trait EdgeEvaluator: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn evaluate(&self, edge: &Edge, group: &RoutingGroup) -> Contribution;
}

/// Classifies vehicles into routing groups.
///
/// Must be a pure function of the vehicle's attributes.
pub trait GroupMapper: Send + Sync {
    fn classify(&self, vehicle: &Vehicle) -> RoutingGroup;
}
