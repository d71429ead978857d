//! Built-in edge evaluators.
//!
//! Each evaluator is independent and pure. Combine them with
//! [`crate::cost::CostPipeline`].

use std::collections::BTreeMap;

use tracing::warn;

use crate::cost::Contribution;
use crate::edge::Edge;
use crate::model::{Area, RoutingGroup};
use crate::traits::EdgeEvaluator;

/// Default property key prefix for explicit routing costs.
pub const DEFAULT_PROPERTY_PREFIX: &str = "routing_cost";

/// Cost = physical length for the direction of travel.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceEvaluator;

impl EdgeEvaluator for DistanceEvaluator {
    fn name(&self) -> &'static str {
        "distance"
    }

    fn evaluate(&self, edge: &Edge, _group: &RoutingGroup) -> Contribution {
        Contribution::Cost(edge.length())
    }
}

/// Cost = 1 per edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct HopsEvaluator;

impl EdgeEvaluator for HopsEvaluator {
    fn name(&self) -> &'static str {
        "hops"
    }

    fn evaluate(&self, _edge: &Edge, _group: &RoutingGroup) -> Contribution {
        Contribution::Cost(1.0)
    }
}

/// Cost = length / velocity.
///
/// The velocity is the path's limit for the direction, capped by the group's
/// speed limit if one is known. Zero velocity vetoes the edge.
#[derive(Debug, Clone, Default)]
pub struct TravelTimeEvaluator {
    group_speed_limits: BTreeMap<String, f64>,
    default_speed_limit: Option<f64>,
}

impl TravelTimeEvaluator {
    pub fn new(group_speed_limits: BTreeMap<String, f64>, default_speed_limit: Option<f64>) -> Self {
        Self {
            group_speed_limits,
            default_speed_limit,
        }
    }

    fn speed_limit(&self, group: &RoutingGroup) -> Option<f64> {
        self.group_speed_limits
            .get(group.as_str())
            .copied()
            .or(self.default_speed_limit)
    }
}

impl EdgeEvaluator for TravelTimeEvaluator {
    fn name(&self) -> &'static str {
        "travel_time"
    }

    fn evaluate(&self, edge: &Edge, group: &RoutingGroup) -> Contribution {
        let path_velocity = edge.path().velocity_for(edge.is_reverse()).abs();
        let velocity = match self.speed_limit(group) {
            Some(limit) => path_velocity.min(limit),
            None => path_velocity,
        };

        if velocity <= 0.0 {
            return Contribution::Veto;
        }
        Contribution::Cost(edge.length() / velocity)
    }
}

/// Cost = value of an explicit path property keyed by direction and group.
///
/// Looks up `<prefix>.forward.<group>` or `<prefix>.reverse.<group>`. A
/// numeric value overrides computed costs, `veto` or `inf` forbids the edge,
/// and a missing property contributes `default_value`.
#[derive(Debug, Clone)]
pub struct ExplicitPropertiesEvaluator {
    property_prefix: String,
    default_value: f64,
}

impl Default for ExplicitPropertiesEvaluator {
    fn default() -> Self {
        Self {
            property_prefix: DEFAULT_PROPERTY_PREFIX.to_string(),
            default_value: 0.0,
        }
    }
}

impl ExplicitPropertiesEvaluator {
    pub fn new(property_prefix: impl Into<String>, default_value: f64) -> Self {
        Self {
            property_prefix: property_prefix.into(),
            default_value,
        }
    }

    pub fn property_key(&self, reverse: bool, group: &RoutingGroup) -> String {
        format!(
            "{}.{}.{}",
            self.property_prefix,
            if reverse { "reverse" } else { "forward" },
            group
        )
    }
}

impl EdgeEvaluator for ExplicitPropertiesEvaluator {
    fn name(&self) -> &'static str {
        "explicit_properties"
    }

    fn evaluate(&self, edge: &Edge, group: &RoutingGroup) -> Contribution {
        let key = self.property_key(edge.is_reverse(), group);
        let Some(raw) = edge.path().properties.get(&key) else {
            return Contribution::Cost(self.default_value);
        };

        let value = raw.trim();
        if value.eq_ignore_ascii_case("veto") || value.eq_ignore_ascii_case("inf") {
            return Contribution::Veto;
        }
        match value.parse::<f64>() {
            Ok(cost) if cost.is_finite() => Contribution::Override(cost),
            _ => {
                warn!(path = %edge.path().name, key = %key, value = %raw, "unparseable routing cost property, vetoing edge");
                Contribution::Veto
            }
        }
    }
}

/// Confines groups to plant areas.
///
/// An edge with an endpoint outside the group's area is vetoed, or charged
/// `penalty` if one is configured. Groups without an area are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxEvaluator {
    areas: BTreeMap<String, Area>,
    default_area: Option<Area>,
    penalty: Option<f64>,
}

impl BoundingBoxEvaluator {
    pub fn new(areas: BTreeMap<String, Area>, default_area: Option<Area>, penalty: Option<f64>) -> Self {
        Self {
            areas,
            default_area,
            penalty,
        }
    }

    fn area_for(&self, group: &RoutingGroup) -> Option<&Area> {
        self.areas.get(group.as_str()).or(self.default_area.as_ref())
    }
}

impl EdgeEvaluator for BoundingBoxEvaluator {
    fn name(&self) -> &'static str {
        "bounding_box"
    }

    fn evaluate(&self, edge: &Edge, group: &RoutingGroup) -> Contribution {
        let Some(area) = self.area_for(group) else {
            return Contribution::Cost(0.0);
        };

        if area.contains(edge.source().position) && area.contains(edge.target().position) {
            return Contribution::Cost(0.0);
        }
        match self.penalty {
            Some(penalty) => Contribution::Cost(penalty),
            None => Contribution::Veto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Path, Point};
    use std::sync::Arc;

    fn edges(path: Path) -> (Edge, Edge) {
        let a = Arc::new(Point::new("A").at(0.0, 0.0));
        let b = Arc::new(Point::new("B").at(5000.0, 0.0));
        let path = Arc::new(path);
        (
            Edge::new(path.clone(), false, a.clone(), b.clone()),
            Edge::new(path, true, a, b),
        )
    }

    #[test]
    fn distance_is_symmetric_unless_declared() {
        let group = RoutingGroup::new("g");
        let (forward, reverse) = edges(Path::new("p", "A", "B", 10.0).bidirectional());
        assert_eq!(DistanceEvaluator.evaluate(&forward, &group), Contribution::Cost(10.0));
        assert_eq!(DistanceEvaluator.evaluate(&reverse, &group), Contribution::Cost(10.0));

        let (_, reverse) = edges(Path::new("p", "A", "B", 10.0).bidirectional().with_reverse_length(14.0));
        assert_eq!(DistanceEvaluator.evaluate(&reverse, &group), Contribution::Cost(14.0));
    }

    #[test]
    fn hops_is_constant() {
        let (forward, reverse) = edges(Path::new("p", "A", "B", 123.0).bidirectional());
        assert_eq!(HopsEvaluator.evaluate(&forward, &"g".into()), Contribution::Cost(1.0));
        assert_eq!(HopsEvaluator.evaluate(&reverse, &"g".into()), Contribution::Cost(1.0));
    }

    #[test]
    fn travel_time_uses_direction_velocity() {
        let (forward, reverse) = edges(
            Path::new("p", "A", "B", 1000.0)
                .bidirectional()
                .with_velocities(500.0, 250.0),
        );
        let evaluator = TravelTimeEvaluator::default();
        assert_eq!(evaluator.evaluate(&forward, &"g".into()), Contribution::Cost(2.0));
        assert_eq!(evaluator.evaluate(&reverse, &"g".into()), Contribution::Cost(4.0));
    }

    #[test]
    fn travel_time_caps_by_group_limit() {
        let (forward, _) = edges(Path::new("p", "A", "B", 1000.0).with_velocities(1000.0, 0.0));
        let limits = BTreeMap::from([("slow".to_string(), 100.0)]);
        let evaluator = TravelTimeEvaluator::new(limits, None);
        assert_eq!(evaluator.evaluate(&forward, &"slow".into()), Contribution::Cost(10.0));
        assert_eq!(evaluator.evaluate(&forward, &"fast".into()), Contribution::Cost(1.0));
    }

    #[test]
    fn travel_time_vetoes_zero_velocity() {
        let (_, reverse) = edges(
            Path::new("p", "A", "B", 1000.0)
                .bidirectional()
                .with_velocities(1000.0, 0.0),
        );
        assert_eq!(
            TravelTimeEvaluator::default().evaluate(&reverse, &"g".into()),
            Contribution::Veto
        );
    }

    #[test]
    fn explicit_property_overrides_per_group_and_direction() {
        let (forward, reverse) = edges(
            Path::new("p", "A", "B", 10.0)
                .bidirectional()
                .with_property("routing_cost.forward.heavy", "42")
                .with_property("routing_cost.reverse.heavy", "veto"),
        );
        let evaluator = ExplicitPropertiesEvaluator::default();
        assert_eq!(evaluator.evaluate(&forward, &"heavy".into()), Contribution::Override(42.0));
        assert_eq!(evaluator.evaluate(&reverse, &"heavy".into()), Contribution::Veto);
        assert_eq!(evaluator.evaluate(&forward, &"light".into()), Contribution::Cost(0.0));
    }

    #[test]
    fn explicit_property_garbage_is_vetoed() {
        let (forward, _) = edges(Path::new("p", "A", "B", 10.0).with_property("cost.forward.g", "fast"));
        let evaluator = ExplicitPropertiesEvaluator::new("cost", 3.0);
        assert_eq!(evaluator.evaluate(&forward, &"g".into()), Contribution::Veto);
        assert_eq!(evaluator.evaluate(&forward, &"h".into()), Contribution::Cost(3.0));
    }

    #[test]
    fn bounding_box_vetoes_or_penalizes_outside_points() {
        let (forward, _) = edges(Path::new("p", "A", "B", 10.0));
        let areas = BTreeMap::from([
            ("small".to_string(), Area::new(-100.0, -100.0, 1000.0, 100.0)),
            ("large".to_string(), Area::new(-100.0, -100.0, 10_000.0, 100.0)),
        ]);

        let veto = BoundingBoxEvaluator::new(areas.clone(), None, None);
        assert_eq!(veto.evaluate(&forward, &"small".into()), Contribution::Veto);
        assert_eq!(veto.evaluate(&forward, &"large".into()), Contribution::Cost(0.0));
        assert_eq!(veto.evaluate(&forward, &"free".into()), Contribution::Cost(0.0));

        let penalty = BoundingBoxEvaluator::new(areas, None, Some(500.0));
        assert_eq!(penalty.evaluate(&forward, &"small".into()), Contribution::Cost(500.0));
    }

    #[test]
    fn bounding_box_default_area_applies_to_unlisted_groups() {
        let (forward, _) = edges(Path::new("p", "A", "B", 10.0));
        let evaluator = BoundingBoxEvaluator::new(
            BTreeMap::new(),
            Some(Area::new(0.0, 0.0, 100.0, 100.0)),
            None,
        );
        assert_eq!(evaluator.evaluate(&forward, &"any".into()), Contribution::Veto);
    }
}
