//! Route query results.

use std::fmt;

use crate::edge::Edge;
use crate::model::RoutingGroup;

/// An immutable route snapshot owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub source: String,
    pub target: String,
    pub group: RoutingGroup,
    /// Edges in travel order. Empty when source equals target.
    pub steps: Vec<Edge>,
    /// Per-step costs, parallel to `steps`.
    pub step_costs: Vec<f64>,
    pub cost: f64,
}

impl Route {
    /// Builds a route, summing step costs in travel order.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        group: RoutingGroup,
        steps: Vec<Edge>,
        step_costs: Vec<f64>,
    ) -> Self {
        let cost = total(&step_costs);
        Self {
            source: source.into(),
            target: target.into(),
            group,
            steps,
            step_costs,
            cost,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn hops(&self) -> usize {
        self.steps.len()
    }

    /// Point names visited, including source and target.
    pub fn points(&self) -> Vec<&str> {
        let mut points = vec![self.source.as_str()];
        points.extend(self.steps.iter().map(|edge| edge.target_vertex()));
        points
    }

    /// Appends `next`, which must start where this route ends.
    pub fn concat(mut self, next: Route) -> Route {
        debug_assert_eq!(self.target, next.source);
        self.target = next.target;
        self.steps.extend(next.steps);
        self.step_costs.extend(next.step_costs);
        self.cost = total(&self.step_costs);
        self
    }
}

fn total(costs: &[f64]) -> f64 {
    costs.iter().fold(0.0, |acc, cost| acc + cost)
}

/// Why a route could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoRouteReason {
    /// The named point does not exist in the plant model.
    UnknownPoint(String),
    /// No sequence of paths leads to the target.
    TargetUnreachable,
    /// Paths to the target exist, but each crosses an edge vetoed for the group.
    AllPathsVetoed,
}

impl fmt::Display for NoRouteReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoRouteReason::UnknownPoint(name) => write!(f, "unknown point '{}'", name),
            NoRouteReason::TargetUnreachable => f.write_str("target unreachable"),
            NoRouteReason::AllPathsVetoed => {
                f.write_str("target unreachable: all paths to target vetoed for this group")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoRouteFound {
    pub source: String,
    pub target: String,
    pub group: RoutingGroup,
    pub reason: NoRouteReason,
}

impl fmt::Display for NoRouteFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no route from '{}' to '{}' for group '{}': {}",
            self.source, self.target, self.group, self.reason
        )
    }
}

/// Outcome of a route query. "No route" is a normal result.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(Route),
    NoRoute(NoRouteFound),
}

impl RouteOutcome {
    pub fn route(&self) -> Option<&Route> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::NoRoute(_) => None,
        }
    }

    pub fn into_route(self) -> Option<Route> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::NoRoute(_) => None,
        }
    }

    pub fn no_route(&self) -> Option<&NoRouteFound> {
        match self {
            RouteOutcome::Found(_) => None,
            RouteOutcome::NoRoute(no_route) => Some(no_route),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, RouteOutcome::Found(_))
    }
}

/// Whether a sequence of points can be travelled, with an explanation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routability {
    pub routable: bool,
    pub reason: String,
}

impl Routability {
    pub fn yes() -> Self {
        Self {
            routable: true,
            reason: String::new(),
        }
    }

    pub fn no(reason: impl Into<String>) -> Self {
        Self {
            routable: false,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Path, Point};
    use std::sync::Arc;

    fn edge(name: &str, from: &str, to: &str) -> Edge {
        Edge::new(
            Arc::new(Path::new(name, from, to, 1.0)),
            false,
            Arc::new(Point::new(from)),
            Arc::new(Point::new(to)),
        )
    }

    #[test]
    fn points_follow_steps() {
        let route = Route::new(
            "A",
            "C",
            "g".into(),
            vec![edge("AB", "A", "B"), edge("BC", "B", "C")],
            vec![1.0, 2.5],
        );
        assert_eq!(route.points(), vec!["A", "B", "C"]);
        assert_eq!(route.cost, 3.5);
        assert_eq!(route.hops(), 2);
    }

    #[test]
    fn concat_joins_legs() {
        let first = Route::new("A", "B", "g".into(), vec![edge("AB", "A", "B")], vec![1.0]);
        let second = Route::new("B", "C", "g".into(), vec![edge("BC", "B", "C")], vec![4.0]);
        let joined = first.concat(second);
        assert_eq!(joined.source, "A");
        assert_eq!(joined.target, "C");
        assert_eq!(joined.cost, 5.0);
        assert_eq!(joined.points(), vec!["A", "B", "C"]);
    }

    #[test]
    fn vetoed_reason_mentions_unreachable() {
        assert_eq!(NoRouteReason::TargetUnreachable.to_string(), "target unreachable");
        assert!(NoRouteReason::AllPathsVetoed.to_string().starts_with("target unreachable"));
    }
}
