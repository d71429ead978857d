//! Composition of edge cost evaluators.

use std::sync::Arc;

use tracing::warn;

use crate::config::EvaluatorConfig;
use crate::edge::Edge;
use crate::evaluators::{
    BoundingBoxEvaluator, DistanceEvaluator, ExplicitPropertiesEvaluator, HopsEvaluator,
    TravelTimeEvaluator,
};
use crate::model::RoutingGroup;
use crate::traits::EdgeEvaluator;

/// What one evaluator says about an edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contribution {
    /// A finite addend to the edge's cost.
    Cost(f64),
    /// An explicit cost that replaces the sum of computed contributions.
    Override(f64),
    /// The edge is impassable for the group.
    Veto,
}

impl Contribution {
    /// Folds contributions in order.
    ///
    /// Any veto wins. Otherwise the last override wins. Otherwise the sum of
    /// all costs. NaN values count as a veto.
    pub fn combine<I>(contributions: I) -> Contribution
    where
        I: IntoIterator<Item = Contribution>,
    {
        let mut sum = 0.0;
        let mut overridden: Option<f64> = None;

        for contribution in contributions {
            match contribution {
                Contribution::Veto => return Contribution::Veto,
                Contribution::Cost(value) | Contribution::Override(value) if value.is_nan() => {
                    return Contribution::Veto;
                }
                Contribution::Cost(value) => sum += value,
                Contribution::Override(value) => overridden = Some(value),
            }
        }

        match overridden {
            Some(value) => Contribution::Override(value),
            None => Contribution::Cost(sum),
        }
    }

    /// The scalar cost, with `f64::INFINITY` for a veto.
    pub fn to_cost(self) -> f64 {
        match self {
            Contribution::Cost(value) | Contribution::Override(value) => value,
            Contribution::Veto => f64::INFINITY,
        }
    }
}

/// An ordered, immutable sequence of evaluators.
///
/// Shared across a whole graph build; evaluation never mutates it.
#[derive(Clone)]
pub struct CostPipeline {
    evaluators: Vec<Arc<dyn EdgeEvaluator>>,
}

impl CostPipeline {
    pub fn new(evaluators: Vec<Arc<dyn EdgeEvaluator>>) -> Self {
        Self { evaluators }
    }

    /// Builds a pipeline from configuration.
    ///
    /// An empty list falls back to plain distance costs.
    pub fn from_config(configs: &[EvaluatorConfig]) -> Self {
        if configs.is_empty() {
            warn!("no edge evaluators configured, falling back to distance");
            return Self::new(vec![Arc::new(DistanceEvaluator)]);
        }

        let evaluators = configs
            .iter()
            .map(|config| -> Arc<dyn EdgeEvaluator> {
                match config {
                    EvaluatorConfig::Distance => Arc::new(DistanceEvaluator),
                    EvaluatorConfig::Hops => Arc::new(HopsEvaluator),
                    EvaluatorConfig::TravelTime {
                        group_speed_limits,
                        default_speed_limit,
                    } => Arc::new(TravelTimeEvaluator::new(
                        group_speed_limits.clone(),
                        *default_speed_limit,
                    )),
                    EvaluatorConfig::ExplicitProperties {
                        property_prefix,
                        default_value,
                    } => Arc::new(ExplicitPropertiesEvaluator::new(
                        property_prefix.clone(),
                        *default_value,
                    )),
                    EvaluatorConfig::BoundingBox {
                        areas,
                        default_area,
                        penalty,
                    } => Arc::new(BoundingBoxEvaluator::new(areas.clone(), *default_area, *penalty)),
                }
            })
            .collect();

        Self::new(evaluators)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn evaluator_names(&self) -> Vec<&'static str> {
        self.evaluators.iter().map(|evaluator| evaluator.name()).collect()
    }

    /// The combined contribution of all evaluators for `edge`.
    pub fn evaluate(&self, edge: &Edge, group: &RoutingGroup) -> Contribution {
        let combined = Contribution::combine(self.evaluators.iter().map(|evaluator| {
            match evaluator.evaluate(edge, group) {
                Contribution::Cost(value) | Contribution::Override(value) if value.is_nan() => {
                    warn!(
                        evaluator = evaluator.name(),
                        edge = %edge,
                        group = %group,
                        "NaN cost contribution, treating as veto"
                    );
                    Contribution::Veto
                }
                contribution => contribution,
            }
        }));

        if let Contribution::Veto = combined {
            return combined;
        }
        if !combined.to_cost().is_finite() {
            warn!(edge = %edge, group = %group, "non-finite cost without an explicit veto, treating as veto");
            return Contribution::Veto;
        }
        combined
    }

    /// Composite edge cost; `f64::INFINITY` if any evaluator vetoes.
    pub fn cost(&self, edge: &Edge, group: &RoutingGroup) -> f64 {
        self.evaluate(edge, group).to_cost()
    }
}

impl std::fmt::Debug for CostPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostPipeline")
            .field("evaluators", &self.evaluator_names())
            .finish()
    }
}
