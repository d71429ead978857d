//! Routing tables and the shortest path strategy seam.

use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bellman_ford::BellmanFord;
use crate::dijkstra::Dijkstra;
use crate::error::{Result, RoutingError};
use crate::floyd_warshall::FloydWarshall;
use crate::graph::Graph;
use crate::model::RoutingGroup;

/// Shortest paths from one source vertex to every vertex.
///
/// Unreachable vertices have cost `f64::INFINITY` and no predecessor.
/// Among equal-cost paths the one with the shorter physical length wins.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingTableRow {
    pub source: usize,
    pub costs: Vec<f64>,
    /// Physical length of the chosen path to each vertex.
    pub lengths: Vec<f64>,
    /// Index of the last edge on an optimal path to each vertex.
    pub predecessors: Vec<Option<usize>>,
}

impl RoutingTableRow {
    /// A row where only the source itself is reached.
    pub fn unreached(source: usize, vertex_count: usize) -> Self {
        let mut costs = vec![f64::INFINITY; vertex_count];
        costs[source] = 0.0;
        let mut lengths = vec![f64::INFINITY; vertex_count];
        lengths[source] = 0.0;
        Self {
            source,
            costs,
            lengths,
            predecessors: vec![None; vertex_count],
        }
    }

    pub fn is_reachable(&self, target: usize) -> bool {
        self.costs[target] != f64::INFINITY
    }

    /// Whether reaching `target` at `cost` over `length` beats the current
    /// entry, ordering on (cost, physical length).
    pub fn improves(&self, target: usize, cost: f64, length: f64) -> bool {
        cost < self.costs[target] || (cost == self.costs[target] && length < self.lengths[target])
    }

    /// Records `edge` as the last step of the best path to `target`.
    pub fn record(&mut self, target: usize, cost: f64, length: f64, edge: Option<usize>) {
        self.costs[target] = cost;
        self.lengths[target] = length;
        self.predecessors[target] = edge;
    }
}

/// All rows for one group, built from one graph.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    graph: Arc<Graph>,
    rows: Vec<RoutingTableRow>,
}

impl RoutingTable {
    /// Assembles and validates a table.
    pub fn new(graph: Arc<Graph>, rows: Vec<RoutingTableRow>) -> Result<Self> {
        let table = Self { graph, rows };
        table.validate()?;
        Ok(table)
    }

    pub fn group(&self) -> &RoutingGroup {
        self.graph.group()
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn row(&self, source: usize) -> &RoutingTableRow {
        &self.rows[source]
    }

    pub fn cost(&self, source: usize, target: usize) -> f64 {
        self.rows[source].costs[target]
    }

    /// Edge indices of an optimal path, in travel order.
    ///
    /// `None` if `target` is unreachable. Empty if `source == target`.
    pub fn path(&self, source: usize, target: usize) -> Option<Vec<usize>> {
        let row = &self.rows[source];
        if !row.is_reachable(target) {
            return None;
        }

        let mut edges = Vec::new();
        let mut current = target;
        while current != source {
            let edge = row.predecessors[current]?;
            edges.push(edge);
            current = self.graph.edge_ends(edge).0;
            // A predecessor chain longer than the vertex count means a cycle.
            if edges.len() > self.graph.vertex_count() {
                return None;
            }
        }
        edges.reverse();
        Some(edges)
    }

    /// Checks shape and basic consistency of all rows.
    pub fn validate(&self) -> Result<()> {
        let n = self.graph.vertex_count();
        if self.rows.len() != n {
            return Err(RoutingError::InvalidTable(format!(
                "{} rows for {} vertices",
                self.rows.len(),
                n
            )));
        }

        for (i, row) in self.rows.iter().enumerate() {
            if row.source != i
                || row.costs.len() != n
                || row.lengths.len() != n
                || row.predecessors.len() != n
            {
                return Err(RoutingError::InvalidTable(format!(
                    "row {} is malformed",
                    i
                )));
            }
            if row.costs[i] != 0.0 {
                return Err(RoutingError::InvalidTable(format!(
                    "row {} has non-zero cost {} to itself",
                    i, row.costs[i]
                )));
            }
            let dangling = row
                .predecessors
                .iter()
                .enumerate()
                .any(|(target, pred)| match pred {
                    Some(edge) => self.graph.edge_ends(*edge).1 != target,
                    None => target != i && row.costs[target] != f64::INFINITY,
                });
            if dangling {
                return Err(RoutingError::InvalidTable(format!(
                    "row {} has inconsistent predecessors",
                    i
                )));
            }
        }

        Ok(())
    }
}

/// A strategy computing routing tables.
pub trait ShortestPath: Send + Sync {
    fn name(&self) -> &'static str;

    /// Shortest paths from `source` to all vertices.
    fn compute(&self, graph: &Graph, source: usize) -> Result<RoutingTableRow>;

    /// Builds the full table, one row per vertex.
    fn build_table(&self, graph: Arc<Graph>) -> Result<RoutingTable> {
        let rows = par_rows(&graph, |source| self.compute(&graph, source))?;
        RoutingTable::new(graph, rows)
    }
}

/// Computes one row per vertex in parallel, collected in vertex order.
pub(crate) fn par_rows<F>(graph: &Graph, row: F) -> Result<Vec<RoutingTableRow>>
where
    F: Fn(usize) -> Result<RoutingTableRow> + Sync + Send,
{
    (0..graph.vertex_count())
        .into_par_iter()
        .map(row)
        .collect()
}

/// Selectable shortest path algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    #[default]
    Dijkstra,
    BellmanFord,
    FloydWarshall,
}

impl Algorithm {
    pub fn strategy(self) -> Box<dyn ShortestPath> {
        match self {
            Algorithm::Dijkstra => Box::new(Dijkstra),
            Algorithm::BellmanFord => Box::new(BellmanFord),
            Algorithm::FloydWarshall => Box::new(FloydWarshall),
        }
    }
}
