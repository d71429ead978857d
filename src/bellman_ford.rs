//! Bellman-Ford shortest paths with negative cycle detection.

use crate::error::{Result, RoutingError};
use crate::graph::Graph;
use crate::table::{RoutingTableRow, ShortestPath};

/// Single-source shortest paths tolerating negative edge costs.
///
/// O(V * E) per source. A negative cycle reachable from the source is a
/// hard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct BellmanFord;

impl BellmanFord {
    /// One relaxation pass over all traversable edges. Returns whether
    /// anything improved.
    fn relax(graph: &Graph, row: &mut RoutingTableRow) -> bool {
        let mut improved = false;
        for edge_index in graph.traversable_edges() {
            let (from, to) = graph.edge_ends(edge_index);
            if row.costs[from] == f64::INFINITY {
                continue;
            }
            let candidate = row.costs[from] + graph.edge(edge_index).cost;
            let candidate_length = row.lengths[from] + graph.edge_length(edge_index);
            if row.improves(to, candidate, candidate_length) {
                row.record(to, candidate, candidate_length, Some(edge_index));
                improved = true;
            }
        }
        improved
    }
}

impl ShortestPath for BellmanFord {
    fn name(&self) -> &'static str {
        "bellman_ford"
    }

    fn compute(&self, graph: &Graph, source: usize) -> Result<RoutingTableRow> {
        let mut row = RoutingTableRow::unreached(source, graph.vertex_count());

        let mut converged = false;
        for _ in 1..graph.vertex_count() {
            if !Self::relax(graph, &mut row) {
                converged = true;
                break;
            }
        }

        if !converged && Self::relax(graph, &mut row) {
            return Err(RoutingError::NegativeCycle {
                group: graph.group().to_string(),
                point: graph.vertex_name(source).to_string(),
            });
        }

        Ok(row)
    }
}
