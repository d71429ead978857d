//! Floyd-Warshall all-pairs shortest paths.

use std::sync::Arc;

use crate::error::{Result, RoutingError};
use crate::graph::Graph;
use crate::table::{RoutingTable, RoutingTableRow, ShortestPath};

/// All-pairs shortest paths in a single O(V^3) pass.
///
/// Worth it when queries vastly outnumber topology changes. Single-source
/// `compute` runs the full pass and returns one row.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloydWarshall;

impl FloydWarshall {
    fn all_pairs(graph: &Graph) -> Result<Vec<RoutingTableRow>> {
        let n = graph.vertex_count();
        let mut rows: Vec<RoutingTableRow> = (0..n).map(|i| RoutingTableRow::unreached(i, n)).collect();

        // Direct edges; the first best parallel edge wins.
        for edge_index in graph.traversable_edges() {
            let cost = graph.edge(edge_index).cost;
            let (from, to) = graph.edge_ends(edge_index);
            if from == to {
                if cost < 0.0 {
                    return Err(Self::negative_cycle(graph, from));
                }
                continue;
            }
            let length = graph.edge_length(edge_index);
            if rows[from].improves(to, cost, length) {
                rows[from].record(to, cost, length, Some(edge_index));
            }
        }

        for k in 0..n {
            let via = rows[k].clone();
            for (i, row) in rows.iter_mut().enumerate() {
                let (to_k, to_k_length) = (row.costs[k], row.lengths[k]);
                if i == k || to_k == f64::INFINITY {
                    continue;
                }
                for j in 0..n {
                    let k_to_j = via.costs[j];
                    if k_to_j == f64::INFINITY {
                        continue;
                    }
                    let candidate = to_k + k_to_j;
                    let candidate_length = to_k_length + via.lengths[j];
                    if row.improves(j, candidate, candidate_length) {
                        row.record(j, candidate, candidate_length, via.predecessors[j]);
                    }
                }
                if row.costs[i] < 0.0 {
                    return Err(Self::negative_cycle(graph, i));
                }
            }
        }

        Ok(rows)
    }

    fn negative_cycle(graph: &Graph, vertex: usize) -> RoutingError {
        RoutingError::NegativeCycle {
            group: graph.group().to_string(),
            point: graph.vertex_name(vertex).to_string(),
        }
    }
}

impl ShortestPath for FloydWarshall {
    fn name(&self) -> &'static str {
        "floyd_warshall"
    }

    fn compute(&self, graph: &Graph, source: usize) -> Result<RoutingTableRow> {
        let mut rows = Self::all_pairs(graph)?;
        Ok(rows.swap_remove(source))
    }

    fn build_table(&self, graph: Arc<Graph>) -> Result<RoutingTable> {
        let rows = Self::all_pairs(&graph)?;
        RoutingTable::new(graph, rows)
    }
}
