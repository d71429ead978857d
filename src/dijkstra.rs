//! Dijkstra's shortest path algorithm.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;

use crate::error::{Result, RoutingError};
use crate::graph::Graph;
use crate::table::{par_rows, RoutingTable, RoutingTableRow, ShortestPath};

/// Priority queue entry, ordered by cost, then physical length, then
/// discovery order.
#[derive(Clone, Copy, Debug)]
struct DijkstraState {
    cost: f64,
    length: f64,
    seq: u64,
    node: usize,
}

impl PartialEq for DijkstraState {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed for a min-heap.
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.length.total_cmp(&self.length))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Single-source shortest paths for non-negative edge costs.
///
/// O((V + E) log V) per source. Rejects graphs containing a negative finite
/// edge cost instead of returning a wrong table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dijkstra;

impl Dijkstra {
    fn check_costs(graph: &Graph) -> Result<()> {
        match graph
            .traversable_edges()
            .map(|index| graph.edge(index))
            .find(|weighted| weighted.cost < 0.0)
        {
            Some(weighted) => Err(RoutingError::NegativeEdgeCost {
                group: graph.group().to_string(),
                edge: weighted.edge.to_string(),
                cost: weighted.cost,
            }),
            None => Ok(()),
        }
    }

    /// Expects costs already checked.
    fn row(graph: &Graph, source: usize) -> RoutingTableRow {
        let mut row = RoutingTableRow::unreached(source, graph.vertex_count());
        let mut settled = vec![false; graph.vertex_count()];
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;
        heap.push(DijkstraState {
            cost: 0.0,
            length: 0.0,
            seq,
            node: source,
        });

        while let Some(DijkstraState { cost, length, node, .. }) = heap.pop() {
            // Superseded by a better entry pushed later.
            if settled[node] || cost != row.costs[node] || length != row.lengths[node] {
                continue;
            }
            settled[node] = true;

            for &edge_index in graph.outgoing(node) {
                let (_, next) = graph.edge_ends(edge_index);
                if settled[next] {
                    continue;
                }
                let candidate = cost + graph.edge(edge_index).cost;
                let candidate_length = length + graph.edge_length(edge_index);
                if row.improves(next, candidate, candidate_length) {
                    row.record(next, candidate, candidate_length, Some(edge_index));
                    seq += 1;
                    heap.push(DijkstraState {
                        cost: candidate,
                        length: candidate_length,
                        seq,
                        node: next,
                    });
                }
            }
        }

        row
    }
}

impl ShortestPath for Dijkstra {
    fn name(&self) -> &'static str {
        "dijkstra"
    }

    fn compute(&self, graph: &Graph, source: usize) -> Result<RoutingTableRow> {
        Self::check_costs(graph)?;
        Ok(Self::row(graph, source))
    }

    fn build_table(&self, graph: Arc<Graph>) -> Result<RoutingTable> {
        Self::check_costs(&graph)?;
        let rows = par_rows(&graph, |source| Ok(Self::row(&graph, source)))?;
        RoutingTable::new(graph, rows)
    }
}
