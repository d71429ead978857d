//! Routing graphs built from plant topology.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use crate::cost::CostPipeline;
use crate::edge::{Edge, WeightedEdge};
use crate::error::{Result, RoutingError};
use crate::model::{Path, Point, RoutingGroup};

/// Vertices plus weighted edges for one routing group.
///
/// Vertices are indexed in ascending name order. Edges are ordered by path
/// name, forward before reverse.
#[derive(Debug, Clone)]
pub struct Graph {
    group: RoutingGroup,
    vertices: Vec<Arc<Point>>,
    index: HashMap<String, usize>,
    edges: Vec<WeightedEdge>,
    edge_ends: Vec<(usize, usize)>,
    /// Outgoing traversable (finite cost) edge indices per vertex.
    outgoing: Vec<Vec<usize>>,
    /// Neighbour vertices per vertex over all edges, vetoed ones included.
    physical: Vec<Vec<usize>>,
}

impl Graph {
    pub fn group(&self) -> &RoutingGroup {
        &self.group
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn vertex(&self, index: usize) -> &Point {
        &self.vertices[index]
    }

    pub fn vertex_name(&self, index: usize) -> &str {
        &self.vertices[index].name
    }

    pub fn vertex_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn edges(&self) -> &[WeightedEdge] {
        &self.edges
    }

    pub fn edge(&self, index: usize) -> &WeightedEdge {
        &self.edges[index]
    }

    /// Physical length of an edge in its travel direction.
    pub fn edge_length(&self, index: usize) -> f64 {
        self.edges[index].edge.length()
    }

    /// Source and target vertex indices of an edge.
    pub fn edge_ends(&self, index: usize) -> (usize, usize) {
        self.edge_ends[index]
    }

    /// Traversable edges leaving `vertex`. Vetoed edges are not included.
    pub fn outgoing(&self, vertex: usize) -> &[usize] {
        &self.outgoing[vertex]
    }

    /// Indices of all traversable edges, grouped by source vertex.
    pub fn traversable_edges(&self) -> impl Iterator<Item = usize> + '_ {
        self.outgoing.iter().flatten().copied()
    }

    pub fn vetoed_count(&self) -> usize {
        self.edges.iter().filter(|edge| edge.is_vetoed()).count()
    }

    /// Whether `to` can be reached from `from` when vetoes are ignored.
    pub fn physically_reachable(&self, from: usize, to: usize) -> bool {
        if from == to {
            return true;
        }

        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);
        while let Some(vertex) = queue.pop_front() {
            for &next in &self.physical[vertex] {
                if next == to {
                    return true;
                }
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

/// Builds group-specific graphs from a topology snapshot.
pub struct GraphBuilder<'a> {
    pipeline: &'a CostPipeline,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(pipeline: &'a CostPipeline) -> Self {
        Self { pipeline }
    }

    /// Builds the graph for `group`.
    ///
    /// Each unlocked path yields one edge per permitted direction. Paths that
    /// reference unknown points, and duplicate names, are rejected.
    pub fn build(&self, points: Vec<Point>, paths: Vec<Path>, group: &RoutingGroup) -> Result<Graph> {
        let mut points = points;
        points.sort_by(|a, b| a.name.cmp(&b.name));

        let mut index = HashMap::with_capacity(points.len());
        let mut vertices = Vec::with_capacity(points.len());
        for (i, point) in points.into_iter().enumerate() {
            if index.insert(point.name.clone(), i).is_some() {
                return Err(RoutingError::malformed(format!("duplicate point '{}'", point.name)));
            }
            vertices.push(Arc::new(point));
        }

        let mut paths = paths;
        paths.sort_by(|a, b| a.name.cmp(&b.name));
        if let Some(pair) = paths.windows(2).find(|pair| pair[0].name == pair[1].name) {
            return Err(RoutingError::malformed(format!("duplicate path '{}'", pair[0].name)));
        }

        let mut edges = Vec::new();
        let mut edge_ends = Vec::new();
        let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];
        let mut physical: Vec<Vec<usize>> = vec![Vec::new(); vertices.len()];

        for path in paths {
            let lookup = |name: &str| {
                index.get(name).copied().ok_or_else(|| {
                    RoutingError::malformed(format!(
                        "path '{}' references unknown point '{}'",
                        path.name, name
                    ))
                })
            };
            let from = lookup(&path.source)?;
            let to = lookup(&path.destination)?;

            if path.locked {
                continue;
            }

            let directions: Vec<bool> = [(false, path.forward_allowed), (true, path.reverse_allowed)]
                .into_iter()
                .filter(|(_, allowed)| *allowed)
                .map(|(reverse, _)| reverse)
                .collect();
            let path = Arc::new(path);

            for reverse in directions {
                let edge = Edge::new(path.clone(), reverse, vertices[from].clone(), vertices[to].clone());
                let cost = self.pipeline.cost(&edge, group);
                let ends = if reverse { (to, from) } else { (from, to) };

                let edge_index = edges.len();
                if cost != f64::INFINITY {
                    outgoing[ends.0].push(edge_index);
                }
                physical[ends.0].push(ends.1);
                edges.push(WeightedEdge { edge, cost });
                edge_ends.push(ends);
            }
        }

        let graph = Graph {
            group: group.clone(),
            vertices,
            index,
            edges,
            edge_ends,
            outgoing,
            physical,
        };

        debug!(
            group = %group,
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            vetoed = graph.vetoed_count(),
            "built routing graph"
        );

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::Contribution;
    use crate::evaluators::DistanceEvaluator;
    use crate::traits::EdgeEvaluator;

    fn points(names: &[&str]) -> Vec<Point> {
        names.iter().map(|name| Point::new(*name)).collect()
    }

    fn distance() -> CostPipeline {
        CostPipeline::new(vec![Arc::new(DistanceEvaluator) as Arc<dyn EdgeEvaluator>])
    }

    #[test]
    fn one_edge_per_permitted_direction() {
        let pipeline = distance();
        let graph = GraphBuilder::new(&pipeline)
            .build(
                points(&["A", "B", "C"]),
                vec![
                    Path::new("A--B", "A", "B", 10.0).bidirectional(),
                    Path::new("B--C", "B", "C", 5.0),
                    Path::new("C--A", "C", "A", 7.0).reverse_only(),
                ],
                &"g".into(),
            )
            .expect("graph");

        assert_eq!(graph.vertex_count(), 3);
        assert_eq!(graph.edge_count(), 4);

        let described: Vec<(String, bool, String, String)> = graph
            .edges()
            .iter()
            .map(|w| {
                (
                    w.edge.path().name.clone(),
                    w.edge.is_reverse(),
                    w.edge.source_vertex().to_string(),
                    w.edge.target_vertex().to_string(),
                )
            })
            .collect();
        assert_eq!(
            described,
            vec![
                ("A--B".into(), false, "A".into(), "B".into()),
                ("A--B".into(), true, "B".into(), "A".into()),
                ("B--C".into(), false, "B".into(), "C".into()),
                ("C--A".into(), true, "A".into(), "C".into()),
            ]
        );
    }

    #[test]
    fn bidirectional_edges_have_equal_cost() {
        let pipeline = distance();
        let graph = GraphBuilder::new(&pipeline)
            .build(
                points(&["A", "B"]),
                vec![Path::new("A--B", "A", "B", 10.0).bidirectional()],
                &"g".into(),
            )
            .expect("graph");
        assert_eq!(graph.edge(0).cost, graph.edge(1).cost);
        assert_eq!(graph.edge_ends(0), (0, 1));
        assert_eq!(graph.edge_ends(1), (1, 0));
    }

    #[test]
    fn unknown_point_is_malformed() {
        let pipeline = distance();
        let result = GraphBuilder::new(&pipeline).build(
            points(&["A"]),
            vec![Path::new("A--X", "A", "X", 1.0)],
            &"g".into(),
        );
        assert!(matches!(result, Err(RoutingError::MalformedTopology(msg)) if msg.contains("'X'")));
    }

    #[test]
    fn duplicate_names_are_malformed() {
        let pipeline = distance();
        let builder = GraphBuilder::new(&pipeline);
        assert!(builder.build(points(&["A", "A"]), Vec::new(), &"g".into()).is_err());
        assert!(
            builder
                .build(
                    points(&["A", "B"]),
                    vec![Path::new("p", "A", "B", 1.0), Path::new("p", "B", "A", 1.0)],
                    &"g".into(),
                )
                .is_err()
        );
    }

    #[test]
    fn locked_paths_yield_no_edges() {
        let pipeline = distance();
        let graph = GraphBuilder::new(&pipeline)
            .build(
                points(&["A", "B"]),
                vec![Path::new("A--B", "A", "B", 1.0).bidirectional().locked()],
                &"g".into(),
            )
            .expect("graph");
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.physically_reachable(0, 1));
    }

    #[test]
    fn build_is_deterministic_regardless_of_input_order() {
        let pipeline = distance();
        let builder = GraphBuilder::new(&pipeline);
        let paths = vec![
            Path::new("b", "B", "C", 2.0).bidirectional(),
            Path::new("a", "A", "B", 1.0),
        ];
        let mut reversed_paths = paths.clone();
        reversed_paths.reverse();

        let first = builder.build(points(&["C", "A", "B"]), paths, &"g".into()).expect("graph");
        let second = builder
            .build(points(&["A", "B", "C"]), reversed_paths, &"g".into())
            .expect("graph");

        let summary = |g: &Graph| -> Vec<(String, bool, u64)> {
            g.edges()
                .iter()
                .map(|w| (w.edge.path().name.clone(), w.edge.is_reverse(), w.cost.to_bits()))
                .collect()
        };
        assert_eq!(summary(&first), summary(&second));
        assert_eq!(first.vertex_name(0), "A");
        assert_eq!(second.vertex_name(2), "C");
    }

    struct VetoAll;

    impl EdgeEvaluator for VetoAll {
        fn name(&self) -> &'static str {
            "veto_all"
        }

        fn evaluate(&self, _edge: &Edge, _group: &RoutingGroup) -> Contribution {
            Contribution::Veto
        }
    }

    #[test]
    fn vetoed_edges_remain_physical_links() {
        let pipeline = CostPipeline::new(vec![Arc::new(VetoAll) as Arc<dyn EdgeEvaluator>]);
        let graph = GraphBuilder::new(&pipeline)
            .build(
                points(&["A", "B", "C"]),
                vec![
                    Path::new("A--B", "A", "B", 4.0).bidirectional().with_reverse_length(6.0),
                    Path::new("B--C", "B", "C", 2.0),
                ],
                &"g".into(),
            )
            .expect("graph");

        assert_eq!(graph.traversable_edges().count(), 0);
        assert_eq!(graph.vetoed_count(), 3);
        assert!(graph.physically_reachable(0, 2));
        assert!(!graph.physically_reachable(2, 0));
        assert_eq!(graph.edge_length(0), 4.0);
        assert_eq!(graph.edge_length(1), 6.0);
    }
}
