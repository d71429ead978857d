//! Directed traversals of plant paths.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::model::{Path, Point};

/// One directed traversal of a path.
///
/// A bidirectional path yields two edges with swapped source and target.
/// Equality is structural: path name plus direction.
#[derive(Debug, Clone)]
pub struct Edge {
    path: Arc<Path>,
    reverse: bool,
    source: Arc<Point>,
    target: Arc<Point>,
}

impl Edge {
    /// Creates the edge for travelling `path` in the given direction.
    ///
    /// `from` and `to` are the path's declared source and destination points;
    /// they are swapped here when travelling reverse.
    pub fn new(path: Arc<Path>, reverse: bool, from: Arc<Point>, to: Arc<Point>) -> Self {
        let (source, target) = if reverse { (to, from) } else { (from, to) };
        Self {
            path,
            reverse,
            source,
            target,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_reverse(&self) -> bool {
        self.reverse
    }

    pub fn source(&self) -> &Point {
        &self.source
    }

    pub fn target(&self) -> &Point {
        &self.target
    }

    pub fn source_vertex(&self) -> &str {
        &self.source.name
    }

    pub fn target_vertex(&self) -> &str {
        &self.target.name
    }

    /// Intrinsic length for this direction.
    pub fn length(&self) -> f64 {
        self.path.length_for(self.reverse)
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.reverse == other.reverse && self.path.name == other.path.name
    }
}

impl Eq for Edge {}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.name.hash(state);
        self.reverse.hash(state);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{} ({} -> {})",
            self.path.name,
            if self.reverse { " [rev]" } else { "" },
            self.source.name,
            self.target.name
        )
    }
}

/// An edge weighted for one routing group.
///
/// `f64::INFINITY` marks a vetoed edge. Vetoed edges stay in the graph so
/// that every group's graph has the same shape.
#[derive(Debug, Clone)]
pub struct WeightedEdge {
    pub edge: Edge,
    pub cost: f64,
}

impl WeightedEdge {
    pub fn is_vetoed(&self) -> bool {
        self.cost == f64::INFINITY
    }
}
