//! In-memory plant topology.
//!
//! A small `PlantTopology` implementation for embedding applications and
//! tests. Mutations do not notify the router; callers invalidate it.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::model::{Path, Point};
use crate::traits::PlantTopology;

#[derive(Debug, Default)]
pub struct InMemoryPlant {
    inner: RwLock<PlantState>,
}

#[derive(Debug, Default)]
struct PlantState {
    points: BTreeMap<String, Point>,
    paths: BTreeMap<String, Path>,
}

impl InMemoryPlant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(points: impl IntoIterator<Item = Point>, paths: impl IntoIterator<Item = Path>) -> Self {
        let plant = Self::new();
        for point in points {
            plant.add_point(point);
        }
        for path in paths {
            plant.add_path(path);
        }
        plant
    }

    /// Adds or replaces a point.
    pub fn add_point(&self, point: Point) {
        self.inner.write().points.insert(point.name.clone(), point);
    }

    /// Adds or replaces a path.
    pub fn add_path(&self, path: Path) {
        self.inner.write().paths.insert(path.name.clone(), path);
    }

    pub fn remove_path(&self, name: &str) -> Option<Path> {
        self.inner.write().paths.remove(name)
    }

    /// Locks or unlocks a path. Returns false if the path is unknown.
    pub fn set_path_locked(&self, name: &str, locked: bool) -> bool {
        match self.inner.write().paths.get_mut(name) {
            Some(path) => {
                path.locked = locked;
                true
            }
            None => false,
        }
    }

    pub fn point_count(&self) -> usize {
        self.inner.read().points.len()
    }
}

impl PlantTopology for InMemoryPlant {
    fn points(&self) -> Vec<Point> {
        self.inner.read().points.values().cloned().collect()
    }

    fn paths(&self) -> Vec<Path> {
        self.inner.read().paths.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_by_name() {
        let plant = InMemoryPlant::with(
            [Point::new("A"), Point::new("B"), Point::new("A").at(1.0, 1.0)],
            [Path::new("AB", "A", "B", 1.0)],
        );
        assert_eq!(plant.point_count(), 2);
        assert_eq!(plant.points()[0].position.x, 1.0);
    }

    #[test]
    fn locks_and_removes_paths() {
        let plant = InMemoryPlant::with([Point::new("A"), Point::new("B")], [Path::new("AB", "A", "B", 1.0)]);
        assert!(plant.set_path_locked("AB", true));
        assert!(plant.paths()[0].locked);
        assert!(!plant.set_path_locked("XY", true));
        assert!(plant.remove_path("AB").is_some());
        assert!(plant.paths().is_empty());
    }
}
