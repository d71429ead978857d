//! Plant layouts used across integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use agv_router::plant::InMemoryPlant;
use agv_router::{Area, Path, Point};

/// Installs a test-writer subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Four-point reference layout:
///
/// ```text
///            P4 (5000, 5000)
///           /  \
///      3   /    \  3
///         /      \
///   P1 ------------ P2 -----> P3
///   (0,0)   10   (5000,0)  5  (10000,0)
/// ```
///
/// P1-P2, P1-P4 and P4-P3 are bidirectional; P2-P3 is forward only.
/// P5 is isolated.
pub fn reference_plant() -> Arc<InMemoryPlant> {
    Arc::new(InMemoryPlant::with(
        [
            Point::new("P1").at(0.0, 0.0),
            Point::new("P2").at(5000.0, 0.0),
            Point::new("P3").at(10_000.0, 0.0),
            Point::new("P4").at(5000.0, 5000.0),
            Point::new("P5").at(20_000.0, 20_000.0),
        ],
        [
            Path::new("P1--P2", "P1", "P2", 10.0).bidirectional(),
            Path::new("P2--P3", "P2", "P3", 5.0),
            Path::new("P1--P4", "P1", "P4", 3.0).bidirectional(),
            Path::new("P4--P3", "P4", "P3", 3.0).bidirectional(),
        ],
    ))
}

/// Area covering P1, P2 and P3 but not P4.
pub fn area_without_p4() -> Area {
    Area::new(-1000.0, -1000.0, 11_000.0, 1000.0)
}

pub fn areas(entries: &[(&str, Area)]) -> BTreeMap<String, Area> {
    entries
        .iter()
        .map(|(group, area)| (group.to_string(), *area))
        .collect()
}

pub fn grid_point(x: usize, y: usize) -> String {
    format!("G{}-{}", x, y)
}

/// A `width` x `height` grid of bidirectional paths. Horizontal paths are
/// shorter than vertical ones so that costs are not all equal.
pub fn grid_plant(width: usize, height: usize) -> Arc<InMemoryPlant> {
    let plant = InMemoryPlant::new();
    for y in 0..height {
        for x in 0..width {
            plant.add_point(Point::new(grid_point(x, y)).at(x as f64 * 1000.0, y as f64 * 1000.0));
        }
    }
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                let (a, b) = (grid_point(x, y), grid_point(x + 1, y));
                plant.add_path(Path::new(format!("{a}--{b}"), a, b, 2.0).bidirectional());
            }
            if y + 1 < height {
                let (a, b) = (grid_point(x, y), grid_point(x, y + 1));
                plant.add_path(Path::new(format!("{a}--{b}"), a, b, 3.0).bidirectional());
            }
        }
    }
    Arc::new(plant)
}
