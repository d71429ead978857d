//! Plant model entities as seen by the router.
//!
//! These are read-only snapshots handed over by the plant-model store. The
//! router never mutates them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Position in plant coordinates (millimetres).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in plant coordinates, bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Area {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= self.min_x
            && position.x <= self.max_x
            && position.y >= self.min_y
            && position.y <= self.max_y
    }

    pub fn is_well_formed(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

/// A navigable point. Its name is the vertex identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub name: String,
    #[serde(default)]
    pub position: Position,
}

impl Point {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Position::default(),
        }
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }
}

/// A path segment between two points.
///
/// Travel permissions are declared per direction. A velocity of zero in a
/// direction makes that direction impassable for time-based costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub name: String,
    pub source: String,
    pub destination: String,
    /// Length in mm, travelling source -> destination.
    pub length: f64,
    /// Length travelling destination -> source, if it differs.
    #[serde(default)]
    pub reverse_length: Option<f64>,
    /// Maximum forward velocity in mm/s.
    pub max_velocity: f64,
    /// Maximum reverse velocity in mm/s.
    pub max_reverse_velocity: f64,
    pub forward_allowed: bool,
    pub reverse_allowed: bool,
    /// Locked paths are not used for routing at all.
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl Path {
    /// Creates a forward-only path with unit velocity in both directions.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
        destination: impl Into<String>,
        length: f64,
    ) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            destination: destination.into(),
            length,
            reverse_length: None,
            max_velocity: 1000.0,
            max_reverse_velocity: 1000.0,
            forward_allowed: true,
            reverse_allowed: false,
            locked: false,
            properties: BTreeMap::new(),
        }
    }

    pub fn bidirectional(mut self) -> Self {
        self.reverse_allowed = true;
        self
    }

    pub fn reverse_only(mut self) -> Self {
        self.forward_allowed = false;
        self.reverse_allowed = true;
        self
    }

    pub fn with_reverse_length(mut self, length: f64) -> Self {
        self.reverse_length = Some(length);
        self
    }

    pub fn with_velocities(mut self, forward: f64, reverse: f64) -> Self {
        self.max_velocity = forward;
        self.max_reverse_velocity = reverse;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Length of the path when travelled in the given direction.
    pub fn length_for(&self, reverse: bool) -> f64 {
        if reverse {
            self.reverse_length.unwrap_or(self.length)
        } else {
            self.length
        }
    }

    pub fn velocity_for(&self, reverse: bool) -> f64 {
        if reverse {
            self.max_reverse_velocity
        } else {
            self.max_velocity
        }
    }
}

/// Opaque routing group identifier.
///
/// Vehicles in the same group must receive identical costs for identical
/// edges, since they share one cached routing table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingGroup(String);

impl RoutingGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoutingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoutingGroup {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The vehicle attributes relevant for routing group classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub name: String,
    #[serde(default)]
    pub vehicle_type: String,
    /// Length in mm.
    #[serde(default)]
    pub length: u32,
    #[serde(default)]
    pub energy_class: String,
    #[serde(default)]
    pub max_velocity: u32,
    #[serde(default)]
    pub max_reverse_velocity: u32,
    /// Explicitly declared routing group; overrides derived grouping.
    #[serde(default)]
    pub routing_group: Option<String>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vehicle_type: String::new(),
            length: 0,
            energy_class: String::new(),
            max_velocity: 0,
            max_reverse_velocity: 0,
            routing_group: None,
        }
    }

    pub fn with_type(mut self, vehicle_type: impl Into<String>) -> Self {
        self.vehicle_type = vehicle_type.into();
        self
    }

    pub fn with_routing_group(mut self, group: impl Into<String>) -> Self {
        self.routing_group = Some(group.into());
        self
    }
}
