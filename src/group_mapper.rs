//! Vehicle classification into routing groups.

use serde::{Deserialize, Serialize};

use crate::model::{RoutingGroup, Vehicle};
use crate::traits::GroupMapper;

/// How vehicles without an explicit routing group are grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingPolicy {
    /// Every vehicle is its own group.
    #[default]
    PerVehicle,
    /// Vehicles with identical routing-relevant attributes share a group.
    ByProfile,
}

/// Default classifier.
///
/// An explicitly declared `routing_group` always wins. Otherwise the policy
/// decides.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGroupMapper {
    policy: GroupingPolicy,
}

impl DefaultGroupMapper {
    pub fn new(policy: GroupingPolicy) -> Self {
        Self { policy }
    }

    fn profile_key(vehicle: &Vehicle) -> String {
        format!(
            "profile:{}:{}:{}:{}:{}",
            vehicle.vehicle_type,
            vehicle.length,
            vehicle.energy_class,
            vehicle.max_velocity,
            vehicle.max_reverse_velocity
        )
    }
}

impl GroupMapper for DefaultGroupMapper {
    fn classify(&self, vehicle: &Vehicle) -> RoutingGroup {
        if let Some(group) = vehicle.routing_group.as_deref().filter(|g| !g.is_empty()) {
            return RoutingGroup::new(group);
        }

        match self.policy {
            GroupingPolicy::PerVehicle => RoutingGroup::new(vehicle.name.as_str()),
            GroupingPolicy::ByProfile => RoutingGroup::new(Self::profile_key(vehicle)),
        }
    }
}
