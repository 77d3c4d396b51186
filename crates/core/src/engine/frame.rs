use std::collections::{BTreeMap, BTreeSet};

use headway_transit::{LonLat, RouteIdentifier, StopIdentifier};
use serde::Serialize;

/// A rendered vehicle.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleState {
    pub route_id: RouteIdentifier,
    /// Index into the route's shapes; positions are always taken from shape 0.
    pub shape_index: usize,
    pub coordinates: LonLat,
    /// Clamped progress actually used for interpolation
    pub progress: f64,
}

/// Everything the presentation layer needs for one simulated instant.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub simulated_sec: f64,
    pub vehicles: Vec<VehicleState>,
    pub visited_stop_ids: BTreeSet<StopIdentifier>,
}

impl Frame {
    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Active vehicles per route, for status displays. Routes without
    /// vehicles are absent.
    pub fn vehicles_by_route(&self) -> BTreeMap<RouteIdentifier, usize> {
        let mut counts = BTreeMap::new();
        for vehicle in &self.vehicles {
            *counts.entry(vehicle.route_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_visited(&self, stop: &StopIdentifier) -> bool {
        self.visited_stop_ids.contains(stop)
    }
}
