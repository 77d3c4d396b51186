//! Position engine.
//!
//! Every frame is recomputed from scratch: the active departures of each route
//! at simulated time `t` are interpolated along the route's first shape. The
//! only state carried between frames is the stop [`VisitationMap`].

mod frame;
pub mod occupancy;
pub mod visitation;

use std::time::{Duration, Instant};

use headway_transit::{PathMeasure, Route, Schedule, Shape};

pub use frame::{Frame, VehicleState};
pub use occupancy::{active_vehicles, ActiveVehicle};
pub use visitation::VisitationMap;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Wall-clock time after which a visited stop reverts to unvisited
    pub respawn_interval: Duration,
    /// Maximum gap between a vehicle's progress and a stop's fraction along
    /// the shape for the stop to count as visited
    pub visit_tolerance: f64,
    pub min_progress: f64,
    pub max_progress: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            respawn_interval: Duration::from_secs(30),
            visit_tolerance: 0.015,
            // Exact 0 and 1 sit on the shape endpoints
            min_progress: 0.001,
            max_progress: 0.999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineConfigError {
    #[error("progress bounds must satisfy 0 <= min <= max <= 1, got {min}..{max}")]
    ProgressBounds { min: f64, max: f64 },

    #[error("visit tolerance must be finite and non-negative, got {0}")]
    VisitTolerance(f64),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineConfigError> {
        let (min, max) = (self.min_progress, self.max_progress);
        // Also rejects NaN, which fails every comparison
        if !(0.0 <= min && min <= max && max <= 1.0) {
            return Err(EngineConfigError::ProgressBounds { min, max });
        }
        if !(self.visit_tolerance.is_finite() && self.visit_tolerance >= 0.0) {
            return Err(EngineConfigError::VisitTolerance(self.visit_tolerance));
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct PositionEngine {
    config: EngineConfig,
    visitation: VisitationMap,
}

impl PositionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, EngineConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            visitation: VisitationMap::new(),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn visitation(&self) -> &VisitationMap {
        &self.visitation
    }

    /// Vehicles and visited stops at simulated time `t`, observed at wall
    /// time `now`.
    ///
    /// A route whose first shape cannot be measured, or a vehicle whose
    /// position cannot be interpolated, is left out of the frame.
    pub fn compute_frame(&mut self, schedule: &Schedule, t: f64, now: Instant) -> Frame {
        let mut vehicles = Vec::new();

        for route in schedule.routes() {
            self.place_route(route, t, now, &mut vehicles);
        }

        let expired = self.visitation.evict(now, self.config.respawn_interval);
        if expired > 0 {
            tracing::trace!("{expired} stops reverted to unvisited");
        }

        Frame {
            simulated_sec: t,
            vehicles,
            visited_stop_ids: self.visitation.visited_ids(),
        }
    }

    fn place_route(&mut self, route: &Route, t: f64, now: Instant, out: &mut Vec<VehicleState>) {
        let active = active_vehicles(route, t);
        if active.is_empty() {
            return;
        }
        let Some(shape) = route.shapes.first() else {
            return;
        };
        let measure = match PathMeasure::new(&shape.line_string()) {
            Ok(measure) => measure,
            Err(err) => {
                tracing::trace!("route {}: shape {} unusable: {err}", route.id, shape.shape_id);
                return;
            }
        };

        for vehicle in active {
            let progress = vehicle
                .progress
                .clamp(self.config.min_progress, self.config.max_progress);
            let point = match measure.point_at_fraction(progress) {
                Ok(point) => point,
                Err(err) => {
                    tracing::trace!(
                        "route {}: omitting departure {}: {err}",
                        route.id,
                        vehicle.departure_sec
                    );
                    continue;
                }
            };

            self.mark_visited_stops(shape, progress, now);
            out.push(VehicleState {
                route_id: route.id.clone(),
                shape_index: 0,
                coordinates: [point.x(), point.y()],
                progress,
            });
        }
    }

    fn mark_visited_stops(&mut self, shape: &Shape, progress: f64, now: Instant) {
        let total = shape.total_stop_distance();
        if total <= 0.0 {
            return;
        }
        for stop in &shape.stops {
            let fraction = stop.distance_along_shape / total;
            if (progress - fraction).abs() < self.config.visit_tolerance {
                self.visitation.mark(stop.stop_id.clone(), now);
            }
        }
    }
}
