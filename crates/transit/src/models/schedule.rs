//! Denormalized per-route schedule records.
//!
//! These are produced once by the compiler, persisted as two JSON documents
//! (routes and stops) and only ever read afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use geo::{Coord, LineString};

use crate::identifiers::*;
use crate::models::types::DirectionId;

/// Trip duration assumed when a trip has fewer than two timed stops.
pub const DEFAULT_TRIP_DURATION_SEC: i64 = 1800;

/// Route color used when `route_color` is blank.
pub const DEFAULT_ROUTE_COLOR: &str = "888888";

/// A `[lon, lat]` pair as stored in the documents.
pub type LonLat = [f64; 2];

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub id: StopIdentifier,
    pub name: Arc<str>,
    pub coordinates: LonLat,
}

/// A stop as visited along one shape.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct StopOnShape {
    pub stop_id: StopIdentifier,
    pub coordinates: LonLat,
    /// Distance from the start of the shape, in the feed's own unit when
    /// `shape_dist_traveled` is present, otherwise in meters.
    pub distance_along_shape: f64,
    pub scheduled_arrival_sec: Option<u32>,
}

/// One direction/variant of a route.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Shape {
    pub shape_id: ShapeIdentifier,
    pub headsign: Arc<str>,
    pub direction: DirectionId,
    pub coordinates: Vec<LonLat>,
    pub stops: Vec<StopOnShape>,
}

impl Shape {
    pub fn line_string(&self) -> LineString {
        self.coordinates
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect()
    }

    /// Distance of the furthest stop, the reference length for stop fractions.
    pub fn total_stop_distance(&self) -> f64 {
        self.stops
            .iter()
            .map(|s| s.distance_along_shape)
            .fold(0.0, f64::max)
    }

    /// Elapsed scheduled time between the first and last timed stop.
    ///
    /// Falls back to [`DEFAULT_TRIP_DURATION_SEC`] with fewer than two timed stops.
    pub fn scheduled_duration_sec(&self) -> i64 {
        let mut timed = self.stops.iter().filter_map(|s| s.scheduled_arrival_sec);
        match (timed.next(), timed.last()) {
            (Some(first), Some(last)) => i64::from(last) - i64::from(first),
            _ => DEFAULT_TRIP_DURATION_SEC,
        }
    }
}

/// A vehicle departs every `headway_sec` for departures in
/// `[start_sec, end_sec)`, each completing its trip in `trip_duration_sec`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct FrequencyBand {
    pub start_sec: i64,
    pub end_sec: i64,
    pub headway_sec: i64,
    pub trip_duration_sec: i64,
}

impl FrequencyBand {
    pub fn is_valid(&self) -> bool {
        self.headway_sec > 0 && self.start_sec < self.end_sec
    }

    /// Synthetic departure times `start, start + headway, ...` strictly before `end`.
    ///
    /// Empty for bands with a non-positive headway.
    pub fn departures(&self) -> impl Iterator<Item = i64> + '_ {
        let step = self.headway_sec.max(1) as usize;
        let end = if self.headway_sec > 0 { self.end_sec } else { self.start_sec };
        (self.start_sec..end).step_by(step)
    }

    /// The band's own duration when positive, else the route default.
    pub fn effective_duration(&self, route_default: i64) -> i64 {
        if self.trip_duration_sec > 0 {
            self.trip_duration_sec
        } else {
            route_default
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Route {
    pub id: RouteIdentifier,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
    pub color_hex: Arc<str>,
    pub shapes: Vec<Shape>,
    pub trip_duration_sec: i64,
    pub frequencies: Vec<FrequencyBand>,
}

impl Route {
    /// Short name when present, otherwise the long name.
    pub fn display_name(&self) -> &str {
        if self.short_name.is_empty() {
            &self.long_name
        } else {
            &self.short_name
        }
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// The loaded route and stop documents with id lookups.
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone, Debug, Default)]
pub struct Schedule {
    routes: Vec<Arc<Route>>,
    stops: Vec<Arc<Stop>>,

    route_map: HashMap<RouteIdentifier, Arc<Route>>,
    stop_map: HashMap<StopIdentifier, Arc<Stop>>,
}

impl Schedule {
    pub fn from_documents(routes: Vec<Route>, stops: Vec<Stop>) -> Self {
        let routes: Vec<Arc<Route>> = routes.into_iter().map(Arc::new).collect();
        let stops: Vec<Arc<Stop>> = stops.into_iter().map(Arc::new).collect();

        let route_map = routes.iter().map(|r| (r.id.clone(), r.clone())).collect();
        let stop_map = stops.iter().map(|s| (s.id.clone(), s.clone())).collect();

        Self {
            routes,
            stops,
            route_map,
            stop_map,
        }
    }

    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    pub fn stops(&self) -> &[Arc<Stop>] {
        &self.stops
    }

    pub fn get_route(&self, id: &RouteIdentifier) -> Option<&Arc<Route>> {
        self.route_map.get(id)
    }

    pub fn get_stop(&self, id: &StopIdentifier) -> Option<&Arc<Stop>> {
        self.stop_map.get(id)
    }

    /// Stop ids referenced by some shape but absent from the stop document.
    pub fn dangling_stop_references(&self) -> Vec<StopIdentifier> {
        let mut missing: Vec<StopIdentifier> = self
            .routes
            .iter()
            .flat_map(|r| r.shapes.iter())
            .flat_map(|s| s.stops.iter())
            .filter(|s| !self.stop_map.contains_key(&s.stop_id))
            .map(|s| s.stop_id.clone())
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop_on_shape(id: &str, distance: f64, arrival: Option<u32>) -> StopOnShape {
        StopOnShape {
            stop_id: StopIdentifier::new(id),
            coordinates: [0.0, 0.0],
            distance_along_shape: distance,
            scheduled_arrival_sec: arrival,
        }
    }

    fn shape(stops: Vec<StopOnShape>) -> Shape {
        Shape {
            shape_id: ShapeIdentifier::new("sh"),
            headsign: "Downtown".into(),
            direction: DirectionId::Outbound,
            coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
            stops,
        }
    }

    #[test]
    fn test_band_departures() {
        let band = FrequencyBand {
            start_sec: 28_800,
            end_sec: 30_000,
            headway_sec: 600,
            trip_duration_sec: 1800,
        };
        let deps: Vec<i64> = band.departures().collect();
        assert_eq!(deps, vec![28_800, 29_400]);
    }

    #[test]
    fn test_band_without_headway_has_no_departures() {
        let band = FrequencyBand {
            start_sec: 0,
            end_sec: 3600,
            headway_sec: 0,
            trip_duration_sec: 1800,
        };
        assert!(!band.is_valid());
        assert_eq!(band.departures().count(), 0);

        let negative = FrequencyBand { headway_sec: -60, ..band };
        assert_eq!(negative.departures().count(), 0);
    }

    #[test]
    fn test_scheduled_duration() {
        let timed = shape(vec![
            stop_on_shape("a", 0.0, Some(100)),
            stop_on_shape("b", 1.0, None),
            stop_on_shape("c", 2.0, Some(700)),
        ]);
        assert_eq!(timed.scheduled_duration_sec(), 600);

        let untimed = shape(vec![stop_on_shape("a", 0.0, Some(100))]);
        assert_eq!(untimed.scheduled_duration_sec(), DEFAULT_TRIP_DURATION_SEC);
    }

    #[test]
    fn test_total_stop_distance() {
        let s = shape(vec![stop_on_shape("a", 0.0, None), stop_on_shape("b", 4.5, None)]);
        assert_eq!(s.total_stop_distance(), 4.5);
    }

    #[test]
    fn test_schedule_lookups_and_dangling_refs() {
        let route = Route {
            id: RouteIdentifier::new("r1"),
            short_name: "1".into(),
            long_name: "Main".into(),
            color_hex: DEFAULT_ROUTE_COLOR.into(),
            shapes: vec![shape(vec![stop_on_shape("a", 0.0, None), stop_on_shape("ghost", 1.0, None)])],
            trip_duration_sec: 1800,
            frequencies: vec![],
        };
        let stop = Stop {
            id: StopIdentifier::new("a"),
            name: "A".into(),
            coordinates: [0.0, 0.0],
        };
        let schedule = Schedule::from_documents(vec![route], vec![stop]);

        assert!(schedule.get_route(&RouteIdentifier::new("r1")).is_some());
        assert!(schedule.get_stop(&StopIdentifier::new("a")).is_some());
        assert_eq!(
            schedule.dangling_stop_references(),
            vec![StopIdentifier::new("ghost")]
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_route_json_field_names() {
        let band = FrequencyBand {
            start_sec: 1,
            end_sec: 2,
            headway_sec: 3,
            trip_duration_sec: 4,
        };
        let json = serde_json::to_value(band).unwrap();
        assert_eq!(json["startSec"], 1);
        assert_eq!(json["tripDurationSec"], 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_route_document_round_trip() {
        let route = Route {
            id: RouteIdentifier::new("r1"),
            short_name: "1".into(),
            long_name: "Main".into(),
            color_hex: DEFAULT_ROUTE_COLOR.into(),
            shapes: vec![shape(vec![stop_on_shape("a", 0.0, Some(28_800))])],
            trip_duration_sec: 1800,
            frequencies: vec![],
        };

        let json = serde_json::to_string(&route).unwrap();
        let parsed: Route = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.long_name.as_ref(), "Main");
        assert_eq!(parsed.shapes[0].headsign.as_ref(), "Downtown");
        assert_eq!(parsed.shapes[0].stops[0].scheduled_arrival_sec, Some(28_800));
    }
}
