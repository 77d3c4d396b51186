//! Schedule compiler.
//!
//! Joins the six raw GTFS tables into per-route [`Route`] records and a
//! global, deduplicated [`Stop`] list. Malformed rows are excluded and
//! counted; only a missing source directory or table aborts a run.

pub mod artifacts;
pub mod frequency;
pub mod simplify;
pub mod stats;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use geo::{Coord, LineString, Point};

use crate::gtfs::{
    parse_table, FrequencyRecord, FromRow, GtfsTables, RouteRecord, ShapePointRecord,
    StopRecord, StopTimeRecord, Table, TripRecord,
};
use crate::identifiers::*;
use crate::models::schedule::*;
use crate::models::types::{DirectionId, Result};
use crate::spatial::PathMeasure;

pub use artifacts::{write_artifacts, ArtifactPaths};
pub use frequency::{merge_bands, MergedBands};
pub use simplify::{round_coordinate, simplification_stride, simplify};
pub use stats::CompileStats;

/// Output of one compiler run.
#[derive(Debug, Clone)]
pub struct CompiledSchedule {
    pub routes: Vec<Route>,
    pub stops: Vec<Stop>,
    pub stats: CompileStats,
}

impl CompiledSchedule {
    pub fn into_schedule(self) -> Schedule {
        Schedule::from_documents(self.routes, self.stops)
    }
}

/// Read all six tables from `source_dir` and compile them.
pub fn compile(source_dir: &Path) -> Result<CompiledSchedule> {
    let tables = GtfsTables::read(source_dir)?;
    Ok(compile_tables(&tables))
}

/// Trip key under which near-identical trips collapse into one shape.
type ShapeKey = (DirectionId, Option<ShapeIdentifier>);

pub fn compile_tables(tables: &GtfsTables) -> CompiledSchedule {
    let mut stats = CompileStats::default();

    let routes: Vec<RouteRecord> = parse_counted(&tables.routes, &mut stats);
    let trips: Vec<TripRecord> = parse_counted(&tables.trips, &mut stats);
    let shape_points: Vec<ShapePointRecord> = parse_counted(&tables.shapes, &mut stats);
    let stop_records: Vec<StopRecord> = parse_counted(&tables.stops, &mut stats);
    let stop_times: Vec<StopTimeRecord> = parse_counted(&tables.stop_times, &mut stats);
    let frequencies: Vec<FrequencyRecord> = parse_counted(&tables.frequencies, &mut stats);
    stats.routes_read = routes.len();

    // 1. trip -> route, and one representative trip per (direction, shape)
    let mut trip_routes: HashMap<&TripIdentifier, &RouteIdentifier> = HashMap::new();
    let mut representatives: HashMap<&RouteIdentifier, Vec<&TripRecord>> = HashMap::new();
    let mut retained: HashMap<(&RouteIdentifier, ShapeKey), &TripRecord> = HashMap::new();
    for trip in &trips {
        trip_routes.insert(&trip.trip_id, &trip.route_id);

        let key = (&trip.route_id, (trip.direction, trip.shape_id.clone()));
        match retained.get(&key) {
            Some(first) => {
                stats.trips_collapsed += 1;
                if first.headsign != trip.headsign {
                    stats.headsign_conflicts += 1;
                }
            }
            None => {
                retained.insert(key, trip);
                representatives.entry(&trip.route_id).or_default().push(trip);
            }
        }
    }

    // 2. shape points ordered by sequence
    let mut shapes: HashMap<&ShapeIdentifier, Vec<(u32, LonLat)>> = HashMap::new();
    for point in &shape_points {
        shapes
            .entry(&point.shape_id)
            .or_default()
            .push((point.sequence, [point.lon, point.lat]));
    }
    for points in shapes.values_mut() {
        points.sort_by_key(|&(sequence, _)| sequence);
    }

    // 3. stop lookup (rows with unusable coordinates never got this far)
    let stop_lookup: HashMap<&StopIdentifier, &StopRecord> =
        stop_records.iter().map(|s| (&s.stop_id, s)).collect();

    // 4. stop visits ordered by sequence
    let mut visits: HashMap<&TripIdentifier, Vec<&StopTimeRecord>> = HashMap::new();
    for stop_time in &stop_times {
        visits.entry(&stop_time.trip_id).or_default().push(stop_time);
    }
    for trip_visits in visits.values_mut() {
        trip_visits.sort_by_key(|v| v.sequence);
    }

    // 5. frequency bands per route
    let mut route_bands: HashMap<&RouteIdentifier, Vec<FrequencyBand>> = HashMap::new();
    for frequency in &frequencies {
        let Some(&route_id) = trip_routes.get(&frequency.trip_id) else {
            stats.bands_unresolved += 1;
            continue;
        };
        let band = FrequencyBand {
            start_sec: i64::from(frequency.start),
            end_sec: i64::from(frequency.end),
            headway_sec: frequency.headway,
            trip_duration_sec: trip_duration_sec(
                visits.get(&frequency.trip_id).map(Vec::as_slice).unwrap_or_default(),
            ),
        };
        if !band.is_valid() {
            stats.bands_dropped += 1;
            continue;
        }
        route_bands.entry(route_id).or_default().push(band);
    }

    // 6 + 7. routes with at least one usable shape, in routes.txt order.
    // A repeated route_id keeps its first row.
    let mut output_routes = Vec::new();
    let mut emitted: HashSet<&RouteIdentifier> = HashSet::new();
    for record in &routes {
        if !emitted.insert(&record.route_id) {
            stats.duplicate_routes += 1;
            tracing::debug!("skipping repeated route {}", record.route_id);
            continue;
        }

        let route_shapes: Vec<Shape> = representatives
            .get(&record.route_id)
            .into_iter()
            .flatten()
            .filter_map(|trip| {
                let built = build_shape(trip, &shapes, &visits, &stop_lookup, &mut stats);
                match built {
                    Some(_) => stats.shapes_emitted += 1,
                    None => stats.shapes_skipped += 1,
                }
                built
            })
            .collect();

        let Some(first_shape) = route_shapes.first() else {
            stats.routes_without_shapes += 1;
            tracing::debug!("route {} has no usable shape", record.route_id);
            continue;
        };

        let merged = merge_bands(route_bands.remove(&record.route_id).unwrap_or_default());
        stats.bands_merged += merged.merged;
        stats.bands_kept += merged.bands.len();

        output_routes.push(Route {
            id: record.route_id.clone(),
            short_name: record.short_name.clone(),
            long_name: record.long_name.clone(),
            color_hex: record
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_ROUTE_COLOR.into()),
            trip_duration_sec: first_shape.scheduled_duration_sec(),
            shapes: route_shapes,
            frequencies: merged.bands,
        });
    }
    stats.routes_emitted = output_routes.len();

    // 8. first-seen stop list in emission order
    let output_stops = collect_stops(&output_routes, &stop_lookup);
    stats.stops_emitted = output_stops.len();

    CompiledSchedule {
        routes: output_routes,
        stops: output_stops,
        stats,
    }
}

fn parse_counted<T: FromRow>(table: &Table, stats: &mut CompileStats) -> Vec<T> {
    let (records, malformed) = parse_table::<T>(table);
    stats.malformed_rows.insert(T::TABLE.name(), malformed);
    records
}

/// Last timed arrival minus first timed arrival, or the default with fewer
/// than two timed stops.
fn trip_duration_sec(visits: &[&StopTimeRecord]) -> i64 {
    let mut timed = visits.iter().filter_map(|v| v.arrival);
    match (timed.next(), timed.last()) {
        (Some(first), Some(last)) => i64::from(last) - i64::from(first),
        _ => DEFAULT_TRIP_DURATION_SEC,
    }
}

fn build_shape(
    trip: &TripRecord,
    shapes: &HashMap<&ShapeIdentifier, Vec<(u32, LonLat)>>,
    visits: &HashMap<&TripIdentifier, Vec<&StopTimeRecord>>,
    stop_lookup: &HashMap<&StopIdentifier, &StopRecord>,
    stats: &mut CompileStats,
) -> Option<Shape> {
    let shape_id = trip.shape_id.as_ref()?;
    let points: Vec<LonLat> = shapes
        .get(shape_id)?
        .iter()
        .map(|&(_, point)| point)
        .collect();
    if points.len() < 2 {
        return None;
    }

    let mut stops: Vec<StopOnShape> = Vec::new();
    let mut all_measured = true;
    for visit in visits.get(&trip.trip_id).into_iter().flatten() {
        let Some(stop) = stop_lookup.get(&visit.stop_id) else {
            stats.unresolved_stop_visits += 1;
            continue;
        };
        all_measured &= visit.shape_dist_traveled.is_some();
        stops.push(StopOnShape {
            stop_id: stop.stop_id.clone(),
            coordinates: simplify::round_lon_lat([stop.lon, stop.lat]),
            distance_along_shape: visit.shape_dist_traveled.unwrap_or_default(),
            scheduled_arrival_sec: visit.arrival,
        });
    }

    if !all_measured {
        project_stop_distances(&points, &mut stops);
    }

    Some(Shape {
        shape_id: shape_id.clone(),
        headsign: trip.headsign.clone(),
        direction: trip.direction,
        coordinates: simplify(&points),
        stops,
    })
}

/// Replace every stop distance with meters along the full-resolution line, so
/// a shape never mixes feed units with measured ones.
fn project_stop_distances(points: &[LonLat], stops: &mut [StopOnShape]) {
    let line: LineString = points.iter().map(|&[x, y]| Coord { x, y }).collect();
    let measure = match PathMeasure::new(&line) {
        Ok(measure) => measure,
        Err(err) => {
            tracing::debug!("cannot project stops onto degenerate shape: {err}");
            return;
        }
    };
    for stop in stops.iter_mut() {
        let [lon, lat] = stop.coordinates;
        let meters = measure.locate(Point::new(lon, lat));
        stop.distance_along_shape = (meters * 10.0).round() / 10.0;
    }
}

fn collect_stops(routes: &[Route], stop_lookup: &HashMap<&StopIdentifier, &StopRecord>) -> Vec<Stop> {
    let mut seen: HashSet<&StopIdentifier> = HashSet::new();
    let mut stops = Vec::new();
    for stop_on_shape in routes
        .iter()
        .flat_map(|r| r.shapes.iter())
        .flat_map(|s| s.stops.iter())
    {
        if !seen.insert(&stop_on_shape.stop_id) {
            continue;
        }
        if let Some(record) = stop_lookup.get(&stop_on_shape.stop_id) {
            stops.push(Stop {
                id: record.stop_id.clone(),
                name: record.name.clone(),
                coordinates: simplify::round_lon_lat([record.lon, record.lat]),
            });
        }
    }
    stops
}
