//! End-to-end compiler runs against the fixture feeds under `tests/fixtures`.

use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use headway_transit::compiler::{self, artifacts, ArtifactPaths, CompiledSchedule};
use headway_transit::gtfs::locate_source;
use headway_transit::prelude::*;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn compile_metro() -> CompiledSchedule {
    let source = locate_source(&fixtures().join("workdir"), "gtfs").unwrap();
    compiler::compile(&source).unwrap()
}

fn route<'a>(compiled: &'a CompiledSchedule, id: &str) -> &'a Route {
    compiled
        .routes
        .iter()
        .find(|r| r.id.as_str() == id)
        .unwrap()
}

#[test]
fn test_locate_source_ignores_case_and_non_matching_dirs() {
    let workdir = fixtures().join("workdir");

    let lower = locate_source(&workdir, "gtfs").unwrap();
    let upper = locate_source(&workdir, "GTFS").unwrap();

    assert_eq!(lower, upper);
    assert_eq!(lower.file_name().unwrap(), "Metro_GTFS_2024");
}

#[test]
fn test_missing_source_directory() {
    let err = locate_source(&fixtures().join("workdir"), "ferry").unwrap_err();
    assert!(matches!(err, TransitError::MissingSource { ref pattern, .. } if pattern == "ferry"));
}

#[test]
fn test_missing_table_aborts_compile() {
    let err = compiler::compile(&fixtures().join("incomplete/city_gtfs")).unwrap_err();

    match err {
        TransitError::MissingTable { table, .. } => assert_eq!(table, "frequencies"),
        other => panic!("expected MissingTable, got {other:?}"),
    }
}

#[test]
fn test_routes_without_usable_shape_are_skipped() {
    let compiled = compile_metro();
    let ids: Vec<&str> = compiled.routes.iter().map(|r| r.id.as_str()).collect();

    assert_eq!(ids, vec!["10", "20"]);
    assert_eq!(compiled.stats.routes_read, 3);
    assert_eq!(compiled.stats.routes_without_shapes, 1);
    assert_eq!(compiled.stats.shapes_emitted, 3);
    assert_eq!(compiled.stats.shapes_skipped, 1);
}

#[test]
fn test_simplified_shapes_keep_endpoints() {
    let compiled = compile_metro();

    // 250 points at stride 3
    let outbound = &route(&compiled, "10").shapes[0];
    assert_eq!(outbound.coordinates.len(), 84);
    assert_eq!(outbound.coordinates[0], [-122.68, 45.5]);
    assert_eq!(*outbound.coordinates.last().unwrap(), [-122.6302, 45.5996]);

    let inbound = &route(&compiled, "10").shapes[1];
    assert_eq!(inbound.direction, DirectionId::Inbound);
    assert_eq!(inbound.coordinates[0], [-122.6302, 45.5996]);
    assert_eq!(*inbound.coordinates.last().unwrap(), [-122.68, 45.5]);

    // 120 points at stride 2, the NaN point is excluded before simplification
    let crosstown = &route(&compiled, "20").shapes[0];
    assert_eq!(crosstown.coordinates.len(), 61);
    assert_eq!(crosstown.coordinates[0], [-122.7, 45.52]);
    assert_eq!(*crosstown.coordinates.last().unwrap(), [-122.6405, 45.52]);
}

#[test]
fn test_trip_collapse_and_stop_order() {
    let compiled = compile_metro();
    let harbor = route(&compiled, "10");

    assert_eq!(harbor.shapes.len(), 2);
    assert_eq!(compiled.stats.trips_collapsed, 2);
    assert_eq!(compiled.stats.headsign_conflicts, 1);

    let inbound: Vec<&str> = harbor.shapes[1]
        .stops
        .iter()
        .map(|s| s.stop_id.as_str())
        .collect();
    assert_eq!(inbound, vec!["H3", "H2", "H1"]);
    assert_eq!(compiled.stats.unresolved_stop_visits, 1);
}

#[test]
fn test_feed_distances_kept_and_missing_distances_projected() {
    let compiled = compile_metro();

    let measured: Vec<f64> = route(&compiled, "10").shapes[0]
        .stops
        .iter()
        .map(|s| s.distance_along_shape)
        .collect();
    assert_eq!(measured, vec![0.0, 4.4, 11.0]);

    let projected = &route(&compiled, "20").shapes[0].stops;
    assert_eq!(projected[0].distance_along_shape, 0.0);
    assert_relative_eq!(projected[1].distance_along_shape, 2337.3, epsilon = 1.0);
    assert_relative_eq!(projected[2].distance_along_shape, 4635.6, epsilon = 1.0);
    assert_eq!(projected[1].scheduled_arrival_sec, None);
}

#[test]
fn test_route_defaults_and_durations() {
    let compiled = compile_metro();

    let harbor = route(&compiled, "10");
    assert_eq!(harbor.color_hex.as_ref(), "1E90FF");
    assert_eq!(harbor.trip_duration_sec, 1500);

    let crosstown = route(&compiled, "20");
    assert_eq!(crosstown.color_hex.as_ref(), DEFAULT_ROUTE_COLOR);
    assert_eq!(crosstown.trip_duration_sec, 1200);
    assert_eq!(crosstown.display_name(), "20");
}

#[test]
fn test_frequency_bands_merged_per_window() {
    let compiled = compile_metro();

    assert_eq!(
        route(&compiled, "10").frequencies,
        vec![
            FrequencyBand {
                start_sec: 21_600,
                end_sec: 32_400,
                headway_sec: 600,
                trip_duration_sec: 1500,
            },
            FrequencyBand {
                start_sec: 23_400,
                end_sec: 34_200,
                headway_sec: 1200,
                trip_duration_sec: 1680,
            },
            FrequencyBand {
                start_sec: 86_400,
                end_sec: 91_800,
                headway_sec: 1800,
                trip_duration_sec: 1500,
            },
        ]
    );
    assert_eq!(
        route(&compiled, "20").frequencies,
        vec![FrequencyBand {
            start_sec: 19_800,
            end_sec: 82_800,
            headway_sec: 720,
            trip_duration_sec: 1200,
        }]
    );

    let stats = &compiled.stats;
    assert_eq!(stats.bands_kept, 4);
    assert_eq!(stats.bands_merged, 1);
    assert_eq!(stats.bands_dropped, 1);
    assert_eq!(stats.bands_unresolved, 0);
}

#[test]
fn test_malformed_rows_counted_per_table() {
    let compiled = compile_metro();
    let malformed = &compiled.stats.malformed_rows;

    assert_eq!(malformed["shapes"], 1);
    assert_eq!(malformed["stops"], 1);
    assert_eq!(malformed["frequencies"], 1);
    assert_eq!(malformed["stop_times"], 0);
    assert_eq!(compiled.stats.total_malformed_rows(), 3);
}

#[test]
fn test_stops_unique_and_referentially_closed() {
    let compiled = compile_metro();
    let ids: Vec<&str> = compiled.stops.iter().map(|s| s.id.as_str()).collect();

    assert_eq!(ids, vec!["H1", "H2", "H3", "C1", "C2", "C3"]);
    assert_eq!(compiled.stats.stops_emitted, 6);

    let schedule = compiled.into_schedule();
    assert!(schedule.dangling_stop_references().is_empty());
}

#[test]
fn test_rerun_is_byte_identical() {
    let out = std::env::temp_dir().join(format!("headway-rerun-{}", std::process::id()));
    let first_dir = out.join("first");
    let second_dir = out.join("second");
    fs::create_dir_all(&first_dir).unwrap();
    fs::create_dir_all(&second_dir).unwrap();

    let first = ArtifactPaths::in_directory(&first_dir);
    let second = ArtifactPaths::in_directory(&second_dir);
    compiler::write_artifacts(&compile_metro(), &first, true).unwrap();
    compiler::write_artifacts(&compile_metro(), &second, true).unwrap();

    assert_eq!(fs::read(&first.routes).unwrap(), fs::read(&second.routes).unwrap());
    assert_eq!(fs::read(&first.stops).unwrap(), fs::read(&second.stops).unwrap());

    fs::remove_dir_all(&out).unwrap();
}

#[test]
fn test_route_document_shape() {
    let compiled = compile_metro();
    let json: serde_json::Value =
        serde_json::from_slice(&artifacts::to_json(&compiled.routes, false).unwrap()).unwrap();

    let harbor = &json[0];
    assert_eq!(harbor["id"], "10");
    assert_eq!(harbor["colorHex"], "1E90FF");
    assert_eq!(harbor["tripDurationSec"], 1500);
    assert_eq!(harbor["shapes"][1]["direction"], 1);
    assert_eq!(harbor["shapes"][0]["stops"][0]["stopId"], "H1");
    assert_eq!(harbor["shapes"][0]["stops"][0]["scheduledArrivalSec"], 21_600);
    assert_eq!(harbor["frequencies"][0]["headwaySec"], 600);
}
