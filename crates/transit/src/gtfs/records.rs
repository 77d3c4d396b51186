//! Typed GTFS records, validated at the table boundary.
//!
//! Each record type parses one [`Row`]; a row with an unusable required field
//! becomes a [`MalformedRow`] instead of aborting the table.

use std::sync::Arc;

use crate::gtfs::reader::{GtfsTable, Row, Table};
use crate::identifiers::*;
use crate::models::time::parse_gtfs_time;
use crate::models::types::DirectionId;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}.txt row {row}: invalid {field} '{value}'", table.name())]
pub struct MalformedRow {
    pub table: GtfsTable,
    pub row: usize,
    pub field: &'static str,
    pub value: String,
}

pub trait FromRow: Sized {
    const TABLE: GtfsTable;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow>;
}

/// Parse every row of `table`, keeping the valid ones in file order.
///
/// Returns the records and the number of rows that were excluded.
pub fn parse_table<T: FromRow>(table: &Table) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(table.len());
    let mut malformed = 0;
    for row in table.rows() {
        match T::from_row(&row) {
            Ok(record) => records.push(record),
            Err(err) => {
                malformed += 1;
                tracing::debug!("skipping {err}");
            }
        }
    }
    if malformed > 0 {
        tracing::warn!(
            "{}.txt: excluded {} malformed rows of {}",
            T::TABLE.name(),
            malformed,
            table.len()
        );
    }
    (records, malformed)
}

fn malformed<T: FromRow>(row: &Row<'_>, field: &'static str) -> MalformedRow {
    MalformedRow {
        table: T::TABLE,
        row: row.index(),
        field,
        value: row.get(field).to_string(),
    }
}

fn required_id<'a, T: FromRow>(row: &Row<'a>, field: &'static str) -> Result<&'a str, MalformedRow> {
    row.non_empty(field)
        .ok_or_else(|| malformed::<T>(row, field))
}

/// A finite float. `"NaN"` parses in Rust, so finiteness is checked explicitly.
fn required_f64<T: FromRow>(row: &Row<'_>, field: &'static str) -> Result<f64, MalformedRow> {
    row.get(field)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| malformed::<T>(row, field))
}

/// Blank is `None`; anything else must parse.
fn optional_f64<T: FromRow>(row: &Row<'_>, field: &'static str) -> Result<Option<f64>, MalformedRow> {
    match row.non_empty(field) {
        None => Ok(None),
        Some(value) => value
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| malformed::<T>(row, field)),
    }
}

fn required_u32<T: FromRow>(row: &Row<'_>, field: &'static str) -> Result<u32, MalformedRow> {
    row.get(field)
        .parse::<u32>()
        .map_err(|_| malformed::<T>(row, field))
}

fn required_time<T: FromRow>(row: &Row<'_>, field: &'static str) -> Result<u32, MalformedRow> {
    parse_gtfs_time(row.get(field)).ok_or_else(|| malformed::<T>(row, field))
}

fn optional_time<T: FromRow>(row: &Row<'_>, field: &'static str) -> Result<Option<u32>, MalformedRow> {
    match row.non_empty(field) {
        None => Ok(None),
        Some(value) => parse_gtfs_time(value)
            .map(Some)
            .ok_or_else(|| malformed::<T>(row, field)),
    }
}

// ============================================================================
// Records
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct RouteRecord {
    pub route_id: RouteIdentifier,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
    pub color: Option<Arc<str>>,
}

impl FromRow for RouteRecord {
    const TABLE: GtfsTable = GtfsTable::Routes;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            route_id: RouteIdentifier::new(required_id::<Self>(row, "route_id")?),
            short_name: row.get("route_short_name").into(),
            long_name: row.get("route_long_name").into(),
            color: row
                .non_empty("route_color")
                .map(|c| c.trim_start_matches('#').into()),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TripRecord {
    pub trip_id: TripIdentifier,
    pub route_id: RouteIdentifier,
    pub direction: DirectionId,
    pub shape_id: Option<ShapeIdentifier>,
    pub headsign: Arc<str>,
}

impl FromRow for TripRecord {
    const TABLE: GtfsTable = GtfsTable::Trips;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            trip_id: TripIdentifier::new(required_id::<Self>(row, "trip_id")?),
            route_id: RouteIdentifier::new(required_id::<Self>(row, "route_id")?),
            direction: DirectionId::from_gtfs(row.get("direction_id"))
                .ok_or_else(|| malformed::<Self>(row, "direction_id"))?,
            shape_id: row.non_empty("shape_id").map(ShapeIdentifier::new),
            headsign: row.get("trip_headsign").into(),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ShapePointRecord {
    pub shape_id: ShapeIdentifier,
    pub lat: f64,
    pub lon: f64,
    pub sequence: u32,
}

impl FromRow for ShapePointRecord {
    const TABLE: GtfsTable = GtfsTable::Shapes;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            shape_id: ShapeIdentifier::new(required_id::<Self>(row, "shape_id")?),
            lat: required_f64::<Self>(row, "shape_pt_lat")?,
            lon: required_f64::<Self>(row, "shape_pt_lon")?,
            sequence: required_u32::<Self>(row, "shape_pt_sequence")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopRecord {
    pub stop_id: StopIdentifier,
    pub name: Arc<str>,
    pub lat: f64,
    pub lon: f64,
}

impl FromRow for StopRecord {
    const TABLE: GtfsTable = GtfsTable::Stops;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            stop_id: StopIdentifier::new(required_id::<Self>(row, "stop_id")?),
            name: row.get("stop_name").into(),
            lat: required_f64::<Self>(row, "stop_lat")?,
            lon: required_f64::<Self>(row, "stop_lon")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StopTimeRecord {
    pub trip_id: TripIdentifier,
    pub stop_id: StopIdentifier,
    pub sequence: u32,
    pub shape_dist_traveled: Option<f64>,
    pub arrival: Option<u32>,
}

impl FromRow for StopTimeRecord {
    const TABLE: GtfsTable = GtfsTable::StopTimes;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            trip_id: TripIdentifier::new(required_id::<Self>(row, "trip_id")?),
            stop_id: StopIdentifier::new(required_id::<Self>(row, "stop_id")?),
            sequence: required_u32::<Self>(row, "stop_sequence")?,
            shape_dist_traveled: optional_f64::<Self>(row, "shape_dist_traveled")?,
            arrival: optional_time::<Self>(row, "arrival_time")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyRecord {
    pub trip_id: TripIdentifier,
    pub start: u32,
    pub end: u32,
    /// Kept signed so non-positive headways survive parsing and are counted
    /// as dropped bands rather than malformed rows.
    pub headway: i64,
}

impl FromRow for FrequencyRecord {
    const TABLE: GtfsTable = GtfsTable::Frequencies;

    fn from_row(row: &Row<'_>) -> Result<Self, MalformedRow> {
        Ok(Self {
            trip_id: TripIdentifier::new(required_id::<Self>(row, "trip_id")?),
            start: required_time::<Self>(row, "start_time")?,
            end: required_time::<Self>(row, "end_time")?,
            headway: row
                .get("headway_secs")
                .parse::<i64>()
                .map_err(|_| malformed::<Self>(row, "headway_secs"))?,
        })
    }
}
