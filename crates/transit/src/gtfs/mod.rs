//! GTFS table reading and typed records.

pub mod reader;
pub mod records;

use std::path::Path;

pub use reader::{locate_source, read_table, GtfsTable, Row, Table};
pub use records::{
    parse_table, FrequencyRecord, FromRow, MalformedRow, RouteRecord, ShapePointRecord,
    StopRecord, StopTimeRecord, TripRecord,
};

use crate::models::types::Result;

/// The six raw tables the compiler consumes.
#[derive(Debug, Clone)]
pub struct GtfsTables {
    pub routes: Table,
    pub trips: Table,
    pub shapes: Table,
    pub stops: Table,
    pub stop_times: Table,
    pub frequencies: Table,
}

impl GtfsTables {
    /// Read all six tables from `dir`, failing on the first missing one.
    pub fn read(dir: &Path) -> Result<Self> {
        Ok(Self {
            routes: read_table(dir, GtfsTable::Routes)?,
            trips: read_table(dir, GtfsTable::Trips)?,
            shapes: read_table(dir, GtfsTable::Shapes)?,
            stops: read_table(dir, GtfsTable::Stops)?,
            stop_times: read_table(dir, GtfsTable::StopTimes)?,
            frequencies: read_table(dir, GtfsTable::Frequencies)?,
        })
    }
}
