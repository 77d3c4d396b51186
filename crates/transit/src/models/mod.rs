//! Schedule model, service times and error types.

pub mod schedule;
pub mod time;
pub mod types;

// Re-exports for convenience
pub use schedule::{FrequencyBand, LonLat, Route, Schedule, Shape, Stop, StopOnShape};
pub use time::{format_gtfs_time, parse_gtfs_time};
pub use types::{DirectionId, Result, TransitError};
