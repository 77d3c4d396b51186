//! # headway-transit
//!
//! Compact per-route schedules for frequency-based transit simulation.
//!
//! ## Features
//!
//! - **Schedule model**: routes, shapes, stops and frequency bands, immutable once built
//! - **Spatial helpers**: haversine path measures and arc-length interpolation
//! - **Compiler** (`compiler` feature): joins raw GTFS tables into the route and
//!   stop documents the simulation loads
//!
//! ## Example
//!
//! ```
//! use headway_transit::prelude::*;
//!
//! let band = FrequencyBand {
//!     start_sec: 28_800,
//!     end_sec: 32_400,
//!     headway_sec: 600,
//!     trip_duration_sec: 1800,
//! };
//!
//! // Six departures between 08:00 and 09:00
//! assert_eq!(band.departures().count(), 6);
//! assert_eq!(parse_gtfs_time("25:30:00"), Some(91_800));
//! ```

pub mod identifiers;
pub mod models;
pub mod spatial;

#[cfg(feature = "compiler")]
pub mod compiler;
#[cfg(feature = "compiler")]
pub mod gtfs;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::models::schedule::*;
    pub use crate::models::time::{format_gtfs_time, parse_gtfs_time};
    pub use crate::models::types::*;
    pub use crate::spatial::{InterpolationError, PathMeasure};
}

pub use prelude::*;
