//! Spatial measures and arc-length interpolation.

pub mod queries;

pub use queries::{haversine_distance, InterpolationError, PathMeasure};
