//! Spatial query utilities for distance calculations.
//!
//! Uses Haversine formula for accurate distances on Earth's surface.

use geo::{Closest, ClosestPoint, HaversineDistance, HaversineIntermediate, Line, LineString, Point};

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(p1: Point, p2: Point) -> f64 {
    p1.haversine_distance(&p2)
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InterpolationError {
    #[error("path has fewer than two points")]
    TooFewPoints,

    #[error("path has zero length")]
    ZeroLength,

    #[error("path contains a non-finite coordinate")]
    NonFiniteCoordinate,

    #[error("fraction {0} is not a finite number")]
    NonFiniteFraction(f64),
}

/// Cumulative haversine lengths along a line string, for constant-speed
/// arc-length interpolation.
#[derive(Debug, Clone)]
pub struct PathMeasure {
    points: Vec<Point>,
    /// `cumulative[i]` is the distance in meters from the first point to point `i`
    cumulative: Vec<f64>,
}

impl PathMeasure {
    pub fn new(line: &LineString) -> Result<Self, InterpolationError> {
        let points: Vec<Point> = line.points().collect();
        if points.len() < 2 {
            return Err(InterpolationError::TooFewPoints);
        }
        if points.iter().any(|p| !p.x().is_finite() || !p.y().is_finite()) {
            return Err(InterpolationError::NonFiniteCoordinate);
        }

        let mut cumulative = Vec::with_capacity(points.len());
        let mut total = 0.0;
        cumulative.push(total);
        for pair in points.windows(2) {
            total += haversine_distance(pair[0], pair[1]);
            cumulative.push(total);
        }

        if total <= 0.0 {
            return Err(InterpolationError::ZeroLength);
        }

        Ok(Self { points, cumulative })
    }

    /// Total length in meters
    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point at `fraction` (0..=1) of the total length. Out-of-range fractions
    /// clamp to the endpoints.
    pub fn point_at_fraction(&self, fraction: f64) -> Result<Point, InterpolationError> {
        if !fraction.is_finite() {
            return Err(InterpolationError::NonFiniteFraction(fraction));
        }
        self.point_at_distance(fraction.clamp(0.0, 1.0) * self.total_length())
    }

    /// Point `distance` meters from the start of the path.
    pub fn point_at_distance(&self, distance: f64) -> Result<Point, InterpolationError> {
        let last = self.points.len() - 1;
        if distance <= 0.0 {
            return Ok(self.points[0]);
        }
        if distance >= self.total_length() {
            return Ok(self.points[last]);
        }

        // First vertex at or past `distance`; always in 1..=last here
        let end = self.cumulative.partition_point(|&c| c < distance).clamp(1, last);
        let start = end - 1;
        let segment = self.cumulative[end] - self.cumulative[start];
        if segment <= 0.0 {
            return Ok(self.points[end]);
        }

        let f = (distance - self.cumulative[start]) / segment;
        let point = self.points[start].haversine_intermediate(&self.points[end], f);
        if point.x().is_finite() && point.y().is_finite() {
            Ok(point)
        } else {
            Err(InterpolationError::NonFiniteCoordinate)
        }
    }

    /// Distance in meters along the path to the point closest to `point`.
    pub fn locate(&self, point: Point) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        for (i, pair) in self.points.windows(2).enumerate() {
            let line = Line::new(pair[0], pair[1]);
            let closest = match line.closest_point(&point) {
                Closest::Intersection(p) | Closest::SinglePoint(p) => p,
                Closest::Indeterminate => pair[0],
            };
            let off_path = haversine_distance(point, closest);
            if off_path < best.0 {
                best = (off_path, self.cumulative[i] + haversine_distance(pair[0], closest));
            }
        }
        best.1
    }
}
