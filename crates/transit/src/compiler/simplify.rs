//! Stride-based shape simplification.

use crate::models::schedule::LonLat;

/// 6 decimal places is roughly 0.11 m at the equator.
const COORDINATE_SCALE: f64 = 1_000_000.0;

/// Keep every Nth point: 3 above 200 points, 2 above 100, otherwise all.
pub fn simplification_stride(point_count: usize) -> usize {
    if point_count > 200 {
        3
    } else if point_count > 100 {
        2
    } else {
        1
    }
}

pub fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

pub fn round_lon_lat([lon, lat]: LonLat) -> LonLat {
    [round_coordinate(lon), round_coordinate(lat)]
}

/// Thin `points` by [`simplification_stride`] and round to 6 decimals.
///
/// The first and last points are always kept, whatever the stride.
pub fn simplify(points: &[LonLat]) -> Vec<LonLat> {
    let Some(last) = points.len().checked_sub(1) else {
        return Vec::new();
    };
    let stride = simplification_stride(points.len());

    points
        .iter()
        .enumerate()
        .filter(|&(i, _)| i % stride == 0 || i == last)
        .map(|(_, &point)| round_lon_lat(point))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> Vec<LonLat> {
        (0..n).map(|i| [i as f64 * 0.001 + 0.000_000_4, 45.0]).collect()
    }

    #[test]
    fn test_stride_thresholds() {
        assert_eq!(simplification_stride(100), 1);
        assert_eq!(simplification_stride(101), 2);
        assert_eq!(simplification_stride(200), 2);
        assert_eq!(simplification_stride(201), 3);
    }

    #[test]
    fn test_endpoints_preserved() {
        for n in [2, 3, 100, 101, 150, 201, 202, 203, 500] {
            let input = line(n);
            let output = simplify(&input);

            assert_eq!(output.first().copied(), Some(round_lon_lat(input[0])), "n = {n}");
            assert_eq!(output.last().copied(), Some(round_lon_lat(input[n - 1])), "n = {n}");
        }
    }

    #[test]
    fn test_stride_applied() {
        // 202 points, stride 3: indices 0, 3, ..., 201 (201 is a multiple of 3)
        assert_eq!(simplify(&line(202)).len(), 68);
        // 203 points: indices 0..=201 step 3 plus the forced last index 202
        assert_eq!(simplify(&line(203)).len(), 69);
        assert_eq!(simplify(&line(50)).len(), 50);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_coordinate(-122.419_415_7), -122.419_416);
        assert_eq!(round_coordinate(37.774_929_4), 37.774_929);
    }

    #[test]
    fn test_empty_input() {
        assert!(simplify(&[]).is_empty());
    }
}
