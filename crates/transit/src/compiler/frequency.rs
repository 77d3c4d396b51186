//! Frequency band merging.

use std::collections::BTreeMap;

use crate::models::schedule::FrequencyBand;

/// Bands of one route after merging, ordered by `(start_sec, end_sec)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedBands {
    pub bands: Vec<FrequencyBand>,
    /// How many input bands were folded into another band with the same window.
    pub merged: usize,
}

/// Collapse bands that share the same `[start, end)` window into the one with
/// the smallest headway. Ties keep the band seen first.
///
/// Several trips of one route often carry the same window with different
/// headways; keeping the tightest one avoids stacking duplicate vehicles.
pub fn merge_bands(bands: impl IntoIterator<Item = FrequencyBand>) -> MergedBands {
    let mut by_window: BTreeMap<(i64, i64), FrequencyBand> = BTreeMap::new();
    let mut merged = 0;

    for band in bands {
        let window = (band.start_sec, band.end_sec);
        match by_window.get_mut(&window) {
            Some(existing) => {
                merged += 1;
                if band.headway_sec < existing.headway_sec {
                    *existing = band;
                }
            }
            None => {
                by_window.insert(window, band);
            }
        }
    }

    MergedBands {
        bands: by_window.into_values().collect(),
        merged,
    }
}
