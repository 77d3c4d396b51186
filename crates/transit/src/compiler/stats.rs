use std::collections::BTreeMap;

/// Counters collected while compiling a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileStats {
    pub routes_read: usize,
    pub routes_emitted: usize,
    pub routes_without_shapes: usize,
    /// Rows repeating a route_id that was already seen
    pub duplicate_routes: usize,
    pub trips_collapsed: usize,
    /// Collapsed trips whose headsign differed from the retained trip's.
    pub headsign_conflicts: usize,
    pub shapes_emitted: usize,
    pub shapes_skipped: usize,
    pub stops_emitted: usize,
    pub unresolved_stop_visits: usize,
    pub bands_kept: usize,
    pub bands_merged: usize,
    pub bands_dropped: usize,
    pub bands_unresolved: usize,
    /// Malformed rows excluded, keyed by table name
    pub malformed_rows: BTreeMap<&'static str, usize>,
}

impl CompileStats {
    pub fn total_malformed_rows(&self) -> usize {
        self.malformed_rows.values().sum()
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Compile Statistics ===");
        tracing::info!(
            "Routes: {} emitted of {} read ({} without a usable shape)",
            self.routes_emitted,
            self.routes_read,
            self.routes_without_shapes
        );
        tracing::info!(
            "Shapes: {} emitted, {} skipped",
            self.shapes_emitted,
            self.shapes_skipped
        );
        tracing::info!("Stops: {} unique", self.stops_emitted);
        tracing::info!(
            "Frequency bands: {} kept, {} merged, {} dropped",
            self.bands_kept,
            self.bands_merged,
            self.bands_dropped
        );
        if self.duplicate_routes > 0 {
            tracing::warn!("Repeated route ids skipped: {}", self.duplicate_routes);
        }
        if self.trips_collapsed > 0 {
            tracing::info!("Trips collapsed onto a shared shape: {}", self.trips_collapsed);
        }
        if self.headsign_conflicts > 0 {
            tracing::warn!(
                "Collapsed trips with a different headsign: {}",
                self.headsign_conflicts
            );
        }
        if self.unresolved_stop_visits > 0 {
            tracing::warn!(
                "Stop visits without a usable stop: {}",
                self.unresolved_stop_visits
            );
        }
        if self.bands_unresolved > 0 {
            tracing::warn!(
                "Frequency rows for unknown trips: {}",
                self.bands_unresolved
            );
        }
        for (table, count) in self.malformed_rows.iter().filter(|(_, &c)| c > 0) {
            tracing::warn!("Malformed rows in {table}.txt: {count}");
        }
    }
}
