//! Decaying "recently visited" marks for stops.

use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

use headway_transit::StopIdentifier;

/// Whether a mark stamped at `stamp` is still live at `now`.
///
/// Live for `now` in `[stamp, stamp + respawn)`. A `now` earlier than the stamp
/// counts as zero elapsed time.
pub fn is_fresh(stamp: Instant, now: Instant, respawn: Duration) -> bool {
    now.saturating_duration_since(stamp) < respawn
}

/// Last wall-clock time each stop was passed by a vehicle.
#[derive(Debug, Clone, Default)]
pub struct VisitationMap {
    stamps: HashMap<StopIdentifier, Instant>,
}

impl VisitationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, stop: StopIdentifier, now: Instant) {
        self.stamps.insert(stop, now);
    }

    pub fn last_visited(&self, stop: &StopIdentifier) -> Option<Instant> {
        self.stamps.get(stop).copied()
    }

    pub fn is_visited(&self, stop: &StopIdentifier, now: Instant, respawn: Duration) -> bool {
        self.last_visited(stop)
            .is_some_and(|stamp| is_fresh(stamp, now, respawn))
    }

    /// Drop every mark that has expired at `now`. Returns how many were removed.
    pub fn evict(&mut self, now: Instant, respawn: Duration) -> usize {
        let before = self.stamps.len();
        self.stamps.retain(|_, &mut stamp| is_fresh(stamp, now, respawn));
        before - self.stamps.len()
    }

    pub fn visited_ids(&self) -> BTreeSet<StopIdentifier> {
        self.stamps.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPAWN: Duration = Duration::from_secs(30);

    #[test]
    fn test_visited_within_respawn_window() {
        let t = Instant::now();
        let stop = StopIdentifier::new("A");
        let mut map = VisitationMap::new();
        map.mark(stop.clone(), t);

        assert!(map.is_visited(&stop, t, RESPAWN));
        assert!(map.is_visited(&stop, t + Duration::from_millis(29_999), RESPAWN));
        assert!(!map.is_visited(&stop, t + RESPAWN, RESPAWN));
        assert!(!map.is_visited(&stop, t + Duration::from_secs(45), RESPAWN));
    }

    #[test]
    fn test_evict_keeps_only_fresh_marks() {
        let t = Instant::now();
        let mut map = VisitationMap::new();
        map.mark(StopIdentifier::new("old"), t);
        map.mark(StopIdentifier::new("new"), t + Duration::from_secs(20));

        assert_eq!(map.evict(t + Duration::from_secs(25), RESPAWN), 0);
        assert_eq!(map.evict(t + RESPAWN, RESPAWN), 1);
        assert_eq!(
            map.visited_ids().into_iter().collect::<Vec<_>>(),
            vec![StopIdentifier::new("new")]
        );
    }

    #[test]
    fn test_remark_refreshes_stamp() {
        let t = Instant::now();
        let stop = StopIdentifier::new("A");
        let mut map = VisitationMap::new();
        map.mark(stop.clone(), t);
        map.mark(stop.clone(), t + Duration::from_secs(20));

        assert!(map.is_visited(&stop, t + Duration::from_secs(40), RESPAWN));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_query_before_stamp_counts_as_fresh() {
        let t = Instant::now() + Duration::from_secs(60);
        assert!(is_fresh(t, t - Duration::from_secs(5), RESPAWN));
    }
}
