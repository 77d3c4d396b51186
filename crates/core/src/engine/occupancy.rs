//! Which synthetic departures are on the road at a given simulated time.

use headway_transit::Route;

/// One departure currently in transit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveVehicle {
    pub departure_sec: i64,
    pub duration_sec: i64,
    /// Fraction of the trip completed, in `[0, 1]`
    pub progress: f64,
}

/// Every departure of every valid band whose trip spans `t`.
///
/// A departure `dep` is active iff `0 <= t - dep <= duration`, where duration is
/// the band's own trip duration when positive and the route's otherwise.
/// Several departures of one band are routinely active at once.
pub fn active_vehicles(route: &Route, t: f64) -> Vec<ActiveVehicle> {
    let mut active = Vec::new();
    for band in route.frequencies.iter().filter(|b| b.is_valid()) {
        let duration = band.effective_duration(route.trip_duration_sec);
        if duration <= 0 {
            continue;
        }
        let window = duration as f64;

        for departure in band.departures() {
            let elapsed = t - departure as f64;
            if elapsed < 0.0 {
                // Departures are ascending
                break;
            }
            if elapsed <= window {
                active.push(ActiveVehicle {
                    departure_sec: departure,
                    duration_sec: duration,
                    progress: elapsed / window,
                });
            }
        }
    }
    active
}
