//! Service-day times.
//!
//! GTFS times are seconds since midnight of the service day and can exceed
//! 24 hours for trips past midnight (e.g., 25:30:00 = 91800 seconds).

pub const SECONDS_PER_DAY: u32 = 86_400;

/// Parse an `H:MM:SS` (or `HH:MM:SS`) GTFS time into seconds since midnight.
///
/// Hours are not reduced modulo 24. Returns `None` for blank or malformed input.
pub fn parse_gtfs_time(value: &str) -> Option<u32> {
    let mut parts = value.trim().split(':');
    let hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = parts.next()?.parse().ok()?;
    let seconds: u32 = parts.next()?.parse().ok()?;

    if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
        return None;
    }

    hours
        .checked_mul(3600)?
        .checked_add(minutes * 60 + seconds)
}

/// Format seconds since midnight as `HH:MM:SS`, keeping hours past 23.
pub fn format_gtfs_time(seconds: u32) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
