//! Simulated service-day clock.
//!
//! Simulated time is seconds since midnight of the service day. It runs at a
//! multiple of wall time and wraps from the end of service back to its start.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};
use headway_transit::models::time::{format_gtfs_time, SECONDS_PER_DAY};

#[derive(Debug, Clone, PartialEq)]
pub struct ClockConfig {
    /// Start of the service day (05:00:00)
    pub lower_bound_sec: f64,
    /// End of service, past midnight (26:00:00)
    pub upper_bound_sec: f64,
    /// Simulated seconds per wall-clock second
    pub rate: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            lower_bound_sec: 18_000.0,
            upper_bound_sec: 93_600.0,
            rate: 60.0,
        }
    }
}

impl ClockConfig {
    pub fn validate(&self) -> Result<(), ClockError> {
        let (lower, upper) = (self.lower_bound_sec, self.upper_bound_sec);
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(ClockError::InvalidBounds { lower, upper });
        }
        validate_rate(self.rate)
    }
}

fn validate_rate(rate: f64) -> Result<(), ClockError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ClockError::InvalidRate(rate));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    #[error("rate must be a finite, non-negative multiplier, got {0}")]
    InvalidRate(f64),

    #[error("service bounds must be finite with lower < upper, got {lower}..{upper}")]
    InvalidBounds { lower: f64, upper: f64 },
}

#[derive(Debug, Clone)]
pub struct SimulationClock {
    config: ClockConfig,
    now_sec: f64,
    paused: bool,
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::starting_at_lower_bound(ClockConfig::default())
    }
}

impl SimulationClock {
    /// A running clock at the start of the service day.
    pub fn new(config: ClockConfig) -> Result<Self, ClockError> {
        config.validate()?;
        Ok(Self::starting_at_lower_bound(config))
    }

    fn starting_at_lower_bound(config: ClockConfig) -> Self {
        Self {
            now_sec: config.lower_bound_sec,
            config,
            paused: false,
        }
    }

    pub fn now(&self) -> f64 {
        self.now_sec
    }

    pub fn rate(&self) -> f64 {
        self.config.rate
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Move the clock forward by `real_delta` of wall time.
    ///
    /// Crossing the upper bound resets to the lower bound. A paused clock does
    /// not move.
    pub fn advance(&mut self, real_delta: Duration) -> f64 {
        if self.paused {
            return self.now_sec;
        }
        self.now_sec += real_delta.as_secs_f64() * self.config.rate;
        if self.now_sec > self.config.upper_bound_sec {
            tracing::debug!("end of service reached, wrapping to {}", self.label());
            self.now_sec = self.config.lower_bound_sec;
        }
        self.now_sec
    }

    pub fn set_rate(&mut self, rate: f64) -> Result<(), ClockError> {
        validate_rate(rate)?;
        self.config.rate = rate;
        Ok(())
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Jump to `t`, clamped into the service bounds. Non-finite targets are
    /// ignored.
    pub fn seek(&mut self, t: f64) -> f64 {
        if t.is_finite() {
            self.now_sec = t.clamp(self.config.lower_bound_sec, self.config.upper_bound_sec);
        }
        self.now_sec
    }

    /// Wall-clock style `HH:MM`, folding times past midnight into the next day.
    pub fn label(&self) -> String {
        let seconds = (self.now_sec.max(0.0) as u32) % SECONDS_PER_DAY;
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
            .map(|time| format!("{:02}:{:02}", time.hour(), time.minute()))
            .unwrap_or_default()
    }

    /// Service-day `HH:MM:SS`, keeping hours past 23.
    pub fn service_time(&self) -> String {
        format_gtfs_time(self.now_sec.max(0.0) as u32)
    }
}
