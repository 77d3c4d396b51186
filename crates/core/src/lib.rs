//! Simulation side of headway: turns a compiled schedule and a simulated
//! clock into per-frame vehicle positions.

pub mod clock;
pub mod driver;
pub mod engine;
pub mod loader;

// Re-export transit from the transit crate
pub use headway_transit as transit;

pub use clock::{ClockConfig, ClockError, SimulationClock};
pub use driver::{DriverCommand, DriverError, FrameDriver, FrameSink};
pub use engine::{EngineConfig, EngineConfigError, Frame, PositionEngine, VehicleState};
pub use loader::{load_schedule, DataFetchError, LoadProgress, ScheduleSource};
