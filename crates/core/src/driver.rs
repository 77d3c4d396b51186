//! The frame loop.
//!
//! A [`FrameDriver`] owns a [`PositionEngine`] and a [`SimulationClock`] on a
//! tokio task. Each tick advances the clock by the wall time elapsed since the
//! previous tick and hands the resulting [`Frame`] to a [`FrameSink`].

use std::time::Duration;

use headway_transit::Schedule;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::clock::SimulationClock;
use crate::engine::{Frame, PositionEngine};

/// Receives every frame the driver produces.
pub trait FrameSink: Send + 'static {
    fn on_frame(&mut self, frame: Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(Frame) + Send + 'static,
{
    fn on_frame(&mut self, frame: Frame) {
        self(frame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverCommand {
    Pause,
    Resume,
    SetRate(f64),
    Seek(f64),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriverError {
    #[error("frame driver has stopped")]
    Stopped,
}

pub struct FrameDriver {
    commands: Option<mpsc::UnboundedSender<DriverCommand>>,
    task: Option<JoinHandle<()>>,
}

impl FrameDriver {
    /// Start producing a frame every `frame_interval`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        schedule: Schedule,
        engine: PositionEngine,
        clock: SimulationClock,
        frame_interval: Duration,
        sink: impl FrameSink,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(schedule, engine, clock, frame_interval, rx, sink));
        Self {
            commands: Some(tx),
            task: Some(task),
        }
    }

    pub fn send(&self, command: DriverCommand) -> Result<(), DriverError> {
        self.commands
            .as_ref()
            .ok_or(DriverError::Stopped)?
            .send(command)
            .map_err(|_| DriverError::Stopped)
    }

    pub fn pause(&self) -> Result<(), DriverError> {
        self.send(DriverCommand::Pause)
    }

    pub fn resume(&self) -> Result<(), DriverError> {
        self.send(DriverCommand::Resume)
    }

    pub fn set_rate(&self, rate: f64) -> Result<(), DriverError> {
        self.send(DriverCommand::SetRate(rate))
    }

    pub fn seek(&self, t: f64) -> Result<(), DriverError> {
        self.send(DriverCommand::Seek(t))
    }

    /// Stop the loop and wait for it to finish. No frame is delivered after
    /// this returns.
    pub async fn shutdown(mut self) {
        // Closing the channel ends the loop
        self.commands.take();
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!("frame loop ended abnormally: {err}");
            }
        }
    }
}

impl Drop for FrameDriver {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_loop(
    schedule: Schedule,
    mut engine: PositionEngine,
    mut clock: SimulationClock,
    frame_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<DriverCommand>,
    mut sink: impl FrameSink,
) {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    loop {
        tokio::select! {
            // Pending commands apply before the next frame
            biased;
            command = commands.recv() => {
                let Some(command) = command else {
                    break;
                };
                apply(&mut clock, command);
            }
            _ = ticker.tick() => {
                let now = Instant::now();
                let elapsed = now.duration_since(last_tick);
                // Wall time spent paused is never fed to the clock
                last_tick = now;
                if clock.is_paused() {
                    continue;
                }
                let t = clock.advance(elapsed);
                sink.on_frame(engine.compute_frame(&schedule, t, now.into_std()));
            }
        }
    }
    tracing::debug!("frame loop stopped at {}", clock.service_time());
}

fn apply(clock: &mut SimulationClock, command: DriverCommand) {
    match command {
        DriverCommand::Pause => clock.pause(),
        DriverCommand::Resume => clock.resume(),
        DriverCommand::SetRate(rate) => {
            if let Err(err) = clock.set_rate(rate) {
                tracing::warn!("ignoring rate change: {err}");
            }
        }
        DriverCommand::Seek(t) => {
            clock.seek(t);
        }
    }
}
