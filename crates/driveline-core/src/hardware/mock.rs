//! In-memory collaborator fakes
//!
//! Scripted sources and recording sinks for exercising the whole control
//! path without hardware. Sinks expose a cloneable handle backed by
//! `Arc<Mutex<_>>` so tests keep inspecting state after the sink moves into
//! a [`RobotIo`](super::RobotIo).

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use super::{
    AnalogSink, BlobSource, DigitalSink, DriveCommand, DriveSink, GamepadSource, TelemetrySink,
    TelemetryValue,
};
use crate::input::GamepadSnapshot;
use crate::vision::Target;

/// Gamepad source replaying a queue of snapshots
///
/// Once the queue drains, the last snapshot (or the neutral default)
/// repeats, mimicking a driver holding the sticks still.
#[derive(Debug, Default)]
pub struct ScriptedGamepad {
    queue: VecDeque<GamepadSnapshot>,
    last: GamepadSnapshot,
}

impl ScriptedGamepad {
    /// Create an empty (always-neutral) gamepad
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a snapshot to be returned by the next sample
    pub fn push(&mut self, snapshot: GamepadSnapshot) {
        self.queue.push_back(snapshot);
    }

    /// Queue the same snapshot several times
    pub fn push_repeated(&mut self, snapshot: GamepadSnapshot, cycles: usize) {
        for _ in 0..cycles {
            self.push(snapshot);
        }
    }
}

impl GamepadSource for ScriptedGamepad {
    fn snapshot(&mut self) -> GamepadSnapshot {
        if let Some(next) = self.queue.pop_front() {
            self.last = next;
        }
        self.last
    }
}

/// Blob source replaying queued frames
///
/// Yields `None` once the queue drains, like a camera with no new frame.
#[derive(Debug, Default)]
pub struct ScriptedBlobs {
    frames: VecDeque<Vec<Target>>,
}

impl ScriptedBlobs {
    /// Create a source with no frames
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one frame of blob measurements
    pub fn push_frame(&mut self, targets: Vec<Target>) {
        self.frames.push_back(targets);
    }
}

impl BlobSource for ScriptedBlobs {
    fn frame(&mut self) -> Option<Vec<Target>> {
        self.frames.pop_front()
    }
}

/// Recording drivetrain sink
#[derive(Debug, Default)]
pub struct RecordingDrive {
    history: Arc<Mutex<Vec<DriveCommand>>>,
}

impl RecordingDrive {
    /// Create a sink with an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloneable handle to the recorded history
    pub fn handle(&self) -> DriveHandle {
        DriveHandle {
            history: self.history.clone(),
        }
    }
}

impl DriveSink for RecordingDrive {
    fn set(&mut self, command: DriveCommand) {
        self.history.lock().push(command);
    }
}

/// Inspection handle for a [`RecordingDrive`]
#[derive(Debug, Clone)]
pub struct DriveHandle {
    history: Arc<Mutex<Vec<DriveCommand>>>,
}

impl DriveHandle {
    /// The most recent command, if any was issued
    pub fn last(&self) -> Option<DriveCommand> {
        self.history.lock().last().copied()
    }

    /// Every command issued so far
    pub fn all(&self) -> Vec<DriveCommand> {
        self.history.lock().clone()
    }

    /// Number of commands issued
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Whether nothing was issued yet
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

/// Recording discrete sink
#[derive(Debug, Default)]
pub struct RecordingDigital {
    state: Arc<Mutex<Option<bool>>>,
}

impl RecordingDigital {
    /// Create a sink that has never been set
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloneable handle to the last commanded state
    pub fn handle(&self) -> DigitalHandle {
        DigitalHandle {
            state: self.state.clone(),
        }
    }
}

impl DigitalSink for RecordingDigital {
    fn set(&mut self, on: bool) {
        *self.state.lock() = Some(on);
    }
}

/// Inspection handle for a [`RecordingDigital`]
#[derive(Debug, Clone)]
pub struct DigitalHandle {
    state: Arc<Mutex<Option<bool>>>,
}

impl DigitalHandle {
    /// The last commanded state, `None` if never set
    pub fn get(&self) -> Option<bool> {
        *self.state.lock()
    }
}

/// Recording scalar sink
#[derive(Debug, Default)]
pub struct RecordingAnalog {
    value: Arc<Mutex<Option<f64>>>,
}

impl RecordingAnalog {
    /// Create a sink that has never been set
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloneable handle to the last commanded value
    pub fn handle(&self) -> AnalogHandle {
        AnalogHandle {
            value: self.value.clone(),
        }
    }
}

impl AnalogSink for RecordingAnalog {
    fn set(&mut self, value: f64) {
        *self.value.lock() = Some(value);
    }
}

/// Inspection handle for a [`RecordingAnalog`]
#[derive(Debug, Clone)]
pub struct AnalogHandle {
    value: Arc<Mutex<Option<f64>>>,
}

impl AnalogHandle {
    /// The last commanded value, `None` if never set
    pub fn get(&self) -> Option<f64> {
        *self.value.lock()
    }
}

/// Recording telemetry sink keeping the latest value per key
#[derive(Debug, Default)]
pub struct RecordingTelemetry {
    values: Arc<Mutex<Vec<(String, TelemetryValue)>>>,
}

impl RecordingTelemetry {
    /// Create an empty telemetry recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Cloneable handle to the published values
    pub fn handle(&self) -> TelemetryHandle {
        TelemetryHandle {
            values: self.values.clone(),
        }
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn publish(&mut self, key: &str, value: TelemetryValue) {
        let mut values = self.values.lock();
        if let Some(entry) = values.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value;
        } else {
            values.push((key.to_string(), value));
        }
    }
}

/// Inspection handle for a [`RecordingTelemetry`]
#[derive(Debug, Clone)]
pub struct TelemetryHandle {
    values: Arc<Mutex<Vec<(String, TelemetryValue)>>>,
}

impl TelemetryHandle {
    /// The latest value published under `key`
    pub fn get(&self, key: &str) -> Option<TelemetryValue> {
        self.values
            .lock()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Number of distinct keys published
    pub fn key_count(&self) -> usize {
        self.values.lock().len()
    }
}
