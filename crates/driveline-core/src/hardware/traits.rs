//! Collaborator traits and command value types
//!
//! Sinks are assumed idempotent and safe to call every cycle; the
//! drivetrain applies its own output-expiration safety timeout downstream.

use serde::{Deserialize, Serialize};

use crate::input::GamepadSnapshot;
use crate::vision::Target;

/// Planar drivetrain command
///
/// Velocity components plus a rotation rate, each in [-1, 1], submitted
/// every cycle whether or not any input changed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriveCommand {
    /// Strafe component (left stick X)
    pub x: f64,
    /// Forward/backward component (left stick Y)
    pub y: f64,
    /// Rotation rate (right stick X)
    pub rotation: f64,
}

impl DriveCommand {
    /// Create a drive command
    pub fn new(x: f64, y: f64, rotation: f64) -> Self {
        Self { x, y, rotation }
    }

    /// The zero command
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Clamp every component to the sink's [-1, 1] contract
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(-1.0, 1.0),
            y: self.y.clamp(-1.0, 1.0),
            rotation: self.rotation.clamp(-1.0, 1.0),
        }
    }
}

/// Telemetry values the display sink accepts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TelemetryValue {
    /// A numeric reading
    Number(f64),
    /// A status flag
    Bool(bool),
}

impl From<f64> for TelemetryValue {
    fn from(value: f64) -> Self {
        TelemetryValue::Number(value)
    }
}

impl From<bool> for TelemetryValue {
    fn from(value: bool) -> Self {
        TelemetryValue::Bool(value)
    }
}

/// Per-cycle controller sampling
pub trait GamepadSource {
    /// Sample the controller; called once at the start of each cycle
    fn snapshot(&mut self) -> GamepadSnapshot;
}

/// Per-frame blob measurements from the vision pipeline
pub trait BlobSource {
    /// The next frame's blob list, or `None` when no frame is available
    ///
    /// One frame at a time; a consumed frame is not restartable.
    fn frame(&mut self) -> Option<Vec<Target>>;
}

/// Continuous drivetrain output
pub trait DriveSink {
    /// Apply a drive command
    fn set(&mut self, command: DriveCommand);
}

/// Discrete on/off output (solenoid valve, relay, compressor enable)
pub trait DigitalSink {
    /// Apply the commanded state
    fn set(&mut self, on: bool);
}

/// Continuous scalar output in [-1, 1] (a single motor controller)
pub trait AnalogSink {
    /// Apply the commanded output
    fn set(&mut self, value: f64);
}

/// Fire-and-forget key/value display
pub trait TelemetrySink {
    /// Publish one reading; no acknowledgment
    fn publish(&mut self, key: &str, value: TelemetryValue);
}

/// The injected collaborators the orchestrator drives
///
/// Bundling them keeps construction to one argument and makes the
/// single-writer rule visible: only the orchestrator holds the sinks, and
/// it only writes what the policy computed.
pub struct RobotIo {
    /// Controller source
    pub gamepad: Box<dyn GamepadSource>,
    /// Vision blob source
    pub blobs: Box<dyn BlobSource>,
    /// Drivetrain
    pub drive: Box<dyn DriveSink>,
    /// Clamp extend valve of the two-position solenoid pair
    pub clamp_extend: Box<dyn DigitalSink>,
    /// Clamp retract valve of the two-position solenoid pair
    pub clamp_retract: Box<dyn DigitalSink>,
    /// Targeting light relay
    pub light: Box<dyn DigitalSink>,
    /// Compressor enable
    pub compressor: Box<dyn DigitalSink>,
    /// Arm motor
    pub arm: Box<dyn AnalogSink>,
    /// Dashboard display
    pub telemetry: Box<dyn TelemetrySink>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_command_clamping() {
        let command = DriveCommand::new(1.6, -2.0, 0.4).clamped();
        assert_eq!(command, DriveCommand::new(1.0, -1.0, 0.4));
    }

    #[test]
    fn test_telemetry_value_conversions() {
        assert_eq!(TelemetryValue::from(0.5), TelemetryValue::Number(0.5));
        assert_eq!(TelemetryValue::from(true), TelemetryValue::Bool(true));
    }
}
