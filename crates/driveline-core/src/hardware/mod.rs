//! Hardware abstraction at the collaborator boundary
//!
//! The core never touches devices directly: the gamepad, vision pipeline,
//! actuators, and telemetry display are reached through the traits here,
//! injected at orchestrator construction so tests substitute the in-memory
//! implementations in [`mock`].

pub mod mock;
mod traits;

pub use traits::{
    AnalogSink, BlobSource, DigitalSink, DriveCommand, DriveSink, GamepadSource, RobotIo,
    TelemetrySink, TelemetryValue,
};
