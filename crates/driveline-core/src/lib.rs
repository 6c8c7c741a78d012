//! driveline-core: real-time control core for a competition robot
//!
//! Converts periodic gamepad samples and vision blob measurements into
//! debounced, rate-limited actuator commands. Device polling, image
//! acquisition, and motor interfacing live behind injected traits so the
//! whole decision path runs against in-memory fakes in tests.
//!
//! # Modules
//!
//! - [`input`] - Edge-tracked gamepad abstraction (levels, first presses, scaled axes)
//! - [`vision`] - Target geometry, pair discovery, and approach-angle estimation
//! - [`control`] - Actuator policy, timed tasks, autonomous scripts, cycle orchestration
//! - [`hardware`] - Collaborator traits (sources/sinks) and in-memory mocks
//!
//! # Data flow
//!
//! ```text
//! gamepad sample ──► InputFrame ──┐
//!                                 ├──► TeleopPolicy ──► actuator sinks
//! blob list ──► PairingEngine ────┘         │
//!                                           └──► telemetry sink
//! ```
//!
//! One direction per cycle, no blocking: the fixed-period driver in
//! [`control::cycle`] (or the host lifecycle) invokes the orchestrator, and
//! every operation below it is a bounded-time computation over owned state.

#![warn(unused_must_use)]

pub mod control;
pub mod hardware;
pub mod input;
pub mod vision;

// Re-exports for convenience
pub use control::{
    ActuatorCommands, ActuatorRequest, AutoScript, AutoStep, Bindings, CoreConfig, CycleDriver,
    CycleDriverConfig, Mode, Orchestrator, PolicyConfig, TaskTable, TeleopPolicy,
};
pub use hardware::{DriveCommand, RobotIo, TelemetryValue};
pub use input::{Axis, Button, EdgeTracker, GamepadSnapshot, InputFrame};
pub use vision::{AngleCalibration, Pair, PairingConfig, PairingEngine, Target};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error types for driveline-core
///
/// Indices on the static path are enum-typed and cannot be invalid; these
/// errors cover the dynamic raw-index accessors and degenerate vision input.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors must be handled or explicitly ignored with let _ = ..."]
#[non_exhaustive]
pub enum Error {
    /// Button index outside the gamepad's 1..=12 range.
    /// Handle by: using the [`input::Button`] constants instead of raw indices.
    #[error("invalid button index {index} (valid range 1..=12)")]
    InvalidButton {
        /// The rejected index.
        index: u8,
    },

    /// Axis index outside the gamepad's 0..=3 range.
    /// Handle by: using the [`input::Axis`] constants instead of raw indices.
    #[error("invalid axis index {index} (valid range 0..=3)")]
    InvalidAxis {
        /// The rejected index.
        index: u8,
    },

    /// A zero-width target reached aspect-ratio computation.
    /// Handle by: filtering blobs through [`vision::PairingEngine::eligible`]
    /// before asking for ratios or angles.
    #[error("degenerate target geometry: width {width} is not positive")]
    DegenerateGeometry {
        /// The offending width.
        width: f64,
    },
}

/// Result type alias for driveline-core operations
pub type Result<T> = std::result::Result<T, Error>;
