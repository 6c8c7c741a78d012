//! Edge-tracked gamepad input
//!
//! Wraps raw per-cycle button/axis samples with level state, rising-edge
//! ("first press") detection, and scaled axis access.

mod gamepad;

pub use gamepad::{Axis, Button, EdgeTracker, GamepadSnapshot, InputFrame};

/// Number of gamepad buttons (numbered 1..=12)
pub const BUTTON_COUNT: usize = 12;

/// Number of stick axes (numbered 0..=3)
pub const AXIS_COUNT: usize = 4;
