//! Gamepad snapshot and edge tracking
//!
//! A [`GamepadSnapshot`] is one cycle's raw sample of the controller. An
//! [`EdgeTracker`] holds the previous cycle's button levels;
//! [`EdgeTracker::observe`] combines the two into an [`InputFrame`], the
//! read-only view the control policy consumes. Committing the frame at the
//! end of the cycle produces the next tracker, so stale prior state cannot
//! be carried by a forgotten update call.
//!
//! # Example
//! ```
//! use driveline_core::input::{Button, EdgeTracker, GamepadSnapshot};
//!
//! let tracker = EdgeTracker::new();
//! let sample = GamepadSnapshot::default().with_button(Button::A, true);
//!
//! let frame = tracker.observe(sample);
//! assert!(frame.first_press(Button::A));
//!
//! // The committed tracker remembers A was down.
//! let tracker = frame.commit();
//! let frame = tracker.observe(sample);
//! assert!(frame.pressed(Button::A));
//! assert!(!frame.first_press(Button::A));
//! ```

use serde::{Deserialize, Serialize};

use super::{AXIS_COUNT, BUTTON_COUNT};
use crate::{Error, Result};

/// Gamepad buttons, Logitech layout
///
/// Raw indices count from 1, so index 0 maps to no button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    X,
    A,
    B,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
    LeftStickClick,
    RightStickClick,
}

impl Button {
    /// All buttons, ordered by raw index
    pub const ALL: [Button; BUTTON_COUNT] = [
        Button::X,
        Button::A,
        Button::B,
        Button::Y,
        Button::LeftBumper,
        Button::RightBumper,
        Button::LeftTrigger,
        Button::RightTrigger,
        Button::Back,
        Button::Start,
        Button::LeftStickClick,
        Button::RightStickClick,
    ];

    /// Raw button number, 1..=12
    pub fn index(self) -> u8 {
        match self {
            Button::X => 1,
            Button::A => 2,
            Button::B => 3,
            Button::Y => 4,
            Button::LeftBumper => 5,
            Button::RightBumper => 6,
            Button::LeftTrigger => 7,
            Button::RightTrigger => 8,
            Button::Back => 9,
            Button::Start => 10,
            Button::LeftStickClick => 11,
            Button::RightStickClick => 12,
        }
    }

    /// Look up a button from its raw number
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            1..=12 => Ok(Self::ALL[index as usize - 1]),
            _ => Err(Error::InvalidButton { index }),
        }
    }

    fn slot(self) -> usize {
        self.index() as usize - 1
    }
}

/// Stick axes
///
/// Raw indices count from 0. The two Y axes are "vertical" and subject to
/// the tracker's scale factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl Axis {
    /// All axes, ordered by raw index
    pub const ALL: [Axis; AXIS_COUNT] = [Axis::LeftX, Axis::LeftY, Axis::RightX, Axis::RightY];

    /// Raw axis number, 0..=3
    pub fn index(self) -> u8 {
        match self {
            Axis::LeftX => 0,
            Axis::LeftY => 1,
            Axis::RightX => 2,
            Axis::RightY => 3,
        }
    }

    /// Look up an axis from its raw number
    pub fn from_index(index: u8) -> Result<Self> {
        match index {
            0..=3 => Ok(Self::ALL[index as usize]),
            _ => Err(Error::InvalidAxis { index }),
        }
    }

    /// Whether the tracker's vertical scale factor applies to this axis
    pub fn is_vertical(self) -> bool {
        matches!(self, Axis::LeftY | Axis::RightY)
    }

    fn slot(self) -> usize {
        self.index() as usize
    }
}

/// One cycle's raw controller sample
///
/// Produced once per cycle by the external gamepad source and read-only to
/// the core. `Default` is all buttons released and all sticks centered.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GamepadSnapshot {
    buttons: [bool; BUTTON_COUNT],
    axes: [f64; AXIS_COUNT],
}

impl GamepadSnapshot {
    /// Build a snapshot from raw arrays
    pub fn new(buttons: [bool; BUTTON_COUNT], axes: [f64; AXIS_COUNT]) -> Self {
        Self { buttons, axes }
    }

    /// Set a button level
    pub fn with_button(mut self, button: Button, pressed: bool) -> Self {
        self.buttons[button.slot()] = pressed;
        self
    }

    /// Set an axis value (expected range [-1, 1])
    pub fn with_axis(mut self, axis: Axis, value: f64) -> Self {
        self.axes[axis.slot()] = value;
        self
    }

    /// Current level of a button
    pub fn button(&self, button: Button) -> bool {
        self.buttons[button.slot()]
    }

    /// Current level of a button by raw number
    pub fn button_raw(&self, index: u8) -> Result<bool> {
        Ok(self.button(Button::from_index(index)?))
    }

    /// Raw, unscaled axis value
    pub fn axis(&self, axis: Axis) -> f64 {
        self.axes[axis.slot()]
    }

    /// Raw, unscaled axis value by raw number
    pub fn axis_raw(&self, index: u8) -> Result<f64> {
        Ok(self.axis(Axis::from_index(index)?))
    }

    fn levels(&self) -> [bool; BUTTON_COUNT] {
        self.buttons
    }
}

/// Prior-cycle button state plus the vertical-axis scale factor
///
/// Created once at controller attach time with every prior level false, so
/// any button held during the very first cycle registers as a first press.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeTracker {
    prior: [bool; BUTTON_COUNT],
    y_axis_scale: f64,
}

impl Default for EdgeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeTracker {
    /// Create a tracker with no press history
    pub fn new() -> Self {
        Self {
            prior: [false; BUTTON_COUNT],
            y_axis_scale: 1.0,
        }
    }

    /// Set the factor multiplied into vertical (Y) axis values
    pub fn set_y_axis_scale(&mut self, scale: f64) {
        self.y_axis_scale = scale;
    }

    /// The current vertical-axis scale factor
    pub fn y_axis_scale(&self) -> f64 {
        self.y_axis_scale
    }

    /// Prior-cycle level of a button
    pub fn prior(&self, button: Button) -> bool {
        self.prior[button.slot()]
    }

    /// Combine this tracker with a fresh sample
    ///
    /// Pure: observing the same snapshot twice yields identical frames.
    /// Consume the frame with [`InputFrame::commit`] at the end of the cycle
    /// to obtain the tracker for the next one.
    pub fn observe(&self, snapshot: GamepadSnapshot) -> InputFrame {
        InputFrame {
            snapshot,
            prior: self.prior,
            y_axis_scale: self.y_axis_scale,
        }
    }
}

/// One cycle's edge-aware view of the controller
///
/// Everything the policy reads during a cycle comes from here; the frame is
/// immutable, so edge detection always sees the snapshot captured at cycle
/// start regardless of when within the cycle it is queried.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputFrame {
    snapshot: GamepadSnapshot,
    prior: [bool; BUTTON_COUNT],
    y_axis_scale: f64,
}

impl InputFrame {
    /// Current-cycle level of a button
    pub fn pressed(&self, button: Button) -> bool {
        self.snapshot.button(button)
    }

    /// True iff the button is down now and was up on the prior cycle
    pub fn first_press(&self, button: Button) -> bool {
        self.snapshot.button(button) && !self.prior[button.slot()]
    }

    /// Level of a button by raw number
    pub fn pressed_raw(&self, index: u8) -> Result<bool> {
        Ok(self.pressed(Button::from_index(index)?))
    }

    /// First-press state of a button by raw number
    pub fn first_press_raw(&self, index: u8) -> Result<bool> {
        Ok(self.first_press(Button::from_index(index)?))
    }

    /// Axis value, with the scale factor applied to vertical axes
    pub fn axis(&self, axis: Axis) -> f64 {
        if axis.is_vertical() {
            self.snapshot.axis(axis) * self.y_axis_scale
        } else {
            self.snapshot.axis(axis)
        }
    }

    /// Axis value by raw number, scaled like [`InputFrame::axis`]
    pub fn axis_raw(&self, index: u8) -> Result<f64> {
        Ok(self.axis(Axis::from_index(index)?))
    }

    /// Left stick left-to-right position
    pub fn left_stick_x(&self) -> f64 {
        self.axis(Axis::LeftX)
    }

    /// Left stick up-to-down position (scaled)
    pub fn left_stick_y(&self) -> f64 {
        self.axis(Axis::LeftY)
    }

    /// Right stick left-to-right position
    pub fn right_stick_x(&self) -> f64 {
        self.axis(Axis::RightX)
    }

    /// Right stick up-to-down position (scaled)
    pub fn right_stick_y(&self) -> f64 {
        self.axis(Axis::RightY)
    }

    /// Finish the cycle: the returned tracker's prior state equals this
    /// frame's observed levels
    pub fn commit(self) -> EdgeTracker {
        EdgeTracker {
            prior: self.snapshot.levels(),
            y_axis_scale: self.y_axis_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_index_round_trip() {
        for button in Button::ALL {
            assert_eq!(Button::from_index(button.index()).unwrap(), button);
        }
        assert!(Button::from_index(0).is_err());
        assert!(Button::from_index(13).is_err());
    }

    #[test]
    fn test_axis_index_round_trip() {
        for axis in Axis::ALL {
            assert_eq!(Axis::from_index(axis.index()).unwrap(), axis);
        }
        assert!(Axis::from_index(4).is_err());
    }

    #[test]
    fn test_first_cycle_registers_first_press() {
        let tracker = EdgeTracker::new();
        let frame = tracker.observe(GamepadSnapshot::default().with_button(Button::Y, true));
        assert!(frame.pressed(Button::Y));
        assert!(frame.first_press(Button::Y));
        assert!(!frame.first_press(Button::A));
    }

    #[test]
    fn test_held_button_is_not_a_first_press_after_commit() {
        let sample = GamepadSnapshot::default().with_button(Button::RightBumper, true);
        let tracker = EdgeTracker::new().observe(sample).commit();

        let frame = tracker.observe(sample);
        assert!(frame.pressed(Button::RightBumper));
        assert!(!frame.first_press(Button::RightBumper));

        // Release, commit, press again: first press fires again.
        let tracker = tracker.observe(GamepadSnapshot::default()).commit();
        let frame = tracker.observe(sample);
        assert!(frame.first_press(Button::RightBumper));
    }

    #[test]
    fn test_observe_is_pure() {
        let tracker = EdgeTracker::new()
            .observe(GamepadSnapshot::default().with_button(Button::B, true))
            .commit();
        let sample = GamepadSnapshot::default().with_button(Button::B, true);
        assert_eq!(tracker.observe(sample), tracker.observe(sample));
    }

    #[test]
    fn test_commit_records_every_button() {
        let sample = GamepadSnapshot::default()
            .with_button(Button::X, true)
            .with_button(Button::Back, true);
        let tracker = EdgeTracker::new().observe(sample).commit();
        for button in Button::ALL {
            assert_eq!(tracker.prior(button), sample.button(button));
        }
    }

    #[test]
    fn test_vertical_axis_scaling() {
        let mut tracker = EdgeTracker::new();
        tracker.set_y_axis_scale(0.5);
        let frame = tracker.observe(
            GamepadSnapshot::default()
                .with_axis(Axis::LeftX, 0.8)
                .with_axis(Axis::LeftY, 0.8)
                .with_axis(Axis::RightY, -1.0),
        );
        assert_eq!(frame.left_stick_x(), 0.8);
        assert_eq!(frame.left_stick_y(), 0.4);
        assert_eq!(frame.right_stick_y(), -0.5);
    }

    #[test]
    fn test_scale_survives_commit() {
        let mut tracker = EdgeTracker::new();
        tracker.set_y_axis_scale(0.25);
        let tracker = tracker.observe(GamepadSnapshot::default()).commit();
        assert_eq!(tracker.y_axis_scale(), 0.25);
    }

    #[test]
    fn test_raw_accessors() {
        let frame = EdgeTracker::new().observe(
            GamepadSnapshot::default()
                .with_button(Button::LeftTrigger, true)
                .with_axis(Axis::RightX, 0.3),
        );
        assert!(frame.pressed_raw(7).unwrap());
        assert!(frame.first_press_raw(7).unwrap());
        assert_eq!(frame.axis_raw(2).unwrap(), 0.3);
        assert!(frame.pressed_raw(0).is_err());
        assert!(frame.axis_raw(9).is_err());
    }
}
