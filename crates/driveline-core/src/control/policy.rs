//! Per-cycle actuation policy
//!
//! Fuses the edge-tracked input frame and the optional vision angle into
//! one [`ActuatorCommands`] value per cycle: a continuous drive command,
//! debounced clamp solenoid states, and latched light/compressor/arm
//! outputs. The policy is the single writer of actuator state - background
//! tasks and autonomous steps change it only through
//! [`TeleopPolicy::apply_request`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::hardware::DriveCommand;
use crate::input::{Button, InputFrame};

/// Button roles the policy reads
///
/// Defaults follow the competition driver layout: triggers trim speed,
/// stick clicks trim rotation, the right bumper works the clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    /// Decrease the speed scale by one step
    pub speed_down: Button,
    /// Increase the speed scale by one step
    pub speed_up: Button,
    /// Decrease the rotation scale by one step
    pub rotation_down: Button,
    /// Increase the rotation scale by one step
    pub rotation_up: Button,
    /// Hold to extend the pneumatic clamp
    pub clamp: Button,
    /// Toggle the targeting light relay
    pub light: Button,
    /// Toggle the compressor enable
    pub compressor: Button,
    /// Toggle the arm direction latch
    pub arm_direction: Button,
    /// Hold to run the arm motor
    pub arm_run: Button,
    /// Hold to steer toward the estimated target angle
    pub aim: Button,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            speed_down: Button::LeftTrigger,
            speed_up: Button::RightTrigger,
            rotation_down: Button::LeftStickClick,
            rotation_up: Button::RightStickClick,
            clamp: Button::RightBumper,
            light: Button::X,
            compressor: Button::Y,
            arm_direction: Button::A,
            arm_run: Button::B,
            aim: Button::LeftBumper,
        }
    }
}

/// Policy tuning parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Increment applied per scale-adjust press
    pub scale_step: f64,
    /// Speed scale lower bound
    pub speed_scale_min: f64,
    /// Speed scale upper bound
    pub speed_scale_max: f64,
    /// Speed scale at session start
    pub initial_speed_scale: f64,
    /// Rotation scale lower bound
    pub rotation_scale_min: f64,
    /// Rotation scale upper bound
    pub rotation_scale_max: f64,
    /// Rotation scale at session start
    pub initial_rotation_scale: f64,
    /// Minimum time between clamp state changes
    pub clamp_debounce: Duration,
    /// Arm motor output magnitude while running
    pub arm_speed: f64,
    /// Degrees of angle error mapped to full rotation while aiming
    pub aim_full_scale_degrees: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            scale_step: 0.1,
            speed_scale_min: 0.1,
            speed_scale_max: 1.0,
            initial_speed_scale: 1.0,
            rotation_scale_min: 0.2,
            rotation_scale_max: 1.0,
            initial_rotation_scale: 0.3,
            clamp_debounce: Duration::from_millis(1000),
            arm_speed: 0.5,
            aim_full_scale_degrees: 45.0,
        }
    }
}

impl PolicyConfig {
    /// Set the clamp debounce window
    pub fn with_clamp_debounce(mut self, window: Duration) -> Self {
        self.clamp_debounce = window;
        self
    }

    /// Set the scale adjustment step
    pub fn with_scale_step(mut self, step: f64) -> Self {
        self.scale_step = step;
        self
    }
}

/// State changes requested from outside the per-cycle input path
///
/// Autonomous script steps and timed background tasks express their desired
/// actuator state as requests; the policy applies them so there is exactly
/// one writer per actuator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActuatorRequest {
    /// Drive at the given command for this cycle
    Drive(DriveCommand),
    /// Request the clamp extended/retracted (subject to the debounce window)
    Clamp(bool),
    /// Set the light relay latch
    Light(bool),
    /// Set the compressor latch
    Compressor(bool),
    /// Run the arm motor at the given output for this cycle
    Arm(f64),
}

/// The full actuator command set for one cycle
///
/// Latched states are re-asserted every cycle, not only on the triggering
/// one; sinks are idempotent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActuatorCommands {
    /// Drivetrain command
    pub drive: DriveCommand,
    /// Clamp extend valve
    pub clamp_extend: bool,
    /// Clamp retract valve (always the complement of extend)
    pub clamp_retract: bool,
    /// Targeting light relay
    pub light: bool,
    /// Compressor enable
    pub compressor: bool,
    /// Arm motor output
    pub arm: f64,
}

/// Session-lived actuator policy state
///
/// Owns the tunable scales, discrete latches, and the clamp debounce
/// timestamp. Reset at mode entry, mutated once per cycle.
#[derive(Debug, Clone)]
pub struct TeleopPolicy {
    config: PolicyConfig,
    bindings: Bindings,
    speed_scale: f64,
    rotation_scale: f64,
    clamp_extended: bool,
    last_clamp_change: Option<Duration>,
    light_on: bool,
    compressor_on: bool,
    arm_forward: bool,
    requested_drive: Option<DriveCommand>,
    requested_arm: Option<f64>,
}

impl Default for TeleopPolicy {
    fn default() -> Self {
        Self::new(PolicyConfig::default(), Bindings::default())
    }
}

impl TeleopPolicy {
    /// Create a policy with the given tuning and button layout
    pub fn new(config: PolicyConfig, bindings: Bindings) -> Self {
        Self {
            config,
            bindings,
            speed_scale: config.initial_speed_scale,
            rotation_scale: config.initial_rotation_scale,
            clamp_extended: false,
            last_clamp_change: None,
            light_on: false,
            compressor_on: false,
            arm_forward: true,
            requested_drive: None,
            requested_arm: None,
        }
    }

    /// Restore session-start state
    ///
    /// Invoked at mode entry: scales return to their configured initial
    /// values, latches drop, and the debounce window clears so the first
    /// clamp request of the new session is honored immediately.
    pub fn reset(&mut self) {
        *self = Self::new(self.config, self.bindings);
    }

    /// Current speed scale factor
    pub fn speed_scale(&self) -> f64 {
        self.speed_scale
    }

    /// Current rotation scale factor
    pub fn rotation_scale(&self) -> f64 {
        self.rotation_scale
    }

    /// Whether the clamp latch is extended
    pub fn clamp_extended(&self) -> bool {
        self.clamp_extended
    }

    /// Whether the light latch is on
    pub fn light_on(&self) -> bool {
        self.light_on
    }

    /// Whether the compressor latch is on
    pub fn compressor_on(&self) -> bool {
        self.compressor_on
    }

    /// Apply an external state-change request
    ///
    /// The only path by which tasks and autonomous steps touch actuator
    /// state. Drive and arm requests last for the current cycle only (active
    /// tasks re-issue them each cycle); clamp requests pass through the same
    /// debounce as driver input.
    pub fn apply_request(&mut self, request: &ActuatorRequest, now: Duration) {
        match *request {
            ActuatorRequest::Drive(command) => self.requested_drive = Some(command),
            ActuatorRequest::Clamp(extended) => {
                self.request_clamp(extended, now);
            }
            ActuatorRequest::Light(on) => self.light_on = on,
            ActuatorRequest::Compressor(on) => self.compressor_on = on,
            ActuatorRequest::Arm(value) => self.requested_arm = Some(value),
        }
    }

    /// Build this cycle's commands from pending requests alone
    ///
    /// Used outside teleop, where no input frame exists: latched state is
    /// re-asserted and unrequested continuous outputs stay at zero.
    pub fn requested_commands(&mut self) -> ActuatorCommands {
        let drive = self.requested_drive.take().unwrap_or_default().clamped();
        let arm = self.requested_arm.take().unwrap_or(0.0).clamp(-1.0, 1.0);
        self.commands(drive, arm)
    }

    /// Run one teleop cycle
    ///
    /// `now` is elapsed session time at cycle start; `angle` is the vision
    /// estimate for this frame if one exists.
    pub fn on_cycle(
        &mut self,
        frame: &InputFrame,
        angle: Option<f64>,
        now: Duration,
    ) -> ActuatorCommands {
        self.update_scales(frame);
        self.update_clamp(frame, now);
        self.update_latches(frame);

        let rotation = match angle {
            Some(angle) if frame.pressed(self.bindings.aim) => {
                (angle / self.config.aim_full_scale_degrees) * self.rotation_scale
            }
            _ => frame.right_stick_x() * self.rotation_scale,
        };
        let drive = DriveCommand::new(
            frame.left_stick_x() * self.speed_scale,
            frame.left_stick_y() * self.speed_scale,
            rotation,
        )
        .clamped();

        let direction = if self.arm_forward { 1.0 } else { -1.0 };
        let arm = if frame.pressed(self.bindings.arm_run) {
            direction * self.config.arm_speed
        } else {
            0.0
        };

        // Task requests for continuous outputs override driver input for
        // the cycle they are active.
        let drive = self.requested_drive.take().unwrap_or(drive).clamped();
        let arm = self.requested_arm.take().unwrap_or(arm).clamp(-1.0, 1.0);

        self.commands(drive, arm)
    }

    fn commands(&self, drive: DriveCommand, arm: f64) -> ActuatorCommands {
        ActuatorCommands {
            drive,
            clamp_extend: self.clamp_extended,
            clamp_retract: !self.clamp_extended,
            light: self.light_on,
            compressor: self.compressor_on,
            arm,
        }
    }

    fn update_scales(&mut self, frame: &InputFrame) {
        if frame.first_press(self.bindings.speed_down) {
            self.speed_scale -= self.config.scale_step;
        }
        if frame.first_press(self.bindings.speed_up) {
            self.speed_scale += self.config.scale_step;
        }
        if frame.first_press(self.bindings.rotation_down) {
            self.rotation_scale -= self.config.scale_step;
        }
        if frame.first_press(self.bindings.rotation_up) {
            self.rotation_scale += self.config.scale_step;
        }

        // Absolute clamping every cycle: the scales cannot drift out of
        // bounds no matter how many triggers landed.
        self.speed_scale = self
            .speed_scale
            .clamp(self.config.speed_scale_min, self.config.speed_scale_max);
        self.rotation_scale = self
            .rotation_scale
            .clamp(self.config.rotation_scale_min, self.config.rotation_scale_max);
    }

    fn update_clamp(&mut self, frame: &InputFrame, now: Duration) {
        let desired = frame.pressed(self.bindings.clamp);
        self.request_clamp(desired, now);
    }

    /// Debounced clamp state change; returns whether the change was applied
    fn request_clamp(&mut self, extended: bool, now: Duration) -> bool {
        if extended == self.clamp_extended {
            return false;
        }
        let window_open = match self.last_clamp_change {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.config.clamp_debounce,
        };
        if !window_open {
            tracing::debug!(extended, "clamp change rejected inside debounce window");
            return false;
        }
        self.clamp_extended = extended;
        self.last_clamp_change = Some(now);
        true
    }

    fn update_latches(&mut self, frame: &InputFrame) {
        if frame.first_press(self.bindings.light) {
            self.light_on = !self.light_on;
        }
        if frame.first_press(self.bindings.compressor) {
            self.compressor_on = !self.compressor_on;
        }
        if frame.first_press(self.bindings.arm_direction) {
            self.arm_forward = !self.arm_forward;
        }
    }
}
