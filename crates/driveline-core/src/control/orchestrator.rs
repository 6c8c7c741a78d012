//! Control cycle orchestration
//!
//! Ties the edge tracker, pairing engine, policy, task table, and
//! autonomous script together once per fixed period and publishes the
//! results to telemetry. Mode transitions are host-driven through the
//! `on_*_enter` hooks; the host (or [`super::cycle::CycleDriver`]) calls
//! [`Orchestrator::on_cycle`] at its configured period.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::policy::{ActuatorCommands, ActuatorRequest, Bindings, PolicyConfig, TeleopPolicy};
use super::sequence::AutoScript;
use super::tasks::TaskTable;
use crate::hardware::{DriveCommand, RobotIo, TelemetryValue};
use crate::input::EdgeTracker;
use crate::vision::{PairingConfig, PairingEngine};

/// Host-selected operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Outputs idle; no actuation
    Disabled,
    /// The preset script drives the robot
    Autonomous,
    /// Driver input drives the robot
    Teleop,
}

/// Top-level configuration for the control core
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Actuator policy tuning
    pub policy: PolicyConfig,
    /// Button layout
    pub bindings: Bindings,
    /// Vision pairing and angle calibration
    pub pairing: PairingConfig,
}

/// The per-cycle control core
///
/// Owns all session state and the injected collaborators; the policy is the
/// only writer of actuator state and the orchestrator is the only holder of
/// the sinks.
pub struct Orchestrator {
    io: RobotIo,
    tracker: EdgeTracker,
    policy: TeleopPolicy,
    engine: PairingEngine,
    tasks: TaskTable,
    script: AutoScript,
    mode: Mode,
    elapsed: Duration,
}

impl Orchestrator {
    /// Create an orchestrator in the disabled mode
    pub fn new(io: RobotIo, config: CoreConfig) -> Self {
        Self {
            io,
            tracker: EdgeTracker::new(),
            policy: TeleopPolicy::new(config.policy, config.bindings),
            engine: PairingEngine::new(config.pairing),
            tasks: TaskTable::new(),
            script: AutoScript::default(),
            mode: Mode::Disabled,
            elapsed: Duration::ZERO,
        }
    }

    /// Install the autonomous script, builder style
    pub fn with_script(mut self, script: AutoScript) -> Self {
        self.script = script;
        self
    }

    /// Current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Read-only view of the policy state (telemetry, diagnostics)
    pub fn policy(&self) -> &TeleopPolicy {
        &self.policy
    }

    /// Schedule a timed action for the current session
    pub fn schedule(&mut self, request: ActuatorRequest, duration: Duration) {
        self.tasks.schedule(request, duration);
    }

    /// Enter teleop: safety state reset, debounce and edge history cleared
    pub fn on_teleop_enter(&mut self) {
        tracing::debug!("mode transition: -> Teleop");
        self.mode = Mode::Teleop;
        self.tasks.cancel_all();
        self.policy.reset();
        self.tracker = EdgeTracker::new();
    }

    /// Enter autonomous: the script rewinds and starts from its first step
    pub fn on_autonomous_enter(&mut self) {
        tracing::debug!("mode transition: -> Autonomous");
        self.mode = Mode::Autonomous;
        self.tasks.cancel_all();
        self.policy.reset();
        self.script.reset();
    }

    /// Enter disabled: everything stops
    pub fn on_disabled_enter(&mut self) {
        tracing::debug!("mode transition: -> Disabled");
        self.mode = Mode::Disabled;
        self.tasks.cancel_all();
        self.io.drive.set(DriveCommand::stopped());
        self.io.arm.set(0.0);
    }

    /// Run one control cycle
    ///
    /// `dt` is the time since the previous cycle, supplied by the external
    /// fixed-period driver. All computation is synchronous and bounded; a
    /// skipped cycle is recovered by the next one re-sampling fresh state.
    pub fn on_cycle(&mut self, dt: Duration) {
        self.elapsed += dt;
        match self.mode {
            Mode::Disabled => {}
            Mode::Autonomous => self.autonomous_cycle(dt),
            Mode::Teleop => self.teleop_cycle(dt),
        }
    }

    fn autonomous_cycle(&mut self, dt: Duration) {
        let now = self.elapsed;
        if let Some(request) = self.script.advance(dt) {
            self.policy.apply_request(&request, now);
        }
        for request in self.tasks.advance(dt) {
            self.policy.apply_request(&request, now);
        }
        let commands = self.policy.requested_commands();
        self.write_outputs(&commands);
    }

    fn teleop_cycle(&mut self, dt: Duration) {
        let now = self.elapsed;

        // Snapshot at cycle start; every read below sees this sample.
        let snapshot = self.io.gamepad.snapshot();
        let frame = self.tracker.observe(snapshot);

        let angle = self
            .io
            .blobs
            .frame()
            .and_then(|targets| self.engine.estimate_angle(&targets));

        for request in self.tasks.advance(dt) {
            self.policy.apply_request(&request, now);
        }
        let commands = self.policy.on_cycle(&frame, angle, now);

        self.write_outputs(&commands);
        self.publish_telemetry(&frame, angle, &commands);

        // Commit after all policy reads of prior state.
        self.tracker = frame.commit();
    }

    fn write_outputs(&mut self, commands: &ActuatorCommands) {
        self.io.drive.set(commands.drive);
        self.io.clamp_extend.set(commands.clamp_extend);
        self.io.clamp_retract.set(commands.clamp_retract);
        self.io.light.set(commands.light);
        self.io.compressor.set(commands.compressor);
        self.io.arm.set(commands.arm);
    }

    fn publish_telemetry(
        &mut self,
        frame: &crate::input::InputFrame,
        angle: Option<f64>,
        commands: &ActuatorCommands,
    ) {
        let telemetry = &mut self.io.telemetry;
        telemetry.publish("left_stick_y", frame.left_stick_y().into());
        telemetry.publish("right_stick_y", frame.right_stick_y().into());
        telemetry.publish("speed_factor", self.policy.speed_scale().into());
        telemetry.publish("rotation_factor", self.policy.rotation_scale().into());
        telemetry.publish("compressor", commands.compressor.into());
        telemetry.publish(
            "clamp_extended",
            (commands.clamp_extend && !commands.clamp_retract).into(),
        );
        telemetry.publish("light", commands.light.into());
        if let Some(angle) = angle {
            telemetry.publish("target_angle", angle.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::mock::{
        AnalogHandle, DigitalHandle, DriveHandle, RecordingAnalog, RecordingDigital,
        RecordingDrive, RecordingTelemetry, ScriptedBlobs, ScriptedGamepad, TelemetryHandle,
    };
    use crate::input::{Axis, Button, GamepadSnapshot};
    use crate::vision::Target;

    struct Handles {
        drive: DriveHandle,
        clamp_extend: DigitalHandle,
        clamp_retract: DigitalHandle,
        light: DigitalHandle,
        arm: AnalogHandle,
        telemetry: TelemetryHandle,
    }

    fn rig(gamepad: ScriptedGamepad, blobs: ScriptedBlobs) -> (Orchestrator, Handles) {
        let drive = RecordingDrive::new();
        let clamp_extend = RecordingDigital::new();
        let clamp_retract = RecordingDigital::new();
        let light = RecordingDigital::new();
        let compressor = RecordingDigital::new();
        let arm = RecordingAnalog::new();
        let telemetry = RecordingTelemetry::new();

        let handles = Handles {
            drive: drive.handle(),
            clamp_extend: clamp_extend.handle(),
            clamp_retract: clamp_retract.handle(),
            light: light.handle(),
            arm: arm.handle(),
            telemetry: telemetry.handle(),
        };

        let io = RobotIo {
            gamepad: Box::new(gamepad),
            blobs: Box::new(blobs),
            drive: Box::new(drive),
            clamp_extend: Box::new(clamp_extend),
            clamp_retract: Box::new(clamp_retract),
            light: Box::new(light),
            compressor: Box::new(compressor),
            arm: Box::new(arm),
            telemetry: Box::new(telemetry),
        };

        (Orchestrator::new(io, CoreConfig::default()), handles)
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_disabled_mode_does_not_actuate() {
        let (mut orchestrator, handles) = rig(ScriptedGamepad::new(), ScriptedBlobs::new());
        orchestrator.on_cycle(ms(10));
        orchestrator.on_cycle(ms(10));
        assert!(handles.drive.is_empty());
    }

    #[test]
    fn test_teleop_cycle_drives_and_publishes() {
        let mut gamepad = ScriptedGamepad::new();
        gamepad.push(
            GamepadSnapshot::default()
                .with_axis(Axis::LeftX, 0.5)
                .with_axis(Axis::LeftY, -0.5),
        );
        let (mut orchestrator, handles) = rig(gamepad, ScriptedBlobs::new());

        orchestrator.on_teleop_enter();
        orchestrator.on_cycle(ms(10));

        assert_eq!(handles.drive.last(), Some(DriveCommand::new(0.5, -0.5, 0.0)));
        assert_eq!(
            handles.telemetry.get("speed_factor"),
            Some(TelemetryValue::Number(1.0))
        );
        assert_eq!(
            handles.telemetry.get("left_stick_y"),
            Some(TelemetryValue::Number(-0.5))
        );
        // No frame, no angle key.
        assert_eq!(handles.telemetry.get("target_angle"), None);
    }

    #[test]
    fn test_edge_state_commits_across_cycles() {
        let mut gamepad = ScriptedGamepad::new();
        // Light button held for three cycles: exactly one toggle.
        gamepad.push_repeated(GamepadSnapshot::default().with_button(Button::X, true), 3);
        let (mut orchestrator, handles) = rig(gamepad, ScriptedBlobs::new());

        orchestrator.on_teleop_enter();
        for _ in 0..3 {
            orchestrator.on_cycle(ms(10));
        }
        assert_eq!(handles.light.get(), Some(true));
        assert!(orchestrator.policy().light_on());
    }

    #[test]
    fn test_vision_angle_reaches_telemetry() {
        let mut blobs = ScriptedBlobs::new();
        blobs.push_frame(vec![
            Target::new(10.0, 50.0, 60.0, 10.0, 600.0),
            Target::new(10.0, 52.0, 58.0, 9.0, 520.0),
        ]);
        let (mut orchestrator, handles) = rig(ScriptedGamepad::new(), blobs);

        orchestrator.on_teleop_enter();
        orchestrator.on_cycle(ms(10));

        let ratio: f64 = (10.0 / 60.0 + 9.0 / 58.0) / 2.0;
        let expected = -89.85 * ratio * ratio + 313.72 * ratio - 219.194;
        assert_eq!(
            handles.telemetry.get("target_angle"),
            Some(TelemetryValue::Number(expected))
        );
    }

    #[test]
    fn test_autonomous_script_runs_in_order() {
        let (orchestrator, handles) = rig(ScriptedGamepad::new(), ScriptedBlobs::new());
        let mut orchestrator = orchestrator.with_script(
            AutoScript::default()
                .then(
                    ActuatorRequest::Drive(DriveCommand::new(0.0, 0.5, 0.0)),
                    ms(20),
                )
                .then(ActuatorRequest::Clamp(true), ms(10)),
        );

        orchestrator.on_autonomous_enter();
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.drive.last(), Some(DriveCommand::new(0.0, 0.5, 0.0)));
        assert_eq!(handles.clamp_extend.get(), Some(false));

        orchestrator.on_cycle(ms(10));
        orchestrator.on_cycle(ms(10));
        // Drive step over, clamp step active.
        assert_eq!(handles.drive.last(), Some(DriveCommand::stopped()));
        assert_eq!(handles.clamp_extend.get(), Some(true));
        assert_eq!(handles.clamp_retract.get(), Some(false));

        // Script exhausted: outputs idle, clamp latch still asserted.
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.drive.last(), Some(DriveCommand::stopped()));
        assert_eq!(handles.clamp_extend.get(), Some(true));
    }

    #[test]
    fn test_timed_task_drives_through_policy() {
        let (mut orchestrator, handles) = rig(ScriptedGamepad::new(), ScriptedBlobs::new());
        orchestrator.on_teleop_enter();
        orchestrator.schedule(ActuatorRequest::Arm(0.5), ms(20));

        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.arm.get(), Some(0.5));
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.arm.get(), Some(0.5));
        // Expired: arm idles.
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.arm.get(), Some(0.0));
    }

    #[test]
    fn test_mode_transition_cancels_tasks_and_stops_outputs() {
        let (mut orchestrator, handles) = rig(ScriptedGamepad::new(), ScriptedBlobs::new());
        orchestrator.on_teleop_enter();
        orchestrator.schedule(ActuatorRequest::Arm(0.5), ms(1000));
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.arm.get(), Some(0.5));

        orchestrator.on_disabled_enter();
        assert_eq!(orchestrator.mode(), Mode::Disabled);
        assert_eq!(handles.arm.get(), Some(0.0));
        assert_eq!(handles.drive.last(), Some(DriveCommand::stopped()));

        // Nothing actuates after the transition.
        let drives_before = handles.drive.len();
        orchestrator.on_cycle(ms(10));
        assert_eq!(handles.drive.len(), drives_before);
    }

    #[test]
    fn test_teleop_entry_resets_session_state() {
        let mut gamepad = ScriptedGamepad::new();
        gamepad.push(GamepadSnapshot::default().with_button(Button::LeftTrigger, true));
        let (mut orchestrator, _handles) = rig(gamepad, ScriptedBlobs::new());

        orchestrator.on_teleop_enter();
        orchestrator.on_cycle(ms(10));
        assert!((orchestrator.policy().speed_scale() - 0.9).abs() < 1e-9);

        orchestrator.on_teleop_enter();
        assert!((orchestrator.policy().speed_scale() - 1.0).abs() < 1e-9);
    }
}
