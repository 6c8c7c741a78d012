//! Autonomous step sequencing
//!
//! The autonomous period is a linear one-shot script: an ordered list of
//! (request, duration) steps advanced by an index. Each step's request is
//! re-issued every cycle for its duration, then the script moves on; there
//! is no branching and no way to fall through two steps at once.

use std::time::Duration;

use super::ActuatorRequest;

/// One autonomous step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoStep {
    /// Request held active for the step's duration
    pub request: ActuatorRequest,
    /// How long the step runs
    pub duration: Duration,
}

impl AutoStep {
    /// Create a step
    pub fn new(request: ActuatorRequest, duration: Duration) -> Self {
        Self { request, duration }
    }
}

/// An ordered, index-advanced autonomous script
#[derive(Debug, Clone, Default)]
pub struct AutoScript {
    steps: Vec<AutoStep>,
    index: usize,
    elapsed_in_step: Duration,
}

impl AutoScript {
    /// Create a script from its steps
    pub fn new(steps: Vec<AutoStep>) -> Self {
        Self {
            steps,
            index: 0,
            elapsed_in_step: Duration::ZERO,
        }
    }

    /// Append a step, builder style
    pub fn then(mut self, request: ActuatorRequest, duration: Duration) -> Self {
        self.steps.push(AutoStep::new(request, duration));
        self
    }

    /// Advance by one cycle and return the active step's request
    ///
    /// Returns `None` once every step has run to completion. Steps with zero
    /// duration are skipped.
    pub fn advance(&mut self, dt: Duration) -> Option<ActuatorRequest> {
        // Skip steps whose time is already consumed.
        while let Some(step) = self.steps.get(self.index) {
            if self.elapsed_in_step < step.duration {
                break;
            }
            self.index += 1;
            self.elapsed_in_step = Duration::ZERO;
        }

        let step = self.steps.get(self.index)?;
        let request = step.request;
        self.elapsed_in_step += dt;
        Some(request)
    }

    /// Whether every step has completed
    pub fn finished(&self) -> bool {
        self.index >= self.steps.len()
            || (self.index == self.steps.len() - 1
                && self
                    .steps
                    .last()
                    .map(|s| self.elapsed_in_step >= s.duration)
                    .unwrap_or(true))
    }

    /// Rewind to the first step
    pub fn reset(&mut self) {
        self.index = 0;
        self.elapsed_in_step = Duration::ZERO;
    }

    /// Number of steps in the script
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::DriveCommand;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn forward() -> ActuatorRequest {
        ActuatorRequest::Drive(DriveCommand::new(0.0, 0.5, 0.0))
    }

    #[test]
    fn test_steps_advance_in_order() {
        let mut script = AutoScript::default()
            .then(forward(), ms(20))
            .then(ActuatorRequest::Clamp(true), ms(10));

        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), Some(ActuatorRequest::Clamp(true)));
        assert_eq!(script.advance(ms(10)), None);
        assert!(script.finished());
    }

    #[test]
    fn test_empty_script_is_finished() {
        let mut script = AutoScript::default();
        assert!(script.finished());
        assert_eq!(script.advance(ms(10)), None);
    }

    #[test]
    fn test_zero_duration_steps_are_skipped() {
        let mut script = AutoScript::default()
            .then(ActuatorRequest::Light(true), ms(0))
            .then(forward(), ms(10));

        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), None);
    }

    #[test]
    fn test_reset_rewinds() {
        let mut script = AutoScript::default().then(forward(), ms(10));
        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), None);

        script.reset();
        assert!(!script.finished());
        assert_eq!(script.advance(ms(10)), Some(forward()));
    }

    #[test]
    fn test_uneven_cycle_periods() {
        let mut script = AutoScript::default().then(forward(), ms(25));
        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), Some(forward()));
        assert_eq!(script.advance(ms(10)), Some(forward()));
        // 30 ms consumed of a 25 ms step.
        assert_eq!(script.advance(ms(10)), None);
    }
}
