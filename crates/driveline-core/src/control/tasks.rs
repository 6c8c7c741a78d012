//! Cancellable timed actuator tasks
//!
//! Actions that must run for a bounded duration independent of driver input
//! (bring the arm to a limit, hold the clamp) are table entries advanced
//! once per cycle, not background threads. Active entries re-issue their
//! request each cycle through the policy, which remains the only actuator
//! writer; cancelling the table at a mode transition guarantees nothing
//! actuates after the session ends.

use std::time::Duration;

use super::ActuatorRequest;

/// One timed action: a request held active until its duration elapses
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedTask {
    request: ActuatorRequest,
    remaining: Duration,
    cancelled: bool,
}

impl TimedTask {
    /// The request this task re-issues while active
    pub fn request(&self) -> &ActuatorRequest {
        &self.request
    }

    /// Time left before the task retires
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Mark the task for removal at the next advance
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    fn active(&self) -> bool {
        !self.cancelled && !self.remaining.is_zero()
    }
}

/// The orchestrator-owned table of timed tasks
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    tasks: Vec<TimedTask>,
}

impl TaskTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a request to stay active for `duration`
    pub fn schedule(&mut self, request: ActuatorRequest, duration: Duration) {
        self.tasks.push(TimedTask {
            request,
            remaining: duration,
            cancelled: false,
        });
    }

    /// Advance all tasks by one cycle
    ///
    /// Returns the requests active this cycle, then decrements durations and
    /// retires expired or cancelled entries. A task scheduled for less than
    /// one cycle still fires exactly once.
    pub fn advance(&mut self, dt: Duration) -> Vec<ActuatorRequest> {
        let active: Vec<ActuatorRequest> = self
            .tasks
            .iter()
            .filter(|t| t.active())
            .map(|t| t.request)
            .collect();

        for task in &mut self.tasks {
            task.remaining = task.remaining.saturating_sub(dt);
        }
        self.tasks.retain(|t| t.active());

        active
    }

    /// Cancel every task
    ///
    /// Called at mode transitions so no stale action outlives its session.
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            tracing::debug!(count = self.tasks.len(), "cancelling timed tasks");
        }
        self.tasks.clear();
    }

    /// Whether no task is pending
    pub fn is_idle(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of pending tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::DriveCommand;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_task_reissues_until_expiry() {
        let mut table = TaskTable::new();
        table.schedule(ActuatorRequest::Arm(0.5), ms(30));

        assert_eq!(table.advance(ms(10)), vec![ActuatorRequest::Arm(0.5)]);
        assert_eq!(table.advance(ms(10)), vec![ActuatorRequest::Arm(0.5)]);
        assert_eq!(table.advance(ms(10)), vec![ActuatorRequest::Arm(0.5)]);
        // 30 ms consumed: retired.
        assert!(table.advance(ms(10)).is_empty());
        assert!(table.is_idle());
    }

    #[test]
    fn test_short_task_fires_once() {
        let mut table = TaskTable::new();
        table.schedule(ActuatorRequest::Clamp(true), ms(5));

        assert_eq!(table.advance(ms(10)).len(), 1);
        assert!(table.advance(ms(10)).is_empty());
    }

    #[test]
    fn test_cancel_all_stops_everything() {
        let mut table = TaskTable::new();
        table.schedule(
            ActuatorRequest::Drive(DriveCommand::new(0.0, 0.5, 0.0)),
            ms(1000),
        );
        table.schedule(ActuatorRequest::Light(true), ms(1000));
        assert_eq!(table.len(), 2);

        table.cancel_all();
        assert!(table.is_idle());
        assert!(table.advance(ms(10)).is_empty());
    }

    #[test]
    fn test_concurrent_tasks_all_report() {
        let mut table = TaskTable::new();
        table.schedule(ActuatorRequest::Arm(0.5), ms(20));
        table.schedule(ActuatorRequest::Light(true), ms(40));

        assert_eq!(table.advance(ms(10)).len(), 2);
        assert_eq!(table.advance(ms(10)).len(), 2);
        // Arm expired, light remains.
        assert_eq!(table.advance(ms(10)), vec![ActuatorRequest::Light(true)]);
    }
}
