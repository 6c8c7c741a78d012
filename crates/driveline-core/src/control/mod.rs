//! Control cycle: policy, timed tasks, autonomous scripting, orchestration
//!
//! One synchronous pass per fixed period: the orchestrator samples input,
//! runs pairing, asks the policy for actuator commands, writes the sinks,
//! and publishes telemetry. Timed actions and autonomous steps advance
//! cycle-by-cycle with no background threads.

pub mod cycle;
mod orchestrator;
mod policy;
mod sequence;
mod tasks;

pub use cycle::{CycleDriver, CycleDriverConfig, CycleHandle, CycleStats};
pub use orchestrator::{CoreConfig, Mode, Orchestrator};
pub use policy::{ActuatorCommands, ActuatorRequest, Bindings, PolicyConfig, TeleopPolicy};
pub use sequence::{AutoScript, AutoStep};
pub use tasks::{TaskTable, TimedTask};
