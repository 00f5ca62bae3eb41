//! The invocable contract every command implements
//!
//! A host binding layer only ever talks to commands through this trait:
//! 1. Query `can_execute` before enabling an affordance
//! 2. Trigger `execute` when the user acts
//! 3. Re-query whenever `readiness_changed` fires

use async_trait::async_trait;

use crate::domain::{
    error::CommandError,
    event::EventSource,
    outcome::{CommandId, ExecutionOutcome, ReadinessChanged},
    parameter::Parameter
};

/// A unit of work with a readiness predicate and an execute operation
#[async_trait]
pub trait Invocable: Send + Sync {
    /// Identity used in notifications and logs
    fn id(&self) -> CommandId;

    /// Human-readable name (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether the command may run with `parameter` right now
    fn can_execute(&self, parameter: &Parameter) -> Result<bool, CommandError>;

    /// Trigger an execution without waiting for it to finish
    fn execute(&self, parameter: &Parameter) -> Result<(), CommandError>;

    /// Trigger an execution and wait for its outcome
    async fn execute_and_wait(&self, parameter: &Parameter) -> Result<ExecutionOutcome, CommandError>;

    /// Fires whenever `can_execute` may return a different answer
    fn readiness_changed(&self) -> &EventSource<ReadinessChanged>;

    /// Whether an execution is in flight
    fn is_executing(&self) -> bool {
        false
    }

    /// Whether `id` is reachable through this command's members
    fn contains_command(&self, _id: CommandId) -> bool {
        false
    }
}
