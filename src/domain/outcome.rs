//! Identity, readiness and completion types shared by all commands

use std::{fmt, sync::Arc};

use tokio::task::JoinError;
use uuid::Uuid;

use crate::domain::error::CommandError;

/// Stable identity of a command instance, used in notifications and logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Published whenever the answer of `can_execute` may have changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadinessChanged {
    pub command_id:   CommandId,
    pub command_name: String,
    pub is_executing: bool
}

/// How an execution ended
#[derive(Debug, Clone)]
pub enum ExecutionOutcome {
    /// The work returned normally
    Completed,
    /// The work observed its cancellation token
    Cancelled,
    /// The work returned an error or panicked
    Failed(Arc<anyhow::Error>)
}

impl ExecutionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ExecutionOutcome::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecutionOutcome::Cancelled)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ExecutionOutcome::Failed(_))
    }

    /// The failure cause, if any
    pub fn error(&self) -> Option<&anyhow::Error> {
        match self {
            ExecutionOutcome::Failed(err) => Some(err),
            _ => None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionOutcome::Completed => "completed",
            ExecutionOutcome::Cancelled => "cancelled",
            ExecutionOutcome::Failed(_) => "failed"
        }
    }

    /// Classify the joined result of a spawned work future.
    ///
    /// Work that returns normally after its token was cancelled counts as cancelled.
    pub(crate) fn from_join(joined: Result<anyhow::Result<()>, JoinError>, cancellation_requested: bool) -> Self {
        match joined {
            Ok(Ok(())) if cancellation_requested => ExecutionOutcome::Cancelled,
            Ok(Ok(())) => ExecutionOutcome::Completed,
            Ok(Err(err)) if is_cancellation(&err) => ExecutionOutcome::Cancelled,
            Ok(Err(err)) => ExecutionOutcome::Failed(Arc::new(err)),
            Err(join_err) if join_err.is_cancelled() => ExecutionOutcome::Cancelled,
            Err(join_err) => ExecutionOutcome::Failed(Arc::new(anyhow::anyhow!("work panicked: {}", join_err)))
        }
    }

    /// Fold member outcomes: the first failure wins, then any cancellation
    pub fn combine(outcomes: impl IntoIterator<Item = ExecutionOutcome>) -> Self {
        let mut combined = ExecutionOutcome::Completed;
        for outcome in outcomes {
            match outcome {
                ExecutionOutcome::Failed(_) => return outcome,
                ExecutionOutcome::Cancelled => combined = ExecutionOutcome::Cancelled,
                ExecutionOutcome::Completed => {}
            }
        }
        combined
    }
}

impl fmt::Display for ExecutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutcome::Failed(err) => write!(f, "failed: {}", err),
            other => f.write_str(other.as_str())
        }
    }
}

fn is_cancellation(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<CommandError>(), Some(CommandError::Cancelled))
}
