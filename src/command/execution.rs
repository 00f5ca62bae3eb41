//! Idle/Running lifecycle shared by the single-flight commands
//!
//! `Idle -> Running` happens only through [`ExecutionState::begin`], a
//! compare-and-swap on the executing flag. `Running -> Idle` happens when the
//! [`Execution`] guard is dropped. The guard lives in the task that awaits the
//! work, not in the caller, so the state stays Running until the work itself
//! returns, fails or panics.

use std::{
    future::Future,
    pin::Pin,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, Ordering}
    }
};

use tokio::{runtime::Handle, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{Level, event};

use crate::domain::{
    constant::command,
    error::CommandError,
    event::EventSource,
    outcome::{CommandId, ExecutionOutcome, ReadinessChanged}
};

/// Type-erased work future
pub(crate) type BoxedWork = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// Execution flag, cancellation handle and notifications of one command
pub(crate) struct ExecutionState {
    id:           CommandId,
    name:         String,
    is_executing: AtomicBool,
    /// `Some` exactly while `is_executing` is set
    cancellation: Mutex<Option<CancellationToken>>,
    readiness:    EventSource<ReadinessChanged>,
    completed:    EventSource<ExecutionOutcome>
}

impl ExecutionState {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            id:           CommandId::new(),
            name:         name.into(),
            is_executing: AtomicBool::new(false),
            cancellation: Mutex::new(None),
            readiness:    EventSource::new(),
            completed:    EventSource::new()
        }
    }

    pub(crate) fn id(&self) -> CommandId {
        self.id
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn is_executing(&self) -> bool {
        self.is_executing.load(Ordering::Acquire)
    }

    pub(crate) fn readiness(&self) -> &EventSource<ReadinessChanged> {
        &self.readiness
    }

    pub(crate) fn completed(&self) -> &EventSource<ExecutionOutcome> {
        &self.completed
    }

    fn slot(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.cancellation.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move to Running and hand out a fresh cancellation token
    pub(crate) fn begin(&self) -> Result<CancellationToken, CommandError> {
        let token = {
            let mut slot = self.slot();
            if self.is_executing.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_err() {
                event!(Level::DEBUG, event = command::EXECUTION_REJECTED,
                       command = %self.name, command_id = %self.id);
                return Err(CommandError::AlreadyRunning { command: self.name.clone() });
            }
            let token = CancellationToken::new();
            *slot = Some(token.clone());
            token
        };

        event!(Level::DEBUG, event = command::EXECUTION_STARTED, command = %self.name, command_id = %self.id);
        self.publish_readiness();
        Ok(token)
    }

    /// Move back to Idle and publish how the execution ended
    fn finish(&self, outcome: &ExecutionOutcome) {
        {
            let mut slot = self.slot();
            slot.take();
            self.is_executing.store(false, Ordering::Release);
        }

        match outcome {
            ExecutionOutcome::Completed => {
                event!(Level::DEBUG, event = command::EXECUTION_COMPLETED,
                       command = %self.name, command_id = %self.id);
            }
            ExecutionOutcome::Cancelled => {
                event!(Level::INFO, event = command::EXECUTION_CANCELLED,
                       command = %self.name, command_id = %self.id);
            }
            ExecutionOutcome::Failed(err) => {
                event!(Level::WARN, event = command::EXECUTION_FAILED,
                       command = %self.name, command_id = %self.id, error = %err);
            }
        }

        self.publish_readiness();
        self.completed.publish(outcome);
    }

    /// Request cooperative cancellation of the in-flight execution.
    ///
    /// Returns false when idle or already requested.
    pub(crate) fn cancel(&self) -> bool {
        let slot = self.slot();
        match slot.as_ref() {
            Some(token) if !token.is_cancelled() => {
                token.cancel();
                event!(Level::DEBUG, event = command::CANCELLATION_REQUESTED,
                       command = %self.name, command_id = %self.id);
                true
            }
            _ => false
        }
    }

    pub(crate) fn publish_readiness(&self) {
        self.readiness.publish(&ReadinessChanged {
            command_id:   self.id,
            command_name: self.name.clone(),
            is_executing: self.is_executing()
        });
    }
}

/// Resets the state to Idle when dropped
struct Execution {
    state:   Arc<ExecutionState>,
    token:   CancellationToken,
    outcome: Option<ExecutionOutcome>
}

impl Drop for Execution {
    fn drop(&mut self) {
        let outcome = match self.outcome.take() {
            Some(outcome) => outcome,
            None => {
                // Torn down with the runtime before the work finished; stop it too.
                self.token.cancel();
                ExecutionOutcome::Cancelled
            }
        };
        self.state.finish(&outcome);
    }
}

async fn drive(state: Arc<ExecutionState>, token: CancellationToken, work: BoxedWork) -> ExecutionOutcome {
    let mut execution = Execution { state, token, outcome: None };

    let joined = tokio::spawn(work).await;
    let outcome = ExecutionOutcome::from_join(joined, execution.token.is_cancelled());

    execution.outcome = Some(outcome.clone());
    drop(execution);
    outcome
}

/// Run `work` for an execution started with [`ExecutionState::begin`].
///
/// The execution lives in its own task: dropping the returned handle only
/// detaches the caller, and the state goes back to Idle when the work ends.
pub(crate) fn launch(
    runtime: &Handle,
    state: Arc<ExecutionState>,
    token: CancellationToken,
    work: BoxedWork
) -> JoinHandle<ExecutionOutcome> {
    runtime.spawn(drive(state, token, work))
}

/// Wait for a launched execution
pub(crate) async fn join(handle: JoinHandle<ExecutionOutcome>) -> ExecutionOutcome {
    match handle.await {
        Ok(outcome) => outcome,
        Err(join_err) if join_err.is_cancelled() => ExecutionOutcome::Cancelled,
        Err(join_err) => ExecutionOutcome::Failed(Arc::new(anyhow::anyhow!("execution panicked: {}", join_err)))
    }
}

/// The runtime new executions are spawned on
pub(crate) fn runtime() -> Result<Handle, CommandError> {
    Handle::try_current().map_err(|e| CommandError::Runtime(e.to_string()))
}
