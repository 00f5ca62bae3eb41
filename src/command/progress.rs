//! Single-flight command whose work reports percentage progress

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicI32, Ordering}
    }
};

use async_trait::async_trait;
use tracing::{Level, event};

use crate::{
    command::execution::{self, BoxedWork, ExecutionState},
    domain::{
        constant::command,
        error::CommandError,
        event::EventSource,
        outcome::{CommandId, ExecutionOutcome, ReadinessChanged},
        parameter::Parameter
    },
    port::command::Invocable
};

struct ProgressState {
    command: String,
    value:   AtomicI32,
    changed: EventSource<i32>
}

/// Handed to the running work to report progress.
///
/// Values are forwarded exactly as reported: no clamping, no ordering, no
/// implied final 100.
#[derive(Clone)]
pub struct ProgressSink {
    progress: Arc<ProgressState>
}

impl ProgressSink {
    pub fn report(&self, percent: i32) {
        self.progress.value.store(percent, Ordering::Release);
        event!(Level::TRACE, event = command::PROGRESS_REPORTED, command = %self.progress.command, percent);
        self.progress.changed.publish(&percent);
    }
}

/// Runs work that reports progress through a [`ProgressSink`].
///
/// The command takes no parameter and is ready whenever it is idle.
pub struct ProgressAsyncRelayCommand {
    state:    Arc<ExecutionState>,
    progress: Arc<ProgressState>,
    work:     Arc<dyn Fn(ProgressSink) -> BoxedWork + Send + Sync>
}

impl ProgressAsyncRelayCommand {
    pub fn new<F, Fut>(work: F) -> Self
    where
        F: Fn(ProgressSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static
    {
        let name = "progress_async_relay_command";
        Self {
            state:    Arc::new(ExecutionState::new(name)),
            progress: Self::progress_state(name),
            work:     Arc::new(move |sink| Box::pin(work(sink)))
        }
    }

    fn progress_state(name: &str) -> Arc<ProgressState> {
        Arc::new(ProgressState { command: name.to_string(), value: AtomicI32::new(0), changed: EventSource::new() })
    }

    /// Name used in notifications and logs.
    ///
    /// Existing subscribers stay attached. Ignored while an execution is in flight.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if let (Some(state), Some(progress)) = (Arc::get_mut(&mut self.state), Arc::get_mut(&mut self.progress)) {
            progress.command = name.clone();
            state.rename(name);
        }
        self
    }

    pub fn can_execute(&self) -> bool {
        !self.state.is_executing()
    }

    pub fn is_executing(&self) -> bool {
        self.state.is_executing()
    }

    /// Last reported value, 0 before any report
    pub fn progress_value(&self) -> i32 {
        self.progress.value.load(Ordering::Acquire)
    }

    /// Fires with every reported value, in report order
    pub fn progress_changed(&self) -> &EventSource<i32> {
        &self.progress.changed
    }

    pub fn completed(&self) -> &EventSource<ExecutionOutcome> {
        self.state.completed()
    }

    fn sink(&self) -> ProgressSink {
        ProgressSink { progress: self.progress.clone() }
    }

    /// Start the work in the background
    pub fn execute(&self) -> Result<(), CommandError> {
        let runtime = execution::runtime()?;
        let token = self.state.begin()?;
        let work = (self.work)(self.sink());
        execution::launch(&runtime, self.state.clone(), token, work);
        Ok(())
    }

    /// Run the work and wait for its outcome.
    ///
    /// Dropping the returned future stops the wait, not the execution.
    pub async fn run(&self) -> Result<ExecutionOutcome, CommandError> {
        let runtime = execution::runtime()?;
        let token = self.state.begin()?;
        let work = (self.work)(self.sink());
        Ok(execution::join(execution::launch(&runtime, self.state.clone(), token, work)).await)
    }
}

#[async_trait]
impl Invocable for ProgressAsyncRelayCommand {
    fn id(&self) -> CommandId {
        self.state.id()
    }

    fn name(&self) -> &str {
        self.state.name()
    }

    fn can_execute(&self, _parameter: &Parameter) -> Result<bool, CommandError> {
        Ok(ProgressAsyncRelayCommand::can_execute(self))
    }

    fn execute(&self, _parameter: &Parameter) -> Result<(), CommandError> {
        ProgressAsyncRelayCommand::execute(self)
    }

    async fn execute_and_wait(&self, _parameter: &Parameter) -> Result<ExecutionOutcome, CommandError> {
        self.run().await
    }

    fn readiness_changed(&self) -> &EventSource<ReadinessChanged> {
        self.state.readiness()
    }

    fn is_executing(&self) -> bool {
        self.state.is_executing()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::{Notify, mpsc};

    use super::*;

    #[tokio::test]
    async fn test_progress_values_forwarded_in_report_order() {
        let command = ProgressAsyncRelayCommand::new(|sink| async move {
            for percent in [10, 55, 40, 100] {
                sink.report(percent);
            }
            anyhow::Ok(())
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        command.progress_changed().subscribe(move |percent| recorder.lock().unwrap().push(*percent));

        let outcome = command.run().await.unwrap();

        assert!(outcome.is_completed());
        assert_eq!(*seen.lock().unwrap(), vec![10, 55, 40, 100]);
        assert_eq!(command.progress_value(), 100);
    }

    #[tokio::test]
    async fn test_progress_is_not_clamped() {
        let command = ProgressAsyncRelayCommand::new(|sink| async move {
            sink.report(150);
            sink.report(-5);
            anyhow::Ok(())
        });

        command.run().await.unwrap();

        assert_eq!(command.progress_value(), -5);
    }

    #[tokio::test]
    async fn test_not_ready_while_running() {
        let gate = Arc::new(Notify::new());
        let release = gate.clone();
        let command = ProgressAsyncRelayCommand::new(move |sink| {
            let gate = release.clone();
            async move {
                sink.report(50);
                gate.notified().await;
                anyhow::Ok(())
            }
        })
        .named("import");
        let (tx, mut done) = mpsc::unbounded_channel();
        command.completed().subscribe(move |outcome| {
            let _ = tx.send(outcome.clone());
        });
        let readiness = Arc::new(Mutex::new(Vec::new()));
        let recorder = readiness.clone();
        command.readiness_changed().subscribe(move |event| recorder.lock().unwrap().push(event.is_executing));

        assert!(command.can_execute());
        Invocable::execute(&command, &Parameter::new("ignored")).unwrap();

        assert!(!command.can_execute());
        assert!(!Invocable::can_execute(&command, &Parameter::none()).unwrap());
        assert!(matches!(command.execute(), Err(CommandError::AlreadyRunning { .. })));

        gate.notify_one();
        assert!(done.recv().await.unwrap().is_completed());

        assert!(command.can_execute());
        assert_eq!(command.progress_value(), 50);
        assert_eq!(*readiness.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_renaming_keeps_progress_subscribers() {
        let command = ProgressAsyncRelayCommand::new(|sink| async move {
            sink.report(25);
            anyhow::Ok(())
        });
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        command.progress_changed().subscribe(move |percent| recorder.lock().unwrap().push(*percent));

        let command = command.named("thumbnails");
        command.run().await.unwrap();

        assert_eq!(Invocable::name(&command), "thumbnails");
        assert_eq!(*seen.lock().unwrap(), vec![25]);
    }

    #[tokio::test]
    async fn test_abandoned_wait_keeps_reporting() {
        let command = ProgressAsyncRelayCommand::new(|sink| async move {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            sink.report(100);
            anyhow::Ok(())
        });
        let (tx, mut done) = mpsc::unbounded_channel();
        command.completed().subscribe(move |outcome| {
            let _ = tx.send(outcome.clone());
        });

        let waited = tokio::time::timeout(std::time::Duration::from_millis(10), command.run()).await;

        assert!(waited.is_err());
        assert!(command.is_executing());
        assert!(done.recv().await.unwrap().is_completed());
        assert_eq!(command.progress_value(), 100);
        assert!(command.can_execute());
    }

    #[tokio::test]
    async fn test_failed_work_returns_to_idle() {
        let command = ProgressAsyncRelayCommand::new(|sink| async move {
            sink.report(30);
            Err::<(), anyhow::Error>(anyhow::anyhow!("index corrupted"))
        });

        let outcome = command.run().await.unwrap();

        assert!(outcome.is_failed());
        assert!(command.can_execute());
        assert_eq!(command.progress_value(), 30);
    }
}
