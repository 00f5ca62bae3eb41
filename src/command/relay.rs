//! Single-flight asynchronous command with cooperative cancellation

use std::{any::Any, future::Future, sync::Arc};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::{
    command::execution::{self, BoxedWork, ExecutionState},
    domain::{
        error::CommandError,
        event::EventSource,
        outcome::{CommandId, ExecutionOutcome, ReadinessChanged},
        parameter::Parameter
    },
    port::command::Invocable
};

type WorkFn<T> = Arc<dyn Fn(T, CancellationToken) -> BoxedWork + Send + Sync>;
type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Wraps an asynchronous action taking a `T` payload and a cancellation token.
///
/// At most one execution is in flight per instance. While it runs,
/// `can_execute` answers false and a second `execute` is rejected with
/// [`CommandError::AlreadyRunning`]. The work must watch its token; `cancel`
/// only requests cancellation.
///
/// An absent [`Parameter`] is handed to the predicate and the work as
/// `T::default()`. Use `Option<U>` payloads when absence must stay visible.
pub struct AsyncRelayCommand<T> {
    state:     Arc<ExecutionState>,
    work:      WorkFn<T>,
    predicate: Option<Predicate<T>>
}

impl<T> AsyncRelayCommand<T>
where
    T: Any + Clone + Default + Send + Sync
{
    pub fn new<F, Fut>(work: F) -> Self
    where
        F: Fn(T, CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static
    {
        Self {
            state:     Arc::new(ExecutionState::new("async_relay_command")),
            work:      Arc::new(move |value, token| Box::pin(work(value, token))),
            predicate: None
        }
    }

    /// Gate execution on `predicate` in addition to the single-flight rule
    pub fn with_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Name used in notifications and logs.
    ///
    /// Existing subscribers stay attached. Ignored while an execution is in flight.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.rename(name.into());
        }
        self
    }

    pub fn is_executing(&self) -> bool {
        self.state.is_executing()
    }

    /// Typed readiness check
    pub fn can_execute_with(&self, value: &T) -> bool {
        if self.state.is_executing() {
            return false;
        }
        self.predicate.as_ref().is_none_or(|predicate| predicate(value))
    }

    /// Start the work in the background
    pub fn execute_with(&self, value: T) -> Result<(), CommandError> {
        let runtime = execution::runtime()?;
        let token = self.state.begin()?;
        let work = (self.work)(value, token.clone());
        execution::launch(&runtime, self.state.clone(), token, work);
        Ok(())
    }

    /// Run the work and wait for its outcome.
    ///
    /// Dropping the returned future stops the wait, not the execution.
    pub async fn run(&self, value: T) -> Result<ExecutionOutcome, CommandError> {
        let runtime = execution::runtime()?;
        let token = self.state.begin()?;
        let work = (self.work)(value, token.clone());
        Ok(execution::join(execution::launch(&runtime, self.state.clone(), token, work)).await)
    }

    /// Request cooperative cancellation; a no-op when idle
    pub fn cancel(&self) {
        self.state.cancel();
    }

    /// Fires with the outcome of every execution, after the command is idle again
    pub fn completed(&self) -> &EventSource<ExecutionOutcome> {
        self.state.completed()
    }
}

#[async_trait]
impl<T> Invocable for AsyncRelayCommand<T>
where
    T: Any + Clone + Default + Send + Sync
{
    fn id(&self) -> CommandId {
        self.state.id()
    }

    fn name(&self) -> &str {
        self.state.name()
    }

    fn can_execute(&self, parameter: &Parameter) -> Result<bool, CommandError> {
        if self.state.is_executing() {
            return Ok(false);
        }
        match &self.predicate {
            None => Ok(true),
            Some(predicate) => Ok(predicate(&parameter.extract::<T>(self.state.name())?))
        }
    }

    fn execute(&self, parameter: &Parameter) -> Result<(), CommandError> {
        let value = parameter.extract::<T>(self.state.name())?;
        self.execute_with(value)
    }

    async fn execute_and_wait(&self, parameter: &Parameter) -> Result<ExecutionOutcome, CommandError> {
        let value = parameter.extract::<T>(self.state.name())?;
        self.run(value).await
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
    use std::{
        sync::atomic::{AtomicBool, AtomicUsize, Ordering},
        time::Duration
    };

    use tokio::sync::{Notify, mpsc};

    use super::*;

    fn completions<T>(command: &AsyncRelayCommand<T>) -> mpsc::UnboundedReceiver<ExecutionOutcome>
    where
        T: Any + Clone + Default + Send + Sync
    {
        let (tx, rx) = mpsc::unbounded_channel();
        command.completed().subscribe(move |outcome| {
            let _ = tx.send(outcome.clone());
        });
        rx
    }

    fn gated<T>(gate: Arc<Notify>) -> AsyncRelayCommand<T>
    where
        T: Any + Clone + Default + Send + Sync
    {
        AsyncRelayCommand::new(move |_value: T, _token| {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                anyhow::Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_gated_execution_blocks_readiness_until_released() {
        let gate = Arc::new(Notify::new());
        let command = gated::<Option<String>>(gate.clone());
        let mut done = completions(&command);
        let none = Parameter::none();

        assert!(command.can_execute(&none).unwrap());

        command.execute(&none).unwrap();
        assert!(!command.can_execute(&none).unwrap());
        assert!(command.is_executing());

        tokio::task::yield_now().await;
        assert!(!command.can_execute(&none).unwrap());

        gate.notify_one();
        let outcome = done.recv().await.unwrap();

        assert!(outcome.is_completed());
        assert!(!command.is_executing());
        assert!(command.can_execute(&none).unwrap());
    }

    #[tokio::test]
    async fn test_predicate_gates_and_running_overrides_it() {
        let gate = Arc::new(Notify::new());
        let command = gated::<i32>(gate.clone()).with_predicate(|value| *value > 0);
        let mut done = completions(&command);

        assert!(!command.can_execute(&Parameter::new(0)).unwrap());
        assert!(command.can_execute(&Parameter::new(5)).unwrap());

        command.execute(&Parameter::new(5)).unwrap();
        assert!(!command.can_execute(&Parameter::new(0)).unwrap());
        assert!(!command.can_execute(&Parameter::new(5)).unwrap());
        assert!(!command.can_execute_with(&5));

        gate.notify_one();
        done.recv().await.unwrap();

        assert!(command.can_execute(&Parameter::new(5)).unwrap());
        assert!(command.can_execute_with(&5));
    }

    #[tokio::test]
    async fn test_absent_parameter_reaches_predicate_as_default() {
        let command = AsyncRelayCommand::<i32>::new(|_, _| async { anyhow::Ok(()) }).with_predicate(|value| *value == 0);

        assert!(command.can_execute(&Parameter::none()).unwrap());
    }

    #[tokio::test]
    async fn test_mismatched_parameter_is_rejected() {
        let unchecked = AsyncRelayCommand::<i32>::new(|_, _| async { anyhow::Ok(()) }).named("unchecked");
        let checked = AsyncRelayCommand::<i32>::new(|_, _| async { anyhow::Ok(()) })
            .named("checked")
            .with_predicate(|value| *value > 0);
        let text = Parameter::new("five");

        assert!(unchecked.can_execute(&text).unwrap());
        assert!(matches!(checked.can_execute(&text), Err(CommandError::TypeMismatch { .. })));
        assert!(matches!(unchecked.execute(&text), Err(CommandError::TypeMismatch { .. })));
        assert!(!unchecked.is_executing());
    }

    #[tokio::test]
    async fn test_second_execute_while_running_is_rejected() {
        let gate = Arc::new(Notify::new());
        let command = gated::<i32>(gate.clone()).named("sync");
        let mut done = completions(&command);

        command.execute_with(1).unwrap();
        match command.execute_with(2) {
            Err(CommandError::AlreadyRunning { command }) => assert_eq!(command, "sync"),
            other => panic!("Expected AlreadyRunning, got {:?}", other)
        }

        gate.notify_one();
        done.recv().await.unwrap();
        assert!(done.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_readiness_published_before_and_after_execution() {
        let gate = Arc::new(Notify::new());
        let command = gated::<i32>(gate.clone());
        let mut done = completions(&command);
        let notified = Arc::new(AtomicUsize::new(0));
        let executing_flags = Arc::new(std::sync::Mutex::new(Vec::new()));

        let counter = notified.clone();
        let flags = executing_flags.clone();
        command.readiness_changed().subscribe(move |event| {
            counter.fetch_add(1, Ordering::SeqCst);
            flags.lock().unwrap().push(event.is_executing);
        });

        command.execute_with(1).unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        gate.notify_one();
        done.recv().await.unwrap();

        assert_eq!(notified.load(Ordering::SeqCst), 2);
        assert_eq!(*executing_flags.lock().unwrap(), vec![true, false]);
    }

    #[tokio::test]
    async fn test_cancel_is_cooperative() {
        let command = AsyncRelayCommand::<i32>::new(|_, token: CancellationToken| async move {
            token.cancelled().await;
            Err::<(), anyhow::Error>(CommandError::Cancelled.into())
        });
        let mut done = completions(&command);

        command.execute_with(1).unwrap();
        command.cancel();
        command.cancel();

        let outcome = done.recv().await.unwrap();
        assert!(outcome.is_cancelled());
        assert!(command.can_execute(&Parameter::none()).unwrap());

        command.cancel();
    }

    #[tokio::test]
    async fn test_cancel_while_idle_never_precancels() {
        let saw_cancelled = Arc::new(AtomicBool::new(false));
        let flag = saw_cancelled.clone();
        let command = AsyncRelayCommand::<i32>::new(move |_, token: CancellationToken| {
            let flag = flag.clone();
            async move {
                flag.store(token.is_cancelled(), Ordering::SeqCst);
                anyhow::Ok(())
            }
        });

        command.cancel();
        let outcome = command.run(1).await.unwrap();

        assert!(outcome.is_completed());
        assert!(!saw_cancelled.load(Ordering::SeqCst));

        command.cancel();
        assert!(command.run(2).await.unwrap().is_completed());
    }

    #[tokio::test]
    async fn test_failure_resets_state_and_is_reported() {
        let command = AsyncRelayCommand::<i32>::new(|value, _| async move {
            Err::<(), anyhow::Error>(anyhow::anyhow!("value {} rejected", value))
        });

        let outcome = command.execute_and_wait(&Parameter::new(3)).await.unwrap();

        assert!(outcome.is_failed());
        assert_eq!(outcome.error().map(|e| e.to_string()), Some("value 3 rejected".to_string()));
        assert!(!command.is_executing());
        assert!(command.can_execute(&Parameter::none()).unwrap());
    }

    #[tokio::test]
    #[allow(unreachable_code)]
    async fn test_panicking_work_still_returns_to_idle() {
        let command = AsyncRelayCommand::<i32>::new(|_, _| async move {
            panic!("work exploded");
            anyhow::Ok(())
        });

        let outcome = command.run(1).await.unwrap();

        assert!(outcome.is_failed());
        assert!(!command.is_executing());
    }

    #[tokio::test]
    async fn test_abandoned_wait_keeps_the_execution_running() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (current, highest) = (running.clone(), peak.clone());
        let command = AsyncRelayCommand::<i32>::new(move |_, _token| {
            let (current, highest) = (current.clone(), highest.clone());
            async move {
                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                highest.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(150)).await;
                current.fetch_sub(1, Ordering::SeqCst);
                anyhow::Ok(())
            }
        });
        let mut done = completions(&command);

        let waited = tokio::time::timeout(Duration::from_millis(20), command.run(1)).await;

        assert!(waited.is_err());
        assert!(command.is_executing());
        assert!(!command.can_execute_with(&2));
        assert!(matches!(command.execute_with(2), Err(CommandError::AlreadyRunning { .. })));

        assert!(done.recv().await.unwrap().is_completed());
        assert!(!command.is_executing());
        assert_eq!(running.load(Ordering::SeqCst), 0);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_renaming_keeps_subscribers() {
        let command = AsyncRelayCommand::<i32>::new(|_, _| async { anyhow::Ok(()) });
        let mut done = completions(&command);
        let readiness = Arc::new(AtomicUsize::new(0));
        let counter = readiness.clone();
        command.readiness_changed().subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let command = command.named("export");
        command.run(1).await.unwrap();

        assert_eq!(command.name(), "export");
        assert!(done.recv().await.unwrap().is_completed());
        assert_eq!(readiness.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_execute_without_runtime_leaves_command_idle() {
        let command = AsyncRelayCommand::<i32>::new(|_, _| async { anyhow::Ok(()) });

        assert!(matches!(command.execute_with(1), Err(CommandError::Runtime(_))));
        assert!(!command.is_executing());
    }
}
