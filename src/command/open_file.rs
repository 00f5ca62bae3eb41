use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tracing::{Level, event};

use crate::{
    domain::{
        constant::command,
        error::CommandError,
        event::EventSource,
        outcome::{CommandId, ExecutionOutcome, ReadinessChanged},
        parameter::Parameter
    },
    port::{command::Invocable, picker::FilePicker}
};

/// Asks the host for a file and hands the chosen path to an action.
///
/// Always executable. Runs synchronously on the caller's thread, since the
/// picker is expected to block until the user answers.
pub struct OpenFileCommand {
    id:        CommandId,
    name:      String,
    picker:    Arc<dyn FilePicker>,
    action:    Arc<dyn Fn(PathBuf) + Send + Sync>,
    readiness: EventSource<ReadinessChanged>
}

impl OpenFileCommand {
    pub fn new<F>(picker: Arc<dyn FilePicker>, action: F) -> Self
    where
        F: Fn(PathBuf) + Send + Sync + 'static
    {
        Self {
            id: CommandId::new(),
            name: "open_file_command".to_string(),
            picker,
            action: Arc::new(action),
            readiness: EventSource::new()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Show the picker; `Completed` when a file was handed to the action,
    /// `Cancelled` when the dialog was dismissed
    pub fn open(&self) -> Result<ExecutionOutcome, CommandError> {
        let picked = self.picker.pick_file().map_err(|e| CommandError::Host(e.to_string()))?;

        match picked {
            Some(path) => {
                event!(Level::DEBUG, event = command::FILE_PICKED, command = %self.name, path = %path.display());
                (self.action)(path);
                Ok(ExecutionOutcome::Completed)
            }
            None => {
                event!(Level::DEBUG, event = command::FILE_DISMISSED, command = %self.name);
                Ok(ExecutionOutcome::Cancelled)
            }
        }
    }
}

#[async_trait]
impl Invocable for OpenFileCommand {
    fn id(&self) -> CommandId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn can_execute(&self, _parameter: &Parameter) -> Result<bool, CommandError> {
        Ok(true)
    }

    fn execute(&self, _parameter: &Parameter) -> Result<(), CommandError> {
        self.open().map(|_| ())
    }

    async fn execute_and_wait(&self, _parameter: &Parameter) -> Result<ExecutionOutcome, CommandError> {
        self.open()
    }

    /// Never fires: readiness does not change
    fn readiness_changed(&self) -> &EventSource<ReadinessChanged> {
        &self.readiness
    }
}
