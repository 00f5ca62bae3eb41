use thiserror::Error;

/// Errors raised by the command layer itself.
///
/// Failures of the work a command runs are not represented here; they are
/// reported through [`ExecutionOutcome::Failed`](crate::domain::outcome::ExecutionOutcome).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The parameter handed to a command does not carry the payload type it expects
    #[error("command '{command}' expected a parameter of type {expected}")]
    TypeMismatch { command: String, expected: &'static str },

    /// A single-flight command was triggered while an execution is in flight
    #[error("command '{command}' is already running")]
    AlreadyRunning { command: String },

    /// There is no async runtime to run the work on
    #[error("no async runtime available: {0}")]
    Runtime(String),

    /// A host collaborator (file picker, frame) failed
    #[error("{0}")]
    Host(String),

    /// Returned by work that observed its cancellation token
    #[error("operation was cancelled")]
    Cancelled
}

/// Navigation registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No page is registered under the requested key or view-model type
    #[error("page for '{0}' not found")]
    NotFound(String),

    /// Navigation was requested before a frame was attached
    #[error("no frame attached to the navigation service")]
    NoFrame,

    /// The view-model factory refused the navigation parameter
    #[error("failed to create view model {view_model}: {reason}")]
    ViewModel { view_model: &'static str, reason: String }
}

/// Value conversion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// The converter has no backward direction
    #[error("converter '{0}' does not support converting back")]
    Unsupported(&'static str),

    /// A color literal could not be parsed
    #[error("invalid color '{0}'")]
    InvalidColor(String),

    /// No converter is registered under the name
    #[error("unknown converter '{0}'")]
    UnknownConverter(String)
}

/// Application level error type
#[derive(Error, Debug, Clone)]
pub enum AppError {
    /// File system related errors
    #[error("{0}")]
    FileSystem(String),

    /// Configuration related errors
    #[error("{0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("{0}")]
    Serialization(String),

    /// Unsupported language
    #[error("unsupported language '{0}'")]
    UnsupportedLanguage(String),

    /// Command layer errors
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Navigation errors
    #[error(transparent)]
    Navigation(#[from] NavigationError),

    /// Value conversion errors
    #[error(transparent)]
    Conversion(#[from] ConvertError),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String)
}

/// Convert from anyhow::Error
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Generic(err.to_string())
    }
}

/// Convert from std::io::Error
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

/// Convert from serde_yaml::Error
impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}
